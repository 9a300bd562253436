use pagetrace::{Options, USAGE};
use sim_log::{StderrLogger, level_from_verbosity};
use std::env;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = StderrLogger::new(level_from_verbosity(options.verbosity)).init() {
        eprintln!("logging disabled: {e}");
    }

    let mut out = BufWriter::new(io::stdout().lock());
    let result = pagetrace::run(&options, &mut out)
        .and_then(|_| out.flush().map_err(pagetrace::Error::Output));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
