//! # pagetrace
//!
//! Replays a binary memory trace through a [`TranslationEngine`] and prints
//! one of several reports.
//!
//! ```text
//! trace file ──► TraceReader ──► TranslationEngine ──► report ──► stdout
//! ```
//!
//! The binary is a thin shell over [`run`]: it parses [`Options`], installs
//! the logger and maps errors to an exit status.

pub mod options;
pub mod report;
pub mod trace;

use log::{info, warn};
use sim_vmem::{TranslationEngine, TranslationStats};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub use crate::options::{OutputMode, Options, USAGE, UsageError};
pub use crate::trace::{RECORD_SIZE, RecordMeta, TraceError, TraceReader, TraceRecord};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

/// Open the trace named in `options` and replay it into `out`.
///
/// # Errors
/// See [`simulate`]; additionally [`Error::Open`] if the trace cannot be
/// opened.
pub fn run(options: &Options, out: &mut impl Write) -> Result<TranslationStats, Error> {
    let file = File::open(&options.trace_file).map_err(|source| Error::Open {
        path: options.trace_file.clone(),
        source,
    })?;
    simulate(options, BufReader::new(file), out)
}

/// Replay `trace` through a fresh engine and write the report to `out`.
///
/// In [`OutputMode::Bitmasks`] only the mask table is written and `trace`
/// is not read. A partial trailing record ends the replay early with a
/// warning; every complete record before it is still counted.
///
/// # Errors
/// - [`Error::Trace`] if reading the trace fails.
/// - [`Error::Output`] if writing the report fails.
pub fn simulate(
    options: &Options,
    trace: impl Read,
    out: &mut impl Write,
) -> Result<TranslationStats, Error> {
    let mut engine = TranslationEngine::new(&options.config, options.tlb_capacity);

    if options.mode == OutputMode::Bitmasks {
        report::write_bitmasks(out, engine.decoder()).map_err(Error::Output)?;
        return Ok(engine.stats());
    }

    let limit = options.max_accesses.map_or(usize::MAX, NonZeroUsize::get);
    for record in TraceReader::new(trace).take(limit) {
        let record = match record {
            Ok(record) => record,
            Err(TraceError::Truncated { offset, len }) => {
                warn!(
                    "trace ends with a partial record of {len} bytes at byte {offset}, ignoring it"
                );
                break;
            }
            Err(e) => return Err(e.into()),
        };

        let translation = engine.translate(record.address);
        report::write_access(out, options.mode, engine.decoder(), &translation)
            .map_err(Error::Output)?;
    }

    let stats = engine.stats();
    info!(
        "processed {} addresses, {} frames allocated",
        stats.accesses, stats.frames_allocated
    );

    if options.mode == OutputMode::Summary {
        report::write_summary(out, options.config.page_size(), &stats).map_err(Error::Output)?;
    }

    Ok(stats)
}
