//! Command-line options.
//!
//! ```text
//! pagetrace [-n N] [-c N] [-o MODE] [-v]... <tracefile> <level bits>...
//! ```
//!
//! Options take their value either attached (`-n10`) or as the next
//! argument (`-n 10`) and may appear anywhere before a `--`.

use sim_vmem::{AddressSpaceConfig, ConfigError};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

/// One-line usage summary.
pub const USAGE: &str =
    "usage: pagetrace [-n N] [-c N] [-o MODE] [-v]... <tracefile> <level bits>...";

/// What to print while replaying the trace.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum OutputMode {
    /// The per-level masks; the trace is not read.
    Bitmasks,
    /// The in-page offset of every address.
    Offset,
    /// Per-level indices and the frame of every address.
    Vpn2Pfn,
    /// Virtual to physical address.
    Va2Pa,
    /// Virtual to physical address with TLB and page table outcomes.
    Va2PaTlbPtwalk,
    /// Aggregate counters after the run.
    #[default]
    Summary,
}

/// Validated driver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub trace_file: PathBuf,
    pub config: AddressSpaceConfig,
    pub max_accesses: Option<NonZeroUsize>,
    pub tlb_capacity: usize,
    pub mode: OutputMode,
    pub verbosity: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("option -{0} requires a value")]
    MissingValue(char),
    #[error("number of memory accesses must be a number, greater than 0 (got {0:?})")]
    InvalidAccessLimit(String),
    #[error("cache capacity must be a number, greater than or equal to 0 (got {0:?})")]
    InvalidCapacity(String),
    #[error("unknown output mode {0:?}")]
    UnknownMode(String),
    #[error("invalid argument {0:?}")]
    UnknownOption(String),
    #[error("a trace file and at least one level size are required")]
    MissingArguments,
    #[error("level {level} page table must be at least 1 bit (got {value:?})")]
    InvalidLevel { level: usize, value: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl OutputMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bitmasks => "bitmasks",
            Self::Offset => "offset",
            Self::Vpn2Pfn => "vpn2pfn",
            Self::Va2Pa => "va2pa",
            Self::Va2PaTlbPtwalk => "va2pa_tlb_ptwalk",
            Self::Summary => "summary",
        }
    }
}

impl FromStr for OutputMode {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bitmasks" => Self::Bitmasks,
            "offset" => Self::Offset,
            "vpn2pfn" => Self::Vpn2Pfn,
            "va2pa" => Self::Va2Pa,
            "va2pa_tlb_ptwalk" | "va2pa_atc_ptwalk" => Self::Va2PaTlbPtwalk,
            "summary" => Self::Summary,
            _ => return Err(UsageError::UnknownMode(s.to_owned())),
        })
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Options {
    /// Parse the arguments following the program name.
    ///
    /// # Errors
    /// Any [`UsageError`]; level widths are validated through
    /// [`AddressSpaceConfig::new`].
    pub fn parse<I, S>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::<String>::into);
        let mut positional = Vec::new();
        let mut max_accesses = None;
        let mut tlb_capacity = 0;
        let mut mode = OutputMode::default();
        let mut verbosity = 0u8;

        while let Some(arg) = args.next() {
            if arg == "--" {
                positional.extend(args.by_ref());
                break;
            }

            let mut chars = arg.chars();
            let flag = match (chars.next(), chars.next()) {
                (Some('-'), Some(flag)) => flag,
                _ => {
                    positional.push(arg);
                    continue;
                }
            };
            let attached = chars.as_str();

            if flag == 'v' && attached.chars().all(|c| c == 'v') {
                let count = u8::try_from(attached.len() + 1).unwrap_or(u8::MAX);
                verbosity = verbosity.saturating_add(count);
                continue;
            }

            let mut value = || {
                if attached.is_empty() {
                    args.next().ok_or(UsageError::MissingValue(flag))
                } else {
                    Ok(attached.to_owned())
                }
            };

            match flag {
                'n' => {
                    let v = value()?;
                    let n = v
                        .parse::<NonZeroUsize>()
                        .map_err(|_| UsageError::InvalidAccessLimit(v))?;
                    max_accesses = Some(n);
                }
                'c' => {
                    let v = value()?;
                    tlb_capacity = v
                        .parse::<usize>()
                        .map_err(|_| UsageError::InvalidCapacity(v))?;
                }
                'o' => mode = value()?.parse()?,
                _ => return Err(UsageError::UnknownOption(arg)),
            }
        }

        let mut positional = positional.into_iter();
        let trace_file = positional.next().ok_or(UsageError::MissingArguments)?;
        let widths = positional
            .enumerate()
            .map(|(level, value)| match value.parse::<u32>() {
                Ok(bits) if bits > 0 => Ok(bits),
                _ => Err(UsageError::InvalidLevel { level, value }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if widths.is_empty() {
            return Err(UsageError::MissingArguments);
        }

        Ok(Self {
            trace_file: PathBuf::from(trace_file),
            config: AddressSpaceConfig::new(widths)?,
            max_accesses,
            tlb_capacity,
            mode,
            verbosity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = Options::parse(["trace.bin", "8", "8"]).expect("valid");
        assert_eq!(o.trace_file, PathBuf::from("trace.bin"));
        assert_eq!(o.config.levels(), [8, 8]);
        assert_eq!(o.max_accesses, None);
        assert_eq!(o.tlb_capacity, 0);
        assert_eq!(o.mode, OutputMode::Summary);
        assert_eq!(o.verbosity, 0);
    }

    #[test]
    fn options_detached_and_attached() {
        let o = Options::parse(["-n", "20", "-c8", "-o", "va2pa", "t", "4", "4", "-vv"])
            .expect("valid");
        assert_eq!(o.max_accesses.map(NonZeroUsize::get), Some(20));
        assert_eq!(o.tlb_capacity, 8);
        assert_eq!(o.mode, OutputMode::Va2Pa);
        assert_eq!(o.verbosity, 2);
    }

    #[test]
    fn atc_alias() {
        let o = Options::parse(["-o", "va2pa_atc_ptwalk", "t", "4"]).expect("valid");
        assert_eq!(o.mode, OutputMode::Va2PaTlbPtwalk);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches!(
            Options::parse(["-n", "0", "t", "4"]),
            Err(UsageError::InvalidAccessLimit(_))
        ));
        assert!(matches!(
            Options::parse(["-c", "-1", "t", "4"]),
            Err(UsageError::InvalidCapacity(_))
        ));
        assert!(matches!(
            Options::parse(["-n"]),
            Err(UsageError::MissingValue('n'))
        ));
    }

    #[test]
    fn rejects_bad_levels() {
        assert!(matches!(
            Options::parse(["t", "4", "0"]),
            Err(UsageError::InvalidLevel { level: 1, .. })
        ));
        assert!(matches!(
            Options::parse(["t", "20", "9"]),
            Err(UsageError::Config(ConfigError::TooManyBits { total: 29, .. }))
        ));
        assert!(matches!(
            Options::parse(["t"]),
            Err(UsageError::MissingArguments)
        ));
    }

    #[test]
    fn rejects_unknown_things() {
        assert!(matches!(
            Options::parse(["-x", "t", "4"]),
            Err(UsageError::UnknownOption(_))
        ));
        assert!(matches!(
            Options::parse(["-o", "everything", "t", "4"]),
            Err(UsageError::UnknownMode(_))
        ));
    }

    #[test]
    fn double_dash_ends_options() {
        let o = Options::parse(["--", "-trace", "4"]).expect("valid");
        assert_eq!(o.trace_file, PathBuf::from("-trace"));
    }
}
