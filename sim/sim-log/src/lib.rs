//! # Simulator Logging
//!
//! A minimal [`log::Log`] sink for the simulator tools. Library crates only
//! talk to the `log` facade; the binary installs a [`StderrLogger`] once at
//! start-up.
//!
//! ```text
//! sim-vmem ── trace!/debug! ──► log facade ──► StderrLogger ──► stderr
//! ```
//!
//! Every record is written as a single line:
//!
//! ```text
//! [LEVEL] target: message
//! ```
//!
//! Diagnostics go to stderr so they never interleave with report output on
//! stdout.

mod logger;

pub use crate::logger::{StderrLogger, format_record, level_from_verbosity};
