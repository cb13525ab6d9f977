//! # Flight log summary
//!
//! Summarizes a flight recorder track log (IGC) in one pass over its lines:
//!
//! - takeoff position, time and altitude
//! - duration, corrected when the flight crosses midnight UTC
//! - total track distance and straight distance from takeoff to landing
//! - maximum altitude
//! - best climb and worst sink over short altitude windows
//! - climb, glide and sink phases
//!
//! Only the `HFDTE` date header and `B` fix records are read. Everything
//! else in the file, including security records, is ignored.
//!
//! ```no_run
//! let report = flight_log::parse("2022-07-27-flight.igc")?;
//!
//! println!("{} in {}", report.summary.total_track_distance, report.summary.duration);
//! # Ok::<(), flight_log::FlightLogError>(())
//! ```

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

pub mod accumulator;
pub mod clock;
mod error;
mod options;
pub mod phases;
pub mod record;
mod summary;
pub mod vario;

pub use accumulator::FlightAccumulator;
pub use error::{FlightLogError, RecordError, Result};
pub use options::{ParseOptions, WindowingMode};
pub use phases::{PhaseBlock, PhaseKind, PhaseReport};
pub use record::{FixRecord, Record};
pub use summary::{FlightSummary, Report};

/// Parse the recording at `path` with default options.
pub fn parse(path: impl AsRef<Path>) -> Result<Report> {
    parse_with(path, ParseOptions::default())
}

/// Read the recording at `path` once and summarize it.
///
/// Lines are decoded one at a time. Bytes that are not UTF-8 are replaced, so
/// a header with a Latin-1 pilot name is still ignored and a damaged fix ends
/// up in the diagnostics instead of failing the whole file.
pub fn parse_with(path: impl AsRef<Path>, options: ParseOptions) -> Result<Report> {
    let path = path.as_ref();
    let unreadable = |source: std::io::Error| FlightLogError::ResourceUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unreadable)?;

    tracing::debug!(path = %path.display(), "reading recording");

    let mut accumulator = FlightAccumulator::new(options);

    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(unreadable)?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);

        accumulator.push_line(&String::from_utf8_lossy(line))?;
    }

    accumulator.finish()
}

/// Summarize a recording already held in memory.
pub fn parse_str(content: &str, options: ParseOptions) -> Result<Report> {
    let mut accumulator = FlightAccumulator::new(options);

    for line in content.lines() {
        accumulator.push_line(line)?;
    }

    accumulator.finish()
}
