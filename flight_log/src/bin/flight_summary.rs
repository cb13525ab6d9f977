use std::path::{Path, PathBuf};

use flight_log::{FlightSummary, ParseOptions, PhaseKind, Report, WindowingMode};
use tracing_subscriber::EnvFilter;

#[derive(Debug, serde::Serialize)]
struct CsvRow {
    file: String,
    date: String,
    takeoff_time: String,
    takeoff_latitude: f64,
    takeoff_longitude: f64,
    takeoff_altitude: i32,
    landing_latitude: f64,
    landing_longitude: f64,
    landing_altitude: i32,
    duration_seconds: i64,
    total_distance_km: f64,
    takeoff_to_landing_km: f64,
    max_distance_from_takeoff_km: f64,
    max_altitude: i32,
    max_climb_rate: f64,
    max_sink_rate: f64,
    fixes: usize,
    skipped_lines: usize,
}

impl CsvRow {
    fn new(path: &Path, report: &Report) -> Self {
        let summary = &report.summary;

        Self {
            file: path.to_string_lossy().into_owned(),
            date: summary.flight_date.to_string(),
            takeoff_time: summary
                .takeoff_timestamp
                .map(|this| this.time().to_string())
                .unwrap_or_default(),
            takeoff_latitude: summary.takeoff_latitude,
            takeoff_longitude: summary.takeoff_longitude,
            takeoff_altitude: summary.takeoff_altitude,
            landing_latitude: summary.landing_latitude,
            landing_longitude: summary.landing_longitude,
            landing_altitude: summary.landing_altitude,
            duration_seconds: summary.duration.whole_seconds(),
            total_distance_km: summary.total_track_distance.as_kilometers(),
            takeoff_to_landing_km: summary.takeoff_to_landing_distance.as_kilometers(),
            max_distance_from_takeoff_km: summary.max_distance_from_takeoff.as_kilometers(),
            max_altitude: summary.max_altitude,
            max_climb_rate: summary.max_climb_rate,
            max_sink_rate: summary.max_sink_rate,
            fixes: summary.fix_count,
            skipped_lines: report.diagnostics.len(),
        }
    }
}

#[derive(Debug, clap::Parser)]
#[command(about = "Summarize IGC flight recorder logs")]
pub struct Args {
    /// IGC files to summarize
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Samples per vertical rate window and fixes per phase chunk
    #[arg(short, long, default_value_t = 5)]
    pub averaging_factor: u32,
    /// Flush vertical rate windows on seconds since takeoff instead of the fix clock digits
    #[arg(short, long, default_value_t = false)]
    pub elapsed_windows: bool,
    /// Vertical rate in m/s above which a chunk counts as climbing
    #[arg(long, default_value_t = 0.5)]
    pub climb_threshold: f64,
    /// Sink rate in m/s beyond which a chunk counts as sinking
    #[arg(long, default_value_t = 2.5)]
    pub sink_threshold: f64,
    /// Fail a file on its first bad line instead of skipping it
    #[arg(short, long, default_value_t = false)]
    pub strict: bool,
    /// Write one csv row per file. _Note_: will truncate old file if exists
    #[arg(long)]
    pub csv: Option<PathBuf>,
    /// Also print every phase block
    #[arg(short, long, default_value_t = false)]
    pub phases: bool,
    /// More logging, repeat for more. `RUST_LOG` is used when not given
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn heading(heading: Option<u16>) -> String {
    heading
        .map(|this| format!("{this}°"))
        .unwrap_or_else(|| "-".to_owned())
}

fn print_summary(path: &Path, summary: &FlightSummary) {
    println!("--- {}", path.display());

    if summary.is_empty() {
        println!("No usable track");
        return;
    }

    let takeoff_time = summary
        .takeoff_timestamp
        .map(|this| this.time().to_string())
        .unwrap_or_default();

    println!("Date: {}", summary.flight_date);
    println!(
        "Takeoff: ({:.6}, {:.6}) at {takeoff_time} UTC, {} m, heading {}",
        summary.takeoff_latitude,
        summary.takeoff_longitude,
        summary.takeoff_altitude,
        heading(summary.takeoff_heading),
    );
    println!(
        "Landing: ({:.6}, {:.6}), {} m, heading {}",
        summary.landing_latitude,
        summary.landing_longitude,
        summary.landing_altitude,
        heading(summary.landing_heading),
    );
    println!(
        "Duration: {} ({} s)",
        summary.duration,
        summary.duration.whole_seconds()
    );
    println!("Track distance: {}", summary.total_track_distance);
    println!("Takeoff to landing: {}", summary.takeoff_to_landing_distance);
    println!("Max distance from takeoff: {}", summary.max_distance_from_takeoff);
    println!("Average speed: {:.1} km/h", summary.average_speed_kmhr());
    println!("Max altitude: {} m", summary.max_altitude);
    println!("Max climb: {:.1} m/s", summary.max_climb_rate);
    println!("Max sink: {:.1} m/s", summary.max_sink_rate);
}

fn print_phases(report: &Report, detailed: bool) {
    let phases = &report.phases;

    for kind in [PhaseKind::Climb, PhaseKind::Glide, PhaseKind::Sink] {
        println!(
            "{kind:>6}: {:3} phases, {:5.1}% of fixes, mean {} m/s",
            phases.count(kind),
            phases.fraction(kind) * 100.0,
            phases
                .mean_rate(kind)
                .map(|this| format!("{this:.1}"))
                .unwrap_or_else(|| "-".to_owned()),
        );
    }

    if let Some(climb) = phases.max_sustained_climb() {
        println!("Max sustained climb: {climb:.1} m/s");
    }

    if let Some(grade) = phases.climb_grade() {
        println!("Climb grade: {:.0}% of fixes rising", grade * 100.0);
    }

    if let Some(grade) = phases.glide_grade() {
        println!("Glide grade: L/D {grade:.1}");
    }

    if let Some(grade) = phases.sink_grade() {
        println!("Sink grade: {grade:.1} m/s");
    }

    if !detailed {
        return;
    }

    for (i, block) in phases.blocks.iter().enumerate() {
        println!(
            "{i:4} {:>6} {} - {} | {:5} m -> {:5} m | {:5.1} m/s | {} flown, {} straight{}",
            block.kind,
            block.start_time,
            block.end_time,
            block.altitude_start,
            block.altitude_end,
            block.rate(),
            block.track_distance,
            block.straight_distance(),
            match block.kind {
                PhaseKind::Climb => format!(" | {:.0}% rising", block.climb_share() * 100.0),
                PhaseKind::Glide => format!(" | L/D {:.1}", block.glide_ratio()),
                PhaseKind::Sink => String::new(),
            },
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Args {
        files,
        averaging_factor,
        elapsed_windows,
        climb_threshold,
        sink_threshold,
        strict,
        csv: csv_path,
        phases,
        verbose,
    } = <Args as clap::Parser>::parse();

    init_logging(verbose);

    let options = ParseOptions::new()
        .set_averaging_factor(averaging_factor)
        .set_windowing(match elapsed_windows {
            true => WindowingMode::ElapsedSeconds,
            false => WindowingMode::ClockDigits,
        })
        .set_climb_threshold(climb_threshold)
        .set_sink_threshold(sink_threshold)
        .set_strict(strict);

    let mut wrt = csv_path
        .as_ref()
        .map(csv::Writer::from_path)
        .transpose()
        .map_err(|e| format!("Failed to create csv file. Reason: {e}"))?;

    let mut failed = 0;

    for path in &files {
        let report = match flight_log::parse_with(path, options.clone()) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to summarize");
                eprintln!("{}: {e}", path.display());
                failed += 1;
                continue;
            }
        };

        print_summary(path, &report.summary);

        if !report.summary.is_empty() {
            print_phases(&report, phases);
        }

        if !report.diagnostics.is_empty() {
            println!("Skipped lines: {}", report.diagnostics.len());
        }

        if let Some(wrt) = &mut wrt {
            wrt.serialize(CsvRow::new(path, &report))?;
        }
    }

    if let Some(mut wrt) = wrt {
        wrt.flush()?;

        if let Some(csv_path) = &csv_path {
            println!("Saved to {}", csv_path.to_string_lossy());
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} files failed", files.len()).into());
    }

    Ok(())
}
