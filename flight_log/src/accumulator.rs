//! Single pass over a recording.
//!
//! The accumulator starts before takeoff, treats the first locked fix as
//! takeoff and from then on folds every fix into running totals. Calling
//! [`FlightAccumulator::finish`] consumes it and derives the summary.

use geodesy::{Distance, Position};
use time::{Date, Duration};
use tracing::{debug, info, warn};

use crate::{
    clock,
    error::{FlightLogError, Result},
    options::{ParseOptions, WindowingMode},
    phases::{PhaseTracker, Sample},
    record::{self, FixRecord, Record},
    summary::{FlightSummary, Report},
    vario::AltitudeWindow,
};

#[derive(Debug)]
pub struct FlightAccumulator {
    options: ParseOptions,
    date: Option<Date>,
    line_number: usize,
    state: State,
    window: AltitudeWindow,
    max_climb_rate: f64,
    max_sink_rate: f64,
    phases: PhaseTracker,
    diagnostics: Vec<FlightLogError>,
}

#[derive(Debug)]
enum State {
    BeforeTakeoff,
    InFlight(Box<Flight>),
}

#[derive(Debug)]
struct Flight {
    takeoff: FixRecord,
    last: FixRecord,
    track_distance: Distance,
    max_distance_from_takeoff: Distance,
    max_altitude: i32,
    takeoff_heading: Option<f64>,
    landing_heading: Option<f64>,
    fix_count: usize,
    climbing_fixes: usize,
    gliding_fixes: usize,
}

impl Flight {
    fn new(takeoff: FixRecord) -> Self {
        Self {
            takeoff,
            last: takeoff,
            track_distance: Distance::ZERO,
            max_distance_from_takeoff: Distance::ZERO,
            max_altitude: takeoff.altitude,
            takeoff_heading: None,
            landing_heading: None,
            fix_count: 1,
            climbing_fixes: 0,
            gliding_fixes: 0,
        }
    }

    /// Fold in the next fix. Returns seconds since takeoff and the leg flown.
    fn advance(&mut self, fix: FixRecord) -> (i64, Distance) {
        let offset = clock::elapsed_seconds(self.takeoff.time, fix.time);

        let leg = self.last.position.distance_to(fix.position);
        self.track_distance += leg;

        let from_takeoff = self.takeoff.position.distance_to(fix.position);
        if from_takeoff > self.max_distance_from_takeoff {
            self.max_distance_from_takeoff = from_takeoff;
        }

        if self.last.position != fix.position {
            let heading = self.last.position.bearing_to(fix.position);

            if self.takeoff_heading.is_none() {
                self.takeoff_heading = Some(heading);
            }
            self.landing_heading = Some(heading);
        }

        match fix.altitude > self.last.altitude {
            true => self.climbing_fixes += 1,
            false => self.gliding_fixes += 1,
        }

        self.max_altitude = self.max_altitude.max(fix.altitude);
        self.fix_count += 1;
        self.last = fix;

        (offset, leg)
    }

    fn summary(&self, date: Date, max_climb_rate: f64, max_sink_rate: f64) -> FlightSummary {
        let Self { takeoff, last, .. } = self;

        FlightSummary {
            flight_date: date,
            takeoff_latitude: takeoff.position.latitude,
            takeoff_longitude: takeoff.position.longitude,
            takeoff_timestamp: Some(clock::timestamp(date, takeoff.time)),
            takeoff_altitude: takeoff.altitude,
            takeoff_heading: self.takeoff_heading.map(whole_degrees),
            landing_latitude: last.position.latitude,
            landing_longitude: last.position.longitude,
            landing_altitude: last.altitude,
            landing_heading: self.landing_heading.map(whole_degrees),
            duration: clock::flight_duration(date, takeoff.time, last.time),
            total_track_distance: self.track_distance,
            takeoff_to_landing_distance: takeoff.position.distance_to(last.position),
            max_distance_from_takeoff: self.max_distance_from_takeoff,
            max_altitude: self.max_altitude,
            max_climb_rate,
            max_sink_rate,
            fix_count: self.fix_count,
            climbing_fixes: self.climbing_fixes,
            gliding_fixes: self.gliding_fixes,
        }
    }
}

/// Bearings are in `[0, 360)` so truncation always fits.
fn whole_degrees(bearing: f64) -> u16 {
    bearing.floor() as u16
}

/// Recorders write a zero latitude until they have a position lock.
fn has_lock(position: Position) -> bool {
    position.latitude != 0.0
}

impl FlightAccumulator {
    /// A zero averaging factor is treated as one.
    pub fn new(mut options: ParseOptions) -> Self {
        options.averaging_factor = options.averaging_factor.max(1);

        let phases = PhaseTracker::new(
            options.averaging_factor as usize,
            options.climb_threshold,
            options.sink_threshold,
        );

        Self {
            options,
            date: None,
            line_number: 0,
            state: State::BeforeTakeoff,
            window: AltitudeWindow::new(),
            max_climb_rate: 0.0,
            max_sink_rate: 0.0,
            phases,
            diagnostics: Vec::new(),
        }
    }

    /// Feed the next line of the recording.
    ///
    /// Bad lines are recorded as diagnostics and skipped unless
    /// [`ParseOptions::strict`] is set. A fix before any date header is a hard
    /// failure either way.
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        self.line_number += 1;

        match record::parse_line(line) {
            Ok(Record::DateHeader(date)) => {
                if self.date.is_some_and(|current| current != date) {
                    warn!(line = self.line_number, %date, "date header repeated, using the last one");
                }

                self.date = Some(date);
                Ok(())
            }
            Ok(Record::Fix(fix)) => self.push_fix(fix),
            Ok(Record::Other) => Ok(()),
            Err(reason) => self.reject(FlightLogError::at_line(self.line_number, reason)),
        }
    }

    fn reject(&mut self, error: FlightLogError) -> Result<()> {
        if self.options.strict {
            return Err(error);
        }

        warn!(%error, "skipping line");
        self.diagnostics.push(error);

        Ok(())
    }

    pub fn push_fix(&mut self, fix: FixRecord) -> Result<()> {
        if self.date.is_none() {
            return Err(FlightLogError::MissingDateHeader);
        }

        if !has_lock(fix.position) {
            debug!(line = self.line_number, time = %fix.time, "no position lock, ignoring fix");
            return Ok(());
        }

        let (offset, leg) = match self.state {
            State::BeforeTakeoff => {
                debug!(
                    line = self.line_number,
                    time = %fix.time,
                    latitude = fix.position.latitude,
                    longitude = fix.position.longitude,
                    altitude = fix.altitude,
                    "takeoff"
                );

                self.state = State::InFlight(Box::new(Flight::new(fix)));
                (0, Distance::ZERO)
            }
            State::InFlight(ref mut flight) => flight.advance(fix),
        };

        self.phases.push(Sample {
            time: fix.time,
            offset: Duration::seconds(offset),
            position: fix.position,
            altitude: fix.altitude,
            leg,
        });

        self.update_window(&fix, offset);

        Ok(())
    }

    /// On a tick that is a multiple of the averaging factor a full window is
    /// flushed into the climb and sink peaks; on any other tick the altitude is
    /// collected.
    fn update_window(&mut self, fix: &FixRecord, offset: i64) {
        let factor = self.options.averaging_factor;

        let tick = match self.options.windowing {
            WindowingMode::ClockDigits => i64::from(fix.clock_digits),
            WindowingMode::ElapsedSeconds => offset,
        };

        if tick % i64::from(factor) != 0 {
            self.window.push(fix.altitude);
            return;
        }

        if self.window.len() <= factor as usize {
            return;
        }

        let Some(rate) = self.window.flush() else {
            return;
        };

        debug!(line = self.line_number, rate, "vertical rate window");

        self.max_climb_rate = self.max_climb_rate.max(rate);
        self.max_sink_rate = self.max_sink_rate.min(rate);
    }

    /// Lines skipped so far.
    pub fn diagnostics(&self) -> &[FlightLogError] {
        &self.diagnostics
    }

    pub fn finish(self) -> Result<Report> {
        let date = self.date.ok_or(FlightLogError::MissingDateHeader)?;

        let summary = match &self.state {
            State::BeforeTakeoff => FlightSummary::empty(date),
            State::InFlight(flight) => flight.summary(date, self.max_climb_rate, self.max_sink_rate),
        };

        if summary.is_empty() {
            warn!(%date, "recording has no usable track");
        }

        info!(
            fixes = summary.fix_count,
            duration = %summary.duration,
            distance = %summary.total_track_distance,
            skipped = self.diagnostics.len(),
            "flight summarized"
        );

        Ok(Report {
            summary,
            phases: self.phases.finish(),
            diagnostics: self.diagnostics,
        })
    }
}

impl Default for FlightAccumulator {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}
