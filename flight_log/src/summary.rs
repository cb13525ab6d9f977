use geodesy::Distance;
use time::{Date, Duration, PrimitiveDateTime};

use crate::{error::FlightLogError, phases::PhaseReport};

/// Derived statistics for one recorded flight.
///
/// Units: degrees for coordinates and headings, meters for altitudes,
/// kilometers for distances, m/s for vertical rates.
/// A file without fixes yields zeroed numeric fields, see [`FlightSummary::is_empty`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlightSummary {
    pub flight_date: Date,

    pub takeoff_latitude: f64,
    pub takeoff_longitude: f64,
    /// `None` when there was no fix
    pub takeoff_timestamp: Option<PrimitiveDateTime>,
    pub takeoff_altitude: i32,
    /// Bearing of the first leg that moved, whole degrees
    pub takeoff_heading: Option<u16>,

    pub landing_latitude: f64,
    pub landing_longitude: f64,
    pub landing_altitude: i32,
    /// Bearing of the last leg that moved, whole degrees
    pub landing_heading: Option<u16>,

    /// Takeoff to last fix, corrected for midnight rollover
    pub duration: Duration,
    pub total_track_distance: Distance,
    pub takeoff_to_landing_distance: Distance,
    pub max_distance_from_takeoff: Distance,

    pub max_altitude: i32,
    /// Best windowed climb, `>= 0`
    pub max_climb_rate: f64,
    /// Worst windowed sink, `<= 0`
    pub max_sink_rate: f64,

    pub fix_count: usize,
    /// Fixes higher than the fix before
    pub climbing_fixes: usize,
    /// Fixes at or below the fix before
    pub gliding_fixes: usize,
}

impl FlightSummary {
    /// Summary of a recording without a usable track.
    pub const fn empty(flight_date: Date) -> Self {
        Self {
            flight_date,
            takeoff_latitude: 0.0,
            takeoff_longitude: 0.0,
            takeoff_timestamp: None,
            takeoff_altitude: 0,
            takeoff_heading: None,
            landing_latitude: 0.0,
            landing_longitude: 0.0,
            landing_altitude: 0,
            landing_heading: None,
            duration: Duration::ZERO,
            total_track_distance: Distance::ZERO,
            takeoff_to_landing_distance: Distance::ZERO,
            max_distance_from_takeoff: Distance::ZERO,
            max_altitude: 0,
            max_climb_rate: 0.0,
            max_sink_rate: 0.0,
            fix_count: 0,
            climbing_fixes: 0,
            gliding_fixes: 0,
        }
    }

    /// `true` when no fix was recorded.
    pub const fn is_empty(&self) -> bool {
        self.fix_count == 0
    }

    /// Average ground speed in km/h, zero for zero duration.
    pub fn average_speed_kmhr(&self) -> f64 {
        let hours = self.duration.as_seconds_f64() / 60.0 / 60.0;

        match hours > 0.0 {
            true => self.total_track_distance.as_kilometers() / hours,
            false => 0.0,
        }
    }
}

/// Result of parsing one recording.
#[derive(Debug)]
pub struct Report {
    pub summary: FlightSummary,
    pub phases: PhaseReport,
    /// Lines that were skipped, in input order
    pub diagnostics: Vec<FlightLogError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use time::macros::date;

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = FlightSummary::empty(date!(2022 - 07 - 27));

        assert!(summary.is_empty());
        assert_eq!(summary.duration, Duration::ZERO);
        assert_eq!(summary.total_track_distance, Distance::ZERO);
        assert_eq!(summary.max_altitude, 0);
        assert_eq!(summary.average_speed_kmhr(), 0.0);
    }

    #[test]
    fn average_speed() {
        let summary = FlightSummary {
            duration: Duration::minutes(30),
            total_track_distance: Distance::from_kilometers(12.0),
            fix_count: 2,
            ..FlightSummary::empty(date!(2022 - 07 - 27))
        };

        assert!(!summary.is_empty());
        assert_eq!(summary.average_speed_kmhr(), 24.0);
    }
}
