//! Climb, glide and sink phases.
//!
//! Fixes are grouped into chunks of `averaging_factor` fixes. Each chunk is
//! classified by its vertical rate and consecutive chunks of the same kind are
//! merged into one [`PhaseBlock`].

use geodesy::{Distance, Position};
use time::{Duration, Time};

use crate::vario::vertical_rate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseKind {
    Climb,
    Glide,
    Sink,
}

impl PhaseKind {
    /// Params:
    /// - `rate` - vertical rate in m/s
    /// - `climb_threshold` - rates above this are climbing
    /// - `sink_threshold` - rates below the negated value are sinking
    pub fn from_rate(rate: f64, climb_threshold: f64, sink_threshold: f64) -> Self {
        if rate > climb_threshold {
            return Self::Climb;
        }

        if rate < -sink_threshold {
            return Self::Sink;
        }

        Self::Glide
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PhaseKind::Climb => "climb",
            PhaseKind::Glide => "glide",
            PhaseKind::Sink => "sink",
        };

        f.pad(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseBlock {
    pub kind: PhaseKind,
    pub start_time: Time,
    pub end_time: Time,
    /// Offset of the first fix from takeoff
    pub start_offset: Duration,
    /// Offset of the last fix from takeoff
    pub end_offset: Duration,
    pub start_position: Position,
    pub end_position: Position,
    pub altitude_start: i32,
    pub altitude_end: i32,
    pub fixes: usize,
    /// Fixes higher than the fix before them in the same block
    pub rising_fixes: usize,
    /// Sum of the legs flown into each fix of the block
    pub track_distance: Distance,
}

impl PhaseBlock {
    pub fn duration(&self) -> Duration {
        self.end_offset - self.start_offset
    }

    pub fn altitude_change(&self) -> i32 {
        self.altitude_end - self.altitude_start
    }

    /// Average vertical speed over the block in m/s, zero for blocks without elapsed time.
    pub fn rate(&self) -> f64 {
        let seconds = self.duration().as_seconds_f64();

        match seconds > 0.0 {
            true => f64::from(self.altitude_change()) / seconds,
            false => 0.0,
        }
    }

    /// Straight line distance between the first and the last fix.
    pub fn straight_distance(&self) -> Distance {
        self.start_position.distance_to(self.end_position)
    }

    /// Meters flown per meter of height lost (L/D).
    ///
    /// A block that lost no height counts as having lost one meter. A block
    /// that gained height gives a negative ratio.
    pub fn glide_ratio(&self) -> f64 {
        let lost = match -self.altitude_change() {
            0 => 1,
            lost => lost,
        };

        self.track_distance.as_meters() / f64::from(lost)
    }

    /// Share of the block's fixes that were higher than the fix before.
    pub fn climb_share(&self) -> f64 {
        match self.fixes {
            0 => 0.0,
            fixes => self.rising_fixes as f64 / fixes as f64,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (count, total) = values.fold((0_usize, 0.0), |(count, total), this| (count + 1, total + this));

    match count {
        0 => None,
        count => Some(total / count as f64),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseReport {
    pub blocks: Vec<PhaseBlock>,
}

impl PhaseReport {
    pub fn count(&self, kind: PhaseKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn of_kind(&self, kind: PhaseKind) -> impl Iterator<Item = &PhaseBlock> {
        self.blocks.iter().filter(move |this| this.kind == kind)
    }

    /// Mean block rate for `kind`, `None` if there is no such block.
    pub fn mean_rate(&self, kind: PhaseKind) -> Option<f64> {
        mean(self.of_kind(kind).map(PhaseBlock::rate))
    }

    /// How steadily the climbs went up, mean [`PhaseBlock::climb_share`] in `[0, 1]`.
    pub fn climb_grade(&self) -> Option<f64> {
        mean(self.of_kind(PhaseKind::Climb).map(PhaseBlock::climb_share))
    }

    /// Mean [`PhaseBlock::glide_ratio`] of the glides.
    pub fn glide_grade(&self) -> Option<f64> {
        mean(self.of_kind(PhaseKind::Glide).map(PhaseBlock::glide_ratio))
    }

    /// Mean absolute sink rate of the sinks in m/s.
    pub fn sink_grade(&self) -> Option<f64> {
        mean(self.of_kind(PhaseKind::Sink).map(|this| this.rate().abs()))
    }

    pub fn max_sustained_climb(&self) -> Option<f64> {
        self.of_kind(PhaseKind::Climb)
            .map(PhaseBlock::rate)
            .fold(None, |acc: Option<f64>, rate| {
                Some(acc.map_or(rate, |acc| acc.max(rate)))
            })
    }

    /// Share of fixes spent in `kind`, in `[0, 1]`.
    pub fn fraction(&self, kind: PhaseKind) -> f64 {
        let total = self.blocks.iter().map(|this| this.fixes).sum::<usize>();

        if total == 0 {
            return 0.0;
        }

        self.of_kind(kind).map(|this| this.fixes).sum::<usize>() as f64 / total as f64
    }
}

/// One accepted fix as seen by the phase tracker.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub time: Time,
    pub offset: Duration,
    pub position: Position,
    pub altitude: i32,
    /// Leg from the previous fix
    pub leg: Distance,
}

#[derive(Debug)]
pub(crate) struct PhaseTracker {
    chunk_size: usize,
    climb_threshold: f64,
    sink_threshold: f64,
    chunk: Vec<Sample>,
    blocks: Vec<PhaseBlock>,
}

impl PhaseTracker {
    pub fn new(chunk_size: usize, climb_threshold: f64, sink_threshold: f64) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            climb_threshold,
            sink_threshold,
            chunk: Vec::with_capacity(chunk_size),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.chunk.push(sample);

        if self.chunk.len() < self.chunk_size {
            return;
        }

        let chunk = std::mem::take(&mut self.chunk);
        let kind = self.classify(&chunk);
        self.extend(kind, &chunk);
    }

    /// A trailing partial chunk only survives if it continues the last block.
    pub fn finish(mut self) -> PhaseReport {
        let chunk = std::mem::take(&mut self.chunk);

        if !chunk.is_empty() {
            let kind = self.classify(&chunk);

            if self.blocks.last().is_some_and(|last| last.kind == kind) {
                self.extend(kind, &chunk);
            }
        }

        PhaseReport {
            blocks: self.blocks,
        }
    }

    fn classify(&self, chunk: &[Sample]) -> PhaseKind {
        let rate = vertical_rate(chunk.iter().map(|this| this.altitude)).unwrap_or_default();

        PhaseKind::from_rate(rate, self.climb_threshold, self.sink_threshold)
    }

    fn extend(&mut self, kind: PhaseKind, chunk: &[Sample]) {
        let (Some(first), Some(last)) = (chunk.first(), chunk.last()) else {
            return;
        };

        let legs = chunk.iter().map(|this| this.leg).sum::<Distance>();
        let rising = chunk
            .windows(2)
            .filter(|pair| pair[1].altitude > pair[0].altitude)
            .count();

        match self.blocks.last_mut() {
            Some(block) if block.kind == kind => {
                if first.altitude > block.altitude_end {
                    block.rising_fixes += 1;
                }

                block.rising_fixes += rising;
                block.end_time = last.time;
                block.end_offset = last.offset;
                block.end_position = last.position;
                block.altitude_end = last.altitude;
                block.fixes += chunk.len();
                block.track_distance += legs;
            }
            _ => self.blocks.push(PhaseBlock {
                kind,
                start_time: first.time,
                end_time: last.time,
                start_offset: first.offset,
                end_offset: last.offset,
                start_position: first.position,
                end_position: last.position,
                altitude_start: first.altitude,
                altitude_end: last.altitude,
                fixes: chunk.len(),
                rising_fixes: rising,
                track_distance: legs,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use time::macros::time;

    fn samples(altitudes: &[i32]) -> Vec<Sample> {
        altitudes
            .iter()
            .enumerate()
            .map(|(i, altitude)| Sample {
                time: time!(12:00:00) + Duration::seconds(i as i64),
                offset: Duration::seconds(i as i64),
                position: Position::new(46.5 + i as f64 * 0.0001, 7.3),
                altitude: *altitude,
                leg: match i {
                    0 => Distance::ZERO,
                    _ => Distance::from_kilometers(0.01),
                },
            })
            .collect()
    }

    fn track(chunk_size: usize, altitudes: &[i32]) -> PhaseReport {
        let mut tracker = PhaseTracker::new(chunk_size, 0.5, 2.5);

        for sample in samples(altitudes) {
            tracker.push(sample);
        }

        tracker.finish()
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(PhaseKind::from_rate(1.2, 0.5, 2.5), PhaseKind::Climb);
        assert_eq!(PhaseKind::from_rate(0.5, 0.5, 2.5), PhaseKind::Glide);
        assert_eq!(PhaseKind::from_rate(-1.0, 0.5, 2.5), PhaseKind::Glide);
        assert_eq!(PhaseKind::from_rate(-2.5, 0.5, 2.5), PhaseKind::Glide);
        assert_eq!(PhaseKind::from_rate(-3.0, 0.5, 2.5), PhaseKind::Sink);
    }

    #[test]
    fn empty_track_has_no_blocks() {
        let report = track(5, &[]);

        assert!(report.blocks.is_empty());
        assert_eq!(report.fraction(PhaseKind::Climb), 0.0);
        assert_eq!(report.mean_rate(PhaseKind::Glide), None);
        assert_eq!(report.max_sustained_climb(), None);
    }

    #[test]
    fn same_kind_chunks_merge() {
        let report = track(3, &[100, 102, 104, 106, 108, 110]);

        assert_eq!(report.blocks.len(), 1);

        let block = &report.blocks[0];
        assert_eq!(block.kind, PhaseKind::Climb);
        assert_eq!(block.fixes, 6);
        assert_eq!(block.altitude_start, 100);
        assert_eq!(block.altitude_end, 110);
        assert_eq!(block.duration(), Duration::seconds(5));
        assert_eq!(block.rate(), 2.0);
        assert_eq!(block.start_time, time!(12:00:00));
        assert_eq!(block.end_time, time!(12:00:05));
    }

    #[test]
    fn kind_changes_start_new_blocks() {
        let report = track(
            3,
            &[
                100, 103, 106, // climb
                106, 106, 106, // glide (no change)
                106, 100, 94, // sink
                94, 90, 86, // sink
            ],
        );

        let kinds = report.blocks.iter().map(|this| this.kind).collect::<Vec<_>>();
        assert_eq!(kinds, [PhaseKind::Climb, PhaseKind::Glide, PhaseKind::Sink]);

        assert_eq!(report.count(PhaseKind::Sink), 1);
        assert_eq!(report.blocks[2].fixes, 6);
        assert_eq!(report.fraction(PhaseKind::Sink), 0.5);
        assert_eq!(report.max_sustained_climb(), Some(3.0));
    }

    #[test]
    fn trailing_chunk_of_other_kind_is_dropped() {
        let report = track(3, &[100, 103, 106, 106, 80]);

        assert_eq!(report.blocks.len(), 1);
        assert_eq!(report.blocks[0].fixes, 3);
    }

    #[test]
    fn trailing_chunk_of_same_kind_is_kept() {
        let report = track(3, &[100, 103, 106, 109, 112]);

        assert_eq!(report.blocks.len(), 1);
        assert_eq!(report.blocks[0].fixes, 5);
        assert_eq!(report.blocks[0].altitude_end, 112);
    }

    #[test]
    fn climb_grade_counts_rising_fixes() {
        // chunks 100, 104, 104 and 110, 116, 122: the repeat is not rising,
        // neither is the first fix of the block
        let report = track(3, &[100, 104, 104, 110, 116, 122]);

        let block = &report.blocks[0];
        assert_eq!(block.kind, PhaseKind::Climb);
        assert_eq!(block.rising_fixes, 4);
        assert_eq!(block.climb_share(), 4.0 / 6.0);
        assert_eq!(report.climb_grade(), Some(4.0 / 6.0));
        assert_eq!(report.glide_grade(), None);
        assert_eq!(report.sink_grade(), None);
    }

    #[test]
    fn level_glide_counts_one_meter_lost() {
        let report = track(2, &[100, 100, 100, 100]);

        let block = &report.blocks[0];
        assert_eq!(block.kind, PhaseKind::Glide);
        assert!((block.glide_ratio() - 30.0).abs() < 1e-9);
        assert!((report.glide_grade().expect("one glide") - 30.0).abs() < 1e-9);
    }

    #[test]
    fn glide_ratio_uses_height_lost() {
        let report = track(4, &[100, 100, 99, 98]);

        let block = &report.blocks[0];
        assert_eq!(block.kind, PhaseKind::Glide);
        assert_eq!(block.altitude_change(), -2);
        assert!((block.glide_ratio() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn sink_grade_is_absolute_rate() {
        let report = track(3, &[200, 190, 180, 170, 160, 150]);

        assert_eq!(report.count(PhaseKind::Sink), 1);
        assert_eq!(report.sink_grade(), Some(10.0));
        assert_eq!(report.climb_grade(), None);
    }

    #[test]
    fn block_distance_sums_legs() {
        let report = track(2, &[100, 100, 100, 100]);

        let block = &report.blocks[0];
        assert_eq!(block.kind, PhaseKind::Glide);
        assert!((block.track_distance.as_kilometers() - 0.03).abs() < 1e-12);
        assert!(block.straight_distance().as_kilometers() > 0.0);
    }
}
