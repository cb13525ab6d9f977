//! Vertical rate from a short run of altitude samples.

/// Average altitude change per distinct reading.
///
/// Samples equal to the previous retained sample carry no new information and
/// are skipped. With roughly one fix per second the result approximates m/s;
/// it is not a true per-second rate when the recorder cadence varies.
///
/// Returns `None` when the samples contain no change at all.
pub fn vertical_rate(altitudes: impl IntoIterator<Item = i32>) -> Option<f64> {
    let mut altitudes = altitudes.into_iter();

    let mut last = altitudes.next()?;
    let mut changes = 0_u32;
    let mut total = 0_i64;

    for this in altitudes {
        if this == last {
            continue;
        }

        changes += 1;
        total += i64::from(this) - i64::from(last);
        last = this;
    }

    if changes == 0 {
        return None;
    }

    Some(total as f64 / f64::from(changes))
}

/// Altitude samples collected since the last flush.
#[derive(Debug, Clone, Default)]
pub struct AltitudeWindow {
    samples: Vec<i32>,
}

impl AltitudeWindow {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, altitude: i32) {
        self.samples.push(altitude);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Estimate the rate over the collected samples and start a new window.
    pub fn flush(&mut self) -> Option<f64> {
        vertical_rate(std::mem::take(&mut self.samples))
    }
}
