/// What decides when the altitude window is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowingMode {
    /// The fix's `HHMMSS` digits as one integer, modulo the averaging factor.
    ///
    /// Matches summaries produced by earlier tools, but it is not elapsed time.
    /// For factors that don't divide 100 the cadence jumps at every minute and
    /// hour boundary (`095959` and `100000` are one second apart), and a
    /// recorder that only logs odd seconds never hits a multiple of 2 or 10.
    #[default]
    ClockDigits,
    /// Seconds since takeoff, modulo the averaging factor.
    ElapsedSeconds,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseOptions {
    /// Window trigger modulus, also the number of samples a window needs before it is flushed
    pub averaging_factor: u32,
    pub windowing: WindowingMode,
    /// Vertical rate (m/s) above which a chunk counts as climbing
    pub climb_threshold: f64,
    /// Vertical rate (m/s) below the negated value of which a chunk counts as sinking
    pub sink_threshold: f64,
    /// Abort on the first bad line instead of skipping it
    pub strict: bool,
}

impl ParseOptions {
    pub const fn new() -> Self {
        Self {
            averaging_factor: 5,
            windowing: WindowingMode::ClockDigits,
            climb_threshold: 0.5,
            sink_threshold: 2.5,
            strict: false,
        }
    }

    /// Zero is treated as one.
    pub const fn set_averaging_factor(mut self, averaging_factor: u32) -> Self {
        self.averaging_factor = if averaging_factor == 0 {
            1
        } else {
            averaging_factor
        };
        self
    }

    pub const fn set_windowing(mut self, windowing: WindowingMode) -> Self {
        self.windowing = windowing;
        self
    }

    pub const fn set_climb_threshold(mut self, climb_threshold: f64) -> Self {
        self.climb_threshold = climb_threshold;
        self
    }

    pub const fn set_sink_threshold(mut self, sink_threshold: f64) -> Self {
        self.sink_threshold = sink_threshold;
        self
    }

    pub const fn set_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
