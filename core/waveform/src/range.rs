/// `[start, end]` window of a song, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipRange {
    pub start: f64,
    pub end: f64,
}

impl ClipRange {
    /// Builds a range, pulling `end` up to `start` when it lies before it.
    /// `start` is never moved.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end: if end < start { start } else { end },
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Value limits of the two range sliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderBounds {
    pub max: f64,
}

impl SliderBounds {
    /// Slider limit used while no audio is loaded.
    pub const UNLOADED: Self = Self { max: 10.0 };

    pub fn for_duration(duration: f64) -> Self {
        Self {
            max: duration.max(0.0),
        }
    }

    /// Holds a raw slider reading inside `[0, max]`. Non-finite readings
    /// count as 0.
    pub fn hold(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(0.0, self.max)
        } else {
            0.0
        }
    }
}

impl Default for SliderBounds {
    fn default() -> Self {
        Self::UNLOADED
    }
}

/// The two human-readable range labels shown next to the sliders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeLabels {
    pub start: String,
    pub end: String,
}

impl RangeLabels {
    pub fn for_range(range: ClipRange, unit: &str) -> Self {
        Self {
            start: format_seconds(range.start, unit),
            end: format_seconds(range.end, unit),
        }
    }
}

/// `5.0` -> `"5.00 seconds"`.
pub fn format_seconds(value: f64, unit: &str) -> String {
    format!("{value:.2} {unit}")
}
