/// Time primitives
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn after(self, seconds: f64) -> Self {
        Time(self.0 + seconds)
    }

    /// Seconds elapsed since `earlier`; negative if `earlier` is in the future.
    pub fn since(self, earlier: Time) -> f64 {
        self.0 - earlier.0
    }
}

/// Fraction of an animation of `duration_s` seconds that started at `start`
/// and has run until `now`, clamped to `[0, 1]`.
///
/// Zero or negative durations complete immediately.
pub fn progress(start: Time, duration_s: f64, now: Time) -> f64 {
    if duration_s <= 0.0 {
        return 1.0;
    }
    (now.since(start) / duration_s).clamp(0.0, 1.0)
}
