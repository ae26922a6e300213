//! Device location capability.

use std::time::Duration;

use crate::error::GeolocationError;

/// One raw position report, angles in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PositionFix {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: Option<f64>,
    pub accuracy_m: f64,
    pub timestamp_ms: f64,
}

impl PositionFix {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude: None,
            accuracy_m: 0.0,
            timestamp_ms: 0.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Oldest cached fix the device may answer with.
    pub maximum_age: Duration,
    pub timeout: Duration,
}

impl PositionOptions {
    /// Locate-once and the initial permission request: fresh fix, 20 s.
    pub const ONE_SHOT: Self = Self {
        enable_high_accuracy: true,
        maximum_age: Duration::ZERO,
        timeout: Duration::from_secs(20),
    };

    /// Follow subscription: fixes up to 1 s old, 10 s per fix.
    pub const WATCH: Self = Self {
        enable_high_accuracy: true,
        maximum_age: Duration::from_secs(1),
        timeout: Duration::from_secs(10),
    };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GeolocationErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unknown,
}

impl GeolocationErrorCode {
    /// Maps the numeric codes browsers report.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }
}

/// Handle of an active continuous-location subscription.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WatchId(pub i32);

pub type OnFix = Box<dyn FnOnce(PositionFix)>;
pub type OnError = Box<dyn FnOnce(GeolocationError)>;
pub type OnWatchFix = Box<dyn FnMut(PositionFix)>;
pub type OnWatchError = Box<dyn FnMut(GeolocationError)>;

/// Callback-style location source, as browsers expose it.
///
/// Callbacks run later on the same thread; implementations must not invoke
/// them re-entrantly from inside the registering call.
pub trait Geolocation {
    fn is_available(&self) -> bool;

    fn get_current_position(&self, options: PositionOptions, on_fix: OnFix, on_error: OnError);

    /// `None` when no subscription was registered; the failure, if any, still
    /// arrives through `on_error`.
    fn watch_position(
        &self,
        options: PositionOptions,
        on_fix: OnWatchFix,
        on_error: OnWatchError,
    ) -> Option<WatchId>;

    fn clear_watch(&self, id: WatchId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_presets() {
        assert_eq!(PositionOptions::ONE_SHOT.maximum_age, Duration::ZERO);
        assert_eq!(PositionOptions::ONE_SHOT.timeout.as_millis(), 20_000);
        assert_eq!(PositionOptions::WATCH.maximum_age.as_millis(), 1_000);
        assert_eq!(PositionOptions::WATCH.timeout.as_millis(), 10_000);
        assert!(PositionOptions::WATCH.enable_high_accuracy);
    }

    #[test]
    fn browser_error_codes() {
        assert_eq!(GeolocationErrorCode::from_code(1), GeolocationErrorCode::PermissionDenied);
        assert_eq!(GeolocationErrorCode::from_code(3), GeolocationErrorCode::Timeout);
        assert_eq!(GeolocationErrorCode::from_code(9), GeolocationErrorCode::Unknown);
    }
}
