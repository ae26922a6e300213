//! Recorded GPS tracks: a JSON array of fixes.
//!
//! ```json
//! [{"t": 0.0, "longitude": 24.94, "latitude": 60.17, "accuracy": 5.0}, ...]
//! ```
//!
//! `t` is seconds since the start of the recording; when omitted, fixes are
//! one second apart.

use std::path::Path;

use serde::{Deserialize, Serialize};

use locator::PositionFix;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackPoint {
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub time_s: Option<f64>,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub points: Vec<TrackPoint>,
}

impl Track {
    pub fn from_json_str(payload: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            points: serde_json::from_str(payload)?,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, crate::ReplayError> {
        let payload = std::fs::read_to_string(path).map_err(|source| crate::ReplayError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json_str(&payload)?)
    }

    /// Fixes with their replay time in seconds.
    pub fn timed_fixes(&self) -> Vec<(f64, PositionFix)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let t = p.time_s.unwrap_or(i as f64);
                let fix = PositionFix {
                    longitude: p.longitude,
                    latitude: p.latitude,
                    altitude: p.altitude,
                    accuracy_m: p.accuracy,
                    timestamp_ms: t * 1000.0,
                };
                (t, fix)
            })
            .collect()
    }
}
