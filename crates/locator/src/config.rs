use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use foundation::math::{Geodetic, HeadingPitchRoll};
use scene::CameraView;

use crate::error::LocatorError;

/// Page configuration, `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocatorConfig {
    pub use_world_terrain: bool,
    pub start_view: StartView,
    pub ion_asset_id: u64,
    /// Drop terrain samples that complete after a newer fix was applied.
    #[serde(default)]
    pub discard_stale_fixes: bool,
}

/// Initial camera pose; angles in degrees.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartView {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl StartView {
    pub fn camera_view(&self) -> CameraView {
        CameraView::new(
            Geodetic::from_degrees(self.longitude, self.latitude, self.height),
            HeadingPitchRoll::from_degrees(self.heading, self.pitch, self.roll),
        )
    }
}

impl LocatorConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, LocatorError> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Where `config.json` comes from.
pub trait ConfigSource {
    fn load(&self) -> LocalBoxFuture<'_, Result<LocatorConfig, LocatorError>>;
}

/// An already loaded configuration is its own source.
impl ConfigSource for LocatorConfig {
    fn load(&self) -> LocalBoxFuture<'_, Result<LocatorConfig, LocatorError>> {
        futures::future::ready(Ok(self.clone())).boxed_local()
    }
}
