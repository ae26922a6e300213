//! Live "you are here" marker over a terrain view.
//!
//! [`Locator`] is the page controller. It owns no platform code: the globe,
//! the device location capability, the page controls and the log region are
//! injected through the traits in [`globe`], [`geolocation`], [`controls`] and
//! [`log`]. [`engine::EngineGlobe`] is the workspace's own globe built on the
//! `scene` and `layers` crates.

pub mod config;
pub mod controls;
pub mod engine;
pub mod error;
pub mod geolocation;
pub mod globe;
pub mod controller;
pub mod log;

#[cfg(test)]
mod testing;

pub use config::*;
pub use controls::*;
pub use error::*;
pub use geolocation::*;
pub use globe::*;
pub use controller::*;
pub use log::*;
