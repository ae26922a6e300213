//! Native tooling around the locator controller: file-backed assets and a
//! replay driver that pushes a recorded GPS track through the full
//! bootstrap and position pipeline.

pub mod assets;
pub mod replay;
pub mod track;

pub use assets::{FileAssetSource, FileConfigSource};
pub use replay::{ReplayError, ReplayOptions, ReplayReport, replay};
pub use track::{Track, TrackPoint};
