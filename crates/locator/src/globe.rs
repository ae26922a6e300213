//! The 3D globe collaborator.

use futures::future::LocalBoxFuture;

use foundation::BoundingSphere;
use foundation::math::{Geodetic, HeadingPitchRange};
use scene::CameraView;
use scene::components::{Color, LabelGraphic, PointGraphic};
use scene::entity::EntityId;

use crate::error::GlobeError;

/// Camera flight to the marker.
pub const FOLLOW_FLIGHT_S: f64 = 0.5;
/// Camera flight framing a freshly loaded tileset.
pub const TILESET_FLIGHT_S: f64 = 2.0;
pub const TILESET_PITCH_DEG: f64 = -35.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TerrainMode {
    /// Remote world terrain.
    World,
    /// Plain WGS84 ellipsoid, every height is 0.
    Ellipsoid,
}

impl TerrainMode {
    pub fn from_flag(use_world_terrain: bool) -> Self {
        if use_world_terrain {
            Self::World
        } else {
            Self::Ellipsoid
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub point: PointGraphic,
    pub label: LabelGraphic,
}

impl MarkerStyle {
    /// 12 px blue point labelled "Me" 30 px above it.
    pub fn you_are_here() -> Self {
        Self {
            point: PointGraphic {
                pixel_size: 12.0,
                color: Color::BLUE,
            },
            label: LabelGraphic {
                text: "Me".to_string(),
                pixel_offset: [0.0, -30.0],
                fill_color: Color::BLACK,
                show_background: true,
            },
        }
    }
}

/// Offset used to frame a tileset: heading 0, pitch -35°, twice the radius.
pub fn tileset_offset(sphere: &BoundingSphere) -> HeadingPitchRange {
    HeadingPitchRange::new(0.0, TILESET_PITCH_DEG.to_radians(), sphere.radius * 2.0)
}

/// Scene, camera, terrain and tileset operations the controller relies on.
///
/// Futures are `'static` so the controller can drop every borrow before
/// awaiting them.
pub trait Globe {
    fn set_terrain(&self, mode: TerrainMode) -> LocalBoxFuture<'static, Result<(), GlobeError>>;

    fn set_camera_view(&self, view: CameraView);

    /// Flies to `destination`, keeping the current orientation.
    fn fly_to(&self, destination: Geodetic, duration_s: f64);

    fn fly_to_bounding_sphere(
        &self,
        sphere: BoundingSphere,
        offset: HeadingPitchRange,
        duration_s: f64,
    );

    /// Adds the tileset to the scene and resolves once its bounds are known.
    fn load_tileset(&self, asset_id: u64)
    -> LocalBoxFuture<'static, Result<BoundingSphere, GlobeError>>;

    /// Heights at the most detailed level available; `None` where the
    /// provider has no value.
    fn sample_terrain_most_detailed(
        &self,
        positions: Vec<Geodetic>,
    ) -> LocalBoxFuture<'static, Result<Vec<Option<f64>>, GlobeError>>;

    fn add_marker(&self, style: &MarkerStyle) -> EntityId;

    fn set_marker_position(&self, marker: EntityId, position: Geodetic);

    fn marker_position(&self, marker: EntityId) -> Option<Geodetic>;

    fn set_marker_visible(&self, marker: EntityId, visible: bool);
}
