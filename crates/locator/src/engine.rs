//! `Globe` built on the workspace's scene and layer crates.
//!
//! Entities live in a [`World`], the camera is a [`Camera`] stepped by
//! [`EngineGlobe::tick`], terrain comes from a [`TerrainLayer`] whose tiles
//! are fetched on demand through an [`AssetSource`]. Rendering is left to
//! the host: it reads [`EngineGlobe::camera_view`] and
//! [`EngineGlobe::drawable_markers`] each frame.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};

use formats::{TerrainTile, TerrainTileset, TileKey, TilesetManifest};
use foundation::BoundingSphere;
use foundation::Time;
use foundation::math::{Geodetic, HeadingPitchRange};
use layers::terrain::{HeightSample, TerrainLayer, TerrainProvider};
use layers::tileset::TilesetLayer;
use scene::components::{Transform, Visibility};
use scene::entity::EntityId;
use scene::{Camera, CameraView, DrawableMarker, World};

use crate::error::{AssetError, GlobeError};
use crate::globe::{Globe, MarkerStyle, TerrainMode};

/// Remote assets the engine needs. Paths and ids only; transport is the
/// implementor's business (HTTP in the browser, files for the CLI).
pub trait AssetSource {
    /// `tilesets/<asset_id>/tileset.json`
    fn fetch_tileset(&self, asset_id: u64) -> LocalBoxFuture<'static, Result<String, AssetError>>;

    /// `terrain/tileset.json`
    fn fetch_terrain_tileset(&self) -> LocalBoxFuture<'static, Result<String, AssetError>>;

    /// `terrain/<path>`, where `path` comes from the tileset's template.
    fn fetch_terrain_tile(
        &self,
        key: TileKey,
        path: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<u8>, AssetError>>;
}

pub struct EngineGlobe {
    world: RefCell<World>,
    camera: RefCell<Camera>,
    terrain: Rc<RefCell<TerrainLayer>>,
    tilesets: Rc<RefCell<Vec<TilesetLayer>>>,
    assets: Rc<dyn AssetSource>,
}

impl EngineGlobe {
    pub fn new(assets: Rc<dyn AssetSource>) -> Self {
        Self {
            world: RefCell::new(World::new()),
            camera: RefCell::new(Camera::default()),
            terrain: Rc::new(RefCell::new(TerrainLayer::ellipsoid())),
            tilesets: Rc::new(RefCell::new(Vec::new())),
            assets,
        }
    }

    /// Steps the camera clock; `true` while a flight is running.
    pub fn tick(&self, now: Time) -> bool {
        self.camera.borrow_mut().update(now)
    }

    pub fn camera_view(&self) -> CameraView {
        self.camera.borrow().view()
    }

    pub fn is_flying(&self) -> bool {
        self.camera.borrow().is_flying()
    }

    pub fn drawable_markers(&self) -> Vec<DrawableMarker> {
        self.world.borrow().drawable_markers()
    }

    pub fn tilesets(&self) -> Vec<TilesetLayer> {
        self.tilesets.borrow().clone()
    }

    pub fn terrain_is_ellipsoid(&self) -> bool {
        self.terrain.borrow().is_ellipsoid()
    }
}

impl Globe for EngineGlobe {
    fn set_terrain(&self, mode: TerrainMode) -> LocalBoxFuture<'static, Result<(), GlobeError>> {
        let terrain = self.terrain.clone();
        match mode {
            TerrainMode::Ellipsoid => {
                *terrain.borrow_mut() = TerrainLayer::ellipsoid();
                futures::future::ready(Ok(())).boxed_local()
            }
            TerrainMode::World => {
                let fetch = self.assets.fetch_terrain_tileset();
                async move {
                    let payload = fetch.await?;
                    let tileset = TerrainTileset::from_json_str(&payload)?;
                    tracing::debug!(
                        zoom_max = tileset.zoom_max,
                        tile_size = tileset.tile_size,
                        "terrain tileset loaded"
                    );
                    *terrain.borrow_mut() = TerrainLayer::tiled(tileset);
                    Ok(())
                }
                .boxed_local()
            }
        }
    }

    fn set_camera_view(&self, view: CameraView) {
        self.camera.borrow_mut().set_view(view);
    }

    fn fly_to(&self, destination: Geodetic, duration_s: f64) {
        self.camera.borrow_mut().fly_to(destination, duration_s);
    }

    fn fly_to_bounding_sphere(
        &self,
        sphere: BoundingSphere,
        offset: HeadingPitchRange,
        duration_s: f64,
    ) {
        self.camera
            .borrow_mut()
            .fly_to_bounding_sphere(sphere, offset, duration_s);
    }

    fn load_tileset(
        &self,
        asset_id: u64,
    ) -> LocalBoxFuture<'static, Result<BoundingSphere, GlobeError>> {
        let tilesets = self.tilesets.clone();
        let index = {
            let mut layers = tilesets.borrow_mut();
            layers.push(TilesetLayer::new(asset_id));
            layers.len() - 1
        };
        let fetch = self.assets.fetch_tileset(asset_id);
        async move {
            let loaded = async {
                let payload = fetch.await?;
                let manifest = TilesetManifest::from_json_str(&payload)?;
                Ok::<_, GlobeError>(manifest.bounding_sphere()?)
            }
            .await;
            if let Some(layer) = tilesets.borrow_mut().get_mut(index) {
                match &loaded {
                    Ok(sphere) => layer.mark_ready(*sphere),
                    Err(err) => layer.mark_failed(err.to_string()),
                }
            }
            loaded
        }
        .boxed_local()
    }

    fn sample_terrain_most_detailed(
        &self,
        positions: Vec<Geodetic>,
    ) -> LocalBoxFuture<'static, Result<Vec<Option<f64>>, GlobeError>> {
        let terrain = self.terrain.clone();
        let assets = self.assets.clone();
        async move {
            let (tile_size, missing) = {
                let layer = terrain.borrow();
                let TerrainProvider::Tiled(tiled) = &layer.provider else {
                    return Ok(vec![Some(0.0); positions.len()]);
                };
                let keys: BTreeSet<TileKey> = positions
                    .iter()
                    .filter_map(|p| match tiled.sample(*p) {
                        HeightSample::Missing(key) => Some(key),
                        _ => None,
                    })
                    .collect();
                let missing: Vec<(TileKey, String)> = keys
                    .into_iter()
                    .map(|key| (key, tiled.tileset().tile_path(key)))
                    .collect();
                (tiled.tileset().tile_size, missing)
            };

            for (key, path) in missing {
                let bytes = assets.fetch_terrain_tile(key, &path).await?;
                let tile = TerrainTile::decode(key, tile_size, &bytes)?;
                if let TerrainProvider::Tiled(tiled) = &mut terrain.borrow_mut().provider {
                    tiled.insert_tile(tile);
                }
            }

            let layer = terrain.borrow();
            let heights = positions
                .iter()
                .map(|p| match &layer.provider {
                    TerrainProvider::Ellipsoid => Some(0.0),
                    TerrainProvider::Tiled(tiled) => match tiled.sample(*p) {
                        HeightSample::Height(h) => Some(h),
                        HeightSample::NoData | HeightSample::Missing(_) => None,
                    },
                })
                .collect();
            Ok(heights)
        }
        .boxed_local()
    }

    fn add_marker(&self, style: &MarkerStyle) -> EntityId {
        let mut world = self.world.borrow_mut();
        let entity = world.spawn();
        world.set_point(entity, style.point);
        world.set_label(entity, style.label.clone());
        entity
    }

    fn set_marker_position(&self, marker: EntityId, position: Geodetic) {
        self.world
            .borrow_mut()
            .set_transform(marker, Transform::at(position));
    }

    fn marker_position(&self, marker: EntityId) -> Option<Geodetic> {
        self.world.borrow().transform(marker).map(|t| t.position)
    }

    fn set_marker_visible(&self, marker: EntityId, visible: bool) {
        self.world
            .borrow_mut()
            .set_visibility(marker, Visibility::from(visible));
    }
}
