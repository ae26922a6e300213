//! Terrain providers and height sampling.
//!
//! The ellipsoid provider answers every query with height 0. The tiled
//! provider answers from decoded heightmap tiles at the tileset's most
//! detailed zoom; fetching those tiles is the caller's job, this module only
//! says which tile a coordinate needs and interpolates inside it.

use std::collections::BTreeMap;

use formats::{TerrainTile, TerrainTileset, TileKey};
use foundation::math::Geodetic;

#[derive(Debug, Clone, PartialEq)]
pub enum TerrainProvider {
    Ellipsoid,
    Tiled(TiledTerrain),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLayer {
    pub provider: TerrainProvider,
}

impl TerrainLayer {
    pub fn ellipsoid() -> Self {
        Self {
            provider: TerrainProvider::Ellipsoid,
        }
    }

    pub fn tiled(tileset: TerrainTileset) -> Self {
        Self {
            provider: TerrainProvider::Tiled(TiledTerrain::new(tileset)),
        }
    }

    pub fn is_ellipsoid(&self) -> bool {
        matches!(self.provider, TerrainProvider::Ellipsoid)
    }
}

/// Outcome of sampling one coordinate against cached tiles.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HeightSample {
    /// Interpolated height in meters.
    Height(f64),
    /// Coordinate lies outside the tileset or on no-data cells.
    NoData,
    /// The tile must be fetched first.
    Missing(TileKey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TiledTerrain {
    tileset: TerrainTileset,
    tiles: BTreeMap<TileKey, TerrainTile>,
}

impl TiledTerrain {
    pub fn new(tileset: TerrainTileset) -> Self {
        Self {
            tileset,
            tiles: BTreeMap::new(),
        }
    }

    pub fn tileset(&self) -> &TerrainTileset {
        &self.tileset
    }

    pub fn insert_tile(&mut self, tile: TerrainTile) {
        self.tiles.insert(tile.key, tile);
    }

    /// Key of the most detailed tile covering `position`.
    fn most_detailed_key(&self, position: Geodetic) -> Option<TileKey> {
        self.tileset
            .tile_for(position.lon_deg(), position.lat_deg(), self.tileset.zoom_max)
    }

    pub fn sample(&self, position: Geodetic) -> HeightSample {
        let Some(key) = self.most_detailed_key(position) else {
            return HeightSample::NoData;
        };
        let Some(tile) = self.tiles.get(&key) else {
            return HeightSample::Missing(key);
        };
        match self.interpolate(tile, position) {
            Some(h) => HeightSample::Height(h),
            None => HeightSample::NoData,
        }
    }

    /// Bilinear interpolation over the tile grid; grid corners sit on the
    /// tile edges.
    fn interpolate(&self, tile: &TerrainTile, position: Geodetic) -> Option<f64> {
        let b = self.tileset.tile_bounds(tile.key);
        let last = (tile.size - 1) as f64;
        let u = ((position.lon_deg() - b.lon_min) / (b.lon_max - b.lon_min)).clamp(0.0, 1.0);
        let v = ((b.lat_max - position.lat_deg()) / (b.lat_max - b.lat_min)).clamp(0.0, 1.0);

        let gx = u * last;
        let gy = v * last;
        let c0 = gx.floor() as usize;
        let r0 = gy.floor() as usize;
        let c1 = (c0 + 1).min(tile.size - 1);
        let r1 = (r0 + 1).min(tile.size - 1);
        let tx = gx - c0 as f64;
        let ty = gy - r0 as f64;

        let mut corners = [0.0f64; 4];
        for (slot, (c, r)) in [(c0, r0), (c1, r0), (c0, r1), (c1, r1)].into_iter().enumerate() {
            let h = tile.height(c, r) as f64;
            if self.is_no_data(h) {
                return None;
            }
            corners[slot] = h;
        }

        let top = corners[0] + (corners[1] - corners[0]) * tx;
        let bottom = corners[2] + (corners[3] - corners[2]) * tx;
        Some(top + (bottom - top) * ty)
    }

    fn is_no_data(&self, h: f64) -> bool {
        !h.is_finite() || self.tileset.no_data.is_some_and(|nd| (h - nd).abs() < 1e-6)
    }
}

#[cfg(test)]
mod tests {
    use super::{HeightSample, TerrainLayer, TerrainProvider, TiledTerrain};
    use formats::{TerrainTile, TerrainTileset, TileKey};
    use foundation::math::Geodetic;

    fn tileset() -> TerrainTileset {
        TerrainTileset::from_json_str(
            r#"{"version":1,"tile_size":2,"zoom_min":0,"zoom_max":0,
                "data_type":"float32","tile_path_template":"tiles/{z}/{x}/{y}.bin",
                "min_lon":24.0,"max_lon":26.0,"min_lat":59.0,"max_lat":61.0,
                "min_height":0.0,"max_height":40.0,"no_data":-9999.0}"#,
        )
        .expect("tileset")
    }

    fn tile(heights: [f32; 4]) -> TerrainTile {
        TerrainTile {
            key: TileKey::new(0, 0, 0),
            size: 2,
            heights_m: heights.to_vec(),
        }
    }

    #[test]
    fn ellipsoid_layer_has_no_tiles() {
        let layer = TerrainLayer::ellipsoid();
        assert!(layer.is_ellipsoid());
        assert_eq!(layer.provider, TerrainProvider::Ellipsoid);
    }

    #[test]
    fn reports_missing_tile_before_fetch() {
        let terrain = TiledTerrain::new(tileset());
        assert_eq!(
            terrain.sample(Geodetic::from_degrees(25.0, 60.0, 0.0)),
            HeightSample::Missing(TileKey::new(0, 0, 0))
        );
    }

    fn height_at(terrain: &TiledTerrain, lon: f64, lat: f64) -> f64 {
        match terrain.sample(Geodetic::from_degrees(lon, lat, 0.0)) {
            HeightSample::Height(h) => h,
            other => panic!("expected a height, got {other:?}"),
        }
    }

    #[test]
    fn interpolates_between_corners() {
        let mut terrain = TiledTerrain::new(tileset());
        // north row: 10, 20; south row: 30, 40
        terrain.insert_tile(tile([10.0, 20.0, 30.0, 40.0]));

        assert!((height_at(&terrain, 25.0, 60.0) - 25.0).abs() < 1e-6);
        assert!((height_at(&terrain, 24.0001, 60.9999) - 10.0).abs() < 0.01);
        assert!((height_at(&terrain, 25.9999, 59.0001) - 40.0).abs() < 0.01);
    }

    #[test]
    fn outside_extent_or_no_data_yields_no_data() {
        let mut terrain = TiledTerrain::new(tileset());
        terrain.insert_tile(tile([-9999.0, 20.0, 30.0, 40.0]));
        assert_eq!(
            terrain.sample(Geodetic::from_degrees(10.0, 60.0, 0.0)),
            HeightSample::NoData
        );
        assert_eq!(
            terrain.sample(Geodetic::from_degrees(24.5, 60.5, 0.0)),
            HeightSample::NoData
        );
    }
}
