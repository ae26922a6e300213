use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Heightmap tileset metadata (`terrain/tileset.json`).
///
/// Tiles form a quadtree over a lon/lat rectangle: zoom `z` splits it into
/// `2^z × 2^z` tiles, `y = 0` at the north edge. Each tile holds
/// `tile_size²` little-endian `f32` heights in row-major order, row 0 north.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerrainTileset {
    pub version: u32,
    pub tile_size: u32,
    pub zoom_min: u32,
    pub zoom_max: u32,
    pub data_type: String,
    pub tile_path_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_datum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_units: Option<String>,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_height: f64,
    pub max_height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_data: Option<f64>,
}

/// Tile extent in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TileBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub z: u32,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

/// Deepest zoom whose `2^z` tile count still fits a `u32` key.
pub const MAX_ZOOM: u32 = 31;
/// Largest accepted tile edge in samples.
pub const MAX_TILE_SIZE: u32 = 4096;

impl TerrainTileset {
    pub fn from_json_str(payload: &str) -> Result<Self, FormatError> {
        let tileset: Self = serde_json::from_str(payload)?;
        tileset.validate()?;
        Ok(tileset)
    }

    fn validate(&self) -> Result<(), FormatError> {
        if self.tile_size < 2 {
            return Err(FormatError::InvalidTileset(format!(
                "tile_size {} is below 2",
                self.tile_size
            )));
        }
        if self.tile_size > MAX_TILE_SIZE {
            return Err(FormatError::InvalidTileset(format!(
                "tile_size {} exceeds {MAX_TILE_SIZE}",
                self.tile_size
            )));
        }
        if self.zoom_max > MAX_ZOOM {
            return Err(FormatError::InvalidTileset(format!(
                "zoom_max {} exceeds {MAX_ZOOM}",
                self.zoom_max
            )));
        }
        if self.zoom_min > self.zoom_max {
            return Err(FormatError::InvalidTileset(format!(
                "zoom_min {} exceeds zoom_max {}",
                self.zoom_min, self.zoom_max
            )));
        }
        if self.min_lon >= self.max_lon || self.min_lat >= self.max_lat {
            return Err(FormatError::InvalidTileset("empty extent".to_string()));
        }
        if self.data_type != "float32" {
            return Err(FormatError::InvalidTileset(format!(
                "unsupported data_type {:?}",
                self.data_type
            )));
        }
        Ok(())
    }

    pub fn contains(&self, lon_deg: f64, lat_deg: f64) -> bool {
        lon_deg >= self.min_lon
            && lon_deg <= self.max_lon
            && lat_deg >= self.min_lat
            && lat_deg <= self.max_lat
    }

    pub fn tile_path(&self, key: TileKey) -> String {
        self.tile_path_template
            .replace("{z}", &key.z.to_string())
            .replace("{x}", &key.x.to_string())
            .replace("{y}", &key.y.to_string())
    }

    pub fn tile_bounds(&self, key: TileKey) -> TileBounds {
        let n = (key.z as f64).exp2();
        let lon_span = (self.max_lon - self.min_lon) / n;
        let lat_span = (self.max_lat - self.min_lat) / n;

        let lon_min = self.min_lon + key.x as f64 * lon_span;
        let lat_max = self.max_lat - key.y as f64 * lat_span;
        TileBounds {
            lon_min,
            lon_max: lon_min + lon_span,
            lat_min: lat_max - lat_span,
            lat_max,
        }
    }

    /// Tile at zoom `z` containing the coordinate; points on the east or
    /// south edge belong to the last tile. `None` past [`MAX_ZOOM`].
    pub fn tile_for(&self, lon_deg: f64, lat_deg: f64, z: u32) -> Option<TileKey> {
        if !self.contains(lon_deg, lat_deg) {
            return None;
        }
        let n = 1u32.checked_shl(z)?;
        let fx = (lon_deg - self.min_lon) / (self.max_lon - self.min_lon);
        let fy = (self.max_lat - lat_deg) / (self.max_lat - self.min_lat);
        let x = ((fx * n as f64) as u32).min(n - 1);
        let y = ((fy * n as f64) as u32).min(n - 1);
        Some(TileKey::new(z, x, y))
    }
}

/// Decoded heightmap tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainTile {
    pub key: TileKey,
    pub size: usize,
    pub heights_m: Vec<f32>,
}

impl TerrainTile {
    pub fn decode(key: TileKey, tile_size: u32, bytes: &[u8]) -> Result<Self, FormatError> {
        let size = tile_size as usize;
        let expected = size
            .checked_mul(size)
            .and_then(|cells| cells.checked_mul(4))
            .ok_or_else(|| {
                FormatError::InvalidTileset(format!("tile_size {tile_size} is too large"))
            })?;
        if bytes.len() != expected {
            return Err(FormatError::TileSize {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            key,
            size,
            heights_m: decode_f32_le(bytes),
        })
    }

    pub fn height(&self, col: usize, row: usize) -> f32 {
        self.heights_m[row.min(self.size - 1) * self.size + col.min(self.size - 1)]
    }

    pub fn encode(&self) -> Vec<u8> {
        self.heights_m.iter().flat_map(|h| h.to_le_bytes()).collect()
    }
}

pub fn decode_f32_le(bytes: &[u8]) -> Vec<f32> {
    let mut out = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        out.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    out
}
