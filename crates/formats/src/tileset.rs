//! 3D Tiles `tileset.json`, reduced to what framing the camera needs: the
//! root bounding volume and an optional root transform.

use foundation::bounds::BoundingSphere;
use foundation::math::Ecef;
use serde::{Deserialize, Serialize};

use crate::error::FormatError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TilesetManifest {
    pub asset: TilesetAsset,
    #[serde(
        rename = "geometricError",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub geometric_error: Option<f64>,
    pub root: TileNode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TilesetAsset {
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TileNode {
    #[serde(rename = "boundingVolume")]
    pub bounding_volume: BoundingVolume,
    /// Column-major 4x4 matrix, applied to the bounding volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<[f64; 16]>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BoundingVolume {
    /// `[cx, cy, cz, radius]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sphere: Option<[f64; 4]>,
    /// `[west, south, east, north, min_height, max_height]`, radians and meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<[f64; 6]>,
    /// Center followed by three half-axis vectors.
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub oriented_box: Option<[f64; 12]>,
}

impl BoundingVolume {
    /// Sphere in the volume's own frame. Regions are already in ECEF.
    fn local_sphere(&self) -> Option<(BoundingSphere, bool)> {
        if let Some([x, y, z, r]) = self.sphere {
            return Some((BoundingSphere::new(Ecef::new(x, y, z), r), true));
        }
        if let Some([w, s, e, n, lo, hi]) = self.region {
            return Some((BoundingSphere::from_region(w, s, e, n, lo, hi), false));
        }
        if let Some(b) = self.oriented_box {
            let center = Ecef::new(b[0], b[1], b[2]);
            let radius = (b[3..12].iter().map(|v| v * v).sum::<f64>()).sqrt();
            return Some((BoundingSphere::new(center, radius), true));
        }
        None
    }
}

impl TilesetManifest {
    pub fn from_json_str(payload: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Root bounding sphere in ECEF meters, with the root transform applied.
    pub fn bounding_sphere(&self) -> Result<BoundingSphere, FormatError> {
        let (local, transformable) = self
            .root
            .bounding_volume
            .local_sphere()
            .ok_or(FormatError::MissingBoundingVolume)?;

        match self.root.transform {
            Some(m) if transformable => Ok(apply_transform(&m, local)),
            _ => Ok(local),
        }
    }
}

fn apply_transform(m: &[f64; 16], sphere: BoundingSphere) -> BoundingSphere {
    let c = sphere.center;
    let center = Ecef::new(
        m[0] * c.x + m[4] * c.y + m[8] * c.z + m[12],
        m[1] * c.x + m[5] * c.y + m[9] * c.z + m[13],
        m[2] * c.x + m[6] * c.y + m[10] * c.z + m[14],
    );
    let column_scale = |i: usize| (m[i] * m[i] + m[i + 1] * m[i + 1] + m[i + 2] * m[i + 2]).sqrt();
    let scale = column_scale(0).max(column_scale(4)).max(column_scale(8));
    BoundingSphere::new(center, sphere.radius * scale)
}
