use crate::math::{Ecef, Geodetic, geodetic_to_ecef};

/// Bounding sphere in ECEF meters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Ecef,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn new(center: Ecef, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Sphere around a geographic region given in radians
    /// (`west, south, east, north`) between two heights.
    ///
    /// Centered on the region's mid point and sized to contain the corners and
    /// edge mid points at both heights.
    pub fn from_region(
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        min_height: f64,
        max_height: f64,
    ) -> Self {
        let mid_lon = 0.5 * (west + east);
        let mid_lat = 0.5 * (south + north);
        let mid_h = 0.5 * (min_height + max_height);
        let center = geodetic_to_ecef(Geodetic::new(mid_lon, mid_lat, mid_h));

        let mut radius: f64 = 0.0;
        for lon in [west, mid_lon, east] {
            for lat in [south, mid_lat, north] {
                for h in [min_height, max_height] {
                    let p = geodetic_to_ecef(Geodetic::new(lon, lat, h));
                    radius = radius.max(p.distance(center));
                }
            }
        }
        Self::new(center, radius)
    }

    pub fn contains(&self, point: Ecef) -> bool {
        point.distance(self.center) <= self.radius
    }
}
