use super::Ecef;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Geodetic position on the WGS84 ellipsoid: longitude and latitude in
/// radians, height above the ellipsoid in meters.
///
/// Longitude comes first everywhere in this workspace, matching the order
/// GPS fixes and the page configuration use.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lon_rad: f64,
    pub lat_rad: f64,
    pub height_m: f64,
}

impl Geodetic {
    pub fn new(lon_rad: f64, lat_rad: f64, height_m: f64) -> Self {
        Self {
            lon_rad,
            lat_rad,
            height_m,
        }
    }

    pub fn from_degrees(lon_deg: f64, lat_deg: f64, height_m: f64) -> Self {
        Self::new(lon_deg.to_radians(), lat_deg.to_radians(), height_m)
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_rad.to_degrees()
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_rad.to_degrees()
    }

    pub fn with_height(self, height_m: f64) -> Self {
        Self { height_m, ..self }
    }

    pub fn to_ecef(self) -> Ecef {
        geodetic_to_ecef(self)
    }
}

pub fn geodetic_to_ecef(geo: Geodetic) -> Ecef {
    let (sin_lat, cos_lat) = geo.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = geo.lon_rad.sin_cos();

    // Prime vertical radius of curvature.
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

    Ecef::new(
        (n + geo.height_m) * cos_lat * cos_lon,
        (n + geo.height_m) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + geo.height_m) * sin_lat,
    )
}

/// Closed-form (Bowring) inverse; sub-millimeter for terrestrial heights.
pub fn ecef_to_geodetic(ecef: Ecef) -> Geodetic {
    let p = ecef.x.hypot(ecef.y);
    let lon = ecef.y.atan2(ecef.x);

    let (sin_t, cos_t) = (ecef.z * WGS84_A).atan2(p * WGS84_B).sin_cos();
    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_t.powi(3))
        .atan2(p - WGS84_E2 * WGS84_A * cos_t.powi(3));

    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let height = p / lat.cos() - n;

    Geodetic::new(lon, lat, height)
}
