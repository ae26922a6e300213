use super::{Ecef, Geodetic, geodetic_to_ecef};

/// Local East-North-Up offset (meters) around a geodetic origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }
}

/// Rows of the ECEF → ENU rotation at `origin`.
fn enu_basis(origin: Geodetic) -> [[f64; 3]; 3] {
    let (sin_lat, cos_lat) = origin.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = origin.lon_rad.sin_cos();
    [
        [-sin_lon, cos_lon, 0.0],
        [-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat],
        [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat],
    ]
}

pub fn ecef_to_enu(point: Ecef, origin: Geodetic) -> Enu {
    let d = point - geodetic_to_ecef(origin);
    let [e, n, u] = enu_basis(origin);
    Enu::new(
        e[0] * d.x + e[1] * d.y + e[2] * d.z,
        n[0] * d.x + n[1] * d.y + n[2] * d.z,
        u[0] * d.x + u[1] * d.y + u[2] * d.z,
    )
}

pub fn enu_to_ecef(enu: Enu, origin: Geodetic) -> Ecef {
    let [e, n, u] = enu_basis(origin);
    // Transpose of the basis maps ENU back into ECEF.
    let d = Ecef::new(
        e[0] * enu.east + n[0] * enu.north + u[0] * enu.up,
        e[1] * enu.east + n[1] * enu.north + u[1] * enu.up,
        e[2] * enu.east + n[2] * enu.north + u[2] * enu.up,
    );
    geodetic_to_ecef(origin) + d
}
