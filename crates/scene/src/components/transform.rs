use foundation::math::{Ecef, Geodetic};

/// Entity placement on the globe.
///
/// The geodetic position is authoritative; `ecef` is derived on every write.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Geodetic,
    pub ecef: Ecef,
}

impl Transform {
    pub fn at(position: Geodetic) -> Self {
        Self {
            position,
            ecef: position.to_ecef(),
        }
    }
}
