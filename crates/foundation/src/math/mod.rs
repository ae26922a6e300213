pub mod ecef;
pub mod geodesy;
pub mod local;
pub mod orientation;

pub use ecef::*;
pub use geodesy::*;
pub use local::*;
pub use orientation::*;
