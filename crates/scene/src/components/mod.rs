pub mod graphics;
pub mod transform;
pub mod visibility;

pub use graphics::*;
pub use transform::*;
pub use visibility::*;
