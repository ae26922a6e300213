pub mod error;
pub mod terrain;
pub mod tileset;

pub use error::*;
pub use terrain::*;
pub use tileset::*;
