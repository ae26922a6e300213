pub mod terrain;
pub mod tileset;
