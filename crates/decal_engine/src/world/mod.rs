mod geometry;
mod raycast;
mod tilemap;

pub use geometry::{PixelCoord, PixelRect, Vec2};
pub use raycast::{ObstacleRaycaster, TileRaycaster};
pub use tilemap::{TileGrid, Tilemap, TilemapError};
