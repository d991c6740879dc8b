mod config;
mod error;
pub mod mapping;
pub mod ops;
pub mod raster;
mod system;
pub mod world;

pub use config::{DecalConfig, DEFAULT_PIXELS_PER_UNIT};
pub use error::DecalError;
pub use mapping::{CameraView, CoordinateMapper, OrthographicCamera, ViewportWindow};
pub use ops::{CleaningAgent, FrameCapture, LineProfile, OutputSurface, ViewportFrame};
pub use raster::{DecalImage, Rgba8};
pub use system::{DecalStatsSnapshot, DecalSystem, JobState, RollingMsStats, StatsHandle};
pub use world::{
    ObstacleRaycaster, PixelCoord, PixelRect, TileGrid, TileRaycaster, Tilemap, TilemapError,
    Vec2,
};
