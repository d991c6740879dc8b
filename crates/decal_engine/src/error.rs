use std::collections::TryReserveError;

use thiserror::Error;

use crate::world::TilemapError;

#[derive(Debug, Error)]
pub enum DecalError {
    #[error("decal buffers are not initialized (operation: {operation})")]
    NotInitialized { operation: &'static str },
    #[error(
        "invalid decal image: {width}x{height} with {pixel_count} pixels \
(dimensions must be non-zero and match the pixel count)"
    )]
    InvalidImage {
        width: u32,
        height: u32,
        pixel_count: usize,
    },
    #[error(
        "map of {tiles_x}x{tiles_y} tiles at {pixels_per_unit} px per unit does not fit in memory"
    )]
    MapTooLarge {
        tiles_x: u32,
        tiles_y: u32,
        pixels_per_unit: u32,
    },
    #[error("failed to allocate {pixel_count} pixels: {source}")]
    Allocation {
        pixel_count: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("a job targeting the {target} buffer is still scheduled; complete it first")]
    JobPending { target: &'static str },
    #[error("invalid decal config field `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    #[error(transparent)]
    Tilemap(#[from] TilemapError),
}
