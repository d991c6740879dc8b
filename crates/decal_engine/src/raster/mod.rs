mod buffer;
mod color;
mod decal_image;

pub(crate) use buffer::{allocate_pixels, par_rows_mut};
pub use buffer::{FloorMask, MapPixelBuffer};
pub use color::Rgba8;
pub use decal_image::DecalImage;
