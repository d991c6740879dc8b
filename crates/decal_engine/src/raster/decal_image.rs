use image::RgbaImage;

use super::Rgba8;
use crate::DecalError;

/// Immutable RGBA8 decal, row-major with row 0 at the bottom (world `y` up).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecalImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl DecalImage {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba8>) -> Result<Self, DecalError> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return Err(DecalError::InvalidImage {
                width,
                height,
                pixel_count: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn solid(width: u32, height: u32, color: Rgba8) -> Result<Self, DecalError> {
        Self::new(
            width,
            height,
            vec![color; width as usize * height as usize],
        )
    }

    /// Builds a decal from interleaved RGBA bytes that are already bottom-up.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, DecalError> {
        if bytes.len() % 4 != 0 {
            return Err(DecalError::InvalidImage {
                width,
                height,
                pixel_count: bytes.len() / 4,
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|chunk| Rgba8::new(chunk[0], chunk[1], chunk[2], chunk[3]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Converts a decoded image (top row first) into the bottom-up decal layout.
    pub fn from_rgba_image(image: &RgbaImage) -> Result<Self, DecalError> {
        let width = image.width();
        let height = image.height();
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in (0..height).rev() {
            for x in 0..width {
                pixels.push(Rgba8::from_array(image.get_pixel(x, y).0));
            }
        }
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}
