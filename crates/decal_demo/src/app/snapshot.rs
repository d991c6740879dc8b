use std::io::Cursor;
use std::path::Path;

use decal_engine::{OutputSurface, Rgba8, Vec2, ViewportFrame};
use image::{ImageFormat, RgbaImage};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::atomic_io::write_bytes_atomic;
use super::DemoError;

/// Output surface that keeps the latest viewport frame and can persist it as PNG.
#[derive(Debug, Default)]
pub(crate) struct SnapshotSurface {
    uploads: u64,
    width: u32,
    height: u32,
    center: Vec2,
    pixels: Vec<Rgba8>,
}

impl SnapshotSurface {
    pub(crate) fn uploads(&self) -> u64 {
        self.uploads
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// SHA-256 over the frame's dimensions and raw pixels, lowercase hex.
    pub(crate) fn frame_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        for pixel in &self.pixels {
            hasher.update(pixel.to_array());
        }
        to_hex_lower(&hasher.finalize())
    }

    /// Viewport rows are stored bottom-up; image rows go top-down.
    pub(crate) fn to_image(&self) -> Option<RgbaImage> {
        if self.uploads == 0 || self.width == 0 || self.height == 0 {
            return None;
        }
        let row_len = self.width as usize;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for row in self.pixels.chunks_exact(row_len).rev() {
            for pixel in row {
                bytes.extend_from_slice(&pixel.to_array());
            }
        }
        RgbaImage::from_raw(self.width, self.height, bytes)
    }

    /// Encodes the latest frame and writes it atomically. Returns the frame digest.
    pub(crate) fn write_png(&self, path: &Path) -> Result<String, DemoError> {
        let image = self.to_image().ok_or(DemoError::EmptySnapshot)?;
        let mut encoded = Cursor::new(Vec::new());
        image
            .write_to(&mut encoded, ImageFormat::Png)
            .map_err(DemoError::EncodeSnapshot)?;
        let bytes = encoded.into_inner();
        write_bytes_atomic(path, &bytes).map_err(|source| DemoError::WriteSnapshot {
            path: path.to_path_buf(),
            source,
        })?;

        let digest = self.frame_digest();
        info!(
            path = %path.display(),
            width = self.width,
            height = self.height,
            center_x = self.center.x,
            center_y = self.center.y,
            png_bytes = bytes.len(),
            sha256 = %digest,
            "snapshot_written"
        );
        Ok(digest)
    }
}

impl OutputSurface for SnapshotSurface {
    fn upload(&mut self, frame: ViewportFrame<'_>) {
        if self.width != frame.width || self.height != frame.height {
            debug!(
                width = frame.width,
                height = frame.height,
                "snapshot_surface_resized"
            );
        }
        self.uploads += 1;
        self.width = frame.width;
        self.height = frame.height;
        self.center = frame.surface_center();
        self.pixels.clear();
        self.pixels.extend_from_slice(frame.pixels);
    }
}

fn to_hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
