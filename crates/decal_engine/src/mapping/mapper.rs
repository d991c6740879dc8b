use super::CameraView;
use crate::world::{PixelCoord, PixelRect, Vec2};
use crate::{DecalConfig, DecalError};

/// Camera-visible slice of the map buffer, in map pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportWindow {
    rect: PixelRect,
    center_world: Vec2,
}

impl ViewportWindow {
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn lower(&self) -> PixelCoord {
        self.rect.min
    }

    pub fn upper(&self) -> PixelCoord {
        self.rect.max
    }

    pub fn width(&self) -> u32 {
        self.rect.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.rect.height() as u32
    }

    /// World position the viewport surface is centered on.
    pub fn center_world(&self) -> Vec2 {
        self.center_world
    }
}

/// Converts between world units, tiles and map pixels, and derives the viewport window.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    pixels_per_unit: u32,
    map_tiles_x: u32,
    map_tiles_y: u32,
    window_oversize: f32,
}

impl CoordinateMapper {
    /// The decal map covers the tile grid plus one extra tile row and column.
    pub fn new(config: &DecalConfig, grid_width: u32, grid_height: u32) -> Result<Self, DecalError> {
        let too_large = || DecalError::MapTooLarge {
            tiles_x: grid_width,
            tiles_y: grid_height,
            pixels_per_unit: config.pixels_per_unit,
        };
        let map_tiles_x = grid_width.checked_add(1).ok_or_else(too_large)?;
        let map_tiles_y = grid_height.checked_add(1).ok_or_else(too_large)?;
        let width_px = map_tiles_x as u64 * config.pixels_per_unit as u64;
        let height_px = map_tiles_y as u64 * config.pixels_per_unit as u64;
        let pixel_count = width_px.checked_mul(height_px).ok_or_else(too_large)?;
        if width_px > i32::MAX as u64
            || height_px > i32::MAX as u64
            || usize::try_from(pixel_count).is_err()
        {
            return Err(too_large());
        }

        Ok(Self {
            pixels_per_unit: config.pixels_per_unit,
            map_tiles_x,
            map_tiles_y,
            window_oversize: config.window_oversize,
        })
    }

    pub fn pixels_per_unit(&self) -> u32 {
        self.pixels_per_unit
    }

    pub fn map_tiles(&self) -> (u32, u32) {
        (self.map_tiles_x, self.map_tiles_y)
    }

    pub fn map_width_px(&self) -> u32 {
        self.map_tiles_x * self.pixels_per_unit
    }

    pub fn map_height_px(&self) -> u32 {
        self.map_tiles_y * self.pixels_per_unit
    }

    pub fn map_size_world(&self) -> Vec2 {
        Vec2::new(self.map_tiles_x as f32, self.map_tiles_y as f32)
    }

    pub fn world_to_pixel(&self, world: Vec2) -> PixelCoord {
        let ppu = self.pixels_per_unit as f32;
        PixelCoord::new(
            saturating_round(world.x * ppu),
            saturating_round(world.y * ppu),
        )
    }

    pub fn pixel_to_world(&self, pixel: PixelCoord) -> Vec2 {
        let ppu = self.pixels_per_unit as f32;
        Vec2::new(pixel.x as f32 / ppu, pixel.y as f32 / ppu)
    }

    /// Tile under `pixel`, or `None` outside the decal map.
    pub fn pixel_to_tile(&self, pixel: PixelCoord) -> Option<(u32, u32)> {
        if pixel.x < 0 || pixel.y < 0 {
            return None;
        }
        let tile_x = pixel.x as u32 / self.pixels_per_unit;
        let tile_y = pixel.y as u32 / self.pixels_per_unit;
        (tile_x < self.map_tiles_x && tile_y < self.map_tiles_y).then_some((tile_x, tile_y))
    }

    /// Fresh window for the camera's current view.
    ///
    /// Each axis is clamped to the map independently: a view wider than the map is
    /// pinned to the whole map, a smaller one is slid back inside. The result is then
    /// grown by the oversize margin, clipped to the map and padded to even dimensions.
    pub fn compute_window(&self, camera: &impl CameraView) -> ViewportWindow {
        let map = self.map_size_world();
        let p0 = camera.viewport_to_world(Vec2::new(0.0, 0.0));
        let p1 = camera.viewport_to_world(Vec2::new(1.0, 1.0));
        let (x0, x1) = clamp_axis(p0.x, p1.x, map.x);
        let (y0, y1) = clamp_axis(p0.y, p1.y, map.y);

        let ppu = self.pixels_per_unit as f32;
        let margin = self.window_oversize;
        let (min_x, max_x) = pixel_span(
            (x0 - margin) * ppu,
            (x1 + margin) * ppu,
            self.map_width_px() as i32,
        );
        let (min_y, max_y) = pixel_span(
            (y0 - margin) * ppu,
            (y1 + margin) * ppu,
            self.map_height_px() as i32,
        );
        self.window_from_rect(PixelRect::new(
            PixelCoord::new(min_x, min_y),
            PixelCoord::new(max_x, max_y),
        ))
    }

    /// Moves `current` to follow the camera without changing its dimensions, so the
    /// viewport buffer can be reused in place.
    pub fn slide_window(&self, current: &ViewportWindow, camera: &impl CameraView) -> ViewportWindow {
        let target = self.compute_window(camera);
        let (center_x, center_y) = target.rect.center();
        let width = current.rect.width();
        let height = current.rect.height();
        let min_x = slide_axis(center_x, width, self.map_width_px() as i32);
        let min_y = slide_axis(center_y, height, self.map_height_px() as i32);
        self.window_from_rect(PixelRect::new(
            PixelCoord::new(min_x, min_y),
            PixelCoord::new(min_x + width, min_y + height),
        ))
    }

    fn window_from_rect(&self, rect: PixelRect) -> ViewportWindow {
        let (center_x, center_y) = rect.center();
        let ppu = self.pixels_per_unit as f32;
        ViewportWindow {
            rect,
            center_world: Vec2::new(center_x / ppu, center_y / ppu),
        }
    }
}

fn saturating_round(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(i32::MIN as f32, i32::MAX as f32) as i32
}

fn clamp_axis(a: f32, b: f32, map_size: f32) -> (f32, f32) {
    if !a.is_finite() || !b.is_finite() {
        return (0.0, map_size);
    }
    let (mut low, mut high) = if a <= b { (a, b) } else { (b, a) };
    if high - low > map_size {
        return (0.0, map_size);
    }
    if low < 0.0 {
        high -= low;
        low = 0.0;
    }
    if high > map_size {
        low -= high - map_size;
        high = map_size;
    }
    (low.max(0.0), high)
}

/// Integer `[min, max)` inside `[0, limit]`, at least one pixel wide, even whenever the
/// map allows it.
fn pixel_span(low: f32, high: f32, limit: i32) -> (i32, i32) {
    let mut min = (low.round() as i32).clamp(0, limit - 1);
    let mut max = (high.round() as i32).clamp(min + 1, limit);
    if (max - min) % 2 != 0 {
        if max < limit {
            max += 1;
        } else if min > 0 {
            min -= 1;
        }
    }
    (min, max)
}

fn slide_axis(center: f32, size: i32, limit: i32) -> i32 {
    let min = (center - size as f32 * 0.5).round() as i32;
    min.clamp(0, (limit - size).max(0))
}
