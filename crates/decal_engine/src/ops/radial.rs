use serde::Deserialize;

use crate::raster::{FloorMask, MapPixelBuffer, Rgba8};
use crate::world::{PixelCoord, Vec2};

/// A moving entity that wipes decals around itself each frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CleaningAgent {
    pub position: Vec2,
    /// Body radius in world units.
    pub radius: f32,
    /// Share of the erase radius that is wiped completely, `0..=1`.
    pub cleaning_quality: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FadeAction {
    Clear,
    FadeTo(f32),
    Keep,
}

/// Radial erase around one pixel, all distances in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RadialProfile {
    center: PixelCoord,
    effective_radius: f32,
    full_clear_radius: f32,
}

impl RadialProfile {
    pub(crate) fn new(
        center: PixelCoord,
        radius_world: f32,
        cleaning_quality: f32,
        pixels_per_unit: u32,
        range_scale: f32,
    ) -> Self {
        let mut effective_radius = range_scale * radius_world * pixels_per_unit as f32;
        if !effective_radius.is_finite() || effective_radius <= 0.0 {
            effective_radius = 1.0;
        }
        let quality = if cleaning_quality.is_nan() {
            0.0
        } else {
            cleaning_quality.clamp(0.0, 1.0)
        };
        Self {
            center,
            effective_radius,
            full_clear_radius: effective_radius * quality,
        }
    }

    pub(crate) fn effective_radius(&self) -> f32 {
        self.effective_radius
    }

    pub(crate) fn full_clear_radius(&self) -> f32 {
        self.full_clear_radius
    }

    pub(crate) fn action_at(&self, distance: f32) -> FadeAction {
        if distance <= self.full_clear_radius {
            return FadeAction::Clear;
        }
        if distance >= self.effective_radius {
            return FadeAction::Keep;
        }
        let band = (self.effective_radius - self.full_clear_radius).max(f32::EPSILON);
        FadeAction::FadeTo((distance - self.full_clear_radius) / band * 255.0)
    }
}

/// Lowers alpha around the profile center; never raises it. Rows run in parallel.
pub(crate) fn clear_radius(map: &mut MapPixelBuffer, floor: &FloorMask, profile: &RadialProfile) {
    let reach = profile.effective_radius.ceil().min(i32::MAX as f32 / 4.0) as i32;
    let center = profile.center;
    let map_width = map.width() as i32;
    let x_min = center.x.saturating_sub(reach).max(0);
    let x_max = center.x.saturating_add(reach).min(map_width - 1);
    if x_min > x_max {
        return;
    }
    let rows = center.y.saturating_sub(reach)..center.y.saturating_add(reach).saturating_add(1);

    map.par_rows_mut(rows, |y, row| {
        let dy = (y - center.y) as f32;
        for x in x_min..=x_max {
            let pixel = &mut row[x as usize];
            if pixel.is_transparent() || !floor.is_floor_pixel(PixelCoord::new(x, y)) {
                continue;
            }
            let dx = (x - center.x) as f32;
            let distance = (dx * dx + dy * dy).sqrt();
            match profile.action_at(distance) {
                FadeAction::Clear => *pixel = Rgba8::TRANSPARENT,
                FadeAction::FadeTo(target) => {
                    if pixel.a as f32 > target {
                        pixel.a = target as u8;
                    }
                }
                FadeAction::Keep => {}
            }
        }
    });
}
