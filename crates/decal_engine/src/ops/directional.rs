use rayon::prelude::*;

use crate::mapping::CoordinateMapper;
use crate::raster::{DecalImage, FloorMask, MapPixelBuffer, Rgba8};
use crate::world::{ObstacleRaycaster, PixelCoord, Vec2};

/// A planned directional erase, everything in map pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineProfile {
    pub start: PixelCoord,
    /// Per-step advance; the major axis component is exactly +-1.
    pub step: Vec2,
    pub step_count: usize,
    /// Unit offset perpendicular to the major axis.
    pub normal: PixelCoord,
    pub hit: PixelCoord,
    /// Sign of travel on each axis, 0 when the line does not move along it.
    pub travel: PixelCoord,
    pub range: i32,
    pub full_clear_range: i32,
    pub fade_darkening: f32,
}

impl LineProfile {
    /// Plans a line from `start` along `direction` up to the first obstacle, or to the
    /// map edge when the raycast finds nothing. `None` for a zero direction, a band
    /// without width, or a band that never touches the map.
    pub fn plan(
        mapper: &CoordinateMapper,
        start: Vec2,
        direction: Vec2,
        obstacles: &impl ObstacleRaycaster,
        (range, full_clear_range): (i32, i32),
        fade_darkening: f32,
    ) -> Option<Self> {
        if range <= 0 || !start.is_finite() {
            return None;
        }
        let direction = direction.normalized()?;
        let map = mapper.map_size_world();
        let ray_length = map.x + map.y;
        let end = start + direction * ray_length;
        let hit = obstacles
            .raycast(start, end)
            .unwrap_or_else(|| map_exit_point(start, direction, map, ray_length));

        let major_x = direction.x.abs() >= direction.y.abs();
        let (major_component, distance) = if major_x {
            (direction.x.abs(), (hit.x - start.x).abs())
        } else {
            (direction.y.abs(), (hit.y - start.y).abs())
        };
        let step = direction * major_component.recip();
        let step_count = (distance.min(ray_length) * mapper.pixels_per_unit() as f32) as usize;
        let start_px = mapper.world_to_pixel(start);
        if !band_touches_map(mapper, start_px, step, step_count, range) {
            return None;
        }

        Some(Self {
            start: start_px,
            step,
            step_count,
            normal: if major_x {
                PixelCoord::new(0, 1)
            } else {
                PixelCoord::new(1, 0)
            },
            hit: mapper.world_to_pixel(hit),
            travel: PixelCoord::new(sign(direction.x), sign(direction.y)),
            range,
            full_clear_range: full_clear_range.clamp(0, range),
            fade_darkening,
        })
    }

    fn step_center(&self, step_index: usize) -> PixelCoord {
        let i = step_index as f32;
        PixelCoord::new(
            self.start.x.saturating_add((i * self.step.x) as i32),
            self.start.y.saturating_add((i * self.step.y) as i32),
        )
    }

    /// Whether `pixel` lies beyond the obstacle along the direction of travel,
    /// checked per axis; an axis the line does not move along never blocks.
    fn is_past_hit(&self, pixel: PixelCoord) -> bool {
        let past_x = (self.travel.x > 0 && pixel.x > self.hit.x)
            || (self.travel.x < 0 && pixel.x < self.hit.x);
        let past_y = (self.travel.y > 0 && pixel.y > self.hit.y)
            || (self.travel.y < 0 && pixel.y < self.hit.y);
        past_x || past_y
    }

    fn fade_alpha(&self, offset: i32) -> f32 {
        let band = (self.range - self.full_clear_range).max(1) as f32;
        (offset - self.full_clear_range) as f32 / band * 255.0
    }
}

fn sign(value: f32) -> i32 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Whether the swept band, widened by `range` on every side, overlaps the map pixels.
fn band_touches_map(
    mapper: &CoordinateMapper,
    start: PixelCoord,
    step: Vec2,
    step_count: usize,
    range: i32,
) -> bool {
    let steps = step_count as f64;
    let reach = range as f64;
    let overlaps = |origin: i32, delta: f32, size: u32| {
        let from = origin as f64;
        let to = from + steps * delta as f64;
        from.min(to) - reach < size as f64 && from.max(to) + reach >= 0.0
    };
    overlaps(start.x, step.x, mapper.map_width_px())
        && overlaps(start.y, step.y, mapper.map_height_px())
}

/// Where a ray starting at `start` leaves the map rectangle `[0, map]`.
fn map_exit_point(start: Vec2, direction: Vec2, map: Vec2, max_length: f32) -> Vec2 {
    let axis_exit = |origin: f32, delta: f32, size: f32| {
        if delta > 0.0 {
            (size - origin) / delta
        } else if delta < 0.0 {
            -origin / delta
        } else {
            f32::INFINITY
        }
    };
    let t = axis_exit(start.x, direction.x, map.x)
        .min(axis_exit(start.y, direction.y, map.y))
        .clamp(0.0, max_length);
    start + direction * t
}

/// Runs the band sweep. Steps are computed in parallel against the unmodified map,
/// each step touching its own column (or row), and the writes are applied afterwards.
/// Returns the number of pixels written.
pub(crate) fn clear_line(
    map: &mut MapPixelBuffer,
    floor: &FloorMask,
    profile: &LineProfile,
    restamp: &DecalImage,
) -> usize {
    let snapshot: &MapPixelBuffer = map;
    let writes: Vec<Vec<(usize, Rgba8)>> = (0..profile.step_count)
        .into_par_iter()
        .map(|step_index| step_writes(snapshot, floor, profile, restamp, step_index))
        .collect();

    let pixels = map.pixels_mut();
    let mut written = 0;
    for (index, color) in writes.into_iter().flatten() {
        pixels[index] = color;
        written += 1;
    }
    written
}

fn step_writes(
    map: &MapPixelBuffer,
    floor: &FloorMask,
    profile: &LineProfile,
    restamp: &DecalImage,
    step_index: usize,
) -> Vec<(usize, Rgba8)> {
    let center = profile.step_center(step_index);
    let texture_x = (step_index % restamp.width() as usize) as u32;
    let half_height = (restamp.height() / 2) as i32;
    let mut writes = Vec::new();

    for offset in 0..profile.range {
        let sides: &[i32] = if offset == 0 { &[1] } else { &[1, -1] };
        for &side in sides {
            let shift = side * offset;
            let pixel = PixelCoord::new(
                center.x.saturating_add(shift * profile.normal.x),
                center.y.saturating_add(shift * profile.normal.y),
            );
            if profile.is_past_hit(pixel) {
                continue;
            }
            let Some(index) = map.writable_index(floor, pixel) else {
                continue;
            };
            let existing = map.pixels()[index];

            if offset < profile.full_clear_range {
                if offset < half_height {
                    if existing.is_transparent() {
                        continue;
                    }
                    let texture_y = (half_height + side * offset) as u32;
                    if let Some(sample) = restamp.pixel(texture_x, texture_y) {
                        writes.push((index, sample.with_alpha(sample.a.min(existing.a))));
                    }
                } else if !existing.is_transparent() {
                    writes.push((index, Rgba8::TRANSPARENT));
                }
                continue;
            }

            let target = profile.fade_alpha(offset);
            if existing.is_transparent() || existing.a as f32 <= target {
                continue;
            }
            let darkened = existing.darkened(1.0 - target / 255.0 * profile.fade_darkening);
            writes.push((index, darkened.with_alpha(target as u8)));
        }
    }
    writes
}
