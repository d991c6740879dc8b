use tracing::debug;

use crate::mapping::RotationOffsetTransform;
use crate::raster::{allocate_pixels, par_rows_mut, DecalImage, FloorMask, MapPixelBuffer, Rgba8};
use crate::world::{PixelCoord, PixelRect, Vec2};
use crate::DecalError;

// Candidate search radius around the inverse-mapped position. A splat touches pixels
// closer than 1 on each map axis, i.e. within sqrt(2) in decal space.
const GATHER_REACH: f32 = 1.5;

/// Rotates `decal` by `direction`, anchors its pivot on `anchor` and composites it into
/// the map. Returns the map-space rectangle that was considered, clipped to the map
/// and empty when the decal misses it entirely.
///
/// The pivot is decal pixel `(width / 2, height / 2)` (integer division), which lands
/// exactly on `anchor` when there is no rotation.
pub(crate) fn stamp_decal(
    map: &mut MapPixelBuffer,
    floor: &FloorMask,
    anchor: PixelCoord,
    direction: Vec2,
    decal: &DecalImage,
) -> Result<PixelRect, DecalError> {
    let transform = RotationOffsetTransform::from_direction(
        direction,
        Vec2::new(anchor.x as f32, anchor.y as f32),
    );
    let pivot = decal_pivot(decal);
    let bounds = transform.splat_bounds(
        Vec2::new(-pivot.x, -pivot.y),
        Vec2::new(
            (decal.width() - 1) as f32 - pivot.x,
            (decal.height() - 1) as f32 - pivot.y,
        ),
    );
    let map_rect = PixelRect::new(
        PixelCoord::new(0, 0),
        PixelCoord::new(map.width() as i32, map.height() as i32),
    );
    let bounds = bounds.intersect(&map_rect);
    if bounds.is_empty() {
        debug!(anchor_x = anchor.x, anchor_y = anchor.y, "decal_stamp_off_map");
        return Ok(bounds);
    }

    let mut scratch = allocate_pixels(bounds.area())?;
    rotate_into_scratch(decal, &transform, bounds, &mut scratch);
    composite_scratch(map, floor, bounds, &scratch);

    debug!(
        anchor_x = anchor.x,
        anchor_y = anchor.y,
        decal_width = decal.width(),
        decal_height = decal.height(),
        scratch_width = bounds.width(),
        scratch_height = bounds.height(),
        "decal_stamped"
    );
    Ok(bounds)
}

fn decal_pivot(decal: &DecalImage) -> Vec2 {
    Vec2::new((decal.width() / 2) as f32, (decal.height() / 2) as f32)
}

/// First pass: every source pixel is bilinearly splatted into the scratch rectangle.
///
/// Expressed as a gather so each scratch row is owned by one task: a scratch pixel
/// visits the source pixels whose splat footprint covers it, in source row-major
/// order, blending each in with its bilinear weight. This yields the same result as
/// splatting the source sequentially.
pub(crate) fn rotate_into_scratch(
    decal: &DecalImage,
    transform: &RotationOffsetTransform,
    bounds: PixelRect,
    scratch: &mut [Rgba8],
) {
    let width = bounds.width() as usize;
    let pivot = decal_pivot(decal);
    let decal_width = decal.width() as i32;
    let decal_height = decal.height() as i32;

    par_rows_mut(scratch, width, 0..bounds.height(), |row_index, row| {
        let map_y = bounds.min.y + row_index;
        for (column, out) in row.iter_mut().enumerate() {
            let map_x = bounds.min.x + column as i32;
            let target = Vec2::new(map_x as f32, map_y as f32);
            let source = transform.invert(target) + pivot;

            let u_min = ((source.x - GATHER_REACH).floor() as i32).max(0);
            let u_max = ((source.x + GATHER_REACH).ceil() as i32).min(decal_width - 1);
            let v_min = ((source.y - GATHER_REACH).floor() as i32).max(0);
            let v_max = ((source.y + GATHER_REACH).ceil() as i32).min(decal_height - 1);

            let mut accumulated = Rgba8::TRANSPARENT;
            for v in v_min..=v_max {
                for u in u_min..=u_max {
                    let Some(color) = decal.pixel(u as u32, v as u32) else {
                        continue;
                    };
                    if color.is_transparent() {
                        continue;
                    }
                    let splat = transform.apply(Vec2::new(u as f32 - pivot.x, v as f32 - pivot.y));
                    let weight = bilinear_weight(splat, target);
                    if weight > 0.0 {
                        accumulated = accumulated.lerp(color, weight);
                    }
                }
            }
            *out = accumulated;
        }
    });
}

#[inline]
fn bilinear_weight(splat: Vec2, target: Vec2) -> f32 {
    let dx = (splat.x - target.x).abs();
    let dy = (splat.y - target.y).abs();
    if dx >= 1.0 || dy >= 1.0 {
        return 0.0;
    }
    (1.0 - dx) * (1.0 - dy)
}

/// Second pass: composite the scratch rectangle over the map, one map row per task.
/// Pixels on wall tiles are cleared instead of blended.
pub(crate) fn composite_scratch(
    map: &mut MapPixelBuffer,
    floor: &FloorMask,
    bounds: PixelRect,
    scratch: &[Rgba8],
) {
    let scratch_width = bounds.width() as usize;
    let map_width = map.width() as i32;
    map.par_rows_mut(bounds.min.y..bounds.max.y, |map_y, row| {
        let offset = (map_y - bounds.min.y) as usize * scratch_width;
        let Some(scratch_row) = scratch.get(offset..offset + scratch_width) else {
            return;
        };
        for (column, source) in scratch_row.iter().enumerate() {
            if source.is_transparent() {
                continue;
            }
            let map_x = bounds.min.x + column as i32;
            if map_x < 0 || map_x >= map_width {
                continue;
            }
            let destination = &mut row[map_x as usize];
            if !floor.is_floor_pixel(PixelCoord::new(map_x, map_y)) {
                *destination = Rgba8::TRANSPARENT;
                continue;
            }
            *destination = source.over(*destination);
        }
    });
}
