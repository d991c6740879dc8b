use crate::world::{PixelCoord, PixelRect, Vec2};

/// Angle of `direction` from the +x axis in degrees, in `[0, 360)`.
///
/// Directions with a negative `y` component map onto the upper half of the range, so
/// the full circle is covered. A zero direction yields 0.
pub fn rotation_angle_degrees(direction: Vec2) -> f32 {
    let Some(unit) = direction.normalized() else {
        return 0.0;
    };
    let angle = unit.x.clamp(-1.0, 1.0).acos().to_degrees();
    if unit.y < 0.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// 2x3 affine map: rotation by a direction followed by a pixel offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationOffsetTransform {
    cos: f32,
    sin: f32,
    offset_px: Vec2,
}

impl RotationOffsetTransform {
    pub fn new(angle_degrees: f32, offset_px: Vec2) -> Self {
        let radians = angle_degrees.to_radians();
        Self {
            cos: radians.cos(),
            sin: radians.sin(),
            offset_px,
        }
    }

    pub fn from_direction(direction: Vec2, offset_px: Vec2) -> Self {
        Self::new(rotation_angle_degrees(direction), offset_px)
    }

    /// Image of the local x axis (first column of the 2x2 part).
    pub fn axis_x(&self) -> Vec2 {
        Vec2::new(self.cos, self.sin)
    }

    /// Image of the local y axis (second column of the 2x2 part).
    pub fn axis_y(&self) -> Vec2 {
        Vec2::new(-self.sin, self.cos)
    }

    pub fn offset_px(&self) -> Vec2 {
        self.offset_px
    }

    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.rotate(local) + self.offset_px
    }

    pub fn rotate(&self, local: Vec2) -> Vec2 {
        Vec2::new(
            local.x * self.cos - local.y * self.sin,
            local.x * self.sin + local.y * self.cos,
        )
    }

    /// Maps a map-space point back to decal-local space.
    pub fn invert(&self, mapped: Vec2) -> Vec2 {
        let shifted = mapped - self.offset_px;
        Vec2::new(
            shifted.x * self.cos + shifted.y * self.sin,
            -shifted.x * self.sin + shifted.y * self.cos,
        )
    }

    /// Integer map-pixel rectangle covering every pixel a splat of the local rectangle
    /// `[min, max]` can touch after the transform.
    pub fn splat_bounds(&self, local_min: Vec2, local_max: Vec2) -> PixelRect {
        let corners = [
            self.apply(local_min),
            self.apply(Vec2::new(local_max.x, local_min.y)),
            self.apply(local_max),
            self.apply(Vec2::new(local_min.x, local_max.y)),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for corner in &corners[1..] {
            min.x = min.x.min(corner.x);
            min.y = min.y.min(corner.y);
            max.x = max.x.max(corner.x);
            max.y = max.y.max(corner.y);
        }
        PixelRect::new(
            PixelCoord::new(min.x.floor() as i32, min.y.floor() as i32),
            PixelCoord::new(
                (max.x.ceil() as i32).saturating_add(1),
                (max.y.ceil() as i32).saturating_add(1),
            ),
        )
    }
}
