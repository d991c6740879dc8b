use std::ops::{Add, Mul, Sub};

use serde::Deserialize;

/// A point or direction in world units. One world unit is one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or `None` for a zero or non-finite vector.
    pub fn normalized(self) -> Option<Self> {
        let length = self.length();
        if !length.is_finite() || length <= f32::EPSILON {
            return None;
        }
        Some(self * length.recip())
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Integer pixel position in map pixel space. `y` grows upward, matching world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub x: i32,
    pub y: i32,
}

impl PixelCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Half-open pixel rectangle `[min, max)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub min: PixelCoord,
    pub max: PixelCoord,
}

impl PixelRect {
    pub const fn new(min: PixelCoord, max: PixelCoord) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> i32 {
        self.max.x.saturating_sub(self.min.x).max(0)
    }

    pub fn height(&self) -> i32 {
        self.max.y.saturating_sub(self.min.y).max(0)
    }

    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Overlap of both rectangles; empty when they do not touch.
    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        let min = PixelCoord::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = PixelCoord::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        if min.x >= max.x || min.y >= max.y {
            return PixelRect::default();
        }
        PixelRect::new(min, max)
    }

    pub fn contains(&self, pixel: PixelCoord) -> bool {
        pixel.x >= self.min.x && pixel.x < self.max.x && pixel.y >= self.min.y && pixel.y < self.max.y
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.min.x as f32 + self.max.x as f32) * 0.5,
            (self.min.y as f32 + self.max.y as f32) * 0.5,
        )
    }
}
