use crate::world::Vec2;

pub const CAMERA_SIZE_DEFAULT: f32 = 5.0;
pub const CAMERA_SIZE_MIN: f32 = 1.0;
pub const CAMERA_SIZE_MAX: f32 = 40.0;
pub const CAMERA_SIZE_STEP: f32 = 0.5;
pub const CAMERA_ASPECT_DEFAULT: f32 = 16.0 / 9.0;

/// What the decal window needs from the scene camera.
pub trait CameraView {
    fn position(&self) -> Vec2;
    /// Half of the visible height, in world units.
    fn orthographic_size(&self) -> f32;
    /// Maps viewport space (`(0,0)` bottom-left, `(1,1)` top-right) to world space.
    fn viewport_to_world(&self, viewport: Vec2) -> Vec2;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    pub position: Vec2,
    pub orthographic_size: f32,
    /// Viewport width divided by height.
    pub aspect: f32,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            orthographic_size: CAMERA_SIZE_DEFAULT,
            aspect: CAMERA_ASPECT_DEFAULT,
        }
    }
}

impl OrthographicCamera {
    pub fn new(position: Vec2, orthographic_size: f32, aspect: f32) -> Self {
        Self {
            position,
            orthographic_size: clamp_camera_size(orthographic_size),
            aspect: if aspect.is_finite() && aspect > 0.0 {
                aspect
            } else {
                CAMERA_ASPECT_DEFAULT
            },
        }
    }

    pub fn set_size_clamped(&mut self, size: f32) {
        self.orthographic_size = clamp_camera_size(size);
    }

    /// Positive steps zoom in (smaller view), negative steps zoom out.
    pub fn apply_zoom_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        let target = self.orthographic_size - steps as f32 * CAMERA_SIZE_STEP;
        self.set_size_clamped(target);
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.orthographic_size * self.aspect, self.orthographic_size)
    }
}

impl CameraView for OrthographicCamera {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn orthographic_size(&self) -> f32 {
        self.orthographic_size
    }

    fn viewport_to_world(&self, viewport: Vec2) -> Vec2 {
        let half = self.half_extents();
        Vec2::new(
            self.position.x + (viewport.x * 2.0 - 1.0) * half.x,
            self.position.y + (viewport.y * 2.0 - 1.0) * half.y,
        )
    }
}

fn clamp_camera_size(size: f32) -> f32 {
    if !size.is_finite() {
        return CAMERA_SIZE_DEFAULT;
    }
    size.clamp(CAMERA_SIZE_MIN, CAMERA_SIZE_MAX)
}
