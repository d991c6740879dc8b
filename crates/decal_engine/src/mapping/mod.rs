mod camera;
mod mapper;
mod transform;

pub use camera::{
    CameraView, OrthographicCamera, CAMERA_ASPECT_DEFAULT, CAMERA_SIZE_DEFAULT, CAMERA_SIZE_MAX,
    CAMERA_SIZE_MIN,
};
pub use mapper::{CoordinateMapper, ViewportWindow};
pub use transform::{rotation_angle_degrees, RotationOffsetTransform};
