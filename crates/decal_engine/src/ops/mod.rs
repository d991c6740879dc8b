mod directional;
mod radial;
mod render;
mod stamp;

pub(crate) use directional::clear_line;
pub use directional::LineProfile;
pub(crate) use radial::{clear_radius, RadialProfile};
pub use radial::CleaningAgent;
pub(crate) use render::copy_visible_rows;
pub use render::{FrameCapture, OutputSurface, ViewportBuffer, ViewportFrame};
pub(crate) use stamp::stamp_decal;
