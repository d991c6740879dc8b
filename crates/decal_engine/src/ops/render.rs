use crate::mapping::ViewportWindow;
use crate::raster::{allocate_pixels, par_rows_mut, MapPixelBuffer, Rgba8};
use crate::world::Vec2;
use crate::DecalError;

/// Camera-sized copy of the visible slice of the map, bottom row first.
#[derive(Debug)]
pub struct ViewportBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl ViewportBuffer {
    pub(crate) fn allocate(width: u32, height: u32) -> Result<Self, DecalError> {
        let pixels = allocate_pixels(width as usize * height as usize)?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    pub fn fits(&self, window: &ViewportWindow) -> bool {
        self.width == window.width() && self.height == window.height()
    }
}

/// One finished viewport image handed to the display side.
#[derive(Debug, Clone, Copy)]
pub struct ViewportFrame<'a> {
    pub window: ViewportWindow,
    pub width: u32,
    pub height: u32,
    /// Row-major, bottom row first.
    pub pixels: &'a [Rgba8],
}

impl ViewportFrame<'_> {
    /// World position the displayed surface should be centered on.
    pub fn surface_center(&self) -> Vec2 {
        self.window.center_world()
    }
}

/// Displayable texture that receives the viewport after each completed render.
pub trait OutputSurface {
    fn upload(&mut self, frame: ViewportFrame<'_>);
}

impl<T: OutputSurface + ?Sized> OutputSurface for &mut T {
    fn upload(&mut self, frame: ViewportFrame<'_>) {
        (**self).upload(frame);
    }
}

/// Keeps an owned copy of the most recent upload.
#[derive(Debug, Default, Clone)]
pub struct FrameCapture {
    pub uploads: usize,
    pub window: Option<ViewportWindow>,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba8>,
}

impl FrameCapture {
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

impl OutputSurface for FrameCapture {
    fn upload(&mut self, frame: ViewportFrame<'_>) {
        self.uploads += 1;
        self.window = Some(frame.window);
        self.width = frame.width;
        self.height = frame.height;
        self.pixels.clear();
        self.pixels.extend_from_slice(frame.pixels);
    }
}

/// Copies every visible map row into the matching viewport row.
///
/// A row whose source slice would fall outside the map reads from offset 0 instead.
pub(crate) fn copy_visible_rows(
    map: &MapPixelBuffer,
    window: &ViewportWindow,
    viewport: &mut ViewportBuffer,
) {
    let view_width = viewport.width as usize;
    let map_width = map.width() as usize;
    let source = map.pixels();
    let lower = window.lower();

    par_rows_mut(
        &mut viewport.pixels,
        view_width,
        0..viewport.height as i32,
        |row_index, row| {
            let y = lower.y + row_index;
            let offset =
                source_offset(lower.x, y, map_width, view_width, source.len()).unwrap_or(0);
            match source.get(offset..offset + view_width) {
                Some(slice) => row.copy_from_slice(slice),
                None => row.fill(Rgba8::TRANSPARENT),
            }
        },
    );
}

fn source_offset(
    x: i32,
    y: i32,
    map_width: usize,
    row_width: usize,
    map_len: usize,
) -> Option<usize> {
    if x < 0 || y < 0 || x as usize + row_width > map_width {
        return None;
    }
    let offset = y as usize * map_width + x as usize;
    (offset + row_width <= map_len).then_some(offset)
}
