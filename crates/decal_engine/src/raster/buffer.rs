use std::ops::Range;

use rayon::prelude::*;

use super::Rgba8;
use crate::world::{PixelCoord, TileGrid};
use crate::DecalError;

/// Allocates a zeroed pixel vector, reporting reservation failure instead of aborting.
pub(crate) fn allocate_pixels(pixel_count: usize) -> Result<Vec<Rgba8>, DecalError> {
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(pixel_count)
        .map_err(|source| DecalError::Allocation {
            pixel_count,
            source,
        })?;
    pixels.resize(pixel_count, Rgba8::TRANSPARENT);
    Ok(pixels)
}

/// Runs `f(row_index, row)` in parallel for every row of `rows` that exists in a
/// `width`-wide row-major buffer. Each task owns exactly one row slice.
pub(crate) fn par_rows_mut<F>(pixels: &mut [Rgba8], width: usize, rows: Range<i32>, f: F)
where
    F: Fn(i32, &mut [Rgba8]) + Sync + Send,
{
    if width == 0 {
        return;
    }
    let height = (pixels.len() / width) as i32;
    let first = rows.start.clamp(0, height);
    let last = rows.end.clamp(first, height);
    if first == last {
        return;
    }
    let start = first as usize * width;
    let end = last as usize * width;
    pixels[start..end]
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(offset, row)| f(first + offset as i32, row));
}

/// The persistent map-wide decal raster. Row 0 is the bottom of the map.
#[derive(Debug)]
pub struct MapPixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl MapPixelBuffer {
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

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Rgba8] {
        &mut self.pixels
    }

    pub fn contains(&self, pixel: PixelCoord) -> bool {
        pixel.x >= 0
            && pixel.y >= 0
            && (pixel.x as u32) < self.width
            && (pixel.y as u32) < self.height
    }

    pub fn index_of(&self, pixel: PixelCoord) -> Option<usize> {
        if !self.contains(pixel) {
            return None;
        }
        Some(pixel.y as usize * self.width as usize + pixel.x as usize)
    }

    pub fn get(&self, pixel: PixelCoord) -> Option<Rgba8> {
        self.index_of(pixel).map(|index| self.pixels[index])
    }

    /// Index of `pixel` when it is inside the buffer and on a floor tile.
    pub(crate) fn writable_index(&self, floor: &FloorMask, pixel: PixelCoord) -> Option<usize> {
        let index = self.index_of(pixel)?;
        floor.is_floor_pixel(pixel).then_some(index)
    }

    pub(crate) fn par_rows_mut<F>(&mut self, rows: Range<i32>, f: F)
    where
        F: Fn(i32, &mut [Rgba8]) + Sync + Send,
    {
        par_rows_mut(&mut self.pixels, self.width as usize, rows, f);
    }
}

/// Per-tile floor flags for the whole decal map, including the one-tile border
/// beyond the grid, which is never floor.
#[derive(Debug, Clone)]
pub struct FloorMask {
    tiles_x: u32,
    tiles_y: u32,
    pixels_per_tile: u32,
    floor: Vec<bool>,
}

impl FloorMask {
    pub(crate) fn from_grid<G: TileGrid + ?Sized>(
        grid: &G,
        tiles_x: u32,
        tiles_y: u32,
        pixels_per_tile: u32,
    ) -> Self {
        let mut floor = vec![false; tiles_x as usize * tiles_y as usize];
        for y in 0..grid.height().min(tiles_y) {
            for x in 0..grid.width().min(tiles_x) {
                floor[y as usize * tiles_x as usize + x as usize] = !grid.is_wall(x, y);
            }
        }
        Self {
            tiles_x,
            tiles_y,
            pixels_per_tile,
            floor,
        }
    }

    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    pub fn is_floor_tile(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.tiles_x || y as u32 >= self.tiles_y {
            return false;
        }
        self.floor[y as usize * self.tiles_x as usize + x as usize]
    }

    pub fn is_floor_pixel(&self, pixel: PixelCoord) -> bool {
        if pixel.x < 0 || pixel.y < 0 || self.pixels_per_tile == 0 {
            return false;
        }
        let size = self.pixels_per_tile as i32;
        self.is_floor_tile(pixel.x / size, pixel.y / size)
    }
}
