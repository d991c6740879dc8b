use super::{TileGrid, Vec2};

/// Spatial index of static obstacles, queried by the directional eraser.
pub trait ObstacleRaycaster {
    /// First obstacle hit on the segment `origin -> end`, or `None` when the segment is clear.
    fn raycast(&self, origin: Vec2, end: Vec2) -> Option<Vec2>;
}

impl<T: ObstacleRaycaster + ?Sized> ObstacleRaycaster for &T {
    fn raycast(&self, origin: Vec2, end: Vec2) -> Option<Vec2> {
        (**self).raycast(origin, end)
    }
}

/// Grid DDA over a [`TileGrid`]; wall tiles and everything outside the grid block the ray.
#[derive(Debug, Clone, Copy)]
pub struct TileRaycaster<'a, G: TileGrid + ?Sized> {
    grid: &'a G,
}

impl<'a, G: TileGrid + ?Sized> TileRaycaster<'a, G> {
    pub fn new(grid: &'a G) -> Self {
        Self { grid }
    }

    fn blocks(&self, tile_x: i64, tile_y: i64) -> bool {
        if tile_x < 0 || tile_y < 0 || tile_x > u32::MAX as i64 || tile_y > u32::MAX as i64 {
            return true;
        }
        self.grid.is_wall(tile_x as u32, tile_y as u32)
    }
}

impl<G: TileGrid + ?Sized> ObstacleRaycaster for TileRaycaster<'_, G> {
    fn raycast(&self, origin: Vec2, end: Vec2) -> Option<Vec2> {
        if !origin.is_finite() || !end.is_finite() {
            return None;
        }
        let segment = end - origin;
        let length = segment.length();
        let direction = segment.normalized()?;

        let mut map_x = origin.x.floor() as i64;
        let mut map_y = origin.y.floor() as i64;
        if self.blocks(map_x, map_y) {
            return Some(origin);
        }

        let delta_dist_x = if direction.x == 0.0 {
            f32::INFINITY
        } else {
            direction.x.recip().abs()
        };
        let delta_dist_y = if direction.y == 0.0 {
            f32::INFINITY
        } else {
            direction.y.recip().abs()
        };

        let (step_x, mut side_dist_x) = if direction.x < 0.0 {
            (-1, (origin.x - map_x as f32) * delta_dist_x)
        } else {
            (1, (map_x as f32 + 1.0 - origin.x) * delta_dist_x)
        };
        let (step_y, mut side_dist_y) = if direction.y < 0.0 {
            (-1, (origin.y - map_y as f32) * delta_dist_y)
        } else {
            (1, (map_y as f32 + 1.0 - origin.y) * delta_dist_y)
        };

        loop {
            let travelled = if side_dist_x < side_dist_y {
                let travelled = side_dist_x;
                side_dist_x += delta_dist_x;
                map_x += step_x;
                travelled
            } else {
                let travelled = side_dist_y;
                side_dist_y += delta_dist_y;
                map_y += step_y;
                travelled
            };

            if !travelled.is_finite() || travelled > length {
                return None;
            }
            if self.blocks(map_x, map_y) {
                return Some(origin + direction * travelled);
            }
        }
    }
}
