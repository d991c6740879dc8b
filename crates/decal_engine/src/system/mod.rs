mod job;
mod stats;

use std::time::Instant;

use tracing::{debug, info};

use crate::mapping::{CameraView, CoordinateMapper, ViewportWindow};
use crate::ops::{
    clear_line, clear_radius, copy_visible_rows, stamp_decal, CleaningAgent, LineProfile,
    OutputSurface, RadialProfile, ViewportBuffer, ViewportFrame,
};
use crate::raster::{DecalImage, FloorMask, MapPixelBuffer, Rgba8};
use crate::world::{ObstacleRaycaster, PixelCoord, PixelRect, TileGrid, Vec2};
use crate::{DecalConfig, DecalError};

pub use job::JobState;
use job::JobSlot;
pub use stats::{DecalStatsSnapshot, RollingMsStats, StatsHandle};
use stats::DecalStats;

const VIEWPORT_TARGET: &str = "viewport";

#[derive(Debug)]
struct MapBuffers {
    mapper: CoordinateMapper,
    floor: FloorMask,
    map: MapPixelBuffer,
}

#[derive(Debug)]
struct ViewportState {
    window: ViewportWindow,
    buffer: ViewportBuffer,
    camera_position: Vec2,
    camera_size: f32,
}

#[derive(Debug, Clone, Copy)]
struct RenderJob {
    window: ViewportWindow,
}

/// Owns the map-wide decal raster and the camera-sized viewport copy.
///
/// Map mutators write straight into the map buffer. `on_frame_update` runs the
/// radial erase for every agent and schedules a window copy, which runs and is
/// uploaded in `complete_pending_render`. While that copy is scheduled, every map
/// mutator is rejected with [`DecalError::JobPending`].
#[derive(Debug)]
pub struct DecalSystem {
    config: DecalConfig,
    buffers: Option<MapBuffers>,
    viewport: Option<ViewportState>,
    render_job: JobSlot<RenderJob>,
    stats: DecalStats,
}

impl DecalSystem {
    pub fn new(config: DecalConfig) -> Result<Self, DecalError> {
        config.validate()?;
        Ok(Self {
            config,
            buffers: None,
            viewport: None,
            render_job: JobSlot::new(VIEWPORT_TARGET),
            stats: DecalStats::default(),
        })
    }

    pub fn config(&self) -> &DecalConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }

    /// Builds the floor mask and a zeroed map buffer for `grid`, replacing any
    /// previous buffers.
    pub fn initialize(&mut self, grid: &impl TileGrid) -> Result<(), DecalError> {
        self.dispose_buffers()?;

        let mapper = CoordinateMapper::new(&self.config, grid.width(), grid.height())?;
        let (tiles_x, tiles_y) = mapper.map_tiles();
        let floor = FloorMask::from_grid(grid, tiles_x, tiles_y, mapper.pixels_per_unit());
        let map = MapPixelBuffer::allocate(mapper.map_width_px(), mapper.map_height_px())?;

        info!(
            grid_width = grid.width(),
            grid_height = grid.height(),
            map_width_px = map.width(),
            map_height_px = map.height(),
            pixels_per_unit = mapper.pixels_per_unit(),
            "decal_buffers_initialized"
        );
        self.buffers = Some(MapBuffers { mapper, floor, map });
        Ok(())
    }

    /// Completes any scheduled render, then releases every buffer. Safe to call
    /// repeatedly.
    pub fn dispose_buffers(&mut self) -> Result<(), DecalError> {
        if let Some(job) = self.render_job.take() {
            if let (Some(buffers), Some(viewport)) = (&self.buffers, &mut self.viewport) {
                copy_visible_rows(&buffers.map, &job.window, &mut viewport.buffer);
            }
            debug!("pending_render_completed_for_dispose");
        }

        let had_buffers = self.buffers.take().is_some();
        let had_viewport = self.viewport.take().is_some();
        if had_buffers || had_viewport {
            info!("decal_buffers_disposed");
        }
        Ok(())
    }

    /// Replaces the map buffer with a zeroed one. The viewport is rebuilt on the
    /// next frame.
    pub fn clear_all_decals(&mut self) -> Result<(), DecalError> {
        self.render_job.ensure_idle("clear_all_decals")?;
        let buffers = self
            .buffers
            .as_mut()
            .ok_or(DecalError::NotInitialized {
                operation: "clear_all_decals",
            })?;
        buffers.map = MapPixelBuffer::allocate(buffers.map.width(), buffers.map.height())?;
        self.viewport = None;
        info!(
            map_width_px = buffers.map.width(),
            map_height_px = buffers.map.height(),
            "decals_cleared"
        );
        Ok(())
    }

    /// Rotates `decal` to face `direction` and composites it with its center on
    /// `world_position + world_offset`. Returns the map-pixel rectangle that was
    /// considered, which may extend past the map.
    pub fn stamp(
        &mut self,
        world_position: Vec2,
        direction: Vec2,
        world_offset: Vec2,
        decal: &DecalImage,
    ) -> Result<PixelRect, DecalError> {
        let buffers = self.mutable_buffers("stamp")?;
        let anchor = buffers.mapper.world_to_pixel(world_position + world_offset);
        let bounds = stamp_decal(&mut buffers.map, &buffers.floor, anchor, direction, decal)?;
        self.stats.record_stamp();
        Ok(bounds)
    }

    /// Clears decals inside `1.5 * radius` of `world_position` (scaled by the
    /// configured range), fully inside `quality` of that and fading outward.
    pub fn clear_radius(
        &mut self,
        world_position: Vec2,
        radius: f32,
        quality: f32,
    ) -> Result<(), DecalError> {
        let range_scale = self.config.radial_range_scale;
        let buffers = self.mutable_buffers("clear_radius")?;
        let profile = RadialProfile::new(
            buffers.mapper.world_to_pixel(world_position),
            radius,
            quality,
            buffers.mapper.pixels_per_unit(),
            range_scale,
        );
        clear_radius(&mut buffers.map, &buffers.floor, &profile);
        self.stats.record_radial_clear();
        Ok(())
    }

    /// Sweeps a band from `world_position` along `direction` up to the first obstacle
    /// reported by `obstacles`, restamping `restamp` in the core and fading the
    /// edges. Returns the number of pixels written.
    pub fn clear_line(
        &mut self,
        world_position: Vec2,
        direction: Vec2,
        restamp: &DecalImage,
        obstacles: &impl ObstacleRaycaster,
    ) -> Result<usize, DecalError> {
        let ranges = self.config.line_ranges_px();
        let darkening = self.config.line_fade_darkening;
        let buffers = self.mutable_buffers("clear_line")?;
        let Some(profile) = LineProfile::plan(
            &buffers.mapper,
            world_position,
            direction,
            obstacles,
            ranges,
            darkening,
        ) else {
            debug!(
                direction_x = direction.x,
                direction_y = direction.y,
                "line_clear_skipped"
            );
            return Ok(0);
        };

        let written = clear_line(&mut buffers.map, &buffers.floor, &profile, restamp);
        debug!(
            start_x = profile.start.x,
            start_y = profile.start.y,
            hit_x = profile.hit.x,
            hit_y = profile.hit.y,
            steps = profile.step_count,
            written,
            "line_cleared"
        );
        self.stats.record_line_clear();
        Ok(written)
    }

    /// Per-frame step: radial erase around every agent, window follow, then the
    /// window copy is scheduled for `complete_pending_render`.
    pub fn on_frame_update<I>(
        &mut self,
        camera: &impl CameraView,
        agents: I,
    ) -> Result<(), DecalError>
    where
        I: IntoIterator<Item = CleaningAgent>,
    {
        self.render_job.ensure_idle("on_frame_update")?;
        let range_scale = self.config.radial_range_scale;
        let buffers = self
            .buffers
            .as_mut()
            .ok_or(DecalError::NotInitialized {
                operation: "on_frame_update",
            })?;

        let erase_start = Instant::now();
        let mut agent_count = 0u64;
        for agent in agents {
            let profile = RadialProfile::new(
                buffers.mapper.world_to_pixel(agent.position),
                agent.radius,
                agent.cleaning_quality,
                buffers.mapper.pixels_per_unit(),
                range_scale,
            );
            clear_radius(&mut buffers.map, &buffers.floor, &profile);
            agent_count += 1;
        }
        let erase_elapsed = erase_start.elapsed();

        let position = camera.position();
        let size = camera.orthographic_size();
        let reusable = match self.viewport.as_mut() {
            Some(viewport) if viewport.camera_size == size => Some(viewport),
            _ => None,
        };
        let window = if let Some(viewport) = reusable {
            if viewport.camera_position != position {
                viewport.window = buffers.mapper.slide_window(&viewport.window, camera);
                viewport.camera_position = position;
            }
            viewport.window
        } else {
            let window = buffers.mapper.compute_window(camera);
            let buffer = ViewportBuffer::allocate(window.width(), window.height())?;
            info!(
                width = window.width(),
                height = window.height(),
                lower_x = window.lower().x,
                lower_y = window.lower().y,
                orthographic_size = size,
                "viewport_reallocated"
            );
            self.viewport = Some(ViewportState {
                window,
                buffer,
                camera_position: position,
                camera_size: size,
            });
            window
        };

        self.render_job
            .schedule("on_frame_update", RenderJob { window })?;
        self.stats.record_frame(erase_elapsed, agent_count);
        Ok(())
    }

    /// Runs the scheduled window copy and uploads the result. `Ok(false)` when no
    /// render was scheduled.
    pub fn complete_pending_render(
        &mut self,
        surface: &mut impl OutputSurface,
    ) -> Result<bool, DecalError> {
        let Some(job) = self.render_job.take() else {
            return Ok(false);
        };
        let (Some(buffers), Some(viewport)) = (&self.buffers, &mut self.viewport) else {
            return Err(DecalError::NotInitialized {
                operation: "complete_pending_render",
            });
        };

        let render_start = Instant::now();
        copy_visible_rows(&buffers.map, &job.window, &mut viewport.buffer);
        let render_elapsed = render_start.elapsed();

        surface.upload(ViewportFrame {
            window: job.window,
            width: viewport.buffer.width(),
            height: viewport.buffer.height(),
            pixels: viewport.buffer.pixels(),
        });
        self.stats.record_render(render_elapsed);
        Ok(true)
    }

    pub fn map_pixel(&self, pixel: PixelCoord) -> Option<Rgba8> {
        self.buffers.as_ref()?.map.get(pixel)
    }

    pub fn map_pixels(&self) -> Option<&[Rgba8]> {
        self.buffers.as_ref().map(|buffers| buffers.map.pixels())
    }

    pub fn floor_mask(&self) -> Option<&FloorMask> {
        self.buffers.as_ref().map(|buffers| &buffers.floor)
    }

    pub fn viewport_window(&self) -> Option<ViewportWindow> {
        self.viewport.as_ref().map(|viewport| viewport.window)
    }

    pub fn render_job_state(&self) -> JobState {
        self.render_job.state()
    }

    pub fn mapper(&self) -> Option<&CoordinateMapper> {
        self.buffers.as_ref().map(|buffers| &buffers.mapper)
    }

    pub fn stats(&self) -> StatsHandle {
        self.stats.handle()
    }

    fn mutable_buffers(&mut self, operation: &'static str) -> Result<&mut MapBuffers, DecalError> {
        self.render_job.ensure_idle(operation)?;
        self.buffers
            .as_mut()
            .ok_or(DecalError::NotInitialized { operation })
    }
}

impl Drop for DecalSystem {
    fn drop(&mut self) {
        let _ = self.dispose_buffers();
    }
}

#[cfg(test)]
mod tests;
