use decal_engine::{
    CleaningAgent, DecalImage, DecalSystem, OrthographicCamera, OutputSurface, Rgba8, TileGrid,
    TileRaycaster, Tilemap, Vec2,
};
use tracing::{debug, info};

use super::{DemoConfig, DemoError};

const SPLAT_SIZE: u32 = 48;
const STREAK_WIDTH: u32 = 16;
const STREAK_HEIGHT: u32 = 12;
const AGENT_ANGULAR_SPEED: f32 = 0.045;
const CAMERA_PAN_SPEED: f32 = 0.02;
const LINE_TURN_SPEED: f32 = 0.13;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub frames: u32,
    pub stamps: u32,
    pub lines: u32,
    pub line_pixels: usize,
}

/// Deterministic script: agents orbit through the map wiping decals, splats land on
/// a fixed cadence, and every so often a streak is swept from the first agent.
pub(crate) struct Scenario {
    grid: Tilemap,
    splat: DecalImage,
    streak: DecalImage,
    camera: OrthographicCamera,
    frames: u32,
    agent_count: u32,
    agent_radius: f32,
    agent_quality: f32,
    stamp_every: u32,
    line_every: u32,
}

impl Scenario {
    pub(crate) fn from_config(config: &DemoConfig) -> Result<Self, DemoError> {
        let grid = config.build_grid()?;
        let splat = match &config.decal_png {
            Some(path) => load_decal_png(path)?,
            None => generated_splat(SPLAT_SIZE)?,
        };
        let camera = OrthographicCamera::new(
            Vec2::new(grid.width() as f32 * 0.5, grid.height() as f32 * 0.5),
            config.camera_size,
            config.camera_aspect,
        );
        Ok(Self {
            grid,
            splat,
            streak: generated_streak(STREAK_WIDTH, STREAK_HEIGHT)?,
            camera,
            frames: config.frames,
            agent_count: config.agent_count,
            agent_radius: config.agent_radius,
            agent_quality: config.agent_quality,
            stamp_every: config.stamp_every,
            line_every: config.line_every,
        })
    }

    pub(crate) fn grid(&self) -> &Tilemap {
        &self.grid
    }

    pub(crate) fn run(
        &mut self,
        system: &mut DecalSystem,
        surface: &mut impl OutputSurface,
    ) -> Result<RunSummary, DemoError> {
        system.initialize(&self.grid)?;
        let mut summary = RunSummary::default();
        let zoom_frame = self.frames / 2;

        for frame in 0..self.frames {
            let t = frame as f32;
            if every(self.stamp_every, frame) {
                let (position, direction) = self.splat_placement(frame);
                system.stamp(position, direction, Vec2::ZERO, &self.splat)?;
                summary.stamps += 1;
            }
            if every(self.line_every, frame) && self.agent_count > 0 {
                let start = self.agent_position(0, t);
                let angle = t * LINE_TURN_SPEED;
                let direction = Vec2::new(angle.cos(), angle.sin());
                let raycaster = TileRaycaster::new(&self.grid);
                summary.line_pixels +=
                    system.clear_line(start, direction, &self.streak, &raycaster)?;
                summary.lines += 1;
            }

            self.pan_camera(t);
            if frame == zoom_frame {
                self.camera.apply_zoom_steps(-2);
                debug!(
                    frame,
                    orthographic_size = self.camera.orthographic_size,
                    "camera_zoomed"
                );
            }

            let agents: Vec<CleaningAgent> = (0..self.agent_count)
                .map(|index| CleaningAgent {
                    position: self.agent_position(index, t),
                    radius: self.agent_radius,
                    cleaning_quality: self.agent_quality,
                })
                .collect();
            system.on_frame_update(&self.camera, agents)?;
            system.complete_pending_render(surface)?;
            summary.frames += 1;
        }

        let stats = system.stats().snapshot();
        info!(
            frames = summary.frames,
            stamps = summary.stamps,
            lines = summary.lines,
            line_pixels = summary.line_pixels,
            erase_avg_ms = stats.erase.avg_ms,
            render_avg_ms = stats.render.avg_ms,
            render_max_ms = stats.render.max_ms,
            "scenario_finished"
        );
        Ok(summary)
    }

    fn extent(&self) -> Vec2 {
        Vec2::new(self.grid.width() as f32, self.grid.height() as f32)
    }

    fn agent_position(&self, index: u32, t: f32) -> Vec2 {
        let extent = self.extent();
        let lane = (index + 1) as f32 / (self.agent_count + 1) as f32;
        let center = Vec2::new(extent.x * lane, extent.y * 0.5);
        let orbit = extent.x.min(extent.y) * 0.3;
        let angle = t * AGENT_ANGULAR_SPEED + index as f32;
        center + Vec2::new(angle.cos(), angle.sin()) * orbit
    }

    /// Positions walk a low-discrepancy sequence over the grid interior.
    fn splat_placement(&self, frame: u32) -> (Vec2, Vec2) {
        let extent = self.extent();
        let k = (frame / self.stamp_every.max(1)) as f32;
        let u = (k * 0.618_034).fract();
        let v = (k * 0.754_877_7).fract();
        let position = Vec2::new(
            0.5 + u * (extent.x - 1.0).max(0.0),
            0.5 + v * (extent.y - 1.0).max(0.0),
        );
        (position, Vec2::new(k.cos(), k.sin()))
    }

    fn pan_camera(&mut self, t: f32) {
        let extent = self.extent();
        self.camera.position = Vec2::new(
            extent.x * (0.5 + 0.3 * (t * CAMERA_PAN_SPEED).sin()),
            extent.y * (0.5 + 0.2 * (t * CAMERA_PAN_SPEED * 0.7).cos()),
        );
    }
}

fn every(interval: u32, frame: u32) -> bool {
    interval > 0 && frame % interval == 0
}

fn load_decal_png(path: &std::path::Path) -> Result<DecalImage, DemoError> {
    let image = image::open(path)
        .map_err(|source| DemoError::LoadImage {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    Ok(DecalImage::from_rgba_image(&image)?)
}

/// Dark red disk whose alpha falls off toward the rim.
fn generated_splat(size: u32) -> Result<DecalImage, DemoError> {
    let half = size as f32 * 0.5;
    let mut pixels = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - half;
            let dy = y as f32 + 0.5 - half;
            let falloff = 1.0 - (dx * dx + dy * dy).sqrt() / half;
            let alpha = (falloff.clamp(0.0, 1.0) * 1.6).min(1.0) * 255.0;
            pixels.push(Rgba8::new(120, 8, 12, alpha as u8));
        }
    }
    Ok(DecalImage::new(size, size, pixels)?)
}

/// Smear texture restamped along swept lines: darker in the middle rows.
fn generated_streak(width: u32, height: u32) -> Result<DecalImage, DemoError> {
    let mid = height as f32 * 0.5;
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        let edge = ((y as f32 + 0.5 - mid).abs() / mid).clamp(0.0, 1.0);
        for x in 0..width {
            let grain = if (x + y) % 3 == 0 { 20 } else { 0 };
            let alpha = 220.0 - edge * 120.0;
            pixels.push(Rgba8::new(90 + grain, 6, 10, alpha as u8));
        }
    }
    Ok(DecalImage::new(width, height, pixels)?)
}
