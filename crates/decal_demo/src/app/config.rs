use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use decal_engine::mapping::CAMERA_ASPECT_DEFAULT;
use decal_engine::{DecalConfig, Tilemap};
use serde::Deserialize;

use super::DemoError;

pub(crate) const CONFIG_ENV_VAR: &str = "DECALS_DEMO_CONFIG";

/// Scripted scene for the headless demo. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DemoConfig {
    pub engine: DecalConfig,
    /// Text rows, `#` wall and `.` floor, top row first. Overrides the generated grid.
    pub grid_rows: Option<Vec<String>>,
    pub grid_width: u32,
    pub grid_height: u32,
    pub frames: u32,
    pub agent_count: u32,
    pub agent_radius: f32,
    pub agent_quality: f32,
    pub stamp_every: u32,
    pub line_every: u32,
    pub camera_size: f32,
    pub camera_aspect: f32,
    /// PNG decal to stamp instead of the generated splat.
    pub decal_png: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            engine: DecalConfig::default(),
            grid_rows: None,
            grid_width: 24,
            grid_height: 16,
            frames: 240,
            agent_count: 3,
            agent_radius: 0.4,
            agent_quality: 0.6,
            stamp_every: 6,
            line_every: 30,
            camera_size: 4.0,
            camera_aspect: CAMERA_ASPECT_DEFAULT,
            decal_png: None,
            snapshot_path: Some(PathBuf::from("decal_snapshot.png")),
        }
    }
}

impl DemoConfig {
    pub(crate) fn validate(&self) -> Result<(), DemoError> {
        if self.grid_rows.is_none() && (self.grid_width == 0 || self.grid_height == 0) {
            return Err(invalid("grid_width", "grid must be at least 1x1".to_string()));
        }
        if self.frames == 0 {
            return Err(invalid("frames", "must be at least 1".to_string()));
        }
        for (field, value) in [
            ("agent_radius", self.agent_radius),
            ("camera_size", self.camera_size),
            ("camera_aspect", self.camera_aspect),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("expected a positive number, got {value}")));
            }
        }
        Ok(())
    }

    /// The configured rows, or an open floor with a regular pattern of pillars.
    pub(crate) fn build_grid(&self) -> Result<Tilemap, DemoError> {
        if let Some(rows) = &self.grid_rows {
            let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
            return Ok(Tilemap::from_rows(&rows)?);
        }
        let mut grid = Tilemap::all_floor(self.grid_width, self.grid_height);
        for y in 0..self.grid_height {
            for x in 0..self.grid_width {
                if x % 6 == 3 && y % 5 == 2 {
                    grid.set_wall(x, y, true);
                }
            }
        }
        Ok(grid)
    }
}

fn invalid(field: &'static str, reason: String) -> DemoError {
    DemoError::InvalidConfig { field, reason }
}

/// Reads the config named by `DECALS_DEMO_CONFIG`, or the defaults when it is unset.
pub(crate) fn load_demo_config() -> Result<DemoConfig, DemoError> {
    let config = match env::var(CONFIG_ENV_VAR) {
        Ok(path) => read_demo_config(Path::new(&path))?,
        Err(env::VarError::NotPresent) => DemoConfig::default(),
        Err(source) => {
            return Err(DemoError::EnvVar {
                var: CONFIG_ENV_VAR,
                source,
            })
        }
    };
    config.validate()?;
    Ok(config)
}

pub(crate) fn read_demo_config(path: &Path) -> Result<DemoConfig, DemoError> {
    let raw = fs::read_to_string(path).map_err(|source| DemoError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    parse_demo_config(&raw, path)
}

fn parse_demo_config(raw: &str, path: &Path) -> Result<DemoConfig, DemoError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, DemoConfig>(&mut deserializer).map_err(|error| {
        let field_path = error.path().to_string();
        DemoError::ParseConfig {
            path: path.to_path_buf(),
            field_path,
            source: error.into_inner(),
        }
    })
}
