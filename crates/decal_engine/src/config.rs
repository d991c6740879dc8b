use serde::Deserialize;

use crate::DecalError;

pub const DEFAULT_PIXELS_PER_UNIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecalConfig {
    /// Pixels per world unit; one tile is one world unit.
    pub pixels_per_unit: u32,
    /// World-unit margin added on every side of the camera view.
    pub window_oversize: f32,
    /// Radial erase reaches `radial_range_scale * radius` world units.
    pub radial_range_scale: f32,
    /// Half-width of the directional erase band, in world units.
    pub line_clear_range: f32,
    /// Fraction of the band that is fully cleared or restamped.
    pub line_full_clear_fraction: f32,
    /// How strongly the fade band darkens surviving pixels.
    pub line_fade_darkening: f32,
}

impl Default for DecalConfig {
    fn default() -> Self {
        Self {
            pixels_per_unit: DEFAULT_PIXELS_PER_UNIT,
            window_oversize: 0.1,
            radial_range_scale: 1.5,
            line_clear_range: 0.3,
            line_full_clear_fraction: 0.4,
            line_fade_darkening: 0.5,
        }
    }
}

impl DecalConfig {
    pub fn validate(&self) -> Result<(), DecalError> {
        if self.pixels_per_unit == 0 {
            return Err(invalid("pixels_per_unit", "must be at least 1"));
        }
        non_negative("window_oversize", self.window_oversize)?;
        non_negative("radial_range_scale", self.radial_range_scale)?;
        non_negative("line_clear_range", self.line_clear_range)?;
        unit_interval("line_full_clear_fraction", self.line_full_clear_fraction)?;
        unit_interval("line_fade_darkening", self.line_fade_darkening)?;
        Ok(())
    }

    /// Directional erase band, `(range, full_clear_range)` in whole pixels.
    pub(crate) fn line_ranges_px(&self) -> (i32, i32) {
        let ppu = self.pixels_per_unit as f32;
        let range = (self.line_clear_range * ppu) as i32;
        let full_clear = (self.line_full_clear_fraction * self.line_clear_range * ppu) as i32;
        (range, full_clear)
    }
}

fn invalid(field: &'static str, reason: &'static str) -> DecalError {
    DecalError::InvalidConfig { field, reason }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), DecalError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, "must be a finite, non-negative number"));
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), DecalError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(field, "must be within [0, 1]"));
    }
    Ok(())
}
