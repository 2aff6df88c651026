// Pipeline configuration
//
// Holds the device-wide values the point pipeline reads on every call:
// depth scaling, region geometry and the target ISP profile.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PointError;

/// Target ISP encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardwareProfile {
    /// PCX2: IEEE floats in 4-word planes.
    #[default]
    NativeFloat,
    /// PCX1: 20-bit packed floats and 1.31 fixed point in 3-word planes.
    PackedFixed,
}

/// Where per-point depth comes from when z-buffering is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthSource {
    /// D3D z in [0, 1): depth = (invert - z) * scale.
    #[default]
    Z,
    /// Reciprocal w: depth = invW * scale.
    ReciprocalW,
}

/// Screen tiling geometry owned by the region manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionInfo {
    /// Region width in pixels. Must be a power of two.
    pub x_size: u32,
    /// Region height in scanlines.
    pub y_size: u32,
    pub num_x_regions: u32,
    pub num_y_regions: u32,
    /// Whether the last row of regions is shorter than `y_size`.
    pub has_left_over: bool,
    /// Scanlines in the short last row, when `has_left_over` is set.
    pub left_over_y: u32,
}

impl Default for RegionInfo {
    fn default() -> Self {
        Self {
            x_size: 32,
            y_size: 32,
            num_x_regions: 20,
            num_y_regions: 15,
            has_left_over: false,
            left_over_y: 0,
        }
    }
}

impl RegionInfo {
    /// Shift converting a pixel X coordinate into a region index.
    pub fn x_shift(&self) -> Result<u32, PointError> {
        if self.x_size.is_power_of_two() {
            Ok(self.x_size.trailing_zeros())
        } else {
            Err(PointError::InvalidRegionSize { x_size: self.x_size })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub profile: HardwareProfile,
    /// Magnitude of the depth scale (minimum inverse z of the scene).
    pub depth_scale: f32,
    /// Increment of the fixed depth counter, also the unit of depth bias.
    pub depth_step: f32,
    /// Starting value of the fixed depth counter used without a z-buffer.
    pub initial_bogus_inv_z: f32,
    pub depth_source: DepthSource,
    pub region: RegionInfo,
    /// Write `DEBUG_PERP_TAG` into edge planes so they stand out in dumps.
    pub debug_plane_tags: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            profile: HardwareProfile::NativeFloat,
            depth_scale: 1.0,
            depth_step: 1.0e-5,
            initial_bogus_inv_z: 0.0,
            depth_source: DepthSource::Z,
            region: RegionInfo::default(),
            debug_plane_tags: false,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config {}", path.display()))?;
        let config: PipelineConfig =
            serde_json::from_str(&content).context("Failed to parse pipeline config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize pipeline config")?;
        std::fs::write(path.as_ref(), content).context("Failed to write pipeline config")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), PointError> {
        self.region.x_shift()?;
        Ok(())
    }
}
