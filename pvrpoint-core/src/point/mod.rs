//! Point primitives
//!
//! Input vertex and draw-context types, the shading-mode classification and
//! the intermediate per-point records shared by the pipeline stages.
//!
//! # Stages
//! - [`process`]: per-point material processors
//! - [`pack`]: per-buffer TSP packers
//! - [`dispatch`]: mode to (processor, packer, record size, control word)
//! - [`isp`]: ISP plane encoding for both hardware profiles
//! - [`pipeline`]: the draw driver

pub mod dispatch;
pub mod isp;
pub mod pack;
pub mod pipeline;
pub mod process;

use serde::{Deserialize, Serialize};

use crate::region::{RegionBounds, RegionDescriptor};
use crate::texture::TextureCoefficients;

/// Capacity of the intermediate point and material buffers.
pub const BURST_CAPACITY: usize = 48;

/// Screen-space D3D vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub inv_w: f32,
    pub u_over_w: f32,
    pub v_over_w: f32,
    /// `0x00RRGGBB`
    pub color: u32,
    /// `0x00RRGGBB` specular term
    pub specular: u32,
}

/// Shadow or light-volume treatment of a draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Lighting {
    #[default]
    None,
    /// Shadowed points blend between `brightness` and its complement.
    Shadow { brightness: f32 },
    /// Light-volume points carry one constant 24-bit color.
    LightVolume { color: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZCompare {
    #[default]
    LessEqual,
    GreaterEqual,
}

/// Shading and state for one draw call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointContext {
    pub texture: bool,
    pub highlight: bool,
    pub lighting: Lighting,
    pub fog: bool,
    /// Explicit fixed depth; reseeds the running depth counter.
    pub bogus_inv_z: Option<f32>,
    /// Depth bias in `depth_step` units (low 5 bits used).
    pub depth_bias: Option<u32>,
    pub z_compare: ZCompare,
    /// Use the running depth counter instead of vertex depth.
    pub disable_z_buffer: bool,
    pub line_width: u32,
    pub regions: RegionBounds,
    pub clipping: bool,
    pub texture_name: u32,
    /// `Some` enables mip-mapping with this exponent offset.
    pub mipmap_offset: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightingMode {
    None,
    Shadow,
    LightVolume,
}

/// Shading mode of a draw call. Fixed for the whole call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub textured: bool,
    pub highlight: bool,
    pub lighting: LightingMode,
}

impl Mode {
    pub fn from_context(ctx: &PointContext) -> Self {
        let lighting = match ctx.lighting {
            Lighting::None => LightingMode::None,
            Lighting::Shadow { .. } => LightingMode::Shadow,
            Lighting::LightVolume { .. } => LightingMode::LightVolume,
        };
        Self {
            textured: ctx.texture,
            highlight: ctx.highlight,
            lighting,
        }
    }

    /// Row within a dispatch table: flat, flat+tex, highlight, highlight+tex.
    pub fn row(&self) -> usize {
        (self.textured as usize) | ((self.highlight as usize) << 1)
    }
}

/// Shadow brightness or light-volume color carried by a material.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum VolumeTerm {
    #[default]
    None,
    Shadow(f32),
    LightVolume(u32),
}

impl VolumeTerm {
    pub fn from_lighting(lighting: &Lighting) -> Self {
        match *lighting {
            Lighting::None => VolumeTerm::None,
            Lighting::Shadow { brightness } => VolumeTerm::Shadow(brightness),
            Lighting::LightVolume { color } => VolumeTerm::LightVolume(color),
        }
    }
}

/// A point accepted into the current burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntermediatePoint {
    /// Snapped screen X as stored in the ISP planes.
    pub x: f32,
    pub y: f32,
    /// Depth after bias, inversion and clamping.
    pub z: f32,
    pub region: RegionDescriptor,
    pub tsp_control_word: u32,
    pub base_color: u32,
    /// Index of the input point this came from.
    pub source: usize,
}

/// Material attributes of a burst point, index-aligned with its point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntermediateMaterial {
    pub tex: TextureCoefficients,
    pub highlight: u32,
    pub volume: VolumeTerm,
}
