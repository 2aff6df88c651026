//! Shared fixtures for the point pipeline tests.
#![allow(dead_code)]

use pvrpoint_core::config::PipelineConfig;
use pvrpoint_core::error::PointError;
use pvrpoint_core::params::SoftParamBuffers;
use pvrpoint_core::point::isp::IspProfile;
use pvrpoint_core::point::pipeline::{DrawInput, DrawReport, PointPipeline};
use pvrpoint_core::point::{PointContext, Vertex};
use pvrpoint_core::texture::FixedTextureSize;

pub const TEXTURE_SIZE: u32 = 256;

pub fn vertex(x: f32, y: f32, color: u32) -> Vertex {
    Vertex { x, y, z: 0.5, inv_w: 1.0, color, ..Vertex::default() }
}

/// A row of points one region apart, colors 0x010101, 0x020202, ...
pub fn row(n: usize) -> Vec<Vertex> {
    (0..n).map(|i| vertex(8.0 + 32.0 * (i % 16) as f32, 8.0, 0x0001_0101 * (i as u32 + 1))).collect()
}

/// Flat, fogged, untextured: the control word carries no flags.
pub fn flat_context() -> PointContext {
    PointContext { fog: true, ..PointContext::default() }
}

pub fn pipeline<P: IspProfile>() -> PointPipeline<P> {
    PointPipeline::new(PipelineConfig { profile: P::HARDWARE, ..PipelineConfig::default() })
        .expect("default configuration is valid")
}

pub fn draw<P: IspProfile>(
    pipeline: &mut PointPipeline<P>,
    ctx: &PointContext,
    input: &DrawInput<'_>,
    buffers: &mut SoftParamBuffers,
) -> Result<DrawReport, PointError> {
    pipeline.draw_points(ctx, input, buffers, &FixedTextureSize(TEXTURE_SIZE))
}

/// Depth word of point `n` in a native-float ISP buffer.
pub fn native_depth(buffers: &SoftParamBuffers, n: usize) -> f32 {
    use pvrpoint_core::params::ParamBuffers;
    f32::from_bits(buffers.isp().words()[n * 20 + 2])
}
