//! PowerVR point-primitive pipeline
//!
//! Converts screen-space D3D-style vertices into parameter-buffer records for
//! the two PowerVR hardware queues:
//! - **ISP** (Image Space Processor): one 5-plane depth/geometry record per point
//! - **TSP** (Tile/Span Processor): one shading/texture record per point
//!
//! The entry point is [`point::pipeline::PointPipeline::draw_points`]. The
//! pipeline is generic over an [`point::isp::IspProfile`], selecting between the
//! PCX2 native-float and PCX1 packed 20-bit ISP encodings at compile time.
//!
//! ```rust,no_run
//! use pvrpoint_core::config::PipelineConfig;
//! use pvrpoint_core::params::SoftParamBuffers;
//! use pvrpoint_core::point::isp::NativeFloat;
//! use pvrpoint_core::point::pipeline::{DrawInput, PointPipeline};
//! use pvrpoint_core::point::{PointContext, Vertex};
//! use pvrpoint_core::texture::FixedTextureSize;
//!
//! let mut pipeline = PointPipeline::<NativeFloat>::new(PipelineConfig::default())?;
//! let mut buffers = SoftParamBuffers::new(4096, 4096);
//! let vertices = [Vertex { x: 10.0, y: 12.0, z: 0.5, ..Vertex::default() }];
//! let report = pipeline.draw_points(
//!     &PointContext::default(),
//!     &DrawInput::direct(&vertices),
//!     &mut buffers,
//!     &FixedTextureSize(256),
//! )?;
//! assert_eq!(report.emitted, 1);
//! # Ok::<(), pvrpoint_core::error::PointError>(())
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod hw;
pub mod params;
pub mod point;
pub mod region;
pub mod texture;

pub use error::PointError;
