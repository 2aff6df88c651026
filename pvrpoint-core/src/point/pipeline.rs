//! Point pipeline driver
//!
//! Runs one draw call through setup, burst fill, ISP packing and TSP packing.
//!
//! # Flow
//! 1. **Admission**: the whole call is checked against the ISP space. No
//!    room at all is an error; partial room truncates the point count.
//! 2. **Setup**: depth direction and bias, point widths, texture metadata,
//!    dispatch entry and TSP control word.
//! 3. **Burst**: up to [`BURST_CAPACITY`] input points are snapped, binned,
//!    clipped, given a depth and run through the mode's processor.
//! 4. **Pack**: the burst is trimmed to the TSP space, packed into the ISP
//!    buffer, and the points the ISP accepted are packed into the TSP buffer.
//!
//! Bursts repeat until the input is drained or a buffer runs out.

use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::marker::PhantomData;

use crate::config::{DepthSource, PipelineConfig};
use crate::error::PointError;
use crate::hw::{DEBUG_PERP_TAG, MASK_DISABLE_FOG};
use crate::params::ParamBuffers;
use crate::point::dispatch::{self, DispatchEntry};
use crate::point::isp::{pack_isp_points, IspProfile, PlaneParams, PointWidths};
use crate::point::{
    IntermediateMaterial, IntermediatePoint, Mode, PointContext, Vertex, VolumeTerm, ZCompare, BURST_CAPACITY,
};
use crate::region::{ClipRect, ObjectType, PointExtent, RegionDescriptor};
use crate::texture::{compute_texture_coefficients, TextureDirectory, TextureSetup};

const SIGN_BIT: u32 = 0x8000_0000;
const DEPTH_BIAS_MASK: u32 = 0x1F;

/// Points of one draw call: a vertex array, optionally selected through a
/// 16-bit index list.
#[derive(Debug, Clone, Copy)]
pub struct DrawInput<'a> {
    pub vertices: &'a [Vertex],
    pub indices: Option<&'a [u16]>,
    pub count: usize,
}

impl<'a> DrawInput<'a> {
    /// Every vertex, in order.
    pub fn direct(vertices: &'a [Vertex]) -> Self {
        Self { vertices, indices: None, count: vertices.len() }
    }

    /// One point per index.
    pub fn indexed(vertices: &'a [Vertex], indices: &'a [u16]) -> Self {
        Self { vertices, indices: Some(indices), count: indices.len() }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    fn validate(&self) -> Result<(), PointError> {
        match self.indices {
            None if self.count > self.vertices.len() => Err(PointError::invalid_input(format!(
                "{} point(s) requested from {} vertices",
                self.count,
                self.vertices.len()
            ))),
            None => Ok(()),
            Some(indices) => {
                if self.count > indices.len() {
                    return Err(PointError::invalid_input(format!(
                        "{} point(s) requested from {} indices",
                        self.count,
                        indices.len()
                    )));
                }
                match indices[..self.count].iter().position(|&i| i as usize >= self.vertices.len()) {
                    Some(at) => Err(PointError::invalid_input(format!(
                        "index {} at position {} is outside {} vertices",
                        indices[at],
                        at,
                        self.vertices.len()
                    ))),
                    None => Ok(()),
                }
            }
        }
    }

    fn vertex(&self, n: usize) -> &'a Vertex {
        match self.indices {
            Some(indices) => &self.vertices[indices[n] as usize],
            None => &self.vertices[n],
        }
    }
}

/// Outcome of one draw call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawReport {
    /// Points the caller asked for.
    pub requested: usize,
    /// Points left after the up-front ISP admission.
    pub admitted: usize,
    /// Input points processed, including those clipped away. The caller may
    /// resubmit from here.
    pub consumed: usize,
    /// Points written to both buffers.
    pub emitted: usize,
    /// Set when a buffer ran out part-way through the call.
    pub exhausted: bool,
}

/// Per-call state derived in setup.
struct DrawSetup {
    entry: &'static DispatchEntry,
    control_word: u32,
    disable_z_buffer: bool,
    invert_z: f32,
    depth_scale: f32,
    widths: PointWidths,
    planes: PlaneParams,
    texture: Option<TextureSetup>,
    clip: Option<ClipRect>,
    volume: VolumeTerm,
}

/// Point pipeline context.
///
/// Holds the scratch burst buffers and the running depth counter, both
/// reused across calls. One context must not be driven concurrently.
pub struct PointPipeline<P: IspProfile> {
    config: PipelineConfig,
    region_shift: u32,
    points: SmallVec<[IntermediatePoint; BURST_CAPACITY]>,
    materials: SmallVec<[IntermediateMaterial; BURST_CAPACITY]>,
    bogus_inv_z: f32,
    fog_used: bool,
    _profile: PhantomData<P>,
}

impl<P: IspProfile> PointPipeline<P> {
    pub fn new(config: PipelineConfig) -> Result<Self, PointError> {
        config.validate()?;
        if config.profile != P::HARDWARE {
            warn!(
                "Pipeline built for {} but configuration names {:?}",
                P::NAME,
                config.profile
            );
        }
        Ok(Self {
            region_shift: config.region.x_shift()?,
            bogus_inv_z: config.initial_bogus_inv_z,
            config,
            points: SmallVec::new(),
            materials: SmallVec::new(),
            fog_used: false,
            _profile: PhantomData,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether any draw so far had fog enabled.
    pub fn fog_used(&self) -> bool {
        self.fog_used
    }

    /// Current value of the fixed depth counter.
    pub fn bogus_inv_z(&self) -> f32 {
        self.bogus_inv_z
    }

    /// Draws `input` as points into `buffers`.
    ///
    /// Returns [`PointError::IspExhausted`] without touching any buffer when
    /// not a single point fits the ISP buffer. Running out of space later is
    /// reported through [`DrawReport::exhausted`].
    pub fn draw_points<B, T>(
        &mut self,
        ctx: &PointContext,
        input: &DrawInput<'_>,
        buffers: &mut B,
        textures: &T,
    ) -> Result<DrawReport, PointError>
    where
        B: ParamBuffers + ?Sized,
        T: TextureDirectory + ?Sized,
    {
        input.validate()?;

        let mut report = DrawReport { requested: input.count, ..DrawReport::default() };
        if input.count == 0 {
            return Ok(report);
        }

        report.admitted = self.admit(input.count, buffers)?;

        let setup = self.setup(ctx, buffers, textures);
        let tsp_words = setup.entry.record_words;

        let mut cursor = 0;
        while cursor < report.admitted && !report.exhausted {
            self.fill_burst(&setup, input, &mut cursor, report.admitted);
            let burst = self.points.len();
            if burst == 0 {
                continue;
            }

            let tsp_addr = buffers.tsp().pos();
            let tsp_room = buffers.tsp().remaining() / tsp_words;
            let fitting = if tsp_room < burst {
                warn!("Out of TSP buffer space: {} of {} point(s) fit", tsp_room, burst);
                report.exhausted = true;
                tsp_room
            } else {
                burst
            };

            let packed = pack_isp_points::<P, B>(
                buffers,
                &self.points[..fitting],
                (tsp_addr >> 1) as u32,
                (tsp_words >> 1) as u32,
                &setup.planes,
            );
            if packed < fitting {
                report.exhausted = true;
            }

            let tsp_end = tsp_addr + packed * tsp_words;
            let tsp = buffers.tsp_mut();
            setup.entry.packer.pack(
                &self.points[..packed],
                &self.materials[..packed],
                setup.texture.map_or(0, |t| t.address),
                tsp.slice_mut(tsp_addr..tsp_end),
            );
            tsp.set_pos(tsp_end);

            report.emitted += packed;
            trace!("Burst of {} point(s): {} packed", burst, packed);

            if packed < burst {
                // Resume from the first point that did not make it.
                cursor = self.points[packed].source;
            }
        }

        report.consumed = cursor;
        if report.exhausted {
            warn!(
                "Point draw truncated: {} of {} point(s) consumed, {} emitted",
                report.consumed, report.requested, report.emitted
            );
        }
        Ok(report)
    }

    /// Up-front ISP admission: the number of points the call may process.
    fn admit<B: ParamBuffers + ?Sized>(&self, count: usize, buffers: &B) -> Result<usize, PointError> {
        let isp = buffers.isp();
        let available = isp.limit() as isize - isp.pos() as isize;
        let needed = count * P::WORDS_PER_POINT;

        if available >= needed as isize {
            return Ok(count);
        }

        let fits = if available > 0 { available as usize / P::WORDS_PER_POINT } else { 0 };
        if fits == 0 {
            error!("ISP space overflowing: {} word(s) left for {} point(s)", available, count);
            return Err(PointError::IspExhausted { requested: count, available_words: available });
        }

        debug!("ISP admits {} of {} point(s)", fits, count);
        Ok(fits)
    }

    fn setup<B, T>(&mut self, ctx: &PointContext, buffers: &mut B, textures: &T) -> DrawSetup
    where
        B: ParamBuffers + ?Sized,
        T: TextureDirectory + ?Sized,
    {
        let scale_bits = self.config.depth_scale.to_bits();
        let (invert_z, depth_scale) = match ctx.z_compare {
            ZCompare::GreaterEqual => (0.0, f32::from_bits(scale_bits | SIGN_BIT)),
            ZCompare::LessEqual => (1.0, f32::from_bits(scale_bits & !SIGN_BIT)),
        };

        let depth_bias = match ctx.depth_bias {
            Some(bias) => self.config.depth_step * (bias & DEPTH_BIAS_MASK) as f32,
            None => 0.0,
        };

        if let Some(bogus) = ctx.bogus_inv_z {
            self.bogus_inv_z = bogus * depth_scale;
        }

        let widths = P::point_widths(ctx.line_width);

        let mut control_word = if ctx.fog {
            self.fog_used = true;
            0
        } else {
            MASK_DISABLE_FOG
        };

        let mode = Mode::from_context(ctx);
        let entry = dispatch::lookup(mode);
        control_word |= entry.control_word;

        let texture = if mode.textured {
            let address = ctx.texture_name;
            let inv_tex_size = textures.inv_texture_dimension(address);
            Some(TextureSetup {
                address,
                inv_tex_size,
                width_inv_tex: ctx.line_width as f32 * inv_tex_size,
                mipmap_offset: ctx.mipmap_offset,
            })
        } else {
            // Untextured records start on an even 64-bit pair.
            let tsp = buffers.tsp_mut();
            tsp.set_pos((tsp.pos() + 2) & !3);
            None
        };

        let clip = ctx.clipping.then(|| ClipRect::from_bounds(&ctx.regions, &self.config.region));

        debug!(
            "Point setup ({}): {:?}, width {}, control word {:#07x}, {} TSP word(s) per point",
            P::NAME,
            mode,
            widths.width,
            control_word,
            entry.record_words
        );

        DrawSetup {
            entry,
            control_word,
            disable_z_buffer: ctx.disable_z_buffer,
            invert_z,
            depth_scale,
            widths,
            planes: PlaneParams {
                width: widths.width,
                depth_bias,
                perp_tag: if self.config.debug_plane_tags { DEBUG_PERP_TAG } else { 0 },
            },
            texture,
            clip,
            volume: VolumeTerm::from_lighting(&ctx.lighting),
        }
    }

    /// Refills the intermediate buffers from `input[*cursor..end]`.
    fn fill_burst(&mut self, setup: &DrawSetup, input: &DrawInput<'_>, cursor: &mut usize, end: usize) {
        self.points.clear();
        self.materials.clear();

        while *cursor < end && self.points.len() < BURST_CAPACITY {
            let source = *cursor;
            *cursor += 1;
            let vertex = input.vertex(source);

            let (px, x) = P::snap(vertex.x);
            let (py, y) = P::snap(vertex.y);
            let extent = PointExtent {
                x0: px >> self.region_shift,
                y0: py,
                x1: px.saturating_add(setup.widths.pixel_width) >> self.region_shift,
                y1: py.saturating_add(setup.widths.pixel_width),
            };

            let extent = match setup.clip {
                Some(rect) => match extent.clip(&rect) {
                    Some(extent) => extent,
                    None => continue,
                },
                None => extent,
            };

            let z = self.point_depth(setup, vertex);

            let mut material = IntermediateMaterial::default();
            if let Some(processor) = setup.entry.processor {
                processor.process(vertex, setup.volume, &mut material);
            }
            if let Some(texture) = &setup.texture {
                material.tex = compute_texture_coefficients(vertex, setup.widths.width2, texture);
            }

            self.points.push(IntermediatePoint {
                x,
                y,
                z,
                region: RegionDescriptor::encode(
                    ObjectType::Opaque,
                    extent.x0,
                    extent.y0,
                    extent.x1,
                    extent.y1,
                    self.config.region.y_size,
                ),
                tsp_control_word: setup.control_word,
                base_color: vertex.color,
                source,
            });
            self.materials.push(material);
        }
    }

    fn point_depth(&mut self, setup: &DrawSetup, vertex: &Vertex) -> f32 {
        if setup.disable_z_buffer {
            let z = self.bogus_inv_z;
            self.bogus_inv_z += self.config.depth_step;
            return z;
        }
        match self.config.depth_source {
            DepthSource::Z => {
                let z = (setup.invert_z - vertex.z) * setup.depth_scale;
                if z < 0.0 {
                    0.0
                } else {
                    z
                }
            }
            DepthSource::ReciprocalW => vertex.inv_w * setup.depth_scale,
        }
    }
}
