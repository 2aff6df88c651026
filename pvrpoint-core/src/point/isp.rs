//! ISP plane packing.
//!
//! Every point is five planes: a visible forward plane carrying depth and the
//! TSP address, then four perpendicular edges bounding the point's square.
//! The numeric encoding of a plane depends on the hardware profile, selected
//! at compile time through [`IspProfile`].

use log::warn;
use smallvec::SmallVec;

use crate::codec::pack_to_20bit;
use crate::config::HardwareProfile;
use crate::hw::{
    FLOAT_TO_FIXED, INV_MAGIC, PCX1_FORW_PERP, PCX1_FORW_VISIB_FP, PCX2_FORW_PERP, PCX2_FORW_VISIB_FP,
    PLANES_PER_POINT, POINT_EDGES, SFLOAT_20BIT_ZERO, UPPER_6_OF_TAG,
};
use crate::params::ParamBuffers;
use crate::point::{IntermediatePoint, BURST_CAPACITY};
use crate::region::RegionDescriptor;

/// Pixel width and the two width scalars derived from the line width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointWidths {
    /// Extra pixels covered beyond the first, used for the region extent.
    pub pixel_width: i32,
    /// Edge offset written into the planes.
    pub width: f32,
    /// Squared width, used by the texture coefficients.
    pub width2: f32,
}

/// Per-plane scalars shared by every point of a draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneParams {
    pub width: f32,
    pub depth_bias: f32,
    pub perp_tag: u32,
}

pub trait IspProfile {
    const NAME: &'static str;
    const HARDWARE: HardwareProfile;
    const WORDS_PER_PLANE: usize;
    const WORDS_PER_POINT: usize = Self::WORDS_PER_PLANE * PLANES_PER_POINT;

    /// Clamps the line width into [1, 64] with the profile's rounding bias.
    fn point_widths(line_width: u32) -> PointWidths;

    /// Truncates a screen coordinate to its pixel and returns the pixel with
    /// the coordinate as stored in the planes.
    fn snap(coord: f32) -> (i32, f32);

    /// Encodes one point into `out` (`WORDS_PER_POINT` words).
    fn write_point(out: &mut [u32], point: &IntermediatePoint, tsp_addr: u32, params: &PlaneParams);
}

/// PCX2: IEEE floats, 4 words per plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFloat;

impl IspProfile for NativeFloat {
    const NAME: &'static str = "native-float";
    const HARDWARE: HardwareProfile = HardwareProfile::NativeFloat;
    const WORDS_PER_PLANE: usize = 4;

    fn point_widths(line_width: u32) -> PointWidths {
        match line_width {
            0 => PointWidths { pixel_width: 0, width: 1.0, width2: 1.0 },
            lw if lw > 64 => PointWidths { pixel_width: 63, width: 64.0, width2: 64.0 * 64.0 },
            lw => PointWidths {
                pixel_width: lw as i32 - 1,
                width: lw as f32,
                width2: (lw * lw) as f32,
            },
        }
    }

    // Coordinates sit one pixel towards the origin so the point lands in
    // the region it was binned into.
    fn snap(coord: f32) -> (i32, f32) {
        let pixel = coord as i32;
        (pixel, pixel.saturating_sub(1) as f32)
    }

    fn write_point(out: &mut [u32], point: &IntermediatePoint, tsp_addr: u32, params: &PlaneParams) {
        let fx = -point.x;
        let fy = -point.y;
        let edges = [fx, params.width - fy, params.width - fx, fy];

        out[0] = 0;
        out[1] = 0;
        out[2] = (point.z + params.depth_bias).to_bits();
        out[3] = PCX2_FORW_VISIB_FP | (tsp_addr << 4);

        let perp = PCX2_FORW_PERP | (params.perp_tag << 4);
        for ((plane, (a, b)), c) in out[4..].chunks_exact_mut(4).zip(POINT_EDGES).zip(edges) {
            plane[0] = a.to_bits();
            plane[1] = b.to_bits();
            plane[2] = c.to_bits();
            plane[3] = perp;
        }
    }
}

/// PCX1: 20-bit packed edge coefficients and 1.31 fixed point, 3 words per
/// plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedFixed;

impl IspProfile for PackedFixed {
    const NAME: &'static str = "packed-fixed";
    const HARDWARE: HardwareProfile = HardwareProfile::PackedFixed;
    const WORDS_PER_PLANE: usize = 3;

    fn point_widths(line_width: u32) -> PointWidths {
        match line_width {
            0 => PointWidths { pixel_width: 0, width: 0.51, width2: 1.0 },
            lw if lw > 64 => PointWidths { pixel_width: 63, width: 63.51, width2: 64.0 * 64.0 },
            lw => PointWidths {
                pixel_width: lw as i32 - 1,
                width: lw as f32 - 0.49,
                width2: (lw * lw) as f32,
            },
        }
    }

    fn snap(coord: f32) -> (i32, f32) {
        let pixel = coord as i32;
        (pixel, pixel as f32)
    }

    fn write_point(out: &mut [u32], point: &IntermediatePoint, tsp_addr: u32, params: &PlaneParams) {
        let fx = -point.x;
        let fy = -point.y;
        let edges = [fx, params.width - fy, params.width - fx, fy];

        // Depth bias is not applied on this profile.
        out[0] = PCX1_FORW_VISIB_FP | ((UPPER_6_OF_TAG & tsp_addr) << (20 - 12)) | SFLOAT_20BIT_ZERO;
        out[1] = (tsp_addr << 20) | SFLOAT_20BIT_ZERO;
        out[2] = (point.z * FLOAT_TO_FIXED) as i32 as u32;

        let tag = params.perp_tag;
        for ((plane, (a, b)), c) in out[3..].chunks_exact_mut(3).zip(POINT_EDGES).zip(edges) {
            plane[0] = PCX1_FORW_PERP | ((UPPER_6_OF_TAG & tag) << (20 - 12)) | pack_to_20bit(a);
            plane[1] = (tag << 20) | pack_to_20bit(b);
            plane[2] = (FLOAT_TO_FIXED * c * INV_MAGIC) as i32 as u32;
        }
    }
}

/// Writes ISP records for `points`, chunked against the buffer's object and
/// chunk limits.
///
/// The TSP address starts at `tsp_addr` and steps by `tsp_increment` per
/// point. Returns how many points were packed; a chunk that cannot hold a
/// single point ends packing.
pub fn pack_isp_points<P, B>(
    buffers: &mut B,
    points: &[IntermediatePoint],
    mut tsp_addr: u32,
    tsp_increment: u32,
    params: &PlaneParams,
) -> usize
where
    P: IspProfile,
    B: ParamBuffers + ?Sized,
{
    let object_words = P::WORDS_PER_POINT;
    let mut packed = 0;

    while packed < points.len() {
        let pos = buffers.isp().pos();
        let current = buffers.start_of_object(pos, object_words);
        if current >= buffers.isp().limit() {
            break;
        }

        let remaining = points.len() - packed;
        let chunk_words = buffers.chunk_limit(current).saturating_sub(current);
        let in_chunk = if remaining * object_words < chunk_words {
            remaining
        } else {
            chunk_words / object_words
        };
        if in_chunk == 0 {
            break;
        }

        let batch = &points[packed..packed + in_chunk];
        let regions: SmallVec<[RegionDescriptor; BURST_CAPACITY]> = batch.iter().map(|p| p.region).collect();
        buffers.add_region_objects(&regions, PLANES_PER_POINT, object_words, current);

        let data_words = in_chunk * object_words;
        let isp = buffers.isp_mut();
        isp.set_pos(current + data_words);
        let out = isp.slice_mut(current..current + data_words);
        for (point, words) in batch.iter().zip(out.chunks_exact_mut(object_words)) {
            P::write_point(words, point, tsp_addr, params);
            tsp_addr = tsp_addr.wrapping_add(tsp_increment);
        }

        packed += in_chunk;
    }

    if packed < points.len() {
        warn!(
            "Out of ISP buffer space: packed {} of {} point(s) ({})",
            packed,
            points.len(),
            P::NAME
        );
    }

    packed
}
