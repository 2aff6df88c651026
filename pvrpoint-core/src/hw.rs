//! PowerVR parameter-buffer bit layouts.
//!
//! These values describe the wire format consumed by the ISP and TSP; they are
//! emitted verbatim and must not be rearranged.
//!
//! # TSP word 0
//! - Bits 0-7: red channel (high byte of the packed base color)
//! - Bits 8-11: texture exponent
//! - Bits 12-16: control flags (`MASK_*`)
//!
//! # TSP texture word 2
//! - Bits 0-15: `r` coefficient
//! - Bits 16-23: mip-map exponent
//! - Bits 24-31: mip-map mantissa

// -- TSP control word ------------------------------------------------------

pub const MASK_TEXTURE: u32 = 0x0000_1000;
pub const MASK_FLAT_HIGHLIGHT: u32 = 0x0000_2000;
/// Gouraud shading. Points are always flat, so this bit is never emitted.
pub const MASK_GOURAUD: u32 = 0x0000_4000;
pub const MASK_SHADOW_FLAG: u32 = 0x0000_8000;
pub const MASK_DISABLE_FOG: u32 = 0x0001_0000;

pub const SHIFT_EXPONENT: u32 = 8;
pub const SHIFT_PMIP_M: u32 = 24;
pub const SHIFT_PMIP_E: u32 = 16;

// -- ISP plane records -----------------------------------------------------

/// Planes per point: one visible depth plane followed by four edge planes.
pub const PLANES_PER_POINT: usize = 5;

/// Visible forward plane carrying depth (PCX2 encoding, low nibble).
pub const PCX2_FORW_VISIB_FP: u32 = 0x0000_0006;
/// Perpendicular forward edge (PCX2 encoding, low nibble).
pub const PCX2_FORW_PERP: u32 = 0x0000_0002;

/// Visible forward plane (PCX1 encoding, bits 26-31).
pub const PCX1_FORW_VISIB_FP: u32 = 0x6 << 26;
/// Perpendicular forward edge (PCX1 encoding, bits 26-31).
pub const PCX1_FORW_PERP: u32 = 0x2 << 26;

/// Upper six bits of an 18-bit PCX1 tag; stored above the 20-bit A field.
pub const UPPER_6_OF_TAG: u32 = 0x0003_F000;
pub const SFLOAT_20BIT_ZERO: u32 = 0;

/// 2^31: scales a unit float to a signed 1.31 fixed-point word.
pub const FLOAT_TO_FIXED: f32 = 2_147_483_648.0;
/// 1/2048: brings screen coordinates into the PCX1 fixed-point edge range.
pub const INV_MAGIC: f32 = 0.000_488_281_25;

/// Tag written into edge planes when debug tags are enabled.
pub const DEBUG_PERP_TAG: u32 = 0x00DD_DDDD;

/// Edge normals (A, B) for the four point edges, in emission order.
pub const POINT_EDGES: [(f32, f32); 4] = [(1.0, 0.0), (0.0, -1.0), (-1.0, 0.0), (0.0, 1.0)];
