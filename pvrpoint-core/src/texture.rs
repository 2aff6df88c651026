//! Texture coefficients for point sprites.
//!
//! A textured point maps the whole texture across its square. The TSP takes
//! the mapping as five 16-bit linear coefficients sharing one exponent, plus
//! an optional mip-map mantissa/exponent pair.

use serde::{Deserialize, Serialize};

use crate::codec::{biased_exponent, pow2_from_exponent};
use crate::point::Vertex;

/// Largest exponent the TSP accepts.
pub const MAX_TEXTURE_EXPONENT: i32 = 15;

/// Resolves texture names to their reciprocal dimension.
pub trait TextureDirectory {
    /// `1 / width` of the texture at `tex_address`.
    fn inv_texture_dimension(&self, tex_address: u32) -> f32;
}

/// Every texture has the same square size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTextureSize(pub u32);

impl TextureDirectory for FixedTextureSize {
    fn inv_texture_dimension(&self, _tex_address: u32) -> f32 {
        1.0 / self.0.max(1) as f32
    }
}

/// Per-draw texture scalars, resolved once in setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSetup {
    pub address: u32,
    pub inv_tex_size: f32,
    /// `line_width * inv_tex_size`
    pub width_inv_tex: f32,
    /// `Some` selects the mip-mapped variant.
    pub mipmap_offset: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureCoefficients {
    pub a: i32,
    pub c: i32,
    pub e: i32,
    pub f: i32,
    pub r: i32,
    pub mip_mant: u32,
    pub mip_exp: i32,
    pub exp: i32,
}

impl TextureCoefficients {
    /// Forces `exp` into `[0, 15]`.
    ///
    /// Above the range `r` loses precision (and the mip exponent drops by
    /// twice the excess); below it `a`, `c`, `e` and `f` do.
    pub fn clamp_exponent(mut self) -> Self {
        if self.exp > MAX_TEXTURE_EXPONENT {
            let excess = self.exp - MAX_TEXTURE_EXPONENT;
            self.r = shift_right(self.r, excess);
            self.mip_exp = self.mip_exp.wrapping_sub(excess << 1);
            self.exp = MAX_TEXTURE_EXPONENT;
        } else if self.exp < 0 {
            let deficit = -self.exp;
            self.a = shift_right(self.a, deficit);
            self.c = shift_right(self.c, deficit);
            self.f = shift_right(self.f, deficit);
            self.e = self.a;
            self.exp = 0;
        }
        self
    }
}

#[inline]
fn shift_right(value: i32, by: i32) -> i32 {
    value >> by.clamp(0, 31)
}

/// Computes the texture coefficients of one point.
///
/// `width2` is the squared point width. The largest of `a`, `c` and `f` is
/// rescaled to 32767 and the exponent is the floor of log2 of `r` relative to
/// it, taken straight from the IEEE exponent field.
pub fn compute_texture_coefficients(vertex: &Vertex, width2: f32, setup: &TextureSetup) -> TextureCoefficients {
    let mut adj_a_e = setup.width_inv_tex * vertex.inv_w;
    let mut adj_c = width2 * vertex.u_over_w - vertex.x * adj_a_e;
    let mut adj_f = width2 * vertex.v_over_w - vertex.y * adj_a_e;
    let mut adj_r = width2 * setup.inv_tex_size;

    let compression = adj_a_e * adj_r;

    adj_c *= 1.0 / 1023.0;
    adj_f *= 1.0 / 1023.0;
    adj_r *= 1.0 / 1023.0;

    let mut largest = adj_a_e.abs();
    if adj_c.abs() > largest {
        largest = adj_c.abs();
    }
    if adj_f.abs() > largest {
        largest = adj_f.abs();
    }

    let mut scale = 1.0 / largest;
    let exp = 126 - biased_exponent(adj_r * scale);

    scale *= 32767.0;
    adj_a_e *= scale;
    adj_c *= scale;
    adj_f *= scale;

    scale *= pow2_from_exponent(exp);
    adj_r *= scale;

    let (mip_mant, mip_exp) = match setup.mipmap_offset {
        Some(offset) => {
            let mip = (compression * scale * scale).to_bits();
            let mant = ((mip >> 16) & 0x7F) + 128;
            let exp = ((mip >> 23) as i32).wrapping_sub(126).wrapping_add(offset);
            (mant, exp)
        }
        None => (0, 0),
    };

    TextureCoefficients {
        a: adj_a_e as i32,
        c: adj_c as i32,
        e: adj_a_e as i32,
        f: adj_f as i32,
        r: adj_r as i32,
        mip_mant,
        mip_exp,
        exp,
    }
    .clamp_exponent()
}
