//! Format codec: color and floating-point conversions into PowerVR fields.
//!
//! D3D colors arrive as `0x00RRGGBB`. The TSP consumes them in several
//! layouts:
//! - 8-8-8 and 5-5-5 scaled pairs for shadowed points (blue lowest)
//! - a 5-5-5 light-volume color (red lowest)
//! - a 5-5-5 highlight in the upper half-word (red highest)

/// IEEE-754 single precision field layout.
pub const F32_EXPONENT_SHIFT: u32 = 23;
pub const F32_EXPONENT_MASK: u32 = 0xFF;
pub const F32_EXPONENT_BIAS: i32 = 127;

/// Biased exponent field of `value`.
#[inline]
pub fn biased_exponent(value: f32) -> i32 {
    ((value.to_bits() >> F32_EXPONENT_SHIFT) & F32_EXPONENT_MASK) as i32
}

/// Builds `2^exponent` directly from the bit pattern.
///
/// Exponents outside the normal range wrap the same way the hardware
/// reference arithmetic does; callers clamp the result afterwards.
#[inline]
pub fn pow2_from_exponent(exponent: i32) -> f32 {
    f32::from_bits(exponent.wrapping_add(F32_EXPONENT_BIAS).wrapping_shl(F32_EXPONENT_SHIFT) as u32)
}

/// Splits a color into an 8-8-8 word scaled by `scale24` and a 5-5-5 word
/// scaled by `scale16`.
///
/// Blue occupies the low bits of both words, then green, then red. Channel
/// values truncate toward zero.
pub fn color_to_fractions(color: u32, scale24: f32, scale16: f32) -> (u32, u32) {
    let red = ((color & 0x00FF_0000) >> 16) as f32;
    let green = ((color & 0x0000_FF00) >> 8) as f32;
    let blue = (color & 0x0000_00FF) as f32;

    let scale16 = scale16 * (31.0 / 255.0);

    let packed24 = ((blue * scale24) as i32) | (((green * scale24) as i32) << 8) | (((red * scale24) as i32) << 16);
    let packed16 = ((blue * scale16) as i32) | (((green * scale16) as i32) << 5) | (((red * scale16) as i32) << 10);

    (packed24 as u32, packed16 as u32)
}

/// Reduces a light-volume color to 5-5-5 with red in the low bits.
#[inline]
pub fn light_volume_to_555(color: u32) -> u32 {
    ((color & 0x00F8_0000) >> 19) | ((color & 0x0000_F800) >> 6) | ((color & 0x0000_00F8) << 7)
}

/// Remaps a D3D specular term into the TSP highlight field.
///
/// The top five bits of each channel land at bits 26-30 (red), 21-25 (green)
/// and 16-20 (blue). The low half-word stays clear.
#[inline]
pub fn highlight_to_555(specular: u32) -> u32 {
    ((specular << 7) & 0x7C00_0000) | ((specular << 10) & 0x03E0_0000) | ((specular << 13) & 0x001F_0000)
}

/// Packs a float into the PCX1 20-bit plane coefficient format.
///
/// Layout: bits 16-19 exponent, bit 15 sign, bits 0-14 mantissa with an
/// explicit leading one (a value in [0.5, 1) scaled by 2^15). Zero and
/// values too small for the exponent range pack to zero; values too large
/// saturate.
pub fn pack_to_20bit(value: f32) -> u32 {
    if value == 0.0 || value.is_nan() {
        return 0;
    }

    let bits = value.to_bits();
    let sign = (bits >> 31) & 1;
    // 1.m * 2^(e-127) == 0.1m * 2^(e-126); bias the 0.1m form by 13.
    let exponent = biased_exponent(value) - 113;

    if exponent < 0 {
        return 0;
    }
    if exponent > 15 {
        return 0x000F_0000 | (sign << 15) | 0x7FFF;
    }

    let mantissa = (1 << 14) | ((bits & 0x007F_FFFF) >> 9);
    ((exponent as u32) << 16) | (sign << 15) | mantissa
}
