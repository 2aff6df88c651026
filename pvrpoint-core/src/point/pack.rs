//! Per-buffer TSP packers.
//!
//! Record layout (words, textured records only where noted):
//!
//! | word | content |
//! |------|---------|
//! | 0    | control word, red byte of the color, texture exponent << 8 |
//! | 1    | low 16 bits of the color << 16, shadow/light-volume 5-5-5 below |
//! | 2    | (tex) mip mantissa << 24, mip exponent << 16, `r` |
//! | 3    | (tex) 0 |
//! | 4    | (tex) low half of the texture address << 16, `c` |
//! | 5    | (tex) `a` |
//! | 6    | (tex) high half of the texture address, `f` |
//! | 7    | (tex) `e` << 16 |
//!
//! Highlight records append the highlight word and a zero word.

use serde::Serialize;

use crate::codec::{color_to_fractions, light_volume_to_555};
use crate::hw::{SHIFT_EXPONENT, SHIFT_PMIP_E, SHIFT_PMIP_M};
use crate::point::{IntermediateMaterial, IntermediatePoint, LightingMode, VolumeTerm};

pub const FLAT_WORDS: usize = 2;
pub const TEXTURE_WORDS: usize = 6;
pub const HIGHLIGHT_WORDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BufferPacker {
    Flat,
    FlatTex,
    High,
    HighTex,
    FlatShad,
    FlatTexShad,
    HighShad,
    HighTexShad,
    FlatLiVol,
    FlatTexLiVol,
    HighLiVol,
    HighTexLiVol,
}

impl BufferPacker {
    pub fn textured(self) -> bool {
        use BufferPacker::*;
        matches!(self, FlatTex | HighTex | FlatTexShad | HighTexShad | FlatTexLiVol | HighTexLiVol)
    }

    pub fn highlight(self) -> bool {
        use BufferPacker::*;
        matches!(self, High | HighTex | HighShad | HighTexShad | HighLiVol | HighTexLiVol)
    }

    pub fn lighting(self) -> LightingMode {
        use BufferPacker::*;
        match self {
            Flat | FlatTex | High | HighTex => LightingMode::None,
            FlatShad | FlatTexShad | HighShad | HighTexShad => LightingMode::Shadow,
            FlatLiVol | FlatTexLiVol | HighLiVol | HighTexLiVol => LightingMode::LightVolume,
        }
    }

    /// Words per TSP record.
    pub fn record_words(self) -> usize {
        let mut words = FLAT_WORDS;
        if self.textured() {
            words += TEXTURE_WORDS;
        }
        if self.highlight() {
            words += HIGHLIGHT_WORDS;
        }
        words
    }

    /// Serializes `points` into `out`, one record per point.
    ///
    /// Shadow brightness and light-volume color are constant across a draw
    /// and are read from the first material.
    pub fn pack(self, points: &[IntermediatePoint], materials: &[IntermediateMaterial], tex_address: u32, out: &mut [u32]) {
        let Some(first) = materials.first() else {
            return;
        };

        let blend = match (self.lighting(), first.volume) {
            (LightingMode::Shadow, VolumeTerm::Shadow(s)) => Blend::Shadow(s, 1.0 - s),
            (LightingMode::Shadow, _) => Blend::Shadow(0.0, 1.0),
            (LightingMode::LightVolume, VolumeTerm::LightVolume(color)) => Blend::LightVolume(light_volume_to_555(color)),
            (LightingMode::LightVolume, _) => Blend::LightVolume(0),
            (LightingMode::None, _) => Blend::None,
        };

        let addr_hi = tex_address & 0xFFFF_0000;
        let addr_lo = tex_address << 16;
        let stride = self.record_words();

        for ((point, mat), rec) in points.iter().zip(materials).zip(out.chunks_exact_mut(stride)) {
            let (color, low) = match blend {
                Blend::None => (point.base_color, 0),
                Blend::Shadow(s, ns) => color_to_fractions(point.base_color, s, ns),
                Blend::LightVolume(c16) => (point.base_color, c16),
            };

            rec[0] = point.tsp_control_word | ((color >> 16) & 0xFF);
            rec[1] = (color << 16) | low;

            let mut next = FLAT_WORDS;
            if self.textured() {
                let tex = &mat.tex;
                rec[0] |= (tex.exp as u32) << SHIFT_EXPONENT;
                rec[2] = (tex.mip_mant << SHIFT_PMIP_M) | ((tex.mip_exp as u32) << SHIFT_PMIP_E) | (tex.r as u32 & 0xFFFF);
                rec[3] = 0;
                rec[4] = addr_lo | (tex.c as u32 & 0xFFFF);
                rec[5] = tex.a as u32 & 0xFFFF;
                rec[6] = addr_hi | (tex.f as u32 & 0xFFFF);
                rec[7] = (tex.e as u32) << 16;
                next += TEXTURE_WORDS;
            }
            if self.highlight() {
                rec[next] = mat.highlight;
                rec[next + 1] = 0;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Blend {
    None,
    /// Shadow brightness and its complement.
    Shadow(f32, f32),
    /// Precomputed 5-5-5 light-volume color.
    LightVolume(u32),
}
