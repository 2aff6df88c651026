//! Mode dispatch tables.
//!
//! Three tables (no volume, shadow, light volume) of four rows (flat,
//! flat+tex, highlight, highlight+tex). Points are always flat shaded, so the
//! gouraud bit is masked out of every control word.

use serde::Serialize;

use crate::hw::{MASK_FLAT_HIGHLIGHT, MASK_GOURAUD, MASK_SHADOW_FLAG, MASK_TEXTURE};
use crate::point::pack::BufferPacker;
use crate::point::process::PointProcessor;
use crate::point::{LightingMode, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchEntry {
    /// `None` when the mode needs no per-point material work.
    pub processor: Option<PointProcessor>,
    pub packer: BufferPacker,
    pub record_words: usize,
    pub control_word: u32,
}

const fn flags(base: u32, features: u32) -> u32 {
    (base | features) & !MASK_GOURAUD
}

const ROW_FEATURES: [u32; 4] = [0, MASK_TEXTURE, MASK_FLAT_HIGHLIGHT, MASK_FLAT_HIGHLIGHT | MASK_TEXTURE];

const fn entry(processor: Option<PointProcessor>, packer: BufferPacker, record_words: usize, base: u32, row: usize) -> DispatchEntry {
    DispatchEntry {
        processor,
        packer,
        record_words,
        control_word: flags(base, ROW_FEATURES[row]),
    }
}

pub static NO_VOLUME: [DispatchEntry; 4] = [
    entry(None, BufferPacker::Flat, 2, 0, 0),
    entry(None, BufferPacker::FlatTex, 8, 0, 1),
    entry(Some(PointProcessor::High), BufferPacker::High, 4, 0, 2),
    entry(Some(PointProcessor::HighTex), BufferPacker::HighTex, 10, 0, 3),
];

pub static SHADOW: [DispatchEntry; 4] = [
    entry(Some(PointProcessor::FlatShadOrLiVol), BufferPacker::FlatShad, 2, MASK_SHADOW_FLAG, 0),
    entry(Some(PointProcessor::FlatTexShadOrLiVol), BufferPacker::FlatTexShad, 8, MASK_SHADOW_FLAG, 1),
    entry(Some(PointProcessor::HighShadOrLiVol), BufferPacker::HighShad, 4, MASK_SHADOW_FLAG, 2),
    entry(Some(PointProcessor::HighTexShadOrLiVol), BufferPacker::HighTexShad, 10, MASK_SHADOW_FLAG, 3),
];

pub static LIGHT_VOLUME: [DispatchEntry; 4] = [
    entry(Some(PointProcessor::FlatShadOrLiVol), BufferPacker::FlatLiVol, 2, MASK_SHADOW_FLAG, 0),
    entry(Some(PointProcessor::FlatTexShadOrLiVol), BufferPacker::FlatTexLiVol, 8, MASK_SHADOW_FLAG, 1),
    entry(Some(PointProcessor::HighShadOrLiVol), BufferPacker::HighLiVol, 4, MASK_SHADOW_FLAG, 2),
    entry(Some(PointProcessor::HighTexShadOrLiVol), BufferPacker::HighTexLiVol, 10, MASK_SHADOW_FLAG, 3),
];

pub fn table(lighting: LightingMode) -> &'static [DispatchEntry; 4] {
    match lighting {
        LightingMode::None => &NO_VOLUME,
        LightingMode::Shadow => &SHADOW,
        LightingMode::LightVolume => &LIGHT_VOLUME,
    }
}

pub fn lookup(mode: Mode) -> &'static DispatchEntry {
    &table(mode.lighting)[mode.row()]
}
