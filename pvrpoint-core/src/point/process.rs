//! Per-point material processors.
//!
//! Each variant fills the subset of a material slot its mode needs. Texture
//! coefficients are computed separately, see
//! [`compute_texture_coefficients`](crate::texture::compute_texture_coefficients).

use serde::Serialize;

use crate::codec::highlight_to_555;
use crate::point::{IntermediateMaterial, Vertex, VolumeTerm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PointProcessor {
    High,
    HighTex,
    FlatShadOrLiVol,
    HighShadOrLiVol,
    FlatTexShadOrLiVol,
    HighTexShadOrLiVol,
}

impl PointProcessor {
    fn has_highlight(self) -> bool {
        matches!(
            self,
            PointProcessor::High
                | PointProcessor::HighTex
                | PointProcessor::HighShadOrLiVol
                | PointProcessor::HighTexShadOrLiVol
        )
    }

    fn has_volume(self) -> bool {
        !matches!(self, PointProcessor::High | PointProcessor::HighTex)
    }

    pub fn process(self, vertex: &Vertex, volume: VolumeTerm, material: &mut IntermediateMaterial) {
        if self.has_highlight() {
            material.highlight = highlight_to_555(vertex.specular);
        }
        if self.has_volume() {
            material.volume = volume;
        }
    }
}
