//! Error types for the point pipeline.
//!
//! Only conditions detected before any buffer is touched are errors. Running
//! out of space part-way through a draw is reported through
//! [`DrawReport`](crate::point::pipeline::DrawReport) instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    /// The ISP buffer has no room at all for the draw.
    ///
    /// Non-fatal: the caller should skip or defer the draw call.
    #[error("ISP parameter buffer exhausted: {requested} point(s) requested, {available_words} word(s) available")]
    IspExhausted {
        requested: usize,
        available_words: isize,
    },

    /// The draw call references more points or vertices than it supplies.
    #[error("Invalid point input: {message}")]
    InvalidInput { message: String },

    /// Region width must be a power of two so X coordinates can be shifted
    /// into region units.
    #[error("Region width {x_size} is not a power of two")]
    InvalidRegionSize { x_size: u32 },
}

impl PointError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
