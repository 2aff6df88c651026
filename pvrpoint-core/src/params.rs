//! Parameter buffers.
//!
//! The ISP and TSP queues are append-only word buffers with a write cursor
//! and a hard limit. Allocation policy (segment boundaries, region lists) is
//! owned by the parameter-buffer service behind [`ParamBuffers`];
//! [`SoftParamBuffers`] is an in-memory model of it.

use serde::Serialize;
use std::ops::Range;

use crate::region::RegionDescriptor;

/// One hardware queue: backing words, write cursor and limit, all in words.
#[derive(Debug, Clone)]
pub struct ParamBuffer {
    words: Vec<u32>,
    pos: usize,
    limit: usize,
}

impl ParamBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            words: vec![0; limit],
            pos: 0,
            limit,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Words between the cursor and the limit.
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.pos)
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.limit);
    }

    pub fn advance(&mut self, words: usize) {
        self.set_pos(self.pos + words);
    }

    pub fn words(&self) -> &[u32] {
        &self.words[..self.pos]
    }

    /// Mutable view of `range`, clipped to the limit.
    pub fn slice_mut(&mut self, range: Range<usize>) -> &mut [u32] {
        let end = range.end.min(self.limit);
        let start = range.start.min(end);
        &mut self.words[start..end]
    }
}

/// Parameter-buffer service used by the point pipeline.
pub trait ParamBuffers {
    fn isp(&self) -> &ParamBuffer;
    fn isp_mut(&mut self) -> &mut ParamBuffer;
    fn tsp(&self) -> &ParamBuffer;
    fn tsp_mut(&mut self) -> &mut ParamBuffer;

    /// Where an ISP object of `object_words` may start at or after `pos`.
    /// Returns the ISP limit when nothing more fits.
    fn start_of_object(&mut self, pos: usize, object_words: usize) -> usize;

    /// End of the contiguous ISP chunk that starts at `pos`.
    fn chunk_limit(&self, pos: usize) -> usize;

    /// Registers `regions.len()` consecutive ISP objects, each of
    /// `planes_per_object` planes and `object_words` words, starting at
    /// `start`.
    fn add_region_objects(
        &mut self,
        regions: &[RegionDescriptor],
        planes_per_object: usize,
        object_words: usize,
        start: usize,
    );
}

/// An ISP object registered with the region lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionObject {
    pub region: u32,
    pub planes: usize,
    pub address: usize,
}

/// In-memory parameter buffers.
///
/// With `segment_words` set the ISP buffer is split into fixed segments an
/// object may not straddle, like the hardware's sabre chunks.
#[derive(Debug, Clone)]
pub struct SoftParamBuffers {
    isp: ParamBuffer,
    tsp: ParamBuffer,
    segment_words: Option<usize>,
    region_objects: Vec<RegionObject>,
}

impl SoftParamBuffers {
    pub fn new(isp_words: usize, tsp_words: usize) -> Self {
        Self {
            isp: ParamBuffer::new(isp_words),
            tsp: ParamBuffer::new(tsp_words),
            segment_words: None,
            region_objects: Vec::new(),
        }
    }

    pub fn with_segment_words(mut self, segment_words: usize) -> Self {
        self.segment_words = (segment_words > 0).then_some(segment_words);
        self
    }

    pub fn region_objects(&self) -> &[RegionObject] {
        &self.region_objects
    }

    fn next_boundary(&self, pos: usize) -> usize {
        match self.segment_words {
            Some(seg) => ((pos / seg + 1) * seg).min(self.isp.limit),
            None => self.isp.limit,
        }
    }
}

impl ParamBuffers for SoftParamBuffers {
    fn isp(&self) -> &ParamBuffer {
        &self.isp
    }

    fn isp_mut(&mut self) -> &mut ParamBuffer {
        &mut self.isp
    }

    fn tsp(&self) -> &ParamBuffer {
        &self.tsp
    }

    fn tsp_mut(&mut self) -> &mut ParamBuffer {
        &mut self.tsp
    }

    fn start_of_object(&mut self, pos: usize, object_words: usize) -> usize {
        let limit = self.isp.limit;
        if pos >= limit {
            return limit;
        }

        let boundary = self.next_boundary(pos);
        if pos + object_words <= boundary {
            return pos;
        }

        // Skip to the next segment; the tail of this one is wasted.
        let next = boundary;
        if next >= limit || next + object_words > self.next_boundary(next) {
            limit
        } else {
            next
        }
    }

    fn chunk_limit(&self, pos: usize) -> usize {
        self.next_boundary(pos)
    }

    fn add_region_objects(
        &mut self,
        regions: &[RegionDescriptor],
        planes_per_object: usize,
        object_words: usize,
        start: usize,
    ) {
        self.region_objects.extend(regions.iter().enumerate().map(|(i, region)| RegionObject {
            region: region.0,
            planes: planes_per_object,
            address: start + i * object_words,
        }));
    }
}
