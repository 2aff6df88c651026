//! Region (tile) bookkeeping for points.
//!
//! X coordinates are tracked in region units (pixel >> region shift); Y
//! coordinates stay in scanlines until they are encoded.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RegionInfo;

/// Object classification stored in the top nibble of a region descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ObjectType {
    Opaque = 0,
    Translucent = 1,
    LightVolume = 2,
    ShadowVolume = 3,
}

/// Packed region-descriptor word handed to the region manager.
///
/// | bits  | field |
/// |-------|-------|
/// | 0-5   | first X region |
/// | 6-11  | last X region |
/// | 12-19 | first Y region |
/// | 20-27 | last Y region |
/// | 28-31 | object type |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionDescriptor(pub u32);

impl RegionDescriptor {
    pub fn encode(kind: ObjectType, x0: i32, y0: i32, x1: i32, y1: i32, y_size: u32) -> Self {
        let y_size = y_size.max(1) as i32;
        let mut bits = BitArray::<[u32; 1], Lsb0>::new([0]);
        bits[0..6].store_le::<u32>(x0 as u32 & 0x3F);
        bits[6..12].store_le::<u32>(x1 as u32 & 0x3F);
        bits[12..20].store_le::<u32>((y0 / y_size) as u32 & 0xFF);
        bits[20..28].store_le::<u32>((y1 / y_size) as u32 & 0xFF);
        bits[28..32].store_le::<u32>(kind as u32);
        Self(bits.into_inner()[0])
    }

    fn field(&self, lo: usize, hi: usize) -> u32 {
        let bits = BitArray::<[u32; 1], Lsb0>::new([self.0]);
        bits[lo..hi].load_le::<u32>()
    }

    pub fn first_x(&self) -> u32 {
        self.field(0, 6)
    }

    pub fn last_x(&self) -> u32 {
        self.field(6, 12)
    }

    pub fn first_y(&self) -> u32 {
        self.field(12, 20)
    }

    pub fn last_y(&self) -> u32 {
        self.field(20, 28)
    }

    pub fn object_type(&self) -> u32 {
        self.field(28, 32)
    }
}

/// Region bounds requested by the caller, in region units on both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub first_x: i32,
    pub first_y: i32,
    pub last_x: i32,
    pub last_y: i32,
}

/// Clip rectangle: X in regions, Y in scanlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub first_x: i32,
    pub first_y: i32,
    pub last_x: i32,
    pub last_y: i32,
}

impl ClipRect {
    /// Converts caller bounds into a clip rectangle, expanding Y regions to
    /// scanlines. A short last row clamps to the last line on screen.
    pub fn from_bounds(bounds: &RegionBounds, info: &RegionInfo) -> Self {
        let y_size = info.y_size as i32;
        let num_y = info.num_y_regions as i32;

        let last_y = if bounds.last_y + 1 <= num_y || !info.has_left_over {
            (bounds.last_y + 1) * y_size - 1
        } else {
            (num_y - 1) * y_size + info.left_over_y as i32
        };

        Self {
            first_x: bounds.first_x,
            first_y: bounds.first_y * y_size,
            last_x: bounds.last_x,
            last_y,
        }
    }
}

/// Screen extent of one point: X in regions, Y in scanlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointExtent {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PointExtent {
    /// Clips against `rect`, one axis bound at a time.
    ///
    /// Returns `None` when the extent lies wholly outside any bound; an
    /// extent straddling a bound has only its near edge clamped.
    pub fn clip(mut self, rect: &ClipRect) -> Option<Self> {
        if self.x0 < rect.first_x {
            if self.x1 < rect.first_x {
                return None;
            }
            self.x0 = rect.first_x;
        }

        if self.y0 < rect.first_y {
            if self.y1 < rect.first_y {
                return None;
            }
            self.y0 = rect.first_y;
        }

        if self.x1 > rect.last_x {
            if self.x0 > rect.last_x {
                return None;
            }
            self.x1 = rect.last_x;
        }

        if self.y1 > rect.last_y {
            if self.y0 > rect.last_y {
                return None;
            }
            self.y1 = rect.last_y;
        }

        Some(self)
    }
}
