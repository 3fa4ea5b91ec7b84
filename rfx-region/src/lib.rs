//! Scanline rectangle-region algebra.
//!
//! A [`Region`] is a set of non-overlapping rectangles organized into
//! horizontal bands, in the style of the classic X server region code.
//! Regions track screen damage: each frame's update rectangles are
//! accumulated with [`Region::union`] and clipped against tile grids with
//! [`Region::intersect`].
//!
//! The crate also provides the tile-rectangle coalescing pass
//! ([`merge_tile_rects`] / [`clip_tile_rects`]) used to minimize the
//! per-frame rectangle list handed to a display sink.

mod merge;
mod region;

pub use merge::{clip_tile_rects, merge_tile_rects};
pub use region::{Region, RegionBox};

#[cfg(test)]
mod proptest_region;
