//! Tile-rectangle coalescing.
//!
//! Decoded tilesets arrive as one 64x64 rectangle per tile in row-major
//! order. Before handing them to a display sink the list is shrunk:
//! horizontally adjacent rects in the same row merge first, then
//! equal-width vertically adjacent rects merge into taller columns.
//! Finally each merged rect is clipped against the frame's update
//! rectangles so the sink never paints outside the damaged area.

use rfx_common::Rect;

/// Merge a row-major list of tile rectangles.
///
/// Horizontal pass: a rect whose left edge touches the right edge of the
/// previous rect in the same row widens the previous rect. Vertical pass:
/// a rect directly below an equal-width rect at the same x extends it
/// downward; consumed rects are marked with zero width and compacted out.
pub fn merge_tile_rects(tile_rects: &[Rect]) -> Vec<Rect> {
    let mut merged: Vec<Rect> = Vec::with_capacity(tile_rects.len());
    for r in tile_rects {
        if let Some(prev) = merged.last_mut() {
            // The summed edge must stay in the wire's u16 domain; a rect
            // that would push past it stays separate.
            let width = prev.width as u32 + r.width as u32;
            if r.y == prev.y && r.x as u32 == prev.right() && width <= u16::MAX as u32 {
                prev.width = width as u16;
                continue;
            }
        }
        merged.push(*r);
    }

    for j in 0..merged.len() {
        for i in (j + 1)..merged.len() {
            let height = merged[j].height as u32 + merged[i].height as u32;
            if merged[j].x == merged[i].x
                && merged[j].bottom() == merged[i].y as u32
                && merged[j].width == merged[i].width
                && merged[i].width != 0
                && height <= u16::MAX as u32
            {
                merged[j].height = height as u16;
                merged[i].width = 0;
            }
        }
    }
    merged.retain(|r| r.width != 0);
    merged
}

/// Clip each tile rectangle against the update rectangles.
///
/// A tile overlapping several update rects contributes one clip per
/// overlap. A tile matching no update rect at all passes through
/// unclipped; the peer said the tile was part of the frame, so it is
/// painted in full rather than dropped.
pub fn clip_tile_rects(tile_rects: &[Rect], update_rects: &[Rect]) -> Vec<Rect> {
    let mut clipped = Vec::with_capacity(tile_rects.len());
    for tile in tile_rects {
        let before = clipped.len();
        for update in update_rects {
            if let Some(clip) = tile.intersection(update) {
                clipped.push(clip);
            }
        }
        if clipped.len() == before {
            clipped.push(*tile);
        }
    }
    clipped
}
