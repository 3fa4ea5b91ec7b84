//! Decoded message model.

use crate::pool::TileHandle;
use rfx_common::Rect;

/// One decoded tile.
///
/// `data` is a fixed 64x64 raster at the context's pixel format (row
/// stride `64 * bytes_per_pixel`), even when the tile sits at a frame
/// edge and covers less.
#[derive(Debug, Default)]
pub struct RfxTile {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

/// Result of parsing one RemoteFX payload: the damage rectangles from the
/// region block and the decoded tiles, both relative to `dest_rect`.
///
/// Tiles live in the context's pool; hand the message back through
/// [`RfxContext::release_message`](crate::RfxContext::release_message)
/// once the pixels have been consumed.
#[derive(Debug, Default)]
pub struct RfxMessage {
    pub rects: Vec<Rect>,
    pub tiles: Vec<TileHandle>,
    pub dest_rect: Rect,
}

impl RfxMessage {
    pub fn new(dest_rect: Rect) -> Self {
        Self {
            rects: Vec::new(),
            tiles: Vec::new(),
            dest_rect,
        }
    }
}
