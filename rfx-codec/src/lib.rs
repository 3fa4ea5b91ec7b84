//! RemoteFX bitmap codec - decoder and encoder.
//!
//! RemoteFX (RFX) is a tile-based wavelet codec for remote display
//! updates. A payload is a sequence of length-prefixed blocks:
//!
//! ```text
//! +------------------+
//! | blockType        |  2 bytes (u16 little-endian)
//! +------------------+
//! | blockLen         |  4 bytes (u32 little-endian, includes header)
//! +------------------+
//! | [codecId=1]      |  only for blockType 0xCCC3..=0xCCC7
//! | [channelId=0]    |
//! +------------------+
//! | body             |  blockLen - 6 (or - 8) bytes
//! +------------------+
//! ```
//!
//! A stream opens with a header group (sync, context, codec versions,
//! channels); each frame is frame begin, a damage region, a tileset of
//! 64x64 tiles, and frame end. Per tile and component the data path is
//!
//! ```text
//! RLGR entropy code <-> LL3 delta code <-> scalar quantization
//!                   <-> 3-level 5/3 DWT <-> YCbCr <-> packed RGB
//! ```
//!
//! # Decoding
//!
//! ```no_run
//! use rfx_codec::RfxContext;
//! use rfx_common::Rect;
//!
//! let mut ctx = RfxContext::new();
//! let payload: &[u8] = &[];
//! let message = ctx.process_message(payload, Rect::new(0, 0, 640, 480));
//! for &handle in &message.tiles {
//!     let tile = ctx.tile(handle);
//!     // blit tile.data at (tile.x, tile.y), clipped by message.rects
//! }
//! ctx.release_message(message);
//! ```
//!
//! Malformed input degrades the frame (missing tiles, skipped blocks)
//! rather than failing: `process_message` always returns a best-effort
//! message and logs what it skipped.
//!
//! # Encoding
//!
//! ```no_run
//! use rfx_codec::{RfxComposeContext, RfxOutStream};
//! use rfx_common::Rect;
//!
//! let mut ctx = RfxComposeContext::new(640, 480);
//! let frame = vec![0u8; 640 * 480 * 4];
//! let mut out = RfxOutStream::new();
//! ctx.compose_message(&mut out, &[Rect::new(0, 0, 640, 480)], &frame, 640 * 4)
//!     .expect("frame buffer is large enough");
//! ```

pub mod blocks;
mod color;
mod compose;
mod context;
mod decode;
mod dwt;
mod encode;
mod error;
mod io;
mod message;
mod parse;
mod pool;
mod quantization;
mod rlgr;

#[cfg(test)]
mod proptest_rlgr;

pub use blocks::{EntropyAlgorithm, OperatingMode};
pub use color::PixelFormat;
pub use context::{RfxComposeContext, RfxContext, SoftwareTransforms, TileTransforms};
pub use error::{Result, RfxError};
pub use io::{RfxInStream, RfxOutStream};
pub use message::{RfxMessage, RfxTile};
pub use pool::{TileHandle, TilePool};
pub use quantization::{QuantTable, DEFAULT_QUANT_TABLE};
