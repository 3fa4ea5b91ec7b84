//! Codec session state.
//!
//! A decoding session keeps one [`RfxContext`] per channel for as long as
//! the peer connection lives: the context carries everything the parser
//! learns from header blocks (dimensions, entropy mode, quantization
//! tables) plus the tile pool. The composing side keeps an
//! [`RfxComposeContext`], whose `header_processed` flag gates the one-time
//! header block group.
//!
//! Neither context is safe for concurrent mutation; give each connection
//! its own.

use crate::blocks::{EntropyAlgorithm, OperatingMode};
use crate::color::PixelFormat;
use crate::dwt;
use crate::message::RfxMessage;
use crate::pool::{TileHandle, TilePool};
use crate::quantization::{self, QuantTable};
use crate::rlgr::COEFFICIENT_COUNT;

/// The transform stages that an accelerated implementation may replace.
///
/// The default software path is selected at construction; alternative
/// implementations cover the same contracts (in-place sub-band layout for
/// the wavelet stages, per-band scaling for the quantization stages).
pub trait TileTransforms {
    fn dwt_decode(&self, buffer: &mut [i16; COEFFICIENT_COUNT], temp: &mut [i16; COEFFICIENT_COUNT]);
    fn dwt_encode(&self, buffer: &mut [i16; COEFFICIENT_COUNT], temp: &mut [i16; COEFFICIENT_COUNT]);
    fn dequantize(&self, buffer: &mut [i16; COEFFICIENT_COUNT], table: &QuantTable);
    fn quantize(&self, buffer: &mut [i16; COEFFICIENT_COUNT], table: &QuantTable);
}

/// Portable scalar implementation of every transform stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareTransforms;

impl TileTransforms for SoftwareTransforms {
    fn dwt_decode(&self, buffer: &mut [i16; COEFFICIENT_COUNT], temp: &mut [i16; COEFFICIENT_COUNT]) {
        dwt::dwt_decode(buffer, temp);
    }

    fn dwt_encode(&self, buffer: &mut [i16; COEFFICIENT_COUNT], temp: &mut [i16; COEFFICIENT_COUNT]) {
        dwt::dwt_encode(buffer, temp);
    }

    fn dequantize(&self, buffer: &mut [i16; COEFFICIENT_COUNT], table: &QuantTable) {
        quantization::dequantize(buffer, table);
    }

    fn quantize(&self, buffer: &mut [i16; COEFFICIENT_COUNT], table: &QuantTable) {
        quantization::quantize(buffer, table);
    }
}

/// Decoder session state.
pub struct RfxContext {
    /// Operating-mode flags from the context block.
    pub flags: OperatingMode,
    /// Channel dimensions from the channels block.
    pub width: u16,
    pub height: u16,
    /// Entropy algorithm from the context block. Starts at RLGR1 (the
    /// zero value of the wire enumeration) so tilesets arriving before
    /// any context block still decode.
    pub mode: EntropyAlgorithm,
    /// Wire version from the sync block.
    pub version: u16,
    /// Codec id/version from the codec-versions block.
    pub codec_id: u8,
    pub codec_version: u16,

    pixel_format: PixelFormat,
    pub(crate) quants: Vec<QuantTable>,
    pub(crate) pool: TilePool,
    pub(crate) transforms: Box<dyn TileTransforms + Send>,
}

impl RfxContext {
    pub fn new() -> Self {
        Self::with_transforms(Box::new(SoftwareTransforms))
    }

    /// Build a context around an alternative transform implementation.
    pub fn with_transforms(transforms: Box<dyn TileTransforms + Send>) -> Self {
        Self {
            flags: OperatingMode::empty(),
            width: 0,
            height: 0,
            mode: EntropyAlgorithm::Rlgr1,
            version: 0,
            codec_id: 0,
            codec_version: 0,
            pixel_format: PixelFormat::default(),
            quants: Vec::new(),
            pool: TilePool::new(),
            transforms,
        }
    }

    pub fn set_pixel_format(&mut self, format: PixelFormat) {
        self.pixel_format = format;
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Look up a decoded tile by the handle stored in a message.
    pub fn tile(&self, handle: TileHandle) -> &crate::message::RfxTile {
        self.pool.get(handle)
    }

    /// Return a message's tiles to the pool. Call after the tile pixels
    /// have been copied out; the handles are dead afterwards.
    pub fn release_message(&mut self, message: RfxMessage) {
        for handle in message.tiles {
            self.pool.release(handle);
        }
    }

    /// Forget all per-stream state (header knowledge and quantization
    /// tables). The tile pool is kept: its buffers are still good.
    pub fn reset(&mut self) {
        self.flags = OperatingMode::empty();
        self.width = 0;
        self.height = 0;
        self.mode = EntropyAlgorithm::Rlgr1;
        self.version = 0;
        self.codec_id = 0;
        self.codec_version = 0;
        self.quants.clear();
    }
}

impl Default for RfxContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Encoder session state.
pub struct RfxComposeContext {
    pub flags: OperatingMode,
    pub mode: EntropyAlgorithm,
    pub width: u16,
    pub height: u16,
    pixel_format: PixelFormat,
    /// Explicit quantization table; the composer falls back to
    /// [`quantization::DEFAULT_QUANT_TABLE`] when unset.
    pub quant: Option<QuantTable>,

    pub(crate) frame_idx: u32,
    pub(crate) header_processed: bool,
    /// Tileset-variant properties word, computed when the context block
    /// is emitted and repeated in every tileset.
    pub(crate) properties: u16,
    pub(crate) transforms: Box<dyn TileTransforms + Send>,
}

impl RfxComposeContext {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            flags: OperatingMode::VIDEO_MODE,
            mode: EntropyAlgorithm::Rlgr3,
            width,
            height,
            pixel_format: PixelFormat::default(),
            quant: None,
            frame_idx: 0,
            header_processed: false,
            properties: 0,
            transforms: Box::new(SoftwareTransforms),
        }
    }

    pub fn set_pixel_format(&mut self, format: PixelFormat) {
        self.pixel_format = format;
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn frame_idx(&self) -> u32 {
        self.frame_idx
    }

    /// Restart the stream: the next compose emits the header group again
    /// and frame numbering starts over.
    pub fn reset(&mut self) {
        self.frame_idx = 0;
        self.header_processed = false;
    }
}
