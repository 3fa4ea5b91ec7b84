//! RemoteFX wire-grammar constants.
//!
//! Block types live in two ranges: `WBT_*` top-level blocks and `CBT_*`
//! sub-blocks carried inside a `WBT_EXTENSION` tileset. Every block starts
//! with a 6-byte header (`u16 blockType`, `u32 blockLen` where the length
//! includes the header itself); blocks in the `WBT_CONTEXT..=WBT_EXTENSION`
//! range carry an extra codec id and channel id byte pair after the header.

use bitflags::bitflags;

/// Magic constant in the `WBT_SYNC` block.
pub const WF_MAGIC: u32 = 0xCACC_ACCA;
/// Wire format version in the `WBT_SYNC` block.
pub const WF_VERSION_1_0: u16 = 0x0100;

/// Synchronization block, first block of a stream.
pub const WBT_SYNC: u16 = 0xCCC0;
/// Codec version list.
pub const WBT_CODEC_VERSIONS: u16 = 0xCCC1;
/// Channel list (one channel carrying the frame dimensions).
pub const WBT_CHANNELS: u16 = 0xCCC2;
/// Codec context: tile size and the properties bitfield.
pub const WBT_CONTEXT: u16 = 0xCCC3;
/// Start of a frame; carries the frame index.
pub const WBT_FRAME_BEGIN: u16 = 0xCCC4;
/// End of a frame.
pub const WBT_FRAME_END: u16 = 0xCCC5;
/// Damage region rectangle list.
pub const WBT_REGION: u16 = 0xCCC6;
/// Extension block wrapping a tileset.
pub const WBT_EXTENSION: u16 = 0xCCC7;

/// Region sub-block marker inside `WBT_REGION`.
pub const CBT_REGION: u16 = 0xCAC1;
/// Tileset sub-block inside `WBT_EXTENSION`.
pub const CBT_TILESET: u16 = 0xCAC2;
/// A single tile inside a tileset.
pub const CBT_TILE: u16 = 0xCAC3;

/// The only defined tile size: 64x64.
pub const CT_TILE_64X64: u16 = 0x0040;

/// Color conversion transform: irreversible color transform (ICT).
pub const COL_CONV_ICT: u16 = 1;
/// Wavelet transform: the 5/3 discrete wavelet transform, variant A.
pub const CLW_XFORM_DWT_53_A: u16 = 1;
/// Entropy algorithm code for RLGR1.
pub const CLW_ENTROPY_RLGR1: u16 = 1;
/// Entropy algorithm code for RLGR3.
pub const CLW_ENTROPY_RLGR3: u16 = 4;
/// Quantization type: scalar.
pub const SCALAR_QUANTIZATION: u16 = 1;

bitflags! {
    /// Codec operating-mode flags, bits 0-2 of the context properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OperatingMode: u16 {
        /// Licensed session.
        const LT = 0x0001;
        /// Video mode: frames are independent, no frame-level acks.
        const VIDEO_MODE = 0x0002;
    }
}

/// Entropy coder selected by the context properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyAlgorithm {
    Rlgr1,
    Rlgr3,
}

impl EntropyAlgorithm {
    /// Map a wire code (bits 9-12 of the context properties) to an
    /// algorithm. Unknown codes return `None`; the parser logs and keeps
    /// its previous mode.
    pub fn from_wire(code: u16) -> Option<Self> {
        match code {
            CLW_ENTROPY_RLGR1 => Some(Self::Rlgr1),
            CLW_ENTROPY_RLGR3 => Some(Self::Rlgr3),
            _ => None,
        }
    }

    pub fn to_wire(self) -> u16 {
        match self {
            Self::Rlgr1 => CLW_ENTROPY_RLGR1,
            Self::Rlgr3 => CLW_ENTROPY_RLGR3,
        }
    }
}
