//! RemoteFX block parser.
//!
//! A payload is a sequence of blocks, each prefixed with a 6-byte header
//! (`u16 blockType`, `u32 blockLen` including the header). Blocks in the
//! `WBT_CONTEXT..=WBT_EXTENSION` range carry two extra bytes of codec id
//! and channel id after the header.
//!
//! The parser is deliberately forgiving: RemoteFX is a best-effort
//! video-like codec, so malformed data degrades the frame instead of
//! failing the call. A bad block is logged and skipped; the declared
//! `blockLen` is trusted to resync the cursor after every block, and a
//! length pointing outside the buffer ends parsing (recoverably, the
//! cursor type refuses the seek). The one hard abort is a quantization
//! index past the parsed table count, which poisons every remaining tile
//! of its tileset.

use crate::blocks::*;
use crate::context::RfxContext;
use crate::decode::{decode_rgb, TILE_SIZE};
use crate::error::{Result, RfxError};
use crate::io::RfxInStream;
use crate::message::RfxMessage;
use crate::quantization::{QuantTable, QUANT_VALUES};
use rfx_common::Rect;
use tracing::{debug, warn};

impl RfxContext {
    /// Parse one RemoteFX payload into a best-effort message.
    ///
    /// `dest_rect` is the destination rectangle the transport delivered
    /// alongside the payload; it is carried through untouched.
    pub fn process_message(&mut self, data: &[u8], dest_rect: Rect) -> RfxMessage {
        let mut message = RfxMessage::new(dest_rect);
        let mut s = RfxInStream::new(data);

        while s.remaining() >= 6 {
            // Both reads are covered by the remaining() check.
            let Ok(block_type) = s.read_u16() else { break };
            let Ok(block_len) = s.read_u32() else { break };
            debug!(block_type = format_args!("{:#06X}", block_type), block_len, "block");

            if block_len == 0 {
                warn!("zero-length block, truncating message");
                break;
            }
            let next_pos = s.position() - 6 + block_len as usize;

            if (WBT_CONTEXT..=WBT_EXTENSION).contains(&block_type) {
                // codecId + channelId
                if s.skip(2).is_err() {
                    warn!("block too short for codec/channel ids");
                    break;
                }
            }

            let result = match block_type {
                WBT_SYNC => self.process_sync(&mut s),
                WBT_CODEC_VERSIONS => self.process_codec_versions(&mut s),
                WBT_CHANNELS => self.process_channels(&mut s),
                WBT_CONTEXT => self.process_context(&mut s),
                WBT_FRAME_BEGIN => self.process_frame_begin(&mut s),
                WBT_FRAME_END => Ok(()),
                WBT_REGION => self.process_region(&mut s, &mut message),
                WBT_EXTENSION => self.process_tileset(&mut s, &mut message),
                _ => {
                    warn!(block_type = format_args!("{:#06X}", block_type), "unknown block type");
                    Ok(())
                }
            };
            if let Err(err) = result {
                warn!(%err, block_type = format_args!("{:#06X}", block_type), "block skipped");
            }

            // Resync to the declared end regardless of what the handler
            // consumed.
            if s.set_position(next_pos).is_err() {
                warn!(next_pos, "declared block length out of range, truncating");
                break;
            }
        }
        message
    }

    fn process_sync(&mut self, s: &mut RfxInStream) -> Result<()> {
        let magic = s.read_u32()?;
        if magic != WF_MAGIC {
            warn!(magic = format_args!("{:#010X}", magic), "bad sync magic");
            return Ok(());
        }
        self.version = s.read_u16()?;
        if self.version != WF_VERSION_1_0 {
            warn!(version = self.version, "unexpected wire version");
        }
        Ok(())
    }

    fn process_codec_versions(&mut self, s: &mut RfxInStream) -> Result<()> {
        let num_codecs = s.read_u8()?;
        if num_codecs != 1 {
            warn!(num_codecs, "expected exactly one codec version");
            return Ok(());
        }
        self.codec_id = s.read_u8()?;
        self.codec_version = s.read_u16()?;
        debug!(
            codec_id = self.codec_id,
            codec_version = format_args!("{:#06X}", self.codec_version),
            "codec version"
        );
        Ok(())
    }

    fn process_channels(&mut self, s: &mut RfxInStream) -> Result<()> {
        let num_channels = s.read_u8()?;
        if num_channels == 0 {
            warn!("channels block with no channels");
            return Ok(());
        }
        // One channel carries the frame; extras are skipped by resync.
        let channel_id = s.read_u8()?;
        self.width = s.read_u16()?;
        self.height = s.read_u16()?;
        debug!(channel_id, width = self.width, height = self.height, "channel");
        Ok(())
    }

    fn process_context(&mut self, s: &mut RfxInStream) -> Result<()> {
        let _ctx_id = s.read_u8()?;
        let tile_size = s.read_u16()?;
        if tile_size != CT_TILE_64X64 {
            warn!(tile_size, "unsupported tile size");
        }
        let properties = s.read_u16()?;
        self.flags = OperatingMode::from_bits_truncate(properties & 0x0007);
        let entropy_code = (properties & 0x1E00) >> 9;
        match EntropyAlgorithm::from_wire(entropy_code) {
            Some(mode) => self.mode = mode,
            None => warn!(entropy_code, "unknown entropy algorithm, keeping previous"),
        }
        debug!(flags = ?self.flags, mode = ?self.mode, "context");
        Ok(())
    }

    fn process_frame_begin(&mut self, s: &mut RfxInStream) -> Result<()> {
        let frame_idx = s.read_u32()?;
        let num_regions = s.read_u16()?;
        debug!(frame_idx, num_regions, "frame begin");
        Ok(())
    }

    fn process_region(&mut self, s: &mut RfxInStream, message: &mut RfxMessage) -> Result<()> {
        let _region_flags = s.read_u8()?;
        let num_rects = s.read_u16()?;
        message.rects.reserve(num_rects as usize);
        for _ in 0..num_rects {
            let x = s.read_u16()?;
            let y = s.read_u16()?;
            let width = s.read_u16()?;
            let height = s.read_u16()?;
            message.rects.push(Rect::new(x, y, width, height));
        }
        debug!(num_rects, "region");
        Ok(())
    }

    fn process_tileset(&mut self, s: &mut RfxInStream, message: &mut RfxMessage) -> Result<()> {
        let subtype = s.read_u16()?;
        if subtype != CBT_TILESET {
            warn!(subtype = format_args!("{:#06X}", subtype), "unexpected extension subtype");
            return Ok(());
        }
        let _idx = s.read_u16()?;
        let _properties = s.read_u16()?;
        let num_quants = s.read_u8()? as usize;
        let _tile_size = s.read_u8()?;
        let num_tiles = s.read_u16()?;
        let _tiles_data_size = s.read_u32()?;

        if num_quants == 0 {
            warn!("tileset with no quantization tables");
            return Ok(());
        }
        if num_tiles == 0 {
            warn!("tileset with no tiles");
            return Ok(());
        }
        let mode = self.mode;

        // Each table is five bytes of packed nibbles, low nibble first.
        self.quants.clear();
        for _ in 0..num_quants {
            let mut values = [0u8; QUANT_VALUES];
            for pair in 0..QUANT_VALUES / 2 {
                let byte = s.read_u8()?;
                values[pair * 2] = byte & 0x0F;
                values[pair * 2 + 1] = byte >> 4;
            }
            self.quants.push(QuantTable(values));
        }
        debug!(num_quants, num_tiles, "tileset");

        let bpp = self.pixel_format().bytes_per_pixel();
        for _ in 0..num_tiles {
            let block_type = s.read_u16()?;
            let block_len = s.read_u32()?;
            if block_type != CBT_TILE {
                warn!(block_type = format_args!("{:#06X}", block_type), "expected tile block");
                break;
            }
            if block_len == 0 {
                warn!("zero-length tile block");
                break;
            }
            let tile_end = s.position() - 6 + block_len as usize;

            let quant_idx_y = s.read_u8()?;
            let quant_idx_cb = s.read_u8()?;
            let quant_idx_cr = s.read_u8()?;
            for idx in [quant_idx_y, quant_idx_cb, quant_idx_cr] {
                if idx as usize >= num_quants {
                    // Peer protocol violation: the whole tileset is
                    // unusable from here on.
                    return Err(RfxError::QuantIndexOutOfRange {
                        index: idx,
                        count: num_quants,
                    });
                }
            }
            let x_idx = s.read_u16()?;
            let y_idx = s.read_u16()?;
            let y_len = s.read_u16()? as usize;
            let cb_len = s.read_u16()? as usize;
            let cr_len = s.read_u16()? as usize;
            let y_data = s.read_bytes(y_len)?;
            let cb_data = s.read_bytes(cb_len)?;
            let cr_data = s.read_bytes(cr_len)?;

            let handle = self.pool.acquire(TILE_SIZE * TILE_SIZE * bpp);
            let quant_y = self.quants[quant_idx_y as usize];
            let quant_cb = self.quants[quant_idx_cb as usize];
            let quant_cr = self.quants[quant_idx_cr as usize];
            let format = self.pixel_format();
            let tile = self.pool.get_mut(handle);
            tile.x = x_idx.saturating_mul(TILE_SIZE as u16);
            tile.y = y_idx.saturating_mul(TILE_SIZE as u16);
            tile.width = TILE_SIZE as u16;
            tile.height = TILE_SIZE as u16;
            decode_rgb(
                self.transforms.as_ref(),
                mode,
                y_data,
                cb_data,
                cr_data,
                &quant_y,
                &quant_cb,
                &quant_cr,
                format,
                tile,
            );
            message.tiles.push(handle);

            // Per-tile resync, same policy as the outer loop.
            s.set_position(tile_end)?;
        }
        Ok(())
    }
}
