//! RemoteFX frame composer.
//!
//! The first frame of a stream is preceded by a one-time header group
//! (sync, context, codec versions, channels) guarded by the context's
//! `header_processed` flag. Every frame then emits frame begin, the
//! caller's damage rectangles as a region block, one tileset covering the
//! whole frame in row-major 64x64 tiles, and frame end.
//!
//! Entropy-coded tile lengths are data-dependent, so every
//! length-prefixed block is built body-first into a scratch stream and
//! appended after its computed header.

use crate::blocks::*;
use crate::context::RfxComposeContext;
use crate::encode::encode_rgb;
use crate::error::{Result, RfxError};
use crate::io::RfxOutStream;
use crate::quantization::DEFAULT_QUANT_TABLE;
use rfx_common::Rect;
use tracing::debug;

/// Tile edge length in pixels.
const TILE_SIZE: usize = 64;

/// Append a plain block: 6-byte header, then the body.
fn append_block(out: &mut RfxOutStream, block_type: u16, body: &RfxOutStream) {
    out.write_u16(block_type);
    out.write_u32((body.len() + 6) as u32);
    out.write_bytes(body.as_slice());
}

/// Append a codec block: 6-byte header plus codec id 1 and channel id 0.
fn append_codec_block(out: &mut RfxOutStream, block_type: u16, body: &RfxOutStream) {
    out.write_u16(block_type);
    out.write_u32((body.len() + 8) as u32);
    out.write_u8(1);
    out.write_u8(0);
    out.write_bytes(body.as_slice());
}

impl RfxComposeContext {
    fn compose_sync(&self, out: &mut RfxOutStream) {
        let mut body = RfxOutStream::with_capacity(6);
        body.write_u32(WF_MAGIC);
        body.write_u16(WF_VERSION_1_0);
        append_block(out, WBT_SYNC, &body);
    }

    fn compose_codec_versions(&self, out: &mut RfxOutStream) {
        let mut body = RfxOutStream::with_capacity(4);
        body.write_u8(1); // numCodecs
        body.write_u8(1); // codecId
        body.write_u16(WF_VERSION_1_0);
        append_block(out, WBT_CODEC_VERSIONS, &body);
    }

    fn compose_channels(&self, out: &mut RfxOutStream) {
        let mut body = RfxOutStream::with_capacity(6);
        body.write_u8(1); // numChannels
        body.write_u8(0); // channelId
        body.write_u16(self.width);
        body.write_u16(self.height);
        append_block(out, WBT_CHANNELS, &body);
    }

    fn compose_context(&mut self, out: &mut RfxOutStream) {
        let mut body = RfxOutStream::with_capacity(5);
        body.write_u8(0); // ctxId
        body.write_u16(CT_TILE_64X64);

        let et = self.mode.to_wire();
        let mut properties: u16 = self.flags.bits();
        properties |= COL_CONV_ICT << 3;
        properties |= CLW_XFORM_DWT_53_A << 5;
        properties |= et << 9;
        properties |= SCALAR_QUANTIZATION << 13;
        body.write_u16(properties);
        append_codec_block(out, WBT_CONTEXT, &body);

        // Tilesets carry the same information in a shifted layout.
        let mut tileset_properties: u16 = 1; // lt
        tileset_properties |= self.flags.bits() << 1;
        tileset_properties |= COL_CONV_ICT << 4;
        tileset_properties |= CLW_XFORM_DWT_53_A << 6;
        tileset_properties |= et << 10;
        tileset_properties |= SCALAR_QUANTIZATION << 14;
        self.properties = tileset_properties;
    }

    /// Emit the one-time header group. `compose_message` calls this
    /// automatically before the first frame; callers that must resend
    /// headers (a new peer joining a session) can invoke it directly.
    pub fn compose_message_header(&mut self, out: &mut RfxOutStream) {
        self.compose_sync(out);
        self.compose_context(out);
        self.compose_codec_versions(out);
        self.compose_channels(out);
        self.header_processed = true;
    }

    fn compose_frame_begin(&mut self, out: &mut RfxOutStream) {
        let mut body = RfxOutStream::with_capacity(6);
        body.write_u32(self.frame_idx);
        body.write_u16(1); // numRegions
        append_codec_block(out, WBT_FRAME_BEGIN, &body);
        self.frame_idx = self.frame_idx.wrapping_add(1);
    }

    fn compose_frame_end(&self, out: &mut RfxOutStream) {
        append_codec_block(out, WBT_FRAME_END, &RfxOutStream::new());
    }

    fn compose_region(&self, out: &mut RfxOutStream, rects: &[Rect]) {
        // The wire count is u16; rects past that cannot be announced.
        let count = rects.len().min(u16::MAX as usize);
        let mut body = RfxOutStream::with_capacity(7 + count * 8);
        body.write_u8(1); // regionFlags
        body.write_u16(count as u16);
        for rect in &rects[..count] {
            body.write_u16(rect.x);
            body.write_u16(rect.y);
            body.write_u16(rect.width);
            body.write_u16(rect.height);
        }
        body.write_u16(CBT_REGION);
        body.write_u16(1); // numTilesets
        append_codec_block(out, WBT_REGION, &body);
    }

    fn compose_tileset(
        &mut self,
        out: &mut RfxOutStream,
        pixels: &[u8],
        width: u16,
        height: u16,
        stride: usize,
    ) -> Result<()> {
        let quant = self.quant.unwrap_or(DEFAULT_QUANT_TABLE);
        let tiles_x = (width as usize).div_ceil(TILE_SIZE);
        let tiles_y = (height as usize).div_ceil(TILE_SIZE);
        let num_tiles = tiles_x * tiles_y;

        // Tiles first: the tileset header needs their total size.
        let mut tiles = RfxOutStream::new();
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                let x = tx * TILE_SIZE;
                let y = ty * TILE_SIZE;
                let tile_width = TILE_SIZE.min(width as usize - x);
                let tile_height = TILE_SIZE.min(height as usize - y);
                let (y_data, cb_data, cr_data) = encode_rgb(
                    self.transforms.as_ref(),
                    self.mode,
                    &quant,
                    self.pixel_format(),
                    pixels,
                    stride,
                    x,
                    y,
                    tile_width,
                    tile_height,
                );

                let mut body = RfxOutStream::with_capacity(
                    13 + y_data.len() + cb_data.len() + cr_data.len(),
                );
                body.write_u8(0); // quantIdxY
                body.write_u8(0); // quantIdxCb
                body.write_u8(0); // quantIdxCr
                body.write_u16(tx as u16);
                body.write_u16(ty as u16);
                body.write_u16(y_data.len() as u16);
                body.write_u16(cb_data.len() as u16);
                body.write_u16(cr_data.len() as u16);
                body.write_bytes(&y_data);
                body.write_bytes(&cb_data);
                body.write_bytes(&cr_data);
                append_block(&mut tiles, CBT_TILE, &body);
            }
        }

        let mut body = RfxOutStream::with_capacity(14 + 5 + tiles.len());
        body.write_u16(CBT_TILESET);
        body.write_u16(0); // idx
        body.write_u16(self.properties);
        body.write_u8(1); // numQuants
        body.write_u8(TILE_SIZE as u8);
        body.write_u16(num_tiles as u16);
        body.write_u32(tiles.len() as u32);
        // One quant table, packed two values per byte, low nibble first.
        for pair in quant.0.chunks_exact(2) {
            body.write_u8((pair[0] & 0x0F) | (pair[1] << 4));
        }
        body.write_bytes(tiles.as_slice());
        append_codec_block(out, WBT_EXTENSION, &body);
        debug!(num_tiles, tiles_bytes = tiles.len(), "tileset composed");
        Ok(())
    }

    /// Compose one frame.
    ///
    /// `rects` are the damage rectangles to announce in the region block;
    /// `pixels` is the full frame at the context's pixel format with row
    /// pitch `stride` bytes. The encoded frame is appended to `out`.
    pub fn compose_message(
        &mut self,
        out: &mut RfxOutStream,
        rects: &[Rect],
        pixels: &[u8],
        stride: usize,
    ) -> Result<()> {
        let needed = (self.height as usize)
            .saturating_sub(1)
            .saturating_mul(stride)
            + (self.width as usize) * self.pixel_format().bytes_per_pixel();
        if self.width > 0 && pixels.len() < needed {
            return Err(RfxError::SourceTooSmall {
                needed,
                available: pixels.len(),
            });
        }

        if self.frame_idx == 0 && !self.header_processed {
            self.compose_message_header(out);
        }
        self.compose_frame_begin(out);
        self.compose_region(out, rects);
        self.compose_tileset(out, pixels, self.width, self.height, stride)?;
        self.compose_frame_end(out);
        Ok(())
    }
}
