//! Tile decode pipeline.
//!
//! Per component (Y, Cb, Cr): RLGR entropy decode, LL3 differential
//! decode, dequantization, three-level inverse DWT. The three spatial
//! components are then converted to RGB and packed into the tile's 64x64
//! raster at the context's pixel format.

use crate::blocks::EntropyAlgorithm;
use crate::color::{pack_pixel, ycbcr_to_rgb_pixel, PixelFormat};
use crate::context::TileTransforms;
use crate::message::RfxTile;
use crate::quantization::{differential_decode, QuantTable};
use crate::rlgr::{rlgr_decode, COEFFICIENT_COUNT};

/// Tile edge length; every transform buffer is TILE_SIZE x TILE_SIZE.
pub const TILE_SIZE: usize = 64;

fn decode_component(
    transforms: &dyn TileTransforms,
    mode: EntropyAlgorithm,
    data: &[u8],
    quant: &QuantTable,
    buffer: &mut [i16; COEFFICIENT_COUNT],
    temp: &mut [i16; COEFFICIENT_COUNT],
) {
    buffer.fill(0);
    rlgr_decode(mode, data, buffer);
    differential_decode(buffer);
    transforms.dequantize(buffer, quant);
    transforms.dwt_decode(buffer, temp);
}

/// Decode one tile's three compressed components into its pixel raster.
#[allow(clippy::too_many_arguments)]
pub(crate) fn decode_rgb(
    transforms: &dyn TileTransforms,
    mode: EntropyAlgorithm,
    y_data: &[u8],
    cb_data: &[u8],
    cr_data: &[u8],
    y_quant: &QuantTable,
    cb_quant: &QuantTable,
    cr_quant: &QuantTable,
    format: PixelFormat,
    tile: &mut RfxTile,
) {
    let mut y = [0i16; COEFFICIENT_COUNT];
    let mut cb = [0i16; COEFFICIENT_COUNT];
    let mut cr = [0i16; COEFFICIENT_COUNT];
    let mut temp = [0i16; COEFFICIENT_COUNT];

    decode_component(transforms, mode, y_data, y_quant, &mut y, &mut temp);
    decode_component(transforms, mode, cb_data, cb_quant, &mut cb, &mut temp);
    decode_component(transforms, mode, cr_data, cr_quant, &mut cr, &mut temp);

    let bpp = format.bytes_per_pixel();
    debug_assert!(tile.data.len() >= TILE_SIZE * TILE_SIZE * bpp);
    for idx in 0..COEFFICIENT_COUNT {
        let (r, g, b) = ycbcr_to_rgb_pixel(y[idx], cb[idx], cr[idx]);
        pack_pixel(format, r, g, b, &mut tile.data[idx * bpp..]);
    }
}
