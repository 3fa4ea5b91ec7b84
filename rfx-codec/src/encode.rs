//! Tile encode pipeline, the exact inverse of decode.
//!
//! Pixels are unpacked from the source raster and converted to YCbCr;
//! tiles at the right/bottom frame edge are padded to 64x64 by edge
//! replication so the wavelet transform always sees a full tile. Each
//! component then runs forward DWT, quantization, LL3 differential
//! coding, and RLGR entropy coding.

use crate::blocks::EntropyAlgorithm;
use crate::color::{rgb_to_ycbcr_pixel, unpack_pixel, PixelFormat};
use crate::context::TileTransforms;
use crate::decode::TILE_SIZE;
use crate::quantization::{differential_encode, QuantTable};
use crate::rlgr::{rlgr_encode, COEFFICIENT_COUNT};

fn encode_component(
    transforms: &dyn TileTransforms,
    mode: EntropyAlgorithm,
    quant: &QuantTable,
    buffer: &mut [i16; COEFFICIENT_COUNT],
    temp: &mut [i16; COEFFICIENT_COUNT],
) -> Vec<u8> {
    transforms.dwt_encode(buffer, temp);
    transforms.quantize(buffer, quant);
    differential_encode(buffer);
    rlgr_encode(mode, buffer)
}

/// Encode one tile from a larger pixel raster.
///
/// `(x, y)` is the tile origin inside the raster, `width`/`height` the
/// tile's real coverage (64 except at frame edges), `stride` the raster's
/// row pitch in bytes. Returns the compressed Y, Cb and Cr streams.
#[allow(clippy::too_many_arguments)]
pub(crate) fn encode_rgb(
    transforms: &dyn TileTransforms,
    mode: EntropyAlgorithm,
    quant: &QuantTable,
    format: PixelFormat,
    pixels: &[u8],
    stride: usize,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut yb = [0i16; COEFFICIENT_COUNT];
    let mut cbb = [0i16; COEFFICIENT_COUNT];
    let mut crb = [0i16; COEFFICIENT_COUNT];
    let mut temp = [0i16; COEFFICIENT_COUNT];

    let bpp = format.bytes_per_pixel();
    for ty in 0..TILE_SIZE {
        let sy = y + ty.min(height - 1);
        for tx in 0..TILE_SIZE {
            let sx = x + tx.min(width - 1);
            let offset = sy * stride + sx * bpp;
            let (r, g, b) = unpack_pixel(format, &pixels[offset..offset + bpp]);
            let (yv, cbv, crv) = rgb_to_ycbcr_pixel(r, g, b);
            let idx = ty * TILE_SIZE + tx;
            yb[idx] = yv;
            cbb[idx] = cbv;
            crb[idx] = crv;
        }
    }

    let y_data = encode_component(transforms, mode, quant, &mut yb, &mut temp);
    let cb_data = encode_component(transforms, mode, quant, &mut cbb, &mut temp);
    let cr_data = encode_component(transforms, mode, quant, &mut crb, &mut temp);
    (y_data, cb_data, cr_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{pack_pixel, unpack_pixel};
    use crate::context::SoftwareTransforms;
    use crate::decode::decode_rgb;
    use crate::message::RfxTile;
    use crate::quantization::DEFAULT_QUANT_TABLE;

    fn gradient_frame(width: usize, height: usize, format: PixelFormat) -> Vec<u8> {
        let bpp = format.bytes_per_pixel();
        let mut pixels = vec![0u8; width * height * bpp];
        for py in 0..height {
            for px in 0..width {
                let r = ((px * 255) / width.max(1)) as u8;
                let g = ((py * 255) / height.max(1)) as u8;
                let b = (px + py) as u8;
                pack_pixel(format, r, g, b, &mut pixels[(py * width + px) * bpp..]);
            }
        }
        pixels
    }

    fn assert_tiles_close(format: PixelFormat, expected: &[u8], actual: &[u8], tolerance: i32) {
        let bpp = format.bytes_per_pixel();
        for idx in 0..(TILE_SIZE * TILE_SIZE) {
            let (er, eg, eb) = unpack_pixel(format, &expected[idx * bpp..]);
            let (ar, ag, ab) = unpack_pixel(format, &actual[idx * bpp..]);
            for (e, a) in [(er, ar), (eg, ag), (eb, ab)] {
                let err = (e as i32 - a as i32).abs();
                assert!(err <= tolerance, "pixel {} err {} > {}", idx, err, tolerance);
            }
        }
    }

    #[test]
    fn test_encode_decode_full_tile() {
        let format = PixelFormat::Bgra32;
        let frame = gradient_frame(64, 64, format);
        for mode in [EntropyAlgorithm::Rlgr1, EntropyAlgorithm::Rlgr3] {
            let (yd, cbd, crd) = encode_rgb(
                &SoftwareTransforms,
                mode,
                &DEFAULT_QUANT_TABLE,
                format,
                &frame,
                64 * 4,
                0,
                0,
                64,
                64,
            );
            let mut tile = RfxTile {
                x: 0,
                y: 0,
                width: 64,
                height: 64,
                data: vec![0u8; TILE_SIZE * TILE_SIZE * 4],
            };
            decode_rgb(
                &SoftwareTransforms,
                mode,
                &yd,
                &cbd,
                &crd,
                &DEFAULT_QUANT_TABLE,
                &DEFAULT_QUANT_TABLE,
                &DEFAULT_QUANT_TABLE,
                format,
                &mut tile,
            );
            // Lossy pipeline: quantization plus wavelet rounding.
            assert_tiles_close(format, &frame, &tile.data, 48);
        }
    }

    #[test]
    fn test_solid_tile_is_near_exact() {
        let format = PixelFormat::Bgra32;
        let mut frame = vec![0u8; 64 * 64 * 4];
        for idx in 0..(64 * 64) {
            pack_pixel(format, 200, 60, 90, &mut frame[idx * 4..]);
        }
        let (yd, cbd, crd) = encode_rgb(
            &SoftwareTransforms,
            EntropyAlgorithm::Rlgr3,
            &DEFAULT_QUANT_TABLE,
            format,
            &frame,
            64 * 4,
            0,
            0,
            64,
            64,
        );
        let mut tile = RfxTile {
            width: 64,
            height: 64,
            data: vec![0u8; 64 * 64 * 4],
            ..Default::default()
        };
        decode_rgb(
            &SoftwareTransforms,
            EntropyAlgorithm::Rlgr3,
            &yd,
            &cbd,
            &crd,
            &DEFAULT_QUANT_TABLE,
            &DEFAULT_QUANT_TABLE,
            &DEFAULT_QUANT_TABLE,
            format,
            &mut tile,
        );
        // A flat tile has detail coefficients of zero everywhere, so only
        // color-transform rounding remains.
        assert_tiles_close(format, &frame, &tile.data, 8);
    }

    #[test]
    fn test_partial_tile_pads_by_replication() {
        let format = PixelFormat::Rgb24;
        let frame = gradient_frame(40, 24, format);
        // Must not read outside the 40x24 raster.
        let (yd, cbd, crd) = encode_rgb(
            &SoftwareTransforms,
            EntropyAlgorithm::Rlgr3,
            &DEFAULT_QUANT_TABLE,
            format,
            &frame,
            40 * 3,
            0,
            0,
            40,
            24,
        );
        assert!(!yd.is_empty());
        assert!(!cbd.is_empty());
        assert!(!crd.is_empty());
    }
}
