//! End-to-end compose -> parse round trips over the real wire format.

use anyhow::Result;
use rfx_codec::{
    EntropyAlgorithm, PixelFormat, RfxComposeContext, RfxContext, RfxOutStream,
};
use rfx_common::Rect;

const TILE: usize = 64;

/// Install a subscriber so `RUST_LOG=rfx_codec=debug` shows the parser's
/// block trace during test runs.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn checker_frame(width: usize, height: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; width * height * bpp];
    for py in 0..height {
        for px in 0..width {
            let offset = (py * width + px) * bpp;
            let on = (px / 8 + py / 8) % 2 == 0;
            // BGRA
            pixels[offset] = if on { 200 } else { 40 };
            pixels[offset + 1] = (px * 2) as u8;
            pixels[offset + 2] = (py * 2) as u8;
            pixels[offset + 3] = 0xFF;
        }
    }
    pixels
}

fn roundtrip(width: u16, height: u16, mode: EntropyAlgorithm) -> Result<()> {
    init_tracing();
    let bpp = PixelFormat::Bgra32.bytes_per_pixel();
    let frame = checker_frame(width as usize, height as usize, bpp);
    let stride = width as usize * bpp;

    let mut compose = RfxComposeContext::new(width, height);
    compose.mode = mode;
    let rects = vec![Rect::new(0, 0, width, height)];
    let mut out = RfxOutStream::new();
    compose.compose_message(&mut out, &rects, &frame, stride)?;

    let mut ctx = RfxContext::new();
    let message = ctx.process_message(out.as_slice(), Rect::new(0, 0, width, height));

    // Region rectangles come back exactly.
    assert_eq!(message.rects, rects);

    // One tile per 64x64 cell of the grid.
    let tiles_x = (width as usize).div_ceil(TILE);
    let tiles_y = (height as usize).div_ceil(TILE);
    assert_eq!(message.tiles.len(), tiles_x * tiles_y);

    // Channel dimensions made it through the header group.
    assert_eq!((ctx.width, ctx.height), (width, height));
    assert_eq!(ctx.mode, mode);

    // Reassemble and compare within the lossy error budget: the mean
    // stays tight, hard quantization edges may locally deviate more.
    let mut max_err = 0i64;
    let mut total_err = 0i64;
    let mut samples = 0i64;
    for &handle in &message.tiles {
        let tile = ctx.tile(handle);
        let copy_w = TILE.min(width as usize - tile.x as usize);
        let copy_h = TILE.min(height as usize - tile.y as usize);
        for ty in 0..copy_h {
            for tx in 0..copy_w {
                let src = (ty * TILE + tx) * bpp;
                let dst = (tile.y as usize + ty) * stride + (tile.x as usize + tx) * bpp;
                for c in 0..3 {
                    let err = (tile.data[src + c] as i64 - frame[dst + c] as i64).abs();
                    max_err = max_err.max(err);
                    total_err += err;
                    samples += 1;
                }
            }
        }
    }
    let mean_err = total_err as f64 / samples as f64;
    assert!(mean_err <= 10.0, "mean channel error {:.2} too high", mean_err);
    assert!(max_err <= 200, "max channel error {} too high", max_err);

    ctx.release_message(message);
    Ok(())
}

#[test]
fn test_single_tile_roundtrip_rlgr3() -> Result<()> {
    roundtrip(64, 64, EntropyAlgorithm::Rlgr3)
}

#[test]
fn test_single_tile_roundtrip_rlgr1() -> Result<()> {
    roundtrip(64, 64, EntropyAlgorithm::Rlgr1)
}

#[test]
fn test_multi_tile_frame_with_partial_edges() -> Result<()> {
    // 150x90 needs a 3x2 grid with partial tiles on both edges.
    roundtrip(150, 90, EntropyAlgorithm::Rlgr3)
}

#[test]
fn test_two_frames_share_one_header_group() {
    let width = 64u16;
    let height = 64u16;
    let bpp = 4;
    let frame = checker_frame(width as usize, height as usize, bpp);

    let mut compose = RfxComposeContext::new(width, height);
    let mut out = RfxOutStream::new();
    let rects = vec![Rect::new(0, 0, width, height)];
    compose
        .compose_message(&mut out, &rects, &frame, width as usize * bpp)
        .expect("frame 1");
    compose
        .compose_message(&mut out, &rects, &frame, width as usize * bpp)
        .expect("frame 2");

    // Both frames parse from the single concatenated stream.
    let mut ctx = RfxContext::new();
    let message = ctx.process_message(out.as_slice(), Rect::new(0, 0, width, height));
    assert_eq!(message.tiles.len(), 2);
    assert_eq!(message.rects.len(), 2);
    ctx.release_message(message);
}

#[test]
fn test_truncated_stream_degrades_gracefully() {
    let width = 128u16;
    let height = 128u16;
    let bpp = 4;
    let frame = checker_frame(width as usize, height as usize, bpp);

    let mut compose = RfxComposeContext::new(width, height);
    let mut out = RfxOutStream::new();
    compose
        .compose_message(
            &mut out,
            &[Rect::new(0, 0, width, height)],
            &frame,
            width as usize * bpp,
        )
        .expect("compose");

    let bytes = out.as_slice();
    let mut ctx = RfxContext::new();
    // Cutting anywhere must never panic; later cuts may still yield tiles.
    for cut in [7, 64, bytes.len() / 2, bytes.len() - 3] {
        let message = ctx.process_message(&bytes[..cut], Rect::new(0, 0, width, height));
        ctx.release_message(message);
    }
}
