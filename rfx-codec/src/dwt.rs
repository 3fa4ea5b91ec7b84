//! Three-level 5/3 discrete wavelet transform over a 64x64 tile component.
//!
//! The coefficient buffer packs ten sub-bands:
//!
//! ```text
//! offset  size   band
//!      0  32x32  HL1
//!   1024  32x32  LH1
//!   2048  32x32  HH1
//!   3072  16x16  HL2
//!   3328  16x16  LH2
//!   3584  16x16  HH2
//!   3840   8x8   HL3
//!   3904   8x8   LH3
//!   3968   8x8   HH3
//!   4032   8x8   LL3
//! ```
//!
//! Each inverse level reconstructs a `2w x 2w` image in place over its
//! block; the level-3 output lands exactly where level 2 expects its LL
//! band, so the cascade needs no copies, only one scratch buffer for the
//! intermediate horizontal pass.
//!
//! The lifting steps use integer arithmetic with floor division; a forward
//! then inverse pass reproduces even samples exactly and odd samples
//! within one unit per level.

use crate::rlgr::COEFFICIENT_COUNT;

/// Half-width of each decomposition level, innermost first.
const LEVEL_WIDTHS: [usize; 3] = [8, 16, 32];
/// Block offset of each decomposition level, innermost first.
const LEVEL_OFFSETS: [usize; 3] = [3840, 3072, 0];

/// Inverse 1-D lifting: combine low band `l` and high band `h` (each `n`
/// long) into `2n` samples.
fn idwt_1d(l: &[i16], h: &[i16], dst: &mut [i16]) {
    let n = l.len();
    for k in 0..n {
        let h_prev = h[k.saturating_sub(1)] as i32;
        dst[2 * k] = (l[k] as i32 - ((h_prev + h[k] as i32 + 1) >> 1)) as i16;
    }
    for k in 0..n {
        let even = dst[2 * k] as i32;
        let predicted = if k + 1 < n {
            (even + dst[2 * k + 2] as i32) >> 1
        } else {
            even
        };
        dst[2 * k + 1] = (((h[k] as i32) << 1) + predicted) as i16;
    }
}

/// Forward 1-D lifting: split `2n` samples into low band `l` and high
/// band `h`.
fn fdwt_1d(src: &[i16], l: &mut [i16], h: &mut [i16]) {
    let n = h.len();
    for k in 0..n {
        let odd = src[2 * k + 1] as i32;
        let predicted = if k + 1 < n {
            (src[2 * k] as i32 + src[2 * k + 2] as i32) >> 1
        } else {
            src[2 * k] as i32
        };
        h[k] = ((odd - predicted) >> 1) as i16;
    }
    for k in 0..n {
        let h_prev = h[k.saturating_sub(1)] as i32;
        l[k] = (src[2 * k] as i32 + ((h_prev + h[k] as i32 + 1) >> 1)) as i16;
    }
}

/// One inverse level: the four `w x w` sub-bands at the head of `block`
/// (HL, LH, HH, LL order) become a `2w x 2w` image over `block[0..4w^2]`.
fn idwt_2d_block(block: &mut [i16], temp: &mut [i16], w: usize) {
    let hl = 0;
    let lh = w * w;
    let hh = 2 * w * w;
    let ll = 3 * w * w;
    let row = 2 * w;

    // Horizontal pass: LL+HL rows form the low half of `temp`, LH+HH rows
    // the high half, each row already at full width.
    for y in 0..w {
        let (head, tail) = temp.split_at_mut(row * w);
        idwt_1d(
            &block[ll + y * w..ll + y * w + w],
            &block[hl + y * w..hl + y * w + w],
            &mut head[y * row..y * row + row],
        );
        idwt_1d(
            &block[lh + y * w..lh + y * w + w],
            &block[hh + y * w..hh + y * w + w],
            &mut tail[y * row..y * row + row],
        );
    }

    // Vertical pass: combine each low/high column pair into the block.
    let mut lcol = [0i16; 32];
    let mut hcol = [0i16; 32];
    let mut dcol = [0i16; 64];
    for x in 0..row {
        for y in 0..w {
            lcol[y] = temp[y * row + x];
            hcol[y] = temp[row * w + y * row + x];
        }
        idwt_1d(&lcol[..w], &hcol[..w], &mut dcol[..row]);
        for y in 0..row {
            block[y * row + x] = dcol[y];
        }
    }
}

/// One forward level: the `2w x 2w` image at the head of `block` becomes
/// the four `w x w` sub-bands (HL, LH, HH, LL order).
fn fdwt_2d_block(block: &mut [i16], temp: &mut [i16], w: usize) {
    let hl = 0;
    let lh = w * w;
    let hh = 2 * w * w;
    let ll = 3 * w * w;
    let row = 2 * w;

    // Vertical pass first (the inverse runs horizontal then vertical).
    let mut scol = [0i16; 64];
    let mut lcol = [0i16; 32];
    let mut hcol = [0i16; 32];
    for x in 0..row {
        for y in 0..row {
            scol[y] = block[y * row + x];
        }
        fdwt_1d(&scol[..row], &mut lcol[..w], &mut hcol[..w]);
        for y in 0..w {
            temp[y * row + x] = lcol[y];
            temp[row * w + y * row + x] = hcol[y];
        }
    }

    // Horizontal pass: low rows split into LL+HL, high rows into LH+HH.
    let mut lrow = [0i16; 32];
    let mut hrow = [0i16; 32];
    for y in 0..w {
        fdwt_1d(&temp[y * row..y * row + row], &mut lrow[..w], &mut hrow[..w]);
        block[ll + y * w..ll + y * w + w].copy_from_slice(&lrow[..w]);
        block[hl + y * w..hl + y * w + w].copy_from_slice(&hrow[..w]);

        let base = row * w + y * row;
        fdwt_1d(&temp[base..base + row], &mut lrow[..w], &mut hrow[..w]);
        block[lh + y * w..lh + y * w + w].copy_from_slice(&lrow[..w]);
        block[hh + y * w..hh + y * w + w].copy_from_slice(&hrow[..w]);
    }
}

/// Full three-level inverse transform: sub-band coefficients to a 64x64
/// spatial component.
pub fn dwt_decode(buffer: &mut [i16; COEFFICIENT_COUNT], temp: &mut [i16; COEFFICIENT_COUNT]) {
    for (&offset, &w) in LEVEL_OFFSETS.iter().zip(LEVEL_WIDTHS.iter()) {
        idwt_2d_block(&mut buffer[offset..], temp, w);
    }
}

/// Full three-level forward transform: a 64x64 spatial component to
/// sub-band coefficients.
pub fn dwt_encode(buffer: &mut [i16; COEFFICIENT_COUNT], temp: &mut [i16; COEFFICIENT_COUNT]) {
    for (&offset, &w) in LEVEL_OFFSETS.iter().zip(LEVEL_WIDTHS.iter()).rev() {
        fdwt_2d_block(&mut buffer[offset..], temp, w);
    }
}
