//! Scalar quantization and LL3 differential coding.
//!
//! A quantization table carries ten 4-bit values, one per sub-band, in
//! LL3, LH3, HL3, HH3, LH2, HL2, HH2, LH1, HL1, HH1 order. A value `q`
//! quantizes its band by `q - 6` bit positions; 6 and below pass
//! coefficients through untouched.
//!
//! The 64 LL3 coefficients are additionally delta-coded before entropy
//! coding: the encoder stores differences between neighbours, the decoder
//! integrates them back.

use crate::rlgr::COEFFICIENT_COUNT;

/// Values per quantization table.
pub const QUANT_VALUES: usize = 10;

/// Sub-band quantization values in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTable(pub [u8; QUANT_VALUES]);

/// Table used by the composer when the caller supplies none.
pub const DEFAULT_QUANT_TABLE: QuantTable = QuantTable([6, 6, 6, 6, 7, 7, 8, 8, 8, 9]);

/// (buffer offset, length, table index) for every sub-band.
const BAND_LAYOUT: [(usize, usize, usize); 10] = [
    (0, 1024, 8),    // HL1
    (1024, 1024, 7), // LH1
    (2048, 1024, 9), // HH1
    (3072, 256, 5),  // HL2
    (3328, 256, 4),  // LH2
    (3584, 256, 6),  // HH2
    (3840, 64, 2),   // HL3
    (3904, 64, 1),   // LH3
    (3968, 64, 3),   // HH3
    (4032, 64, 0),   // LL3
];

/// Offset of the LL3 band inside the coefficient buffer.
pub const LL3_OFFSET: usize = 4032;
/// Length of the LL3 band.
pub const LL3_LEN: usize = 64;

/// Undo quantization: scale every sub-band back up by its factor.
pub fn dequantize(buffer: &mut [i16; COEFFICIENT_COUNT], table: &QuantTable) {
    for &(offset, len, qi) in BAND_LAYOUT.iter() {
        let factor = table.0[qi] as i32 - 6;
        if factor <= 0 {
            continue;
        }
        for v in buffer[offset..offset + len].iter_mut() {
            *v <<= factor;
        }
    }
}

/// Quantize every sub-band: round to nearest, then shift down.
pub fn quantize(buffer: &mut [i16; COEFFICIENT_COUNT], table: &QuantTable) {
    for &(offset, len, qi) in BAND_LAYOUT.iter() {
        let factor = table.0[qi] as i32 - 6;
        if factor <= 0 {
            continue;
        }
        let half = 1i32 << (factor - 1);
        for v in buffer[offset..offset + len].iter_mut() {
            *v = (((*v as i32) + half) >> factor) as i16;
        }
    }
}

/// Integrate the delta-coded LL3 band.
pub fn differential_decode(buffer: &mut [i16; COEFFICIENT_COUNT]) {
    for i in LL3_OFFSET + 1..LL3_OFFSET + LL3_LEN {
        buffer[i] = buffer[i].wrapping_add(buffer[i - 1]);
    }
}

/// Delta-code the LL3 band.
pub fn differential_encode(buffer: &mut [i16; COEFFICIENT_COUNT]) {
    for i in (LL3_OFFSET + 1..LL3_OFFSET + LL3_LEN).rev() {
        buffer[i] = buffer[i].wrapping_sub(buffer[i - 1]);
    }
}
