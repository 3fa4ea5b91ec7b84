//! YCbCr color transform and pixel packing.
//!
//! The codec transforms between RGB and YCbCr with fixed-point integer
//! arithmetic (16 fractional bits). Y is biased by -128 so all three
//! components are signed and centered for the wavelet stage; the inverse
//! adds the bias back and clamps to the 8-bit range.

/// Output pixel layout for decoded tiles and input layout for compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// Blue, green, red, alpha byte order (alpha forced opaque).
    #[default]
    Bgra32,
    /// Red, green, blue, alpha byte order (alpha forced opaque).
    Rgba32,
    Bgr24,
    Rgb24,
    /// 16-bit 5-6-5 with blue in the high bits, little-endian.
    Bgr565,
    /// 16-bit 5-6-5 with red in the high bits, little-endian.
    Rgb565,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgra32 | Self::Rgba32 => 4,
            Self::Bgr24 | Self::Rgb24 => 3,
            Self::Bgr565 | Self::Rgb565 => 2,
        }
    }

    pub const fn bits_per_pixel(self) -> u32 {
        (self.bytes_per_pixel() as u32) * 8
    }
}

// Fixed-point (16 fractional bits) BT.601-style transform coefficients.
const Y_R: i32 = 19596;
const Y_G: i32 = 38470;
const Y_B: i32 = 7471;
const CB_R: i32 = -11072;
const CB_G: i32 = -21738;
const CB_B: i32 = 32807;
const CR_R: i32 = 32756;
const CR_G: i32 = -27429;
const CR_B: i32 = -5327;

const R_CR: i64 = 91916;
const G_CB: i64 = -22527;
const G_CR: i64 = -46819;
const B_CB: i64 = 115993;

const HALF: i32 = 1 << 15;

#[inline]
pub fn rgb_to_ycbcr_pixel(r: u8, g: u8, b: u8) -> (i16, i16, i16) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let y = ((Y_R * r + Y_G * g + Y_B * b + HALF) >> 16) - 128;
    let cb = (CB_R * r + CB_G * g + CB_B * b + HALF) >> 16;
    let cr = (CR_R * r + CR_G * g + CR_B * b + HALF) >> 16;
    (y as i16, cb as i16, cr as i16)
}

#[inline]
fn clamp_u8(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

/// Inverse transform with clamping. Computed in i64: hostile coefficient
/// streams can drive components far outside the nominal range and must
/// not overflow.
#[inline]
pub fn ycbcr_to_rgb_pixel(y: i16, cb: i16, cr: i16) -> (u8, u8, u8) {
    let yy = ((y as i64 + 128) << 16) + (HALF as i64);
    let cb = cb as i64;
    let cr = cr as i64;
    let r = (yy + R_CR * cr) >> 16;
    let g = (yy + G_CB * cb + G_CR * cr) >> 16;
    let b = (yy + B_CB * cb) >> 16;
    (clamp_u8(r), clamp_u8(g), clamp_u8(b))
}

/// Write one pixel at the format's width. `out` must be at least
/// `bytes_per_pixel` long.
#[inline]
pub fn pack_pixel(format: PixelFormat, r: u8, g: u8, b: u8, out: &mut [u8]) {
    match format {
        PixelFormat::Bgra32 => {
            out[0] = b;
            out[1] = g;
            out[2] = r;
            out[3] = 0xFF;
        }
        PixelFormat::Rgba32 => {
            out[0] = r;
            out[1] = g;
            out[2] = b;
            out[3] = 0xFF;
        }
        PixelFormat::Bgr24 => {
            out[0] = b;
            out[1] = g;
            out[2] = r;
        }
        PixelFormat::Rgb24 => {
            out[0] = r;
            out[1] = g;
            out[2] = b;
        }
        PixelFormat::Bgr565 => {
            let v = (((b as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((r as u16) >> 3);
            out[..2].copy_from_slice(&v.to_le_bytes());
        }
        PixelFormat::Rgb565 => {
            let v = (((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3);
            out[..2].copy_from_slice(&v.to_le_bytes());
        }
    }
}

/// Read one pixel at the format's width. 5/6-bit channels are expanded by
/// bit replication.
#[inline]
pub fn unpack_pixel(format: PixelFormat, bytes: &[u8]) -> (u8, u8, u8) {
    match format {
        PixelFormat::Bgra32 | PixelFormat::Bgr24 => (bytes[2], bytes[1], bytes[0]),
        PixelFormat::Rgba32 | PixelFormat::Rgb24 => (bytes[0], bytes[1], bytes[2]),
        PixelFormat::Bgr565 | PixelFormat::Rgb565 => {
            let v = u16::from_le_bytes([bytes[0], bytes[1]]);
            let hi = (((v >> 11) & 0x1F) as u8) << 3;
            let hi = hi | (hi >> 5);
            let mid = (((v >> 5) & 0x3F) as u8) << 2;
            let mid = mid | (mid >> 6);
            let lo = ((v & 0x1F) as u8) << 3;
            let lo = lo | (lo >> 5);
            if format == PixelFormat::Bgr565 {
                (lo, mid, hi)
            } else {
                (hi, mid, lo)
            }
        }
    }
}
