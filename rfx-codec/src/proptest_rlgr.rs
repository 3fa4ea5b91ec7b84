//! Property tests for the RLGR entropy coder.
//!
//! Random coefficient buffers (biased toward runs of zeros, like real
//! wavelet output) must survive an encode/decode round trip exactly in
//! both variants, and the decoder must accept arbitrary bytes without
//! panicking.

mod tests {
    use crate::blocks::EntropyAlgorithm;
    use crate::rlgr::{rlgr_decode, rlgr_encode, COEFFICIENT_COUNT};
    use proptest::prelude::*;

    /// Sparse buffers: mostly zeros with scattered signed coefficients.
    fn sparse_buffer() -> impl Strategy<Value = Box<[i16; COEFFICIENT_COUNT]>> {
        prop::collection::vec((0usize..COEFFICIENT_COUNT, -512i16..=512), 0..64).prop_map(
            |entries| {
                let mut buf = Box::new([0i16; COEFFICIENT_COUNT]);
                for (idx, val) in entries {
                    buf[idx] = val;
                }
                buf
            },
        )
    }

    proptest! {
        #[test]
        fn rlgr1_roundtrip_is_exact(buf in sparse_buffer()) {
            let encoded = rlgr_encode(EntropyAlgorithm::Rlgr1, &buf);
            let mut decoded = [0i16; COEFFICIENT_COUNT];
            rlgr_decode(EntropyAlgorithm::Rlgr1, &encoded, &mut decoded);
            prop_assert_eq!(&decoded[..], &buf[..]);
        }

        #[test]
        fn rlgr3_roundtrip_is_exact(buf in sparse_buffer()) {
            let encoded = rlgr_encode(EntropyAlgorithm::Rlgr3, &buf);
            let mut decoded = [0i16; COEFFICIENT_COUNT];
            rlgr_decode(EntropyAlgorithm::Rlgr3, &encoded, &mut decoded);
            prop_assert_eq!(&decoded[..], &buf[..]);
        }

        #[test]
        fn decoder_accepts_arbitrary_bytes(data in prop::collection::vec(any::<u8>(), 0..256)) {
            let mut buf = [0i16; COEFFICIENT_COUNT];
            rlgr_decode(EntropyAlgorithm::Rlgr1, &data, &mut buf);
            buf = [0i16; COEFFICIENT_COUNT];
            rlgr_decode(EntropyAlgorithm::Rlgr3, &data, &mut buf);
        }
    }
}
