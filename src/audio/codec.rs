//! Conversion between raw PCM blocks and normalized channel streams
//!
//! Decoding divides by 32768 so full-scale negative maps to exactly -1.0.
//! Encoding truncates toward zero and saturates to the 16-bit range; it
//! never fails on out-of-range input.
//!
//! The right channel is encoded with a +32768 offset, as if it were an
//! unsigned format, while the block itself is signed. Any non-negative right
//! sample therefore saturates at 32767. Existing consumers of this stream
//! rely on that layout, so it is kept as-is.

use super::RawBlock;
use crate::constants::{BYTES_PER_SAMPLE, CHANNELS, FRAME_BYTES, FULL_SCALE};
use crate::error::{DemodError, Result};

/// Normalize one 16-bit sample to roughly [-1.0, 1.0)
#[inline]
pub fn normalize(sample: i16) -> f64 {
    sample as f64 / FULL_SCALE
}

/// Truncate toward zero and clamp to the i16 range
#[inline]
fn saturate(value: f64) -> i16 {
    // `as i32` truncates toward zero, saturates at the i32 bounds and maps NaN to 0
    (value as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Encode a left-channel sample
#[inline]
pub fn quantize_left(sample: f64) -> i16 {
    saturate(sample * FULL_SCALE)
}

/// Encode a right-channel sample, including the full-scale offset
#[inline]
pub fn quantize_right(sample: f64) -> i16 {
    saturate(sample * FULL_SCALE + FULL_SCALE)
}

/// Whether `sample` lands outside the 16-bit range when encoded on the left channel
#[inline]
pub fn clips(sample: f64) -> bool {
    let scaled = (sample * FULL_SCALE).trunc();
    !(i16::MIN as f64..=i16::MAX as f64).contains(&scaled)
}

/// Split a block into (left, right) normalized channel streams
///
/// # Errors
/// Returns `DemodError::MalformedBlock` if the byte length is not a whole
/// number of interleaved frames.
pub fn decode(block: &RawBlock) -> Result<(Vec<f64>, Vec<f64>)> {
    let bytes = block.as_bytes();
    if !bytes.len().is_multiple_of(FRAME_BYTES) {
        return Err(DemodError::MalformedBlock {
            len: bytes.len(),
            frame_bytes: FRAME_BYTES,
        });
    }

    let frames = bytes.len() / FRAME_BYTES;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);

    for frame in bytes.chunks_exact(FRAME_BYTES) {
        let l = i16::from_le_bytes([frame[0], frame[1]]);
        let r = i16::from_le_bytes([frame[2], frame[3]]);
        left.push(normalize(l));
        right.push(normalize(r));
    }

    Ok((left, right))
}

/// Interleave two normalized channel streams into a block
///
/// # Errors
/// Returns `DemodError::ChannelMismatch` if the streams differ in length.
pub fn encode(left: &[f64], right: &[f64]) -> Result<RawBlock> {
    if left.len() != right.len() {
        return Err(DemodError::ChannelMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    let mut bytes = Vec::with_capacity(left.len() * CHANNELS * BYTES_PER_SAMPLE);
    for (&l, &r) in left.iter().zip(right) {
        bytes.extend_from_slice(&quantize_left(l).to_le_bytes());
        bytes.extend_from_slice(&quantize_right(r).to_le_bytes());
    }

    Ok(RawBlock::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_deinterleaves_and_normalizes() {
        let block = RawBlock::from_samples(&[16384, -32768, 0, 32767]);
        let (left, right) = decode(&block).unwrap();

        assert_eq!(left, vec![0.5, 0.0]);
        assert_eq!(right, vec![-1.0, 32767.0 / 32768.0]);
    }

    #[test]
    fn test_decode_rejects_partial_frame() {
        for len in [1, 2, 3, 5, 6, 7] {
            let block = RawBlock::from_bytes(vec![0; len]);
            match decode(&block) {
                Err(DemodError::MalformedBlock { len: l, frame_bytes }) => {
                    assert_eq!(l, len);
                    assert_eq!(frame_bytes, 4);
                }
                other => panic!("expected MalformedBlock for {} bytes, got {:?}", len, other),
            }
        }
    }

    #[test]
    fn test_decode_empty_block() {
        let (left, right) = decode(&RawBlock::default()).unwrap();
        assert!(left.is_empty());
        assert!(right.is_empty());
    }

    #[test]
    fn test_zero_round_trip_biases_right_channel() {
        let block = RawBlock::from_samples(&[0; 16]);
        let (left, right) = decode(&block).unwrap();
        let encoded = encode(&left, &right).unwrap().to_samples();

        for frame in encoded.chunks_exact(2) {
            assert_eq!(frame[0], 0);
            assert_eq!(frame[1], 32767);
        }
    }

    #[test]
    fn test_left_clamp_boundaries() {
        assert_eq!(quantize_left(1.5), 32767);
        assert_eq!(quantize_left(-1.5), -32768);
        assert_eq!(quantize_left(1.0), 32767);
        assert_eq!(quantize_left(-1.0), -32768);
        assert_eq!(quantize_left(f64::INFINITY), 32767);
        assert_eq!(quantize_left(f64::NEG_INFINITY), -32768);
        assert_eq!(quantize_left(f64::NAN), 0);
    }

    #[test]
    fn test_encode_truncates_toward_zero() {
        // 0.99999 * 32768 = 32767.67 and -0.00002 * 32768 = -0.655
        assert_eq!(quantize_left(0.99999), 32767);
        assert_eq!(quantize_left(-0.00002), 0);
        assert_eq!(quantize_left(-1.5 / 32768.0), -1);
    }

    #[test]
    fn test_truncation_resolves_sub_lsb_offsets() {
        // A single-precision path would round these onto the boundary
        assert_eq!(quantize_left((12345.0 - 1e-9) / 32768.0), 12344);
        assert_eq!(quantize_left(-(12345.0 - 1e-9) / 32768.0), -12344);
        assert_eq!(quantize_left(12345.0 / 32768.0), 12345);
    }

    #[test]
    fn test_every_sample_round_trips_on_left() {
        for s in i16::MIN..=i16::MAX {
            assert_eq!(quantize_left(normalize(s)), s);
        }
    }

    #[test]
    fn test_right_channel_offset() {
        assert_eq!(quantize_right(-1.0), 0);
        assert_eq!(quantize_right(-0.5), 16384);
        assert_eq!(quantize_right(0.25), 32767);
        assert_eq!(quantize_right(-2.0), -32768);
    }

    #[test]
    fn test_encode_interleaves_left_then_right() {
        let block = encode(&[0.5, -0.25], &[-1.0, -0.75]).unwrap();
        assert_eq!(block.to_samples(), vec![16384, 0, -8192, 8192]);
    }

    #[test]
    fn test_encode_rejects_mismatched_channels() {
        assert!(matches!(
            encode(&[0.0; 3], &[0.0; 2]),
            Err(DemodError::ChannelMismatch { left: 3, right: 2 })
        ));
    }

    #[test]
    fn test_clips() {
        assert!(!clips(0.5));
        assert!(!clips(-1.0));
        assert!(clips(1.0));
        assert!(clips(-1.5));
    }
}
