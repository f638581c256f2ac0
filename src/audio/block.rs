use crate::constants::{BYTES_PER_SAMPLE, FRAME_BYTES};

/// One block of interleaved stereo 16-bit little-endian PCM
///
/// The byte length is not validated on construction: blocks arrive from
/// external sources as-is and the codec rejects malformed ones on decode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawBlock {
    bytes: Vec<u8>,
}

impl RawBlock {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Build a block from interleaved samples [L, R, L, R, ...]
    pub fn from_samples(samples: &[i16]) -> Self {
        let mut bytes = Vec::with_capacity(samples.len() * BYTES_PER_SAMPLE);
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        Self { bytes }
    }

    /// Interleaved samples; a trailing odd byte is ignored
    pub fn to_samples(&self) -> Vec<i16> {
        self.bytes
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of complete frames in the block
    pub fn frames(&self) -> usize {
        self.bytes.len() / FRAME_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_little_endian() {
        let block = RawBlock::from_samples(&[1, -2]);
        assert_eq!(block.as_bytes(), &[0x01, 0x00, 0xfe, 0xff]);
        assert_eq!(block.to_samples(), vec![1, -2]);
        assert_eq!(block.frames(), 1);
    }

    #[test]
    fn test_frames_ignores_partial_frame() {
        let block = RawBlock::from_bytes(vec![0; 10]);
        assert_eq!(block.frames(), 2);
        assert_eq!(block.len(), 10);
    }
}
