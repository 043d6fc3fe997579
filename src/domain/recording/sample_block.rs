//! Units of captured audio as delivered by a capture device

use std::sync::Arc;

/// Default number of samples per raw capture block
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// A block of consecutive mono samples, nominally in [-1.0, 1.0].
///
/// Blocks are immutable once created; cloning shares the underlying buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBlock {
    samples: Arc<[f32]>,
}

impl SampleBlock {
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<f32>> for SampleBlock {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

/// A fragment of an encoded container stream.
///
/// Concatenating chunks in arrival order reconstructs the full stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerChunk {
    bytes: Vec<u8>,
}

impl ContainerChunk {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Concatenate chunks in order into one contiguous stream
pub fn concat_chunks(chunks: &[ContainerChunk]) -> Vec<u8> {
    let total = chunks.iter().map(ContainerChunk::len).sum();
    let mut out = Vec::with_capacity(total);
    for chunk in chunks {
        out.extend_from_slice(chunk.bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_exposes_samples() {
        let block = SampleBlock::new(vec![0.1, -0.2, 0.3]);
        assert_eq!(block.len(), 3);
        assert_eq!(block.samples(), &[0.1, -0.2, 0.3]);
        assert!(!block.is_empty());
    }

    #[test]
    fn clone_shares_buffer() {
        let block = SampleBlock::new(vec![0.5; 8]);
        let copy = block.clone();
        assert_eq!(block.samples().as_ptr(), copy.samples().as_ptr());
    }

    #[test]
    fn concat_preserves_arrival_order() {
        let chunks = vec![
            ContainerChunk::new(vec![1, 2]),
            ContainerChunk::new(Vec::new()),
            ContainerChunk::new(vec![3]),
        ];
        assert_eq!(concat_chunks(&chunks), vec![1, 2, 3]);
    }
}
