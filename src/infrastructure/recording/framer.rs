//! Regroups callback-sized sample runs into fixed-size blocks

use crate::domain::recording::SampleBlock;

/// Accumulates samples until a full block is available.
///
/// A trailing partial block is never emitted.
#[derive(Debug)]
pub struct BlockFramer {
    block_size: usize,
    pending: Vec<f32>,
}

impl BlockFramer {
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            block_size,
            pending: Vec::with_capacity(block_size),
        }
    }

    /// Samples waiting for the next full block
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Feed samples and return every block completed by them
    pub fn push(&mut self, samples: &[f32]) -> Vec<SampleBlock> {
        let mut blocks = Vec::new();
        let mut rest = samples;
        while !rest.is_empty() {
            let take = (self.block_size - self.pending.len()).min(rest.len());
            self.pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.pending.len() == self.block_size {
                let full = std::mem::replace(&mut self.pending, Vec::with_capacity(self.block_size));
                blocks.push(SampleBlock::new(full));
            }
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_only_full_blocks() {
        let mut framer = BlockFramer::new(4);
        assert!(framer.push(&[0.1, 0.2, 0.3]).is_empty());
        let blocks = framer.push(&[0.4, 0.5]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].samples(), &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(framer.pending(), 1);
    }

    #[test]
    fn splits_large_runs() {
        let mut framer = BlockFramer::new(3);
        let blocks = framer.push(&[0.0; 10]);
        assert_eq!(blocks.len(), 3);
        assert_eq!(framer.pending(), 1);
    }
}
