//! Ordered buffer of raw capture blocks

use super::sample_block::SampleBlock;

/// Append-only list of sample blocks with a drop flag.
///
/// While the flag is set every offered block is discarded; nothing is
/// buffered for later replay and no gap is filled on resume.
#[derive(Debug, Default)]
pub struct PcmAccumulator {
    blocks: Vec<SampleBlock>,
    sample_count: usize,
    dropped_blocks: usize,
    dropping: bool,
}

impl PcmAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a freshly delivered block. Returns `true` when it was kept.
    pub fn offer(&mut self, block: SampleBlock) -> bool {
        if self.dropping {
            self.dropped_blocks += 1;
            return false;
        }
        self.sample_count += block.len();
        self.blocks.push(block);
        true
    }

    /// Set or clear the drop flag
    pub fn set_dropping(&mut self, dropping: bool) {
        self.dropping = dropping;
    }

    /// Total samples kept so far
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Blocks discarded while the drop flag was set
    pub fn dropped_blocks(&self) -> usize {
        self.dropped_blocks
    }

    /// Kept blocks in arrival order
    pub fn blocks(&self) -> &[SampleBlock] {
        &self.blocks
    }
}
