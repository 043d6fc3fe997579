//! Artifact storage adapters

mod memory;

pub use memory::MemoryArtifactStore;
