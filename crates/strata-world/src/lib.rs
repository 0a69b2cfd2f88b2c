//! V7P terrain generation: configuration, per-chunk generator and spawn queries.
#![forbid(unsafe_code)]

pub mod worldgen;
pub mod voxel;

pub use voxel::{BlockMakeData, ChunkBounds, ChunkTiming, MapgenV7p};
pub use worldgen::{ConfigError, MapgenFlags, V7pFlags, WorldGenConfig, WorldGenParams};

#[cfg(test)]
mod tests;
