mod chunk_coord;
mod gen_ctx;
pub mod generation;

pub use chunk_coord::{
    ChunkBounds, MAP_BLOCKSIZE, MAX_MAP_GENERATION_LIMIT, block_seed2, containing_chunk,
    node_to_block,
};
pub use gen_ctx::{
    ChunkTiming, MAPGEN_STAGE_COUNT, MAPGEN_STAGE_LABELS, MapgenStage, StageProfiler,
};
pub use generation::{BlockMakeData, MapgenNodes, MapgenV7p, find_ground_level};
