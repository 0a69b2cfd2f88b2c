use strata_geom::{V3i, VoxelArea};

/// Nodes per block edge.
pub const MAP_BLOCKSIZE: i32 = 16;
/// Absolute node coordinate bound on every axis.
pub const MAX_MAP_GENERATION_LIMIT: i32 = 31000;

/// Per-chunk seed, a pure function of the overgeneration origin and map seed.
#[inline]
pub fn block_seed2(p: V3i, seed: i32) -> u32 {
    let n = 1619u32
        .wrapping_mul(p.x as u32)
        .wrapping_add(31337u32.wrapping_mul(p.y as u32))
        .wrapping_add(52591u32.wrapping_mul(p.z as u32))
        .wrapping_add(1013u32.wrapping_mul(seed as u32));
    let n = (n >> 13) ^ n;
    n.wrapping_mul(n.wrapping_mul(n).wrapping_mul(60493).wrapping_add(19_990_303))
        .wrapping_add(1_376_312_589)
}

/// Block containing node `p`.
#[inline]
pub fn node_to_block(p: V3i) -> V3i {
    V3i::new(
        p.x.div_euclid(MAP_BLOCKSIZE),
        p.y.div_euclid(MAP_BLOCKSIZE),
        p.z.div_euclid(MAP_BLOCKSIZE),
    )
}

/// First block of the chunk that contains `blockpos`. Chunk origins are
/// offset by half a chunk so block `(0, 0, 0)` sits near a chunk center.
pub fn containing_chunk(blockpos: V3i, chunksize: i32) -> V3i {
    let coff = -chunksize / 2;
    let off = V3i::splat(coff);
    let rel = blockpos - off;
    V3i::new(
        rel.x.div_euclid(chunksize),
        rel.y.div_euclid(chunksize),
        rel.z.div_euclid(chunksize),
    ) * chunksize
        + off
}

/// Node-space bound sets derived from an inclusive block range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkBounds {
    pub blockpos_min: V3i,
    pub blockpos_max: V3i,
    pub node_min: V3i,
    pub node_max: V3i,
    /// Core box grown by one block of overgeneration on every side.
    pub full_node_min: V3i,
    pub full_node_max: V3i,
}

impl ChunkBounds {
    pub fn from_blocks(blockpos_min: V3i, blockpos_max: V3i) -> Self {
        Self {
            blockpos_min,
            blockpos_max,
            node_min: blockpos_min * MAP_BLOCKSIZE,
            node_max: (blockpos_max + V3i::ONE) * MAP_BLOCKSIZE - V3i::ONE,
            full_node_min: (blockpos_min - V3i::ONE) * MAP_BLOCKSIZE,
            full_node_max: (blockpos_max + V3i::splat(2)) * MAP_BLOCKSIZE - V3i::ONE,
        }
    }

    /// Bounds of the `chunksize`-block chunk starting at `blockpos_min`.
    pub fn for_chunk(blockpos_min: V3i, chunksize: i32) -> Self {
        Self::from_blocks(blockpos_min, blockpos_min + V3i::splat(chunksize - 1))
    }

    #[inline]
    pub fn core(&self) -> VoxelArea {
        VoxelArea::new(self.node_min, self.node_max)
    }

    #[inline]
    pub fn full(&self) -> VoxelArea {
        VoxelArea::new(self.full_node_min, self.full_node_max)
    }

    /// Core footprint size in nodes.
    #[inline]
    pub fn csize(&self) -> V3i {
        self.node_max - self.node_min + V3i::ONE
    }
}
