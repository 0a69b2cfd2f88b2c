use hashbrown::HashMap;
use strata_blocks::CONTENT_IGNORE;
use strata_chunk::{LiquidQueue, MapNode, VoxelManip};
use strata_geom::V3i;
use strata_noise::PseudoRandom;
use strata_world::voxel::{containing_chunk, node_to_block};
use strata_world::{BlockMakeData, ChunkBounds, MapgenV7p};

/// Candidate columns tried before giving up.
pub const SPAWN_TRIES: i32 = 4000;

/// Nodes searched upward from the spawn level of a candidate.
const SPAWN_CLIMB: i32 = 8;

/// Searches for a standable position near the origin: a suitable column
/// whose spawn level has two empty nodes stacked above ground. Chunks are
/// generated on demand and kept for the duration of the search.
///
/// Returns the lower empty node, or the origin if nothing was found.
pub fn find_spawn_pos(mg: &mut MapgenV7p) -> V3i {
    let params = mg.params().clone();
    let range_max = params.mapgen_limit.max(1);
    let mut rng = PseudoRandom::new(params.seed_i32());
    let mut chunks = ChunkCache::default();

    for i in 0..SPAWN_TRIES {
        let range = (1 + i).min(range_max);
        let x = -range + rng.next() % (range * 2);
        let z = -range + rng.next() % (range * 2);

        let Some(level) = mg.spawn_level_at_point(x, z) else {
            continue;
        };

        let mut p = V3i::new(x, level, z);
        let mut air_count = 0;
        for _ in 0..SPAWN_CLIMB {
            let node = chunks.node(mg, p);
            if node.content == CONTENT_IGNORE || mg.registry().get(node.content).is_airlike() {
                air_count += 1;
                if air_count >= 2 {
                    let spawn = p.with_y(p.y - 1);
                    if within_limit(spawn, params.mapgen_limit) {
                        log::info!(
                            "spawn found at {:?} after {} candidates, {} chunks generated",
                            spawn,
                            i + 1,
                            chunks.len()
                        );
                        return spawn;
                    }
                    break;
                }
            } else {
                air_count = 0;
            }
            p.y += 1;
        }
    }

    log::warn!("no suitable spawn found in {SPAWN_TRIES} candidates, using origin");
    V3i::ZERO
}

fn within_limit(p: V3i, limit: i32) -> bool {
    p.x.abs() <= limit && p.y.abs() <= limit && p.z.abs() <= limit
}

/// Generated chunks keyed by their minimum block position.
#[derive(Default)]
struct ChunkCache {
    chunks: HashMap<V3i, VoxelManip>,
}

impl ChunkCache {
    fn len(&self) -> usize {
        self.chunks.len()
    }

    fn node(&mut self, mg: &mut MapgenV7p, p: V3i) -> MapNode {
        let chunksize = mg.params().chunksize;
        let key = containing_chunk(node_to_block(p), chunksize);
        let vm = self.chunks.entry(key).or_insert_with(|| {
            let bounds = ChunkBounds::for_chunk(key, chunksize);
            let mut vm = VoxelManip::new(bounds.full());
            let mut liquid = LiquidQueue::new();
            let mut data = BlockMakeData {
                blockpos_min: bounds.blockpos_min,
                blockpos_max: bounds.blockpos_max,
                vmanip: &mut vm,
                transforming_liquid: &mut liquid,
            };
            mg.make_chunk(&mut data);
            vm
        });
        vm.get(p)
    }
}
