use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use strata_blocks::BlockRegistry;
use strata_chunk::{LiquidQueue, VoxelManip};
use strata_geom::V3i;
use strata_world::{BlockMakeData, ChunkBounds, MapgenV7p, WorldGenParams};

fn bench_make_chunk(c: &mut Criterion) {
    let reg = Arc::new(BlockRegistry::builtin().expect("builtin registry"));
    let params = Arc::new(WorldGenParams::default());
    let mut mg = MapgenV7p::new(params.clone(), reg).expect("default params");
    let blockpos_min = V3i::splat(-2);
    let bounds = ChunkBounds::for_chunk(blockpos_min, params.chunksize);

    c.bench_function("make_chunk_surface_80", |b| {
        b.iter(|| {
            let mut vm = VoxelManip::new(bounds.full());
            let mut liquid = LiquidQueue::new();
            let mut data = BlockMakeData {
                blockpos_min,
                blockpos_max: bounds.blockpos_max,
                vmanip: &mut vm,
                transforming_liquid: &mut liquid,
            };
            black_box(mg.make_chunk(&mut data));
            black_box(vm.data.len())
        })
    });

    c.bench_function("spawn_level_at_point_x256", |b| {
        b.iter(|| {
            let mut found = 0;
            for z in 0..16 {
                for x in 0..16 {
                    if mg.spawn_level_at_point(black_box(x * 97), black_box(z * 89)).is_some() {
                        found += 1;
                    }
                }
            }
            black_box(found)
        })
    });
}

criterion_group!(benches, bench_make_chunk);
criterion_main!(benches);
