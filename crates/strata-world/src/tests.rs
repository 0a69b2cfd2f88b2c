use std::sync::Arc;

use strata_blocks::{BlockRegistry, CONTENT_AIR, CONTENT_IGNORE, ContentId};
use strata_chunk::{LiquidQueue, MapNode, VMANIP_FLAG_CAVE, VoxelManip};
use strata_geom::{V3i, VoxelArea};
use strata_noise::{NoiseParams, PseudoRandom, noise_perlin_2d};

use crate::voxel::generation::{
    DungeonGen, DungeonParams, TunnelCarver, dir_to_facedir, rand_ortho_dir, surface_level,
    turn_xz,
};
use crate::voxel::{MAX_MAP_GENERATION_LIMIT, MapgenStage, block_seed2, containing_chunk};
use crate::worldgen::params_from_toml_str;
use crate::{
    BlockMakeData, ChunkBounds, ChunkTiming, ConfigError, MapgenFlags, MapgenV7p, V7pFlags,
    WorldGenParams,
};

fn registry() -> Arc<BlockRegistry> {
    Arc::new(BlockRegistry::builtin().expect("builtin registry"))
}

fn id(reg: &BlockRegistry, name: &str) -> ContentId {
    reg.id_by_name(name).expect(name)
}

/// One-block chunks keep the buffers small.
fn small_params(seed: u64) -> WorldGenParams {
    WorldGenParams {
        seed,
        chunksize: 1,
        ..WorldGenParams::default()
    }
}

/// Terrain and liquid only: no passes that rewrite defined cells.
fn terrain_only(seed: u64, spflags: V7pFlags) -> WorldGenParams {
    WorldGenParams {
        flags: MapgenFlags(0),
        spflags,
        ores: Vec::new(),
        decorations: Vec::new(),
        ..small_params(seed)
    }
}

fn mapgen(params: WorldGenParams) -> MapgenV7p {
    MapgenV7p::new(Arc::new(params), registry()).expect("valid params")
}

fn generate_into(
    mg: &mut MapgenV7p,
    blockpos_min: V3i,
    vm: &mut VoxelManip,
    liquid: &mut LiquidQueue,
) -> ChunkTiming {
    let bounds = ChunkBounds::for_chunk(blockpos_min, mg.params().chunksize);
    let mut data = BlockMakeData {
        blockpos_min,
        blockpos_max: bounds.blockpos_max,
        vmanip: vm,
        transforming_liquid: liquid,
    };
    mg.make_chunk(&mut data)
}

fn generate(mg: &mut MapgenV7p, blockpos_min: V3i) -> (VoxelManip, LiquidQueue, ChunkTiming) {
    let bounds = ChunkBounds::for_chunk(blockpos_min, mg.params().chunksize);
    let mut vm = VoxelManip::new(bounds.full());
    let mut liquid = LiquidQueue::new();
    let timing = generate_into(mg, blockpos_min, &mut vm, &mut liquid);
    (vm, liquid, timing)
}

fn queued(q: &LiquidQueue) -> Vec<V3i> {
    q.iter().copied().collect()
}

#[test]
fn block_seed_depends_only_on_origin_and_seed() {
    let p = V3i::new(-16, 32, 48);
    assert_eq!(block_seed2(p, 7), block_seed2(p, 7));
    assert_ne!(block_seed2(p, 7), block_seed2(p, 8));
    assert_ne!(block_seed2(p, 7), block_seed2(p + V3i::UP, 7));
}

#[test]
fn containing_chunk_centers_origin() {
    assert_eq!(containing_chunk(V3i::ZERO, 5), V3i::splat(-2));
    assert_eq!(containing_chunk(V3i::splat(2), 5), V3i::splat(-2));
    assert_eq!(containing_chunk(V3i::splat(3), 5), V3i::splat(3));
    assert_eq!(containing_chunk(V3i::splat(-3), 5), V3i::splat(-7));
}

#[test]
fn chunk_bounds_add_one_block_of_overgeneration() {
    let b = ChunkBounds::for_chunk(V3i::splat(-2), 5);
    assert_eq!(b.node_min, V3i::splat(-32));
    assert_eq!(b.node_max, V3i::splat(47));
    assert_eq!(b.full_node_min, V3i::splat(-48));
    assert_eq!(b.full_node_max, V3i::splat(63));
    assert_eq!(b.csize(), V3i::splat(80));
}

#[test]
fn generation_is_deterministic_across_instances() {
    let origin = V3i::ZERO;
    let (a, qa, _) = generate(&mut mapgen(small_params(42)), origin);
    let (b, qb, _) = generate(&mut mapgen(small_params(42)), origin);
    assert_eq!(a, b);
    assert_eq!(queued(&qa), queued(&qb));

    // A reused instance carries no state from the previous chunk.
    let mut reused = mapgen(small_params(42));
    generate(&mut reused, V3i::new(1, 0, -1));
    let (c, qc, _) = generate(&mut reused, origin);
    assert_eq!(a, c);
    assert_eq!(queued(&qa), queued(&qc));
}

#[test]
fn different_seeds_give_different_chunks() {
    let (a, _, _) = generate(&mut mapgen(small_params(1)), V3i::ZERO);
    let (b, _, _) = generate(&mut mapgen(small_params(2)), V3i::ZERO);
    assert_ne!(a.data, b.data);
}

#[test]
fn point_and_map_terrain_levels_agree() {
    for seed in [0u64, 7, 123_456] {
        let mut mg = mapgen(small_params(seed));
        for node_min in [V3i::ZERO, V3i::new(-160, 0, 320), V3i::new(1984, 0, -1200)] {
            mg.calc_terrain_noise(node_min);
            let side = mg.csize().x;
            for i in 0..(side * side) as usize {
                let x = node_min.x + i as i32 % side;
                let z = node_min.z + i as i32 / side;

                let map = mg.base_terrain_level_from_map(i);
                let point = mg.base_terrain_level_at_point(x, z);
                assert!(
                    (map - point).abs() <= 0.05 + 1e-3 * point.abs(),
                    "seed {seed} base at ({x},{z}): map {map} point {point}"
                );

                let map = mg.mountain_level_from_map(i);
                let point = mg.mountain_level_at_point(x, z);
                assert!(
                    (map - point).abs() <= 0.05 + 1e-3 * point.abs(),
                    "seed {seed} mountain at ({x},{z}): map {map} point {point}"
                );
            }
        }
    }
}

#[test]
fn surface_level_takes_higher_of_base_and_mountain() {
    assert_eq!(surface_level(3.7, None), 3);
    assert_eq!(surface_level(3.7, Some(10.2)), 10);
    assert_eq!(surface_level(12.9, Some(-40.0)), 12);
    // Truncation, not flooring.
    assert_eq!(surface_level(-0.5, Some(-3.0)), 0);
}

#[test]
fn terrain_never_overwrites_defined_cells() {
    let reg = registry();
    let cobble = id(&reg, "cobble");
    let mut mg = mapgen(terrain_only(9, V7pFlags::MOUNTAINS));
    let origin = V3i::ZERO;
    let bounds = ChunkBounds::for_chunk(origin, 1);

    let mut vm = VoxelManip::new(bounds.full());
    let marked: Vec<V3i> = bounds
        .core()
        .iter()
        .filter(|p| (p.x + 3 * p.y + 5 * p.z) % 17 == 0)
        .collect();
    for p in &marked {
        vm.set(*p, MapNode::new(cobble));
    }
    let mut liquid = LiquidQueue::new();
    generate_into(&mut mg, origin, &mut vm, &mut liquid);
    for p in &marked {
        assert_eq!(vm.content(*p), cobble, "defined cell {p:?} was overwritten");
    }

    // Generating the same chunk over its own output changes nothing.
    let first = vm.clone();
    generate_into(&mut mg, origin, &mut vm, &mut liquid);
    assert_eq!(first, vm);
}

#[test]
fn ridges_skip_deep_chunks() {
    // node_max.y = -33, below water_level - 16, above bedrock.
    let origin = V3i::new(0, -3, 0);
    let mut plain = mapgen(terrain_only(5, V7pFlags::MOUNTAINS));
    let mut ridged = mapgen(terrain_only(5, V7pFlags::DEFAULT));

    let (a, _, ta) = generate(&mut plain, origin);
    let (b, _, tb) = generate(&mut ridged, origin);
    assert!(!ta.ran(MapgenStage::Ridges));
    assert!(tb.ran(MapgenStage::Ridges));
    assert_eq!(a, b);
}

#[test]
fn spawn_level_matches_point_terrain() {
    for spflags in [V7pFlags::DEFAULT, V7pFlags::MOUNTAINS, V7pFlags(0)] {
        let params = WorldGenParams {
            spflags,
            ..WorldGenParams::default()
        };
        let mg = mapgen(params.clone());
        let wl = params.water_level;
        let seed = params.seed_i32();

        for z in (-600..600).step_by(37) {
            for x in (-600..600).step_by(41) {
                let in_river = spflags.contains(V7pFlags::RIDGES)
                    && (noise_perlin_2d(&params.np_ridge_uwater, x as f32, z as f32, seed) * 2.0)
                        .abs()
                        <= 0.2;
                let mountain = spflags
                    .contains(V7pFlags::MOUNTAINS)
                    .then(|| mg.mountain_level_at_point(x, z));
                let h = surface_level(mg.base_terrain_level_at_point(x, z), mountain);

                let expected = (!in_river && h > wl && h <= wl + 16).then_some(h + 2);
                assert_eq!(mg.spawn_level_at_point(x, z), expected, "column ({x},{z}) h={h}");
            }
        }
    }
}

#[test]
fn chunks_at_bedrock_only_fill_bedrock() {
    let reg = registry();
    let bedrock = id(&reg, "bedrock");
    let mut mg = mapgen(small_params(3));
    // node_max.y = -65 <= bedrock_level = -63
    let origin = V3i::new(0, -5, 0);
    let (vm, liquid, timing) = generate(&mut mg, origin);

    assert!(timing.ran(MapgenStage::Bedrock));
    for stage in [
        MapgenStage::Terrain,
        MapgenStage::Ridges,
        MapgenStage::Heightmap,
        MapgenStage::Biomes,
        MapgenStage::Caves,
        MapgenStage::Dungeons,
        MapgenStage::Decorations,
        MapgenStage::Ores,
        MapgenStage::Dust,
        MapgenStage::Liquid,
    ] {
        assert!(!timing.ran(stage), "{stage:?} ran");
    }
    assert!(liquid.is_empty());

    let b = *mg.bounds();
    let columns = VoxelArea::new(b.node_min - V3i::UP, b.node_max + V3i::UP);
    for p in vm.area.iter() {
        let n = vm.get(p);
        if columns.contains(p) {
            assert_eq!(n.content, bedrock, "{p:?}");
        } else {
            assert_eq!(n.content, CONTENT_IGNORE, "{p:?}");
        }
        assert_eq!(n.param1, 0);
    }
}

#[test]
fn seed_zero_chunk_end_to_end() {
    let params = WorldGenParams::default();
    assert_eq!(params.bedrock_level(), -63);
    let wl = params.water_level;
    let seed = params.seed_i32();
    let np_uwater = params.np_ridge_uwater;

    let mut mg = mapgen(params);
    let origin = V3i::new(-2, -3, -2);
    let (vm, liquid, timing) = generate(&mut mg, origin);
    let b = *mg.bounds();
    assert_eq!(b.node_min.y, -48);

    assert!(!timing.ran(MapgenStage::Bedrock));
    for stage in [
        MapgenStage::Terrain,
        MapgenStage::Ridges,
        MapgenStage::Heightmap,
        MapgenStage::Biomes,
        MapgenStage::Ores,
        MapgenStage::Dust,
        MapgenStage::Liquid,
        MapgenStage::Lighting,
    ] {
        assert!(timing.ran(stage), "{stage:?} did not run");
    }
    assert_eq!(vm.count_ignore_in(&b.core()), 0);
    assert!(liquid.iter().all(|p| b.full().contains(*p)));

    let side = mg.csize().x;
    let heightmap = mg.heightmap().to_vec();
    for z in b.node_min.z..=b.node_max.z {
        for x in b.node_min.x..=b.node_max.x {
            let i = ((z - b.node_min.z) * side + (x - b.node_min.x)) as usize;
            let s = surface_level(
                mg.base_terrain_level_from_map(i),
                Some(mg.mountain_level_from_map(i)),
            );

            assert!(heightmap[i] <= s, "heightmap above terrain at ({x},{z})");
            let uwater = (noise_perlin_2d(&np_uwater, x as f32, z as f32, seed) * 2.0).abs();
            if uwater > 0.25 && s >= b.node_min.y {
                assert_eq!(heightmap[i], s.min(b.node_max.y), "heightmap at ({x},{z})");
            }

            // Decorations and dust reach at most five nodes above the surface.
            for y in s.max(wl) + 6..=b.node_max.y {
                let n = vm.get(V3i::new(x, y, z));
                assert_eq!(n.content, CONTENT_AIR, "({x},{y},{z}) above surface {s}");
                assert_eq!(n.light_day(), 15, "({x},{y},{z}) not sunlit");
            }
        }
    }
}

#[test]
fn lighting_flag_controls_light() {
    let params = WorldGenParams {
        flags: MapgenFlags(MapgenFlags::DEFAULT.0 & !MapgenFlags::LIGHT.0),
        ..small_params(11)
    };
    let (vm, _, timing) = generate(&mut mapgen(params), V3i::ZERO);
    assert!(!timing.ran(MapgenStage::Lighting));
    assert!(vm.data.iter().all(|n| n.param1 == 0));
}

#[test]
fn biome_map_is_empty_without_biomes() {
    let params = WorldGenParams {
        flags: MapgenFlags(MapgenFlags::CAVES.0),
        ..small_params(4)
    };
    let mut mg = mapgen(params);
    generate(&mut mg, V3i::ZERO);
    assert!(mg.biomemap().iter().all(|b| *b == crate::voxel::generation::BIOME_NONE));
}

#[test]
fn small_caves_only_replace_ground_content() {
    let reg = registry();
    let stone = id(&reg, "stone");
    let bedrock = id(&reg, "bedrock");
    let nmin = V3i::new(0, -100, 0);
    let nmax = nmin + V3i::splat(15);
    let area = VoxelArea::new(nmin - V3i::splat(16), nmax + V3i::splat(16));
    let mut vm = VoxelManip::new(area);
    for p in area.iter() {
        let c = if p.y % 3 == 0 { bedrock } else { stone };
        vm.set(p, MapNode::new(c));
    }

    let carver = TunnelCarver {
        c_water_source: id(&reg, "water_source"),
        c_lava_source: id(&reg, "lava_source"),
        water_level: 1,
    };
    let mut ps = PseudoRandom::new(1234);
    let mut ps2 = PseudoRandom::new(99);
    for _ in 0..4 {
        carver.make_cave(&mut vm, &reg, nmin, nmax, &mut ps, &mut ps2, false, 0, None);
    }

    let mut carved = 0;
    for p in area.iter() {
        let i = vm.index(p);
        if p.y % 3 == 0 {
            assert_eq!(vm.data[i].content, bedrock, "{p:?}");
        } else if vm.data[i].content == CONTENT_AIR {
            assert_ne!(vm.flags[i] & VMANIP_FLAG_CAVE, 0);
            carved += 1;
        }
    }
    assert!(carved > 0);
}

fn dungeon_params(reg: &BlockRegistry) -> DungeonParams {
    DungeonParams {
        c_wall: id(reg, "cobble"),
        c_alt_wall: id(reg, "mossycobble"),
        c_stair: id(reg, "stair_cobble"),
        num_dungeons: 1,
        num_rooms: 4,
        room_size_min: V3i::new(5, 5, 5),
        room_size_max: V3i::new(8, 6, 8),
        room_size_large_min: V3i::new(8, 6, 8),
        room_size_large_max: V3i::new(12, 8, 12),
        large_room_chance: 0,
        diagonal_dirs: false,
        holesize: V3i::new(1, 2, 1),
        corridor_len_min: 1,
        corridor_len_max: 13,
        np_alt_wall: NoiseParams::new(-0.4, 1.0, [40.0; 3], 7763, 3, 0.5, 2.0),
    }
}

#[test]
fn dungeons_carve_rooms_and_preserve_liquids_and_air() {
    let reg = registry();
    let stone = id(&reg, "stone");
    let water = id(&reg, "water_source");
    let area = VoxelArea::new(V3i::ZERO, V3i::splat(63));
    let mut vm = VoxelManip::new(area);
    for p in area.iter() {
        let c = if p.y >= 56 {
            CONTENT_AIR
        } else if p.x < 4 {
            water
        } else {
            stone
        };
        vm.set(p, MapNode::new(c));
    }
    let before = vm.clone();

    let dp = dungeon_params(&reg);
    let (c_wall, c_alt) = (dp.c_wall, dp.c_alt_wall);
    DungeonGen::new(&reg, dp).generate(&mut vm, 0xdead_beef, area.min, area.max);

    let mut walls = 0;
    let mut opened = 0;
    for (old, new) in before.data.iter().zip(&vm.data) {
        if old.content != stone {
            assert_eq!(old.content, new.content);
            continue;
        }
        if new.content == c_wall || new.content == c_alt {
            walls += 1;
        } else if new.content == CONTENT_AIR {
            opened += 1;
        }
    }
    assert!(walls > 0 && opened > 0, "walls {walls} opened {opened}");
}

#[test]
fn dungeon_direction_helpers() {
    let east = V3i::new(1, 0, 0);
    assert_eq!(turn_xz(east, 0), V3i::new(0, 0, -1));
    assert_eq!(turn_xz(east, 1), V3i::new(0, 0, 1));
    assert_eq!(turn_xz(turn_xz(east, 0), 1), east);

    assert_eq!(dir_to_facedir(V3i::new(0, 0, 1)), 0);
    assert_eq!(dir_to_facedir(V3i::new(1, 0, 0)), 1);
    assert_eq!(dir_to_facedir(V3i::new(0, 0, -1)), 2);
    assert_eq!(dir_to_facedir(V3i::new(-1, 0, 0)), 3);

    let mut r = PseudoRandom::new(77);
    for _ in 0..200 {
        let d = rand_ortho_dir(&mut r, false);
        assert_eq!(d.y, 0);
        assert_eq!(d.x.abs() + d.z.abs(), 1, "{d:?}");
    }
}

#[test]
fn default_params_validate() {
    let params = WorldGenParams::default();
    params.validate().expect("defaults are valid");
    assert_eq!(params.chunksize, 5);
    assert_eq!(params.water_level, 1);
    assert_eq!(params.mapgen_limit, MAX_MAP_GENERATION_LIMIT);
    assert!(params.flags.contains(MapgenFlags::DEFAULT));
    assert!(params.spflags.contains(V7pFlags::MOUNTAINS));
    assert!(params.spflags.contains(V7pFlags::RIDGES));
}

#[test]
fn degenerate_noise_is_rejected() {
    let mut params = WorldGenParams::default();
    params.np_ridge.spread[1] = 0.0;
    assert!(matches!(
        params.validate(),
        Err(ConfigError::Noise { ref channel, .. }) if channel == "np_ridge"
    ));

    let mut params = WorldGenParams::default();
    params.np_terrain_base.lacunarity = 0.0;
    assert!(matches!(params.validate(), Err(ConfigError::Noise { .. })));

    let params = WorldGenParams {
        chunksize: 0,
        ..WorldGenParams::default()
    };
    assert!(matches!(params.validate(), Err(ConfigError::ChunkSize(0))));
    assert!(MapgenV7p::new(Arc::new(params), registry()).is_err());
}

#[test]
fn unknown_references_are_rejected() {
    let mut params = WorldGenParams::default();
    if let Some(ore) = params.ores.first_mut() {
        ore.biomes = vec!["atlantis".into()];
        assert!(matches!(
            params.validate(),
            Err(ConfigError::UnknownBiome { kind: "ore", .. })
        ));
    }

    let params = WorldGenParams {
        dungeon_wall: "no_such_node".into(),
        ..WorldGenParams::default()
    };
    assert!(matches!(
        MapgenV7p::new(Arc::new(params), registry()),
        Err(ConfigError::UnknownNode(ref n)) if n == "no_such_node"
    ));
}

#[test]
fn too_many_biomes_are_rejected() {
    let mut params = WorldGenParams::default();
    let template = params.biomes[0].clone();
    params.biomes = (0..256)
        .map(|i| {
            let mut b = template.clone();
            b.name = format!("biome_{i}");
            b
        })
        .collect();
    params.ores.clear();
    params.decorations.clear();
    assert!(matches!(params.validate(), Err(ConfigError::TooManyBiomes(256))));
}

#[test]
fn toml_flags_override_defaults() {
    let params = params_from_toml_str(
        r#"
        [mapgen]
        seed = 99
        water_level = 4
        flags = "nodungeons, nolight"

        [v7p]
        spflags = "noridges"
        "#,
    )
    .expect("valid config");
    assert_eq!(params.seed, 99);
    assert_eq!(params.water_level, 4);
    assert_eq!(params.bedrock_level(), -60);
    assert!(params.flags.contains(MapgenFlags::CAVES));
    assert!(!params.flags.contains(MapgenFlags::DUNGEONS));
    assert!(!params.flags.contains(MapgenFlags::LIGHT));
    assert!(params.spflags.contains(V7pFlags::MOUNTAINS));
    assert!(!params.spflags.contains(V7pFlags::RIDGES));
    assert_eq!(params.biomes.len(), WorldGenParams::default().biomes.len());
}

#[test]
fn config_round_trips_through_flag_strings() {
    let params = WorldGenParams {
        flags: MapgenFlags(MapgenFlags::CAVES.0 | MapgenFlags::BIOMES.0),
        spflags: V7pFlags::RIDGES,
        ..WorldGenParams::default()
    };
    let back = WorldGenParams::from_config(&params.to_config()).expect("round trip");
    assert_eq!(back.flags, params.flags);
    assert_eq!(back.spflags, params.spflags);
    assert_eq!(back.np_mountain, params.np_mountain);
}

#[test]
fn timing_lists_stages_in_order() {
    let (_, _, timing) = generate(&mut mapgen(small_params(8)), V3i::ZERO);
    let stages: Vec<MapgenStage> = timing.iter().map(|(s, _)| s).collect();
    let mut sorted = stages.clone();
    sorted.sort_by_key(|s| s.index());
    assert_eq!(stages, sorted);
    assert_eq!(stages.first(), Some(&MapgenStage::Terrain));
    assert_eq!(stages.last(), Some(&MapgenStage::Lighting));
    assert!(timing.to_string().starts_with("total="));
}
