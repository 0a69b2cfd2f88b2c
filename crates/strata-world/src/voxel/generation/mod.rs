mod biomes;
mod caves;
mod decorations;
mod dungeons;
mod ores;
mod surface;
mod terrain;
mod water;

use std::sync::Arc;
use std::time::Instant;

use strata_blocks::{BlockRegistry, CONTENT_IGNORE, ContentId};
use strata_chunk::{LiquidQueue, VoxelManip};
use strata_geom::V3i;
use strata_noise::Noise;

use crate::worldgen::{ConfigError, MapgenFlags, V7pFlags, WorldGenParams};

use super::chunk_coord::{ChunkBounds, MAP_BLOCKSIZE, MAX_MAP_GENERATION_LIMIT, block_seed2};
use super::gen_ctx::{ChunkTiming, MapgenStage, StageProfiler};

pub use self::biomes::{BIOME_NONE, Biome, BiomeGen, BiomeId, BiomeManager};
pub use self::caves::TunnelCarver;
pub use self::decorations::{Decoration, DecorationManager};
pub use self::dungeons::{DungeonGen, DungeonParams, dir_to_facedir, rand_ortho_dir, turn_xz};
pub use self::ores::{Ore, OreManager};
pub use self::terrain::{TerrainChannel, base_terrain_level, mountain_level, surface_level};

/// One chunk generation request. `vmanip` must cover the full
/// overgeneration bounds of the block range.
pub struct BlockMakeData<'a> {
    pub blockpos_min: V3i,
    pub blockpos_max: V3i,
    pub vmanip: &'a mut VoxelManip,
    pub transforming_liquid: &'a mut LiquidQueue,
}

/// Content ids the mapgen writes directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapgenNodes {
    pub c_stone: ContentId,
    pub c_water_source: ContentId,
    pub c_lava_source: ContentId,
    pub c_bedrock: ContentId,
    pub c_cobble: ContentId,
    pub c_mossycobble: ContentId,
    pub c_stair_cobble: ContentId,
}

impl MapgenNodes {
    pub fn resolve(ndef: &BlockRegistry, params: &WorldGenParams) -> Result<Self, ConfigError> {
        let id = |name: &str| {
            ndef.id_by_name(name)
                .ok_or_else(|| ConfigError::UnknownNode(name.to_string()))
        };
        Ok(Self {
            c_stone: id("stone")?,
            c_water_source: id("water_source")?,
            c_lava_source: id("lava_source")?,
            c_bedrock: id("bedrock")?,
            c_cobble: id(&params.dungeon_wall)?,
            c_mossycobble: id(&params.dungeon_alt_wall)?,
            c_stair_cobble: id(&params.dungeon_stair)?,
        })
    }
}

/// Topmost walkable node of column `(x, z)` within `ymin..=ymax`, or
/// `-MAX_MAP_GENERATION_LIMIT` if there is none.
pub fn find_ground_level(
    vm: &VoxelManip,
    ndef: &BlockRegistry,
    x: i32,
    z: i32,
    ymin: i32,
    ymax: i32,
) -> i32 {
    (ymin..=ymax)
        .rev()
        .find(|y| ndef.get(vm.content(V3i::new(x, *y, z))).walkable)
        .unwrap_or(-MAX_MAP_GENERATION_LIMIT)
}

/// V7P terrain generator. One instance serves one thread at a time: its
/// noise buffers, heightmap and biome map are rewritten by every chunk.
pub struct MapgenV7p {
    params: Arc<WorldGenParams>,
    ndef: Arc<BlockRegistry>,
    nodes: MapgenNodes,
    seed: i32,
    water_level: i32,
    bedrock_level: i32,
    flags: MapgenFlags,
    spflags: V7pFlags,
    csize: V3i,
    small_caves_count: u32,

    noise_terrain_base: Noise,
    noise_terrain_alt: Noise,
    noise_terrain_persist: Noise,
    noise_height_select: Noise,
    noise_filler_depth: Noise,
    noise_mount_height: Noise,
    noise_ridge_uwater: Noise,
    noise_mountain: Noise,
    noise_ridge: Noise,

    biomes: BiomeManager,
    biomegen: BiomeGen,
    ores: OreManager,
    decorations: DecorationManager,

    heightmap: Vec<i32>,
    biomemap: Vec<BiomeId>,
    bounds: ChunkBounds,
    blockseed: u32,
    profiler: StageProfiler,
}

impl MapgenV7p {
    pub fn new(params: Arc<WorldGenParams>, ndef: Arc<BlockRegistry>) -> Result<Self, ConfigError> {
        params.validate()?;
        let nodes = MapgenNodes::resolve(&ndef, &params)?;
        let biomes = BiomeManager::resolve(&params.biomes, &nodes, &ndef)?;
        let ores = OreManager::resolve(&params.ores, &ndef, &biomes)?;
        let decorations = DecorationManager::resolve(&params.decorations, &ndef, &biomes)?;

        let seed = params.seed_i32();
        let side = params.chunksize * MAP_BLOCKSIZE;
        let csize = V3i::splat(side);
        let (sx, sz) = (csize.x as u32, csize.z as u32);
        let area2d = (csize.x * csize.z) as usize;
        let noise2d = |np| Noise::new_2d(np, seed, sx, sz);

        Ok(Self {
            nodes,
            seed,
            water_level: params.water_level,
            bedrock_level: params.bedrock_level(),
            flags: params.flags,
            spflags: params.spflags,
            csize,
            small_caves_count: (6 * csize.x * csize.z * MAP_BLOCKSIZE / 50000) as u32,
            noise_terrain_base: noise2d(params.np_terrain_base),
            noise_terrain_alt: noise2d(params.np_terrain_alt),
            noise_terrain_persist: noise2d(params.np_terrain_persist),
            noise_height_select: noise2d(params.np_height_select),
            noise_filler_depth: noise2d(params.np_filler_depth),
            noise_mount_height: noise2d(params.np_mount_height),
            noise_ridge_uwater: noise2d(params.np_ridge_uwater),
            noise_mountain: noise2d(params.np_mountain),
            noise_ridge: noise2d(params.np_ridge),
            biomegen: BiomeGen::new(&params, seed, csize),
            biomes,
            ores,
            decorations,
            heightmap: vec![-MAX_MAP_GENERATION_LIMIT; area2d],
            biomemap: vec![BIOME_NONE; area2d],
            bounds: ChunkBounds::for_chunk(V3i::ZERO, params.chunksize),
            blockseed: 0,
            profiler: StageProfiler::default(),
            params,
            ndef,
        })
    }

    #[inline]
    pub fn params(&self) -> &Arc<WorldGenParams> {
        &self.params
    }

    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.ndef
    }

    #[inline]
    pub fn nodes(&self) -> &MapgenNodes {
        &self.nodes
    }

    #[inline]
    pub fn biome_manager(&self) -> &BiomeManager {
        &self.biomes
    }

    #[inline]
    pub fn water_level(&self) -> i32 {
        self.water_level
    }

    #[inline]
    pub fn bedrock_level(&self) -> i32 {
        self.bedrock_level
    }

    /// Core chunk size in nodes.
    #[inline]
    pub fn csize(&self) -> V3i {
        self.csize
    }

    /// Bounds of the last generated chunk.
    #[inline]
    pub fn bounds(&self) -> &ChunkBounds {
        &self.bounds
    }

    #[inline]
    pub fn blockseed(&self) -> u32 {
        self.blockseed
    }

    /// Surface height per column of the last chunk, `(z, x)` row-major.
    #[inline]
    pub fn heightmap(&self) -> &[i32] {
        &self.heightmap
    }

    /// Biome per column of the last chunk; [`BIOME_NONE`] where no stone surface was found.
    #[inline]
    pub fn biomemap(&self) -> &[BiomeId] {
        &self.biomemap
    }

    #[inline]
    fn index2d(&self, x: i32, z: i32) -> usize {
        ((z - self.bounds.node_min.z) * self.csize.x + (x - self.bounds.node_min.x)) as usize
    }

    /// Generates one chunk into `data.vmanip`.
    ///
    /// # Panics
    /// If the buffer does not cover the full overgeneration bounds or the
    /// block range does not match the configured chunk size.
    pub fn make_chunk(&mut self, data: &mut BlockMakeData<'_>) -> ChunkTiming {
        let bounds = ChunkBounds::from_blocks(data.blockpos_min, data.blockpos_max);
        assert_eq!(
            bounds.csize(),
            self.csize,
            "block range {:?}..={:?} does not match chunksize {}",
            data.blockpos_min,
            data.blockpos_max,
            self.params.chunksize
        );
        assert!(
            data.vmanip.area.contains_area(&bounds.full()),
            "voxel buffer {:?} does not cover {:?}",
            data.vmanip.area,
            bounds.full()
        );

        self.bounds = bounds;
        self.blockseed = block_seed2(bounds.full_node_min, self.seed);
        self.profiler.reset();
        let vm = &mut *data.vmanip;

        if bounds.node_max.y <= self.bedrock_level {
            self.run_stage(MapgenStage::Bedrock, |mg| mg.generate_bedrock(vm));
        } else {
            let stone_surface_max_y =
                self.run_stage(MapgenStage::Terrain, |mg| mg.generate_terrain(vm));

            if self.spflags.contains(V7pFlags::RIDGES) {
                self.run_stage(MapgenStage::Ridges, |mg| mg.generate_ridge_terrain(vm));
            }

            self.run_stage(MapgenStage::Heightmap, |mg| {
                mg.update_heightmap(vm, bounds.node_min, bounds.node_max)
            });

            if self.flags.contains(MapgenFlags::BIOMES) {
                self.run_stage(MapgenStage::Biomes, |mg| {
                    mg.biomegen.calc_biome_noise(bounds.node_min);
                    mg.generate_biomes(vm);
                });
            } else {
                self.biomemap.fill(BIOME_NONE);
            }

            if self.flags.contains(MapgenFlags::CAVES) {
                let large_cave_depth = self.water_level;
                self.run_stage(MapgenStage::Caves, |mg| {
                    mg.generate_caves(vm, stone_surface_max_y, large_cave_depth)
                });
            }

            if self.flags.contains(MapgenFlags::DUNGEONS) {
                self.run_stage(MapgenStage::Dungeons, |mg| {
                    mg.generate_dungeons(vm, stone_surface_max_y)
                });
            }

            if self.flags.contains(MapgenFlags::DECORATIONS) {
                self.run_stage(MapgenStage::Decorations, |mg| {
                    let biomemap = mg.flags.contains(MapgenFlags::BIOMES).then_some(&mg.biomemap[..]);
                    mg.decorations.place_all(
                        vm,
                        mg.seed,
                        mg.blockseed,
                        bounds.node_min,
                        bounds.node_max,
                        &mg.heightmap,
                        biomemap,
                    )
                });
            }

            self.run_stage(MapgenStage::Ores, |mg| {
                let biomemap = mg.flags.contains(MapgenFlags::BIOMES).then_some(&mg.biomemap[..]);
                mg.ores.place_all(
                    vm,
                    mg.seed,
                    mg.blockseed,
                    bounds.node_min,
                    bounds.node_max,
                    biomemap,
                )
            });

            self.run_stage(MapgenStage::Dust, |mg| mg.dust_top_nodes(vm));

            let queue = &mut *data.transforming_liquid;
            self.run_stage(MapgenStage::Liquid, |mg| {
                mg.update_liquid(vm, queue, bounds.full_node_min, bounds.full_node_max)
            });
        }

        if self.flags.contains(MapgenFlags::LIGHT) {
            let core = strata_geom::VoxelArea::new(
                bounds.node_min - V3i::UP,
                bounds.node_max + V3i::UP,
            );
            self.run_stage(MapgenStage::Lighting, |mg| {
                strata_lighting::calc_lighting(vm, &mg.ndef, core, bounds.full(), mg.water_level, true)
            });
        }

        let timing = self.profiler.snapshot();
        log::debug!(
            "chunk {:?}..={:?} blockseed={:#010x} {}",
            bounds.node_min,
            bounds.node_max,
            self.blockseed,
            timing
        );
        timing
    }

    fn run_stage<R>(&mut self, stage: MapgenStage, f: impl FnOnce(&mut Self) -> R) -> R {
        self.profiler.begin_stage(stage);
        let stage_start = Instant::now();
        let out = f(self);
        self.profiler
            .record_stage_duration(stage, stage_start.elapsed());
        out
    }

    /// Records the topmost walkable node of every core column.
    pub fn update_heightmap(&mut self, vm: &VoxelManip, nmin: V3i, nmax: V3i) {
        let mut index = 0usize;
        for z in nmin.z..=nmax.z {
            for x in nmin.x..=nmax.x {
                self.heightmap[index] = find_ground_level(vm, &self.ndef, x, z, nmin.y, nmax.y);
                index += 1;
            }
        }
    }

    /// Writes bedrock into every still-undefined cell of the core columns,
    /// one node past the core vertically.
    pub fn generate_bedrock(&mut self, vm: &mut VoxelManip) {
        let (nmin, nmax) = (self.bounds.node_min, self.bounds.node_max);
        let c_bedrock = self.nodes.c_bedrock;
        for z in nmin.z..=nmax.z {
            for y in nmin.y - 1..=nmax.y + 1 {
                let mut vi = vm.area.index(nmin.x, y, z);
                for _ in nmin.x..=nmax.x {
                    if vm.data[vi].content == CONTENT_IGNORE {
                        vm.data[vi].content = c_bedrock;
                    }
                    vi += 1;
                }
            }
        }
    }
}
