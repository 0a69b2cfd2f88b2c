use strata_blocks::{BlockRegistry, ContentId};
use strata_chunk::{MapNode, VoxelManip};
use strata_geom::V3i;
use strata_noise::{NoiseParams, PcgRandom, noise_perlin_3d};

use crate::worldgen::{ConfigError, OreDef};

use super::biomes::{BiomeId, BiomeManager};

/// Scatter ore with resolved node ids.
#[derive(Clone, Debug, PartialEq)]
pub struct Ore {
    pub name: String,
    pub c_ore: ContentId,
    pub c_wherein: Vec<ContentId>,
    pub clust_scarcity: u32,
    pub clust_num_ores: u32,
    pub clust_size: i32,
    pub y_min: i32,
    pub y_max: i32,
    pub noise: Option<(NoiseParams, f32)>,
    /// Empty means every biome.
    pub biomes: Vec<BiomeId>,
}

impl Ore {
    /// Places this ore's clusters in `nmin..=nmax`; returns the number of
    /// nodes written.
    #[allow(clippy::too_many_arguments)]
    pub fn generate(
        &self,
        vm: &mut VoxelManip,
        mapseed: i32,
        blockseed: u32,
        nmin: V3i,
        nmax: V3i,
        biomemap: Option<&[BiomeId]>,
    ) -> usize {
        if nmin.y > self.y_max || nmax.y < self.y_min {
            return 0;
        }
        let ymin = nmin.y.max(self.y_min);
        let ymax = nmax.y.min(self.y_max);
        if self.clust_size >= ymax - ymin + 1 {
            return 0;
        }
        let nmin = nmin.with_y(ymin);
        let nmax = nmax.with_y(ymax);

        let mut pr = PcgRandom::new(u64::from(blockseed));
        let volume = (nmax.x - nmin.x + 1) as u64 * (nmax.y - nmin.y + 1) as u64 * (nmax.z - nmin.z + 1) as u64;
        let csize = self.clust_size;
        let cvolume = csize * csize * csize;
        let nclusters = volume / u64::from(self.clust_scarcity.max(1));
        let sizex = nmax.x - nmin.x + 1;

        let mut placed = 0usize;
        for _ in 0..nclusters {
            let x0 = pr.range(nmin.x, nmax.x - csize + 1);
            let y0 = pr.range(nmin.y, nmax.y - csize + 1);
            let z0 = pr.range(nmin.z, nmax.z - csize + 1);

            if let Some((np, threshold)) = &self.noise {
                if noise_perlin_3d(np, x0 as f32, y0 as f32, z0 as f32, mapseed) < *threshold {
                    continue;
                }
            }

            if let Some(map) = biomemap {
                if !self.biomes.is_empty() {
                    let index = (sizex * (z0 - nmin.z) + (x0 - nmin.x)) as usize;
                    if !self.biomes.contains(&map[index]) {
                        continue;
                    }
                }
            }

            for z1 in 0..csize {
                for y1 in 0..csize {
                    for x1 in 0..csize {
                        if pr.range(1, cvolume) > self.clust_num_ores as i32 {
                            continue;
                        }
                        let p = V3i::new(x0 + x1, y0 + y1, z0 + z1);
                        if !vm.area.contains(p) {
                            continue;
                        }
                        let i = vm.area.index_of(p);
                        if self.c_wherein.contains(&vm.data[i].content) {
                            vm.data[i] = MapNode::new(self.c_ore);
                            placed += 1;
                        }
                    }
                }
            }
        }
        placed
    }
}

#[derive(Clone, Debug, Default)]
pub struct OreManager {
    ores: Vec<Ore>,
}

impl OreManager {
    pub fn resolve(
        defs: &[OreDef],
        ndef: &BlockRegistry,
        biomes: &BiomeManager,
    ) -> Result<Self, ConfigError> {
        let id = |name: &str| {
            ndef.id_by_name(name)
                .ok_or_else(|| ConfigError::UnknownNode(name.to_string()))
        };
        let ores = defs
            .iter()
            .map(|def| {
                Ok(Ore {
                    name: def.ore.clone(),
                    c_ore: id(&def.ore)?,
                    c_wherein: def
                        .wherein
                        .iter()
                        .map(|w| id(w))
                        .collect::<Result<_, _>>()?,
                    clust_scarcity: def.clust_scarcity,
                    clust_num_ores: def.clust_num_ores,
                    clust_size: def.clust_size,
                    y_min: def.y_min,
                    y_max: def.y_max,
                    noise: def.noise_params.map(|np| (np, def.noise_threshold)),
                    biomes: def
                        .biomes
                        .iter()
                        .map(|b| {
                            biomes.id_by_name(b).ok_or_else(|| ConfigError::UnknownBiome {
                                kind: "ore",
                                biome: b.clone(),
                            })
                        })
                        .collect::<Result<_, _>>()?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { ores })
    }

    #[inline]
    pub fn ores(&self) -> &[Ore] {
        &self.ores
    }

    /// Runs every ore in registration order. Ore `i` draws from its own
    /// stream seeded with `blockseed + i`.
    pub fn place_all(
        &self,
        vm: &mut VoxelManip,
        mapseed: i32,
        blockseed: u32,
        nmin: V3i,
        nmax: V3i,
        biomemap: Option<&[BiomeId]>,
    ) -> usize {
        let mut nplaced = 0;
        for (i, ore) in self.ores.iter().enumerate() {
            nplaced += ore.generate(vm, mapseed, blockseed.wrapping_add(i as u32), nmin, nmax, biomemap);
        }
        nplaced
    }
}
