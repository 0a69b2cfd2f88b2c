use strata_blocks::{BlockRegistry, CONTENT_AIR, CONTENT_IGNORE, ContentId};
use strata_chunk::{MapNode, VoxelManip};
use strata_geom::V3i;
use strata_noise::{NoiseParams, PcgRandom, noise_perlin_2d};

use crate::worldgen::{ConfigError, DecorationDef};

use super::biomes::{BiomeId, BiomeManager};

/// Density at or above which a division is covered completely.
const FULL_COVER_DENSITY: f32 = 10.0;

/// Simple column decoration with resolved node ids.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
    pub c_place_on: Vec<ContentId>,
    pub c_decos: Vec<ContentId>,
    pub sidelen: i32,
    pub fill_ratio: f32,
    pub noise: Option<NoiseParams>,
    /// Empty means every biome.
    pub biomes: Vec<BiomeId>,
    pub y_min: i32,
    pub y_max: i32,
    pub height: i32,
    pub height_max: i32,
}

impl Decoration {
    /// Scatters this decoration over the core footprint, division by
    /// division. Returns the number of columns placed.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &self,
        vm: &mut VoxelManip,
        mapseed: i32,
        blockseed: u32,
        nmin: V3i,
        nmax: V3i,
        heightmap: &[i32],
        biomemap: Option<&[BiomeId]>,
    ) -> usize {
        let mut ps = PcgRandom::new(u64::from(blockseed.wrapping_add(53)));
        let carea_size = nmax.x - nmin.x + 1;

        let sidelen = if self.sidelen <= 0 || carea_size % self.sidelen != 0 {
            carea_size
        } else {
            self.sidelen
        };
        let divlen = carea_size / sidelen;
        let area = sidelen * sidelen;

        let mut placed = 0usize;
        for z0 in 0..divlen {
            for x0 in 0..divlen {
                let center_x = nmin.x + sidelen / 2 + sidelen * x0;
                let center_z = nmin.z + sidelen / 2 + sidelen * z0;
                let min_x = nmin.x + sidelen * x0;
                let min_z = nmin.z + sidelen * z0;
                let max_x = min_x + sidelen - 1;
                let max_z = min_z + sidelen - 1;

                let nval = match &self.noise {
                    Some(np) => noise_perlin_2d(np, center_x as f32, center_z as f32, mapseed),
                    None => self.fill_ratio,
                };

                let mut cover = false;
                let mut deco_count = 0u32;
                if nval >= FULL_COVER_DENSITY {
                    cover = true;
                    deco_count = area as u32;
                } else {
                    let deco_count_f = area as f32 * nval;
                    if deco_count_f >= 1.0 {
                        deco_count = deco_count_f as u32;
                    } else if deco_count_f > 0.0 && ps.range_u32(1000) as f32 <= deco_count_f * 1000.0 {
                        deco_count = 1;
                    }
                }

                let mut x = min_x - 1;
                let mut z = min_z;
                for _ in 0..deco_count {
                    if cover {
                        x += 1;
                        if x == max_x + 1 {
                            z += 1;
                            x = min_x;
                        }
                    } else {
                        x = ps.range(min_x, max_x);
                        z = ps.range(min_z, max_z);
                    }

                    let mapindex = (carea_size * (z - nmin.z) + (x - nmin.x)) as usize;
                    let y = heightmap[mapindex];
                    if y < self.y_min || y > self.y_max || y < nmin.y || y > nmax.y {
                        continue;
                    }
                    if let Some(map) = biomemap {
                        if !self.biomes.is_empty() && !self.biomes.contains(&map[mapindex]) {
                            continue;
                        }
                    }

                    if self.generate(vm, &mut ps, V3i::new(x, y, z)) {
                        placed += 1;
                    }
                }
            }
        }
        placed
    }

    fn generate(&self, vm: &mut VoxelManip, ps: &mut PcgRandom, p: V3i) -> bool {
        if self.c_decos.is_empty() || !self.c_place_on.contains(&vm.content(p)) {
            return false;
        }
        if p.y + self.height.max(self.height_max) > vm.area.max.y || p.y + 1 > vm.area.max.y {
            return false;
        }

        let c_place = self.c_decos[ps.range(0, self.c_decos.len() as i32 - 1) as usize];
        let height = if self.height_max > 0 {
            ps.range(self.height, self.height_max)
        } else {
            self.height
        };

        let mut vi = vm.area.index_of(p);
        for _ in 0..height {
            vi = vm.area.add_y(vi, 1);
            let c = vm.data[vi].content;
            if c != CONTENT_AIR && c != CONTENT_IGNORE {
                break;
            }
            vm.data[vi] = MapNode::new(c_place);
        }
        true
    }
}

#[derive(Clone, Debug, Default)]
pub struct DecorationManager {
    decos: Vec<Decoration>,
}

impl DecorationManager {
    pub fn resolve(
        defs: &[DecorationDef],
        ndef: &BlockRegistry,
        biomes: &BiomeManager,
    ) -> Result<Self, ConfigError> {
        let ids = |names: &[String]| {
            names
                .iter()
                .map(|n| {
                    ndef.id_by_name(n)
                        .ok_or_else(|| ConfigError::UnknownNode(n.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };
        let mut decos = Vec::with_capacity(defs.len());
        for def in defs {
            let biome_ids = def
                .biomes
                .iter()
                .map(|b| {
                    biomes.id_by_name(b).ok_or_else(|| ConfigError::UnknownBiome {
                        kind: "decoration",
                        biome: b.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            decos.push(Decoration {
                c_place_on: ids(&def.place_on)?,
                c_decos: ids(&def.decoration)?,
                sidelen: def.sidelen,
                fill_ratio: def.fill_ratio,
                noise: def.noise_params,
                biomes: biome_ids,
                y_min: def.y_min,
                y_max: def.y_max,
                height: def.height,
                height_max: def.height_max,
            });
        }
        Ok(Self { decos })
    }

    #[inline]
    pub fn decorations(&self) -> &[Decoration] {
        &self.decos
    }

    /// Places every decoration; decoration `i` is seeded from `blockseed + i`.
    #[allow(clippy::too_many_arguments)]
    pub fn place_all(
        &self,
        vm: &mut VoxelManip,
        mapseed: i32,
        blockseed: u32,
        nmin: V3i,
        nmax: V3i,
        heightmap: &[i32],
        biomemap: Option<&[BiomeId]>,
    ) -> usize {
        let mut nplaced = 0;
        for (i, deco) in self.decos.iter().enumerate() {
            nplaced += deco.place(
                vm,
                mapseed,
                blockseed.wrapping_add(i as u32),
                nmin,
                nmax,
                heightmap,
                biomemap,
            );
        }
        nplaced
    }
}
