use strata_blocks::{BlockRegistry, CONTENT_AIR, ContentId};
use strata_chunk::{MapNode, VoxelManip};
use strata_geom::V3i;
use strata_noise::{Noise, noise_perlin_2d};

use crate::voxel::MAX_MAP_GENERATION_LIMIT;
use crate::worldgen::{BiomeDef, ConfigError, WorldGenParams};

use super::{MapgenNodes, MapgenV7p};

pub type BiomeId = u8;

/// Id of the fallback biome; also marks columns without a stone surface.
pub const BIOME_NONE: BiomeId = 0;

/// Column fill count meaning "no more top or filler nodes here".
const NPLACED_DONE: u16 = u16::MAX;

/// A biome with its node names resolved to content ids.
#[derive(Clone, Debug, PartialEq)]
pub struct Biome {
    pub id: BiomeId,
    pub name: String,
    pub c_dust: Option<ContentId>,
    pub c_top: ContentId,
    pub c_filler: ContentId,
    pub c_stone: ContentId,
    pub c_water_top: ContentId,
    pub c_water: ContentId,
    pub depth_top: i32,
    pub depth_filler: i32,
    pub depth_water_top: i32,
    pub y_min: i32,
    pub y_max: i32,
    pub heat_point: f32,
    pub humidity_point: f32,
}

impl Biome {
    /// Plain stone and water everywhere; chosen when no configured biome fits.
    fn fallback(nodes: &MapgenNodes) -> Self {
        Self {
            id: BIOME_NONE,
            name: "none".into(),
            c_dust: None,
            c_top: nodes.c_stone,
            c_filler: nodes.c_stone,
            c_stone: nodes.c_stone,
            c_water_top: nodes.c_water_source,
            c_water: nodes.c_water_source,
            depth_top: 0,
            depth_filler: -MAX_MAP_GENERATION_LIMIT,
            depth_water_top: 0,
            y_min: -MAX_MAP_GENERATION_LIMIT,
            y_max: MAX_MAP_GENERATION_LIMIT,
            heat_point: 0.0,
            humidity_point: 0.0,
        }
    }
}

/// Resolved biome table. Index 0 is the fallback biome; configured biomes
/// follow in definition order.
#[derive(Clone, Debug)]
pub struct BiomeManager {
    biomes: Vec<Biome>,
}

impl BiomeManager {
    pub fn resolve(
        defs: &[BiomeDef],
        nodes: &MapgenNodes,
        ndef: &BlockRegistry,
    ) -> Result<Self, ConfigError> {
        if defs.len() > BiomeId::MAX as usize {
            return Err(ConfigError::TooManyBiomes(defs.len()));
        }
        let node = |name: &Option<String>, fallback: ContentId| match name {
            Some(n) => ndef
                .id_by_name(n)
                .ok_or_else(|| ConfigError::UnknownNode(n.clone())),
            None => Ok(fallback),
        };

        let mut biomes = Vec::with_capacity(defs.len() + 1);
        biomes.push(Biome::fallback(nodes));
        for (i, def) in defs.iter().enumerate() {
            let c_dust = match &def.node_dust {
                Some(n) => Some(
                    ndef.id_by_name(n)
                        .ok_or_else(|| ConfigError::UnknownNode(n.clone()))?,
                ),
                None => None,
            };
            biomes.push(Biome {
                id: (i + 1) as BiomeId,
                name: def.name.clone(),
                c_dust,
                c_top: node(&def.node_top, nodes.c_stone)?,
                c_filler: node(&def.node_filler, nodes.c_stone)?,
                c_stone: node(&def.node_stone, nodes.c_stone)?,
                c_water_top: node(&def.node_water_top, nodes.c_water_source)?,
                c_water: node(&def.node_water, nodes.c_water_source)?,
                depth_top: def.depth_top,
                depth_filler: def.depth_filler,
                depth_water_top: def.depth_water_top,
                y_min: def.y_min,
                y_max: def.y_max,
                heat_point: def.heat_point,
                humidity_point: def.humidity_point,
            });
        }
        Ok(Self { biomes })
    }

    /// Biome `id`, or the fallback biome for unknown ids.
    #[inline]
    pub fn get(&self, id: BiomeId) -> &Biome {
        self.biomes.get(id as usize).unwrap_or(&self.biomes[0])
    }

    pub fn id_by_name(&self, name: &str) -> Option<BiomeId> {
        self.biomes.iter().find(|b| b.name == name).map(|b| b.id)
    }

    /// Number of biomes including the fallback.
    #[inline]
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.biomes.len() <= 1
    }

    /// Closest configured biome in (heat, humidity) space among those
    /// whose vertical range contains `y`.
    pub fn calc_biome_from_noise(&self, heat: f32, humidity: f32, y: i32) -> &Biome {
        let mut dist_min = f32::MAX;
        let mut closest = &self.biomes[0];
        for b in &self.biomes[1..] {
            if y < b.y_min || y > b.y_max {
                continue;
            }
            let d_heat = heat - b.heat_point;
            let d_humidity = humidity - b.humidity_point;
            let dist = d_heat * d_heat + d_humidity * d_humidity;
            if dist < dist_min {
                dist_min = dist;
                closest = b;
            }
        }
        closest
    }
}

/// Heat and humidity fields over one chunk footprint.
pub struct BiomeGen {
    seed: i32,
    np_heat: strata_noise::NoiseParams,
    np_humidity: strata_noise::NoiseParams,
    np_heat_blend: strata_noise::NoiseParams,
    np_humidity_blend: strata_noise::NoiseParams,
    noise_heat: Noise,
    noise_humidity: Noise,
    noise_heat_blend: Noise,
    noise_humidity_blend: Noise,
    pub heatmap: Vec<f32>,
    pub humidmap: Vec<f32>,
}

impl BiomeGen {
    pub fn new(params: &WorldGenParams, seed: i32, csize: V3i) -> Self {
        let (sx, sz) = (csize.x as u32, csize.z as u32);
        let n = (csize.x * csize.z) as usize;
        Self {
            seed,
            np_heat: params.np_heat,
            np_humidity: params.np_humidity,
            np_heat_blend: params.np_heat_blend,
            np_humidity_blend: params.np_humidity_blend,
            noise_heat: Noise::new_2d(params.np_heat, seed, sx, sz),
            noise_humidity: Noise::new_2d(params.np_humidity, seed, sx, sz),
            noise_heat_blend: Noise::new_2d(params.np_heat_blend, seed, sx, sz),
            noise_humidity_blend: Noise::new_2d(params.np_humidity_blend, seed, sx, sz),
            heatmap: vec![0.0; n],
            humidmap: vec![0.0; n],
        }
    }

    /// Fills `heatmap` and `humidmap` for the footprint starting at `pmin`.
    pub fn calc_biome_noise(&mut self, pmin: V3i) {
        let (x, z) = (pmin.x as f32, pmin.z as f32);
        let heat = self.noise_heat.perlin_map_2d(x, z, None);
        self.heatmap.copy_from_slice(heat);
        let blend = self.noise_heat_blend.perlin_map_2d(x, z, None);
        for (h, b) in self.heatmap.iter_mut().zip(blend) {
            *h += *b;
        }

        let humidity = self.noise_humidity.perlin_map_2d(x, z, None);
        self.humidmap.copy_from_slice(humidity);
        let blend = self.noise_humidity_blend.perlin_map_2d(x, z, None);
        for (h, b) in self.humidmap.iter_mut().zip(blend) {
            *h += *b;
        }
    }

    /// Heat and humidity sampled at a single column.
    pub fn climate_at_point(&self, x: i32, z: i32) -> (f32, f32) {
        let (fx, fz) = (x as f32, z as f32);
        let heat = noise_perlin_2d(&self.np_heat, fx, fz, self.seed)
            + noise_perlin_2d(&self.np_heat_blend, fx, fz, self.seed);
        let humidity = noise_perlin_2d(&self.np_humidity, fx, fz, self.seed)
            + noise_perlin_2d(&self.np_humidity_blend, fx, fz, self.seed);
        (heat, humidity)
    }

    #[inline]
    pub fn biome_at_index<'m>(&self, biomes: &'m BiomeManager, index: usize, y: i32) -> &'m Biome {
        biomes.calc_biome_from_noise(self.heatmap[index], self.humidmap[index], y)
    }

    pub fn biome_at_point<'m>(&self, biomes: &'m BiomeManager, p: V3i) -> &'m Biome {
        let (heat, humidity) = self.climate_at_point(p.x, p.z);
        biomes.calc_biome_from_noise(heat, humidity, p.y)
    }
}

impl MapgenV7p {
    /// Replaces the stone and water of each core column with its biome's
    /// surface layers, top-down, and records the biome of the first stone
    /// surface in the biome map.
    pub(super) fn generate_biomes(&mut self, vm: &mut VoxelManip) {
        let (nmin, nmax) = (self.bounds.node_min, self.bounds.node_max);
        let c_stone = self.nodes.c_stone;
        let c_water = self.nodes.c_water_source;

        self.noise_filler_depth
            .perlin_map_2d(nmin.x as f32, nmin.z as f32, None);

        let mut index = 0usize;
        for z in nmin.z..=nmax.z {
            for x in nmin.x..=nmax.x {
                let mut biome: Option<&Biome> = None;
                let mut depth_top = 0i32;
                let mut base_filler = 0u16;
                let mut depth_water_top = 0i32;
                let mut biome_y_min = -MAX_MAP_GENERATION_LIMIT;

                let mut vi = vm.area.index(x, nmax.y, z);
                let c_above = vm.data[vm.area.add_y(vi, 1)].content;
                let mut air_above = c_above == CONTENT_AIR;
                let mut water_above = c_above == c_water;

                self.biomemap[index] = BIOME_NONE;
                let mut nplaced: u16 = if air_above || water_above { 0 } else { NPLACED_DONE };

                for y in (nmin.y..=nmax.y).rev() {
                    let c = vm.data[vi].content;

                    let stone_surface =
                        c == c_stone && (air_above || water_above || biome.is_none() || y < biome_y_min);
                    let water_surface =
                        c == c_water && (air_above || biome.is_none() || y < biome_y_min);
                    if stone_surface || water_surface {
                        let b = self.biomegen.biome_at_index(&self.biomes, index, y);
                        depth_top = b.depth_top;
                        let filler = (depth_top + b.depth_filler) as f32
                            + self.noise_filler_depth.result[index];
                        base_filler = filler.max(0.0) as u16;
                        depth_water_top = b.depth_water_top;
                        biome_y_min = b.y_min;
                        if self.biomemap[index] == BIOME_NONE && c == c_stone {
                            self.biomemap[index] = b.id;
                        }
                        biome = Some(b);
                    }

                    if c == c_stone {
                        let c_below = vm.data[vm.area.add_y(vi, -1)].content;
                        if c_below == CONTENT_AIR || c_below == c_water {
                            nplaced = NPLACED_DONE;
                        }
                        // A stone cell always has a biome by now.
                        if let Some(b) = biome {
                            if i32::from(nplaced) < depth_top {
                                vm.data[vi] = MapNode::new(b.c_top);
                                nplaced += 1;
                            } else if nplaced < base_filler {
                                vm.data[vi] = MapNode::new(b.c_filler);
                                nplaced += 1;
                            } else {
                                vm.data[vi] = MapNode::new(b.c_stone);
                                nplaced = NPLACED_DONE;
                            }
                        }
                        air_above = false;
                        water_above = false;
                    } else if c == c_water {
                        if let Some(b) = biome {
                            vm.data[vi] = MapNode::new(if y > self.water_level - depth_water_top {
                                b.c_water_top
                            } else {
                                b.c_water
                            });
                        }
                        nplaced = 0;
                        water_above = true;
                    } else if c == CONTENT_AIR {
                        nplaced = 0;
                        air_above = true;
                    } else {
                        nplaced = NPLACED_DONE;
                        air_above = false;
                        water_above = false;
                    }

                    vi = vm.area.add_y(vi, -1);
                }
                index += 1;
            }
        }
    }
}
