use strata_blocks::CONTENT_IGNORE;
use strata_chunk::{MapNode, VoxelManip};
use strata_geom::V3i;
use strata_noise::noise_perlin_2d;

use crate::voxel::MAX_MAP_GENERATION_LIMIT;
use crate::worldgen::V7pFlags;

use super::MapgenV7p;

/// Half-width of the ridge band in `ridge_uwater` noise units.
const RIDGE_WIDTH: f32 = 0.2;

/// 2D fields that shape the base and mountain surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainChannel {
    HeightSelect,
    TerrainBase,
    TerrainAlt,
    MountHeight,
    Mountain,
}

/// Base surface height from the height-select, base and alt channels.
/// The same formula backs both per-point and per-map sampling.
#[inline]
pub fn base_terrain_level(mut sample: impl FnMut(TerrainChannel) -> f32) -> f32 {
    let hselect = sample(TerrainChannel::HeightSelect).clamp(0.0, 1.0);
    let height_base = sample(TerrainChannel::TerrainBase);
    let height_alt = sample(TerrainChannel::TerrainAlt);
    if height_alt > height_base {
        return height_alt;
    }
    height_base * hselect + height_alt * (1.0 - hselect)
}

#[inline]
pub fn mountain_level(mut sample: impl FnMut(TerrainChannel) -> f32) -> f32 {
    let mount_height = sample(TerrainChannel::MountHeight);
    sample(TerrainChannel::Mountain) * mount_height
}

/// Integer solid surface of a column: the truncated base level, raised to
/// the truncated mountain level where that is higher.
#[inline]
pub fn surface_level(base: f32, mountain: Option<f32>) -> i32 {
    let y = base as i32;
    match mountain {
        Some(m) => (m as i32).max(y),
        None => y,
    }
}

impl MapgenV7p {
    /// Fills the terrain noise maps for the column footprint at `node_min`.
    /// Base and alt use the persistence map point-by-point.
    pub fn calc_terrain_noise(&mut self, node_min: V3i) {
        let (x, z) = (node_min.x as f32, node_min.z as f32);
        self.noise_terrain_persist.perlin_map_2d(x, z, None);
        let persist = &self.noise_terrain_persist.result[..];
        self.noise_terrain_base.perlin_map_2d(x, z, Some(persist));
        self.noise_terrain_alt.perlin_map_2d(x, z, Some(persist));
        self.noise_height_select.perlin_map_2d(x, z, None);

        if self.spflags.contains(V7pFlags::MOUNTAINS) {
            self.noise_mount_height.perlin_map_2d(x, z, None);
            self.noise_mountain.perlin_map_2d(x, z, None);
        }
    }

    fn sample_map(&self, channel: TerrainChannel, index: usize) -> f32 {
        let noise = match channel {
            TerrainChannel::HeightSelect => &self.noise_height_select,
            TerrainChannel::TerrainBase => &self.noise_terrain_base,
            TerrainChannel::TerrainAlt => &self.noise_terrain_alt,
            TerrainChannel::MountHeight => &self.noise_mount_height,
            TerrainChannel::Mountain => &self.noise_mountain,
        };
        noise.result[index]
    }

    fn sample_point(&self, channel: TerrainChannel, x: f32, z: f32, persist: f32) -> f32 {
        let p = &*self.params;
        let np = match channel {
            TerrainChannel::HeightSelect => p.np_height_select,
            TerrainChannel::TerrainBase => p.np_terrain_base.with_persistence(persist),
            TerrainChannel::TerrainAlt => p.np_terrain_alt.with_persistence(persist),
            TerrainChannel::MountHeight => p.np_mount_height,
            TerrainChannel::Mountain => p.np_mountain,
        };
        noise_perlin_2d(&np, x, z, self.seed)
    }

    /// Base level from the maps filled by [`Self::calc_terrain_noise`].
    pub fn base_terrain_level_from_map(&self, index: usize) -> f32 {
        base_terrain_level(|ch| self.sample_map(ch, index))
    }

    pub fn mountain_level_from_map(&self, index: usize) -> f32 {
        mountain_level(|ch| self.sample_map(ch, index))
    }

    pub fn base_terrain_level_at_point(&self, x: i32, z: i32) -> f32 {
        let (fx, fz) = (x as f32, z as f32);
        let persist = noise_perlin_2d(&self.params.np_terrain_persist, fx, fz, self.seed);
        base_terrain_level(|ch| self.sample_point(ch, fx, fz, persist))
    }

    pub fn mountain_level_at_point(&self, x: i32, z: i32) -> f32 {
        let (fx, fz) = (x as f32, z as f32);
        mountain_level(|ch| self.sample_point(ch, fx, fz, 0.0))
    }

    /// Spawn height for column `(x, z)`: two above the solid surface when
    /// that surface lies in `water_level + 1..=water_level + 16` and the
    /// column is outside any ridge band.
    pub fn spawn_level_at_point(&self, x: i32, z: i32) -> Option<i32> {
        if self.spflags.contains(V7pFlags::RIDGES) {
            let uwatern = noise_perlin_2d(
                &self.params.np_ridge_uwater,
                x as f32,
                z as f32,
                self.seed,
            ) * 2.0;
            if uwatern.abs() <= RIDGE_WIDTH {
                return None;
            }
        }

        let mountain = self
            .spflags
            .contains(V7pFlags::MOUNTAINS)
            .then(|| self.mountain_level_at_point(x, z));
        let y = surface_level(self.base_terrain_level_at_point(x, z), mountain);

        if y <= self.water_level || y > self.water_level + 16 {
            None
        } else {
            Some(y + 2)
        }
    }

    /// Places bedrock, stone, water and air into undefined cells of the
    /// core columns and returns the highest solid surface seen.
    pub(super) fn generate_terrain(&mut self, vm: &mut VoxelManip) -> i32 {
        let (nmin, nmax) = (self.bounds.node_min, self.bounds.node_max);
        self.calc_terrain_noise(nmin);

        let n_stone = MapNode::new(self.nodes.c_stone);
        let n_bedrock = MapNode::new(self.nodes.c_bedrock);
        let n_water = MapNode::new(self.nodes.c_water_source);
        let mountains = self.spflags.contains(V7pFlags::MOUNTAINS);

        let mut stone_surface_max_y = -MAX_MAP_GENERATION_LIMIT;
        let mut index2d = 0usize;
        for z in nmin.z..=nmax.z {
            for x in nmin.x..=nmax.x {
                let mountain = mountains.then(|| self.mountain_level_from_map(index2d));
                let surface_y = surface_level(self.base_terrain_level_from_map(index2d), mountain);
                stone_surface_max_y = stone_surface_max_y.max(surface_y);

                let mut vi = vm.area.index(x, nmin.y - 1, z);
                for y in nmin.y - 1..=nmax.y + 1 {
                    if vm.data[vi].content == CONTENT_IGNORE {
                        vm.data[vi] = if y <= surface_y {
                            if y <= self.bedrock_level { n_bedrock } else { n_stone }
                        } else if y <= self.water_level {
                            n_water
                        } else {
                            MapNode::AIR
                        };
                    }
                    vi = vm.area.add_y(vi, 1);
                }
                index2d += 1;
            }
        }
        stone_surface_max_y
    }

    /// Carves river channels along the zero band of `ridge_uwater`. Cells
    /// above water level become air, the rest water, whatever they held.
    pub(super) fn generate_ridge_terrain(&mut self, vm: &mut VoxelManip) {
        let (nmin, nmax) = (self.bounds.node_min, self.bounds.node_max);
        if nmax.y < self.water_level - 16 {
            return;
        }

        self.noise_ridge.perlin_map_2d(nmin.x as f32, nmin.z as f32, None);
        self.noise_ridge_uwater
            .perlin_map_2d(nmin.x as f32, nmin.z as f32, None);

        let n_water = MapNode::new(self.nodes.c_water_source);
        for z in nmin.z..=nmax.z {
            for y in nmin.y - 1..=nmax.y + 1 {
                let mut vi = vm.area.index(nmin.x, y, z);
                for x in nmin.x..=nmax.x {
                    let index2d = self.index2d(x, z);
                    let uwatern = self.noise_ridge_uwater.result[index2d] * 2.0;
                    if uwatern.abs() <= RIDGE_WIDTH {
                        let altitude = (y - self.water_level) as f32;
                        let height_mod = (altitude + 17.0) / 2.5;
                        let width_mod = RIDGE_WIDTH - uwatern.abs();
                        let nridge = self.noise_ridge.result[index2d] * altitude.max(0.0) / 7.0;

                        if nridge + width_mod * height_mod >= 0.6 {
                            vm.data[vi] = if y > self.water_level { MapNode::AIR } else { n_water };
                        }
                    }
                    vi += 1;
                }
            }
        }
    }
}
