use strata_blocks::{BlockRegistry, CONTENT_AIR, ContentId};
use strata_chunk::{MapNode, VMANIP_FLAG_CAVE, VoxelManip};
use strata_geom::{V3i, Vec3};
use strata_noise::PseudoRandom;

use super::MapgenV7p;

/// `lo <= x <= hi` clamp that tolerates `lo > hi` by preferring `lo`.
#[inline]
fn rangelim(x: i32, lo: i32, hi: i32) -> i32 {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Random-walk tunnel carver. Each cave is a chain of straight segments
/// between route points; segments are swept with a rounded brush.
#[derive(Clone, Copy, Debug)]
pub struct TunnelCarver {
    pub c_water_source: ContentId,
    pub c_lava_source: ContentId,
    pub water_level: i32,
}

impl TunnelCarver {
    /// Carves one cave into `vm`. `ps` drives the shape; `ps2` only picks
    /// the per-segment brush jitter mode. Tunnels whose ends are both
    /// above the surface recorded in `heightmap` leave no trace.
    #[allow(clippy::too_many_arguments)]
    pub fn make_cave(
        &self,
        vm: &mut VoxelManip,
        ndef: &BlockRegistry,
        node_min: V3i,
        node_max: V3i,
        ps: &mut PseudoRandom,
        ps2: &mut PseudoRandom,
        is_large: bool,
        max_stone_height: i32,
        heightmap: Option<&[i32]>,
    ) {
        let mut min_d = 2;
        let mut max_d = ps.range(2, 6);
        let dswitchint = ps.range(1, 14);
        let part_max_length_rs;
        let routepoints;
        if is_large {
            part_max_length_rs = ps.range(2, 4);
            let hi = ps.range(15, 30);
            routepoints = ps.range(5, hi);
            min_d = 5;
            let hi = ps.range(8, 24);
            max_d = ps.range(7, hi);
        } else {
            part_max_length_rs = ps.range(2, 9);
            let hi = ps.range(15, 30);
            routepoints = ps.range(10, hi);
        }
        let flat = ps.range(0, 1) == 0;

        // Route area: the core plus a margin wide enough for the brush.
        let mut ar = node_max - node_min + V3i::ONE;
        let mut of = node_min;
        let more = (16 - max_d / 2 - 10).max(1);
        ar += V3i::new(1, 0, 1) * (more * 2);
        of -= V3i::new(1, 0, 1) * more;

        let mut route_y_min = 0;
        let mut route_y_max = rangelim(-of.y + max_stone_height + max_d / 2 + 7, 0, ar.y - 1);

        if is_large {
            let mut minpos = 0;
            if node_min.y < self.water_level && node_max.y > self.water_level {
                minpos = self.water_level - max_d / 3 - of.y;
                route_y_max = self.water_level + max_d / 3 - of.y;
            }
            route_y_min = ps.range(minpos, minpos + max_d);
            route_y_min = rangelim(route_y_min, 0, route_y_max);
        }

        let start_y_min = rangelim(route_y_min, 0, ar.y - 1);
        let start_y_max = rangelim(route_y_max, start_y_min, ar.y - 1);

        let mut orp = Vec3::ZERO;
        orp.z = (ps.next() % ar.z) as f32 + 0.5;
        orp.y = ps.range(start_y_min, start_y_max) as f32 + 0.5;
        orp.x = (ps.next() % ar.x) as f32 + 0.5;

        let mut tunnel = Tunnel {
            carver: self,
            vm,
            ndef,
            ps,
            ps2,
            heightmap,
            node_min,
            node_max,
            large: is_large,
            flat,
            min_d,
            max_d,
            part_max_length_rs,
            main_direction: Vec3::ZERO,
            ar,
            of,
            route_y_min,
            route_y_max,
            orp,
            rs: 0,
        };
        for j in 0..routepoints {
            tunnel.make_segment(j % dswitchint == 0);
        }
    }
}

struct Tunnel<'a, 'r> {
    carver: &'a TunnelCarver,
    vm: &'a mut VoxelManip,
    ndef: &'a BlockRegistry,
    ps: &'a mut PseudoRandom,
    ps2: &'a mut PseudoRandom,
    heightmap: Option<&'r [i32]>,
    node_min: V3i,
    node_max: V3i,
    large: bool,
    flat: bool,
    min_d: i32,
    max_d: i32,
    part_max_length_rs: i32,
    main_direction: Vec3,
    ar: V3i,
    of: V3i,
    route_y_min: i32,
    route_y_max: i32,
    orp: Vec3,
    rs: i32,
}

impl Tunnel<'_, '_> {
    fn surface_at(&self, p: V3i) -> i32 {
        let (nmin, nmax) = (self.node_min, self.node_max);
        match self.heightmap {
            Some(hm) if p.x >= nmin.x && p.x <= nmax.x && p.z >= nmin.z && p.z <= nmax.z => {
                let sx = nmax.x - nmin.x + 1;
                hm[((p.z - nmin.z) * sx + (p.x - nmin.x)) as usize]
            }
            _ => self.carver.water_level,
        }
    }

    fn make_segment(&mut self, dirswitch: bool) {
        if dirswitch && !self.large {
            let ps = &mut *self.ps;
            let mut dir = Vec3::ZERO;
            dir.z = ((ps.next() % 20) as f32 - 10.0) / 10.0;
            dir.y = ((ps.next() % 20) as f32 - 10.0) / 30.0;
            dir.x = ((ps.next() % 20) as f32 - 10.0) / 10.0;
            self.main_direction = dir * (ps.range(0, 10) as f32 / 10.0);
        }

        self.rs = self.ps.range(self.min_d, self.max_d);
        let part_len = self.rs * self.part_max_length_rs;
        let maxlen = if self.large {
            V3i::new(part_len, part_len / 2, part_len)
        } else {
            V3i::new(part_len, self.ps.range(1, part_len), part_len)
        };

        let mut vec = Vec3::ZERO;
        vec.z = (self.ps.next() % maxlen.z) as f32 - maxlen.z as f32 / 2.0;
        vec.y = (self.ps.next() % maxlen.y) as f32 - maxlen.y as f32 / 2.0;
        vec.x = (self.ps.next() % maxlen.x) as f32 - maxlen.x as f32 / 2.0;

        // Occasional steep shaft.
        if !self.large && self.ps.range(0, 12) == 0 {
            vec.z = (self.ps.next() % maxlen.z) as f32 - maxlen.z as f32 / 2.0;
            vec.y = (self.ps.next() % (maxlen.y * 2)) as f32 - maxlen.y as f32;
            vec.x = (self.ps.next() % maxlen.x) as f32 - maxlen.x as f32 / 2.0;
        }

        let p1 = self.orp.to_i32() + self.of + V3i::splat(self.rs / 2);
        let p2 = vec.to_i32() + p1;
        let above_ground = p1.y > self.surface_at(p1) && p2.y > self.surface_at(p2);

        vec += self.main_direction;

        let mut rp = self.orp + vec;
        let (ar, route_y_min, route_y_max) = (self.ar, self.route_y_min as f32, self.route_y_max as f32);
        if rp.x < 0.0 {
            rp.x = 0.0;
        } else if rp.x >= ar.x as f32 {
            rp.x = (ar.x - 1) as f32;
        }
        if rp.y < route_y_min {
            rp.y = route_y_min;
        } else if rp.y >= route_y_max {
            rp.y = route_y_max - 1.0;
        }
        if rp.z < 0.0 {
            rp.z = 0.0;
        } else if rp.z >= ar.z as f32 {
            rp.z = (ar.z - 1) as f32;
        }

        let vec = rp - self.orp;
        let mut veclen = vec.length();
        if veclen < 0.05 {
            veclen = 1.0;
        }

        // Every segment draws once from the second stream.
        let randomize_xz = self.ps2.range(1, 2) == 1;

        let step = 1.0 / veclen;
        let mut f = 0.0f32;
        while f < 1.0 {
            self.carve_route(vec, f, randomize_xz, above_ground);
            f += step;
        }

        self.orp = rp;
    }

    fn carve_route(&mut self, vec: Vec3, f: f32, randomize_xz: bool, above_ground: bool) {
        let rs = self.rs;
        let startp = self.orp.to_i32() + self.of;

        let mut fp = self.orp + vec * f;
        fp.x += 0.1 * self.ps.range(-10, 10) as f32;
        fp.z += 0.1 * self.ps.range(-10, 10) as f32;
        let cp = fp.to_i32();

        let mut d0 = -rs / 2;
        let mut d1 = d0 + rs;
        if randomize_xz {
            d0 += self.ps.range(-1, 1);
            d1 += self.ps.range(-1, 1);
        }

        let n_water = MapNode::new(self.carver.c_water_source);
        let n_lava = MapNode::new(self.carver.c_lava_source);
        let water_level = self.carver.water_level;

        for z0 in d0..=d1 {
            let si = rs / 2 - (z0.abs() - rs / 7 - 1).max(0);
            let mut x0 = -si - self.ps.range(0, 1);
            // The upper bound is re-drawn on every test.
            while x0 <= si - 1 + self.ps.range(0, 1) {
                if !above_ground {
                    let maxabsxz = x0.abs().max(z0.abs());
                    let si2 = rs / 2 - (maxabsxz - rs / 7 - 1).max(0);
                    for y0 in -si2..=si2 {
                        if self.flat && rs > 7 && y0.abs() >= rs / 3 {
                            continue;
                        }

                        let p = cp + V3i::new(x0, y0, z0) + self.of;
                        if !self.vm.area.contains(p) {
                            continue;
                        }
                        let i = self.vm.area.index_of(p);
                        let c = self.vm.data[i].content;
                        if !self.ndef.get(c).is_ground_content {
                            continue;
                        }

                        if self.large {
                            let full_ymin = self.node_min.y - 16;
                            let full_ymax = self.node_max.y + 16;
                            self.vm.data[i] = if full_ymin < water_level && full_ymax > water_level {
                                if p.y <= water_level { n_water } else { MapNode::AIR }
                            } else if full_ymax < water_level {
                                if p.y < startp.y - 2 { n_lava } else { MapNode::AIR }
                            } else {
                                MapNode::AIR
                            };
                        } else {
                            if c == CONTENT_AIR {
                                continue;
                            }
                            self.vm.data[i] = MapNode::AIR;
                            self.vm.flags[i] |= VMANIP_FLAG_CAVE;
                        }
                    }
                }
                x0 += 1;
            }
        }
    }
}

impl MapgenV7p {
    /// Small tunnels everywhere below the surface, plus up to two large
    /// caves in chunks that lie entirely at or below `large_cave_depth`.
    pub(super) fn generate_caves(&mut self, vm: &mut VoxelManip, max_stone_y: i32, large_cave_depth: i32) {
        let (nmin, nmax) = (self.bounds.node_min, self.bounds.node_max);
        if max_stone_y < nmin.y {
            return;
        }

        let mut ps = PseudoRandom::new(self.blockseed.wrapping_add(21343) as i32);
        let mut ps2 = PseudoRandom::new(self.blockseed.wrapping_add(1032) as i32);

        let large_caves_count = if nmax.y <= large_cave_depth {
            ps.range(0, 2) as u32
        } else {
            0
        };

        let carver = TunnelCarver {
            c_water_source: self.nodes.c_water_source,
            c_lava_source: self.nodes.c_lava_source,
            water_level: self.water_level,
        };
        let total = self.small_caves_count + large_caves_count;
        for i in 0..total {
            carver.make_cave(
                vm,
                &self.ndef,
                nmin,
                nmax,
                &mut ps,
                &mut ps2,
                i >= self.small_caves_count,
                max_stone_y,
                Some(self.heightmap.as_slice()),
            );
        }
        log::trace!("caves: {} small, {} large", self.small_caves_count, large_caves_count);
    }
}
