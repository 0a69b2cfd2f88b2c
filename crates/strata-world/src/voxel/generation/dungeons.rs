use strata_blocks::{BlockRegistry, CONTENT_AIR, CONTENT_IGNORE, ContentId};
use strata_chunk::{
    MapNode, VMANIP_FLAG_DUNGEON_INSIDE, VMANIP_FLAG_DUNGEON_PRESERVE,
    VMANIP_FLAG_DUNGEON_UNTOUCHABLE, VoxelManip,
};
use strata_geom::V3i;
use strata_noise::{NoiseParams, PseudoRandom, noise_perlin_3d};

use super::MapgenV7p;

/// Clearance kept between the first room and the buffer edge.
const ROOM_PADDING: i32 = 16;

/// Shape and material of the dungeons of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct DungeonParams {
    pub c_wall: ContentId,
    pub c_alt_wall: ContentId,
    pub c_stair: ContentId,
    pub num_dungeons: u32,
    pub num_rooms: u32,
    pub room_size_min: V3i,
    pub room_size_max: V3i,
    pub room_size_large_min: V3i,
    pub room_size_large_max: V3i,
    /// One in this many rooms is large; 0 disables large rooms.
    pub large_room_chance: i32,
    pub diagonal_dirs: bool,
    pub holesize: V3i,
    pub corridor_len_min: i32,
    pub corridor_len_max: i32,
    pub np_alt_wall: NoiseParams,
}

/// Room-and-corridor carver working inside a voxel buffer. The walker
/// position and direction persist across the dungeons of one call.
pub struct DungeonGen<'a> {
    ndef: &'a BlockRegistry,
    dp: DungeonParams,
    random: PseudoRandom,
    blockseed: u32,
    m_pos: V3i,
    m_dir: V3i,
}

impl<'a> DungeonGen<'a> {
    pub fn new(ndef: &'a BlockRegistry, dp: DungeonParams) -> Self {
        Self {
            ndef,
            dp,
            random: PseudoRandom::new(0),
            blockseed: 0,
            m_pos: V3i::ZERO,
            m_dir: V3i::ZERO,
        }
    }

    /// Builds `num_dungeons` dungeons inside `nmin..=nmax`, then swaps
    /// walls to the alternate node where the alt-wall field is positive.
    pub fn generate(&mut self, vm: &mut VoxelManip, bseed: u32, nmin: V3i, nmax: V3i) {
        if self.dp.num_dungeons == 0 {
            return;
        }
        self.blockseed = bseed;
        self.random.seed(bseed.wrapping_add(2) as i32);

        for f in vm.flags.iter_mut() {
            *f &= !(VMANIP_FLAG_DUNGEON_INSIDE | VMANIP_FLAG_DUNGEON_PRESERVE);
        }

        // Existing air, liquid and foreign structures stay as they are.
        for z in nmin.z..=nmax.z {
            for y in nmin.y..=nmax.y {
                let mut i = vm.area.index(nmin.x, y, z);
                for _ in nmin.x..=nmax.x {
                    let c = vm.data[i].content;
                    let def = self.ndef.get(c);
                    if c == CONTENT_IGNORE || def.is_airlike() || def.is_liquid() || !def.is_ground_content {
                        vm.flags[i] |= VMANIP_FLAG_DUNGEON_PRESERVE;
                    }
                    i += 1;
                }
            }
        }

        for _ in 0..self.dp.num_dungeons {
            self.make_dungeon(vm, V3i::splat(ROOM_PADDING));
        }

        for z in nmin.z..=nmax.z {
            for y in nmin.y..=nmax.y {
                let mut i = vm.area.index(nmin.x, y, z);
                for x in nmin.x..=nmax.x {
                    if vm.data[i].content == self.dp.c_wall
                        && noise_perlin_3d(
                            &self.dp.np_alt_wall,
                            x as f32,
                            y as f32,
                            z as f32,
                            self.blockseed as i32,
                        ) > 0.0
                    {
                        vm.data[i].content = self.dp.c_alt_wall;
                    }
                    i += 1;
                }
            }
        }
    }

    fn random_room_size(&mut self, large: bool) -> V3i {
        let (lo, hi) = if large {
            (self.dp.room_size_large_min, self.dp.room_size_large_max)
        } else {
            (self.dp.room_size_min, self.dp.room_size_max)
        };
        let z = self.random.range(lo.z, hi.z);
        let y = self.random.range(lo.y, hi.y);
        let x = self.random.range(lo.x, hi.x);
        V3i::new(x, y, z)
    }

    fn next_room_is_large(&mut self) -> bool {
        self.dp.large_room_chance >= 1 && self.random.range(1, self.dp.large_room_chance) == 1
    }

    fn make_dungeon(&mut self, vm: &mut VoxelManip, padding: V3i) {
        let area = vm.area;
        let areasize = area.extent();
        let mut roomsize = V3i::ZERO;
        let mut roomplace = V3i::ZERO;

        // First room: somewhere it does not touch preserved cells or the
        // buffer edge.
        let mut fits = false;
        for _ in 0..100 {
            let large = self.next_room_is_large();
            roomsize = self.random_room_size(large);

            let z = self.random.range(0, areasize.z - roomsize.z - padding.z);
            let y = self.random.range(0, areasize.y - roomsize.y - padding.y);
            let x = self.random.range(0, areasize.x - roomsize.x - padding.x);
            roomplace = area.min + padding + V3i::new(x, y, z);

            fits = room_is_clear(vm, roomplace, roomsize);
            if fits {
                break;
            }
        }
        if !fits {
            return;
        }

        let mut last_room_center = roomplace + V3i::new(roomsize.x / 2, 1, roomsize.z / 2);

        let num_rooms = self.dp.num_rooms;
        for i in 0..num_rooms {
            self.make_room(vm, roomsize, roomplace);

            let room_center = roomplace + V3i::new(roomsize.x / 2, 1, roomsize.z / 2);
            if i + 1 >= num_rooms {
                break;
            }

            // Corridors start from either this room or the previous one.
            let start_in_last_room = self.random.range(0, 2) != 0;
            let walker_start = if start_in_last_room {
                last_room_center
            } else {
                last_room_center = room_center;
                room_center
            };

            self.m_pos = walker_start;
            let Some((doorplace, doordir)) = self.find_place_for_door(vm) else {
                return;
            };

            let doorplace = if self.random.range(0, 1) == 0 {
                self.make_door(vm, doorplace);
                doorplace
            } else {
                doorplace - doordir
            };

            let (corridor_end, corridor_end_dir) = self.make_corridor(vm, doorplace, doordir);

            let large = self.next_room_is_large();
            roomsize = self.random_room_size(large);

            self.m_pos = corridor_end;
            self.m_dir = corridor_end_dir;
            let Some((door, dir, place)) = self.find_place_for_room_door(vm, roomsize) else {
                return;
            };
            roomplace = place;

            if self.random.range(0, 1) == 0 {
                self.make_door(vm, door);
            } else {
                roomplace -= dir;
            }
        }
    }

    fn make_room(&mut self, vm: &mut VoxelManip, roomsize: V3i, roomplace: V3i) {
        let n_wall = MapNode::new(self.dp.c_wall);

        // Walls on +-X, +-Z, then floor and ceiling.
        for z in 0..roomsize.z {
            for y in 0..roomsize.y {
                for x in [0, roomsize.x - 1] {
                    set_unless_untouchable(vm, roomplace + V3i::new(x, y, z), n_wall);
                }
            }
        }
        for x in 0..roomsize.x {
            for y in 0..roomsize.y {
                for z in [0, roomsize.z - 1] {
                    set_unless_untouchable(vm, roomplace + V3i::new(x, y, z), n_wall);
                }
            }
        }
        for z in 0..roomsize.z {
            for x in 0..roomsize.x {
                for y in [0, roomsize.y - 1] {
                    set_unless_untouchable(vm, roomplace + V3i::new(x, y, z), n_wall);
                }
            }
        }

        for z in 1..roomsize.z - 1 {
            for y in 1..roomsize.y - 1 {
                for x in 1..roomsize.x - 1 {
                    let p = roomplace + V3i::new(x, y, z);
                    if !vm.area.contains(p) {
                        continue;
                    }
                    let vi = vm.area.index_of(p);
                    vm.flags[vi] |= VMANIP_FLAG_DUNGEON_UNTOUCHABLE;
                    vm.data[vi] = MapNode::AIR;
                }
            }
        }
    }

    fn make_fill(&self, vm: &mut VoxelManip, place: V3i, size: V3i, avoid_flags: u8, n: MapNode, or_flags: u8) {
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    let p = place + V3i::new(x, y, z);
                    if !vm.area.contains(p) {
                        continue;
                    }
                    let vi = vm.area.index_of(p);
                    if vm.flags[vi] & avoid_flags != 0 {
                        continue;
                    }
                    vm.flags[vi] |= or_flags;
                    vm.data[vi] = n;
                }
            }
        }
    }

    fn make_hole(&self, vm: &mut VoxelManip, place: V3i) {
        self.make_fill(
            vm,
            place,
            self.dp.holesize,
            0,
            MapNode::AIR,
            VMANIP_FLAG_DUNGEON_INSIDE,
        );
    }

    fn make_door(&self, vm: &mut VoxelManip, doorplace: V3i) {
        self.make_hole(vm, doorplace);
    }

    fn make_corridor(&mut self, vm: &mut VoxelManip, doorplace: V3i, doordir: V3i) -> (V3i, V3i) {
        self.make_hole(vm, doorplace);
        let mut p0 = doorplace;
        let mut dir = doordir;
        let length = self.random.range(self.dp.corridor_len_min, self.dp.corridor_len_max);
        let mut partlength = self.random.range(self.dp.corridor_len_min, self.dp.corridor_len_max);
        let mut partcount = 0;
        let mut make_stairs = 0;

        if self.random.next() % 2 == 0 && partlength >= 3 {
            make_stairs = if self.random.next() % 2 != 0 { 1 } else { -1 };
        }

        let n_wall = MapNode::new(self.dp.c_wall);
        let holesize = self.dp.holesize;

        for i in 0..length {
            let mut p = p0 + dir;
            if partcount != 0 {
                p.y += make_stairs;
            }

            if vm.area.contains(p) && vm.area.contains(p + V3i::ONE) {
                if make_stairs != 0 {
                    self.make_fill(
                        vm,
                        p - V3i::ONE,
                        holesize + V3i::new(2, 3, 2),
                        VMANIP_FLAG_DUNGEON_UNTOUCHABLE,
                        n_wall,
                        0,
                    );
                    self.make_fill(vm, p, holesize, VMANIP_FLAG_DUNGEON_UNTOUCHABLE, MapNode::AIR, VMANIP_FLAG_DUNGEON_INSIDE);
                    self.make_fill(
                        vm,
                        p - dir,
                        holesize,
                        VMANIP_FLAG_DUNGEON_UNTOUCHABLE,
                        MapNode::AIR,
                        VMANIP_FLAG_DUNGEON_INSIDE,
                    );

                    // Stairs only on straight x or z runs, and never on
                    // the step that would jut out of the corridor end.
                    if (dir.x ^ dir.z) & 1 != 0
                        && ((make_stairs == 1 && i != 0) || (make_stairs == -1 && i != length - 1))
                    {
                        let facedir = dir_to_facedir(dir * make_stairs);
                        let stair_width = if dir.z != 0 { holesize.x } else { holesize.z };
                        // Stair width vector, perpendicular to travel.
                        let swv = if dir.z != 0 { V3i::new(1, 0, 0) } else { V3i::new(0, 0, 1) };
                        for st in 0..stair_width {
                            let ps = p + swv * st;
                            let stair_pos = if make_stairs == -1 {
                                ps - dir - V3i::UP
                            } else {
                                ps - V3i::UP
                            };
                            if vm.area.contains(stair_pos) {
                                let vi = vm.area.index_of(stair_pos);
                                if vm.data[vi].content == self.dp.c_wall {
                                    let mut n = MapNode::new(self.dp.c_stair);
                                    n.param2 = facedir;
                                    vm.data[vi] = n;
                                }
                            }
                        }
                    }
                } else {
                    self.make_fill(
                        vm,
                        p - V3i::ONE,
                        holesize + V3i::splat(2),
                        VMANIP_FLAG_DUNGEON_UNTOUCHABLE,
                        n_wall,
                        0,
                    );
                    self.make_hole(vm, p);
                }

                p0 = p;
            } else {
                // Can't go here, turn away.
                dir = turn_xz(dir, self.random.range(0, 1));
                make_stairs = -make_stairs;
                partcount = 0;
                partlength = self.random.range(1, length);
                continue;
            }

            partcount += 1;
            if partcount >= partlength {
                partcount = 0;
                dir = self.random_turn(dir);
                partlength = self.random.range(1, length);

                make_stairs = 0;
                if self.random.next() % 2 == 0 && partlength >= 3 {
                    make_stairs = if self.random.next() % 2 != 0 { 1 } else { -1 };
                }
            }
        }
        (p0, dir)
    }

    fn find_place_for_door(&mut self, vm: &VoxelManip) -> Option<(V3i, V3i)> {
        let c_wall = self.dp.c_wall;
        for i in 0..100 {
            let mut p = self.m_pos + self.m_dir;
            let p1 = p + V3i::UP;
            if !vm.area.contains(p) || !vm.area.contains(p1) || i % 4 == 0 {
                self.randomize_dir();
                continue;
            }
            if vm.content(p) == c_wall && vm.content(p1) == c_wall {
                let found = (p, self.m_dir);
                self.randomize_dir();
                return Some(found);
            }

            // Step up or down one node if there is headroom there.
            if vm.content(p) == c_wall
                && vm.content(p + V3i::UP) == CONTENT_AIR
                && vm.content(p + V3i::new(0, 2, 0)) == CONTENT_AIR
            {
                p += V3i::UP;
            }
            if vm.content(p + V3i::UP) == c_wall
                && vm.content(p) == CONTENT_AIR
                && vm.content(p - V3i::UP) == CONTENT_AIR
            {
                p -= V3i::UP;
            }

            if vm.content(p) != CONTENT_AIR || vm.content(p + V3i::UP) != CONTENT_AIR {
                self.randomize_dir();
                continue;
            }
            self.m_pos = p;
        }
        None
    }

    fn find_place_for_room_door(&mut self, vm: &VoxelManip, roomsize: V3i) -> Option<(V3i, V3i, V3i)> {
        for _ in 0..30 {
            let Some((doorplace, doordir)) = self.find_place_for_door(vm) else {
                continue;
            };
            let roomplace = if doordir == V3i::new(1, 0, 0) {
                let z = self.random.range(-roomsize.z + 2, -2);
                doorplace + V3i::new(0, -1, z)
            } else if doordir == V3i::new(-1, 0, 0) {
                let z = self.random.range(-roomsize.z + 2, -2);
                doorplace + V3i::new(-roomsize.x + 1, -1, z)
            } else if doordir == V3i::new(0, 0, 1) {
                let x = self.random.range(-roomsize.x + 2, -2);
                doorplace + V3i::new(x, -1, 0)
            } else if doordir == V3i::new(0, 0, -1) {
                let x = self.random.range(-roomsize.x + 2, -2);
                doorplace + V3i::new(x, -1, -roomsize.z + 1)
            } else {
                doorplace
            };

            let mut fits = true;
            'outer: for z in 1..roomsize.z - 1 {
                for y in 1..roomsize.y - 1 {
                    for x in 1..roomsize.x - 1 {
                        let p = roomplace + V3i::new(x, y, z);
                        if !vm.area.contains(p) || vm.flags[vm.area.index_of(p)] & VMANIP_FLAG_DUNGEON_INSIDE != 0 {
                            fits = false;
                            break 'outer;
                        }
                    }
                }
            }
            if fits {
                return Some((doorplace, doordir, roomplace));
            }
        }
        None
    }

    fn randomize_dir(&mut self) {
        self.m_dir = rand_ortho_dir(&mut self.random, self.dp.diagonal_dirs);
    }

    fn random_turn(&mut self, dir: V3i) -> V3i {
        match self.random.range(0, 2) {
            1 => turn_xz(dir, 0),
            2 => turn_xz(dir, 1),
            _ => dir,
        }
    }
}

/// Room interior fits when every cell is inside the buffer, untouched by
/// other rooms and not the ignore sentinel.
fn room_is_clear(vm: &VoxelManip, roomplace: V3i, roomsize: V3i) -> bool {
    for z in 0..roomsize.z {
        for y in 0..roomsize.y {
            for x in 0..roomsize.x {
                let p = roomplace + V3i::new(x, y, z);
                if !vm.area.contains(p) {
                    return false;
                }
                let vi = vm.area.index_of(p);
                if vm.flags[vi] & VMANIP_FLAG_DUNGEON_UNTOUCHABLE != 0
                    || vm.data[vi].content == CONTENT_IGNORE
                {
                    return false;
                }
            }
        }
    }
    true
}

fn set_unless_untouchable(vm: &mut VoxelManip, p: V3i, n: MapNode) {
    if !vm.area.contains(p) {
        return;
    }
    let vi = vm.area.index_of(p);
    if vm.flags[vi] & VMANIP_FLAG_DUNGEON_UNTOUCHABLE != 0 {
        return;
    }
    vm.data[vi] = n;
}

/// Random horizontal unit direction; with `diagonal` also diagonals.
pub fn rand_ortho_dir(random: &mut PseudoRandom, diagonal: bool) -> V3i {
    // Diagonals are rare even when enabled.
    if diagonal && random.next() % 4 == 0 {
        let mut dir = V3i::ZERO;
        for _ in 0..10 {
            dir.z = random.next() % 3 - 1;
            dir.x = random.next() % 3 - 1;
            if dir.x != 0 && dir.z != 0 {
                break;
            }
        }
        return dir;
    }
    if random.next() % 2 == 0 {
        if random.next() % 2 != 0 { V3i::new(-1, 0, 0) } else { V3i::new(1, 0, 0) }
    } else if random.next() % 2 != 0 {
        V3i::new(0, 0, -1)
    } else {
        V3i::new(0, 0, 1)
    }
}

/// Quarter turn about Y: `t == 0` turns one way, anything else the other.
#[inline]
pub fn turn_xz(d: V3i, t: i32) -> V3i {
    if t == 0 {
        V3i::new(d.z, d.y, -d.x)
    } else {
        V3i::new(-d.z, d.y, d.x)
    }
}

/// Facedir param2 for a node facing along `d` in the XZ plane.
#[inline]
pub fn dir_to_facedir(d: V3i) -> u8 {
    if d.x.abs() > d.z.abs() {
        if d.x < 0 { 3 } else { 1 }
    } else if d.z < 0 {
        2
    } else {
        0
    }
}

impl MapgenV7p {
    /// Rolls this chunk's dungeon shape from the block seed and builds
    /// `floor(np_dungeons)` dungeons over the full overgeneration bounds.
    pub(super) fn generate_dungeons(&mut self, vm: &mut VoxelManip, max_stone_y: i32) {
        let (nmin, full_min, full_max) = (
            self.bounds.node_min,
            self.bounds.full_node_min,
            self.bounds.full_node_max,
        );
        if max_stone_y < nmin.y {
            return;
        }

        let density = noise_perlin_3d(
            &self.params.np_dungeons,
            nmin.x as f32,
            nmin.y as f32,
            nmin.z as f32,
            self.seed,
        );
        let num_dungeons = density.floor().max(0.0) as u32;
        if num_dungeons == 0 {
            return;
        }

        let mut ps = PseudoRandom::new(self.blockseed.wrapping_add(70033) as i32);
        let num_rooms = ps.range(2, 16) as u32;
        let large_room_chance = if ps.range(1, 4) == 1 { 8 } else { 0 };
        let diagonal_dirs = ps.range(1, 8) == 1;
        let holewidth = if diagonal_dirs { 2 } else { ps.range(1, 2) };

        let dp = DungeonParams {
            c_wall: self.nodes.c_cobble,
            c_alt_wall: self.nodes.c_mossycobble,
            c_stair: self.nodes.c_stair_cobble,
            num_dungeons,
            num_rooms,
            room_size_min: V3i::new(5, 5, 5),
            room_size_max: V3i::new(12, 6, 12),
            room_size_large_min: V3i::new(12, 6, 12),
            room_size_large_max: V3i::new(16, 16, 16),
            large_room_chance,
            diagonal_dirs,
            holesize: V3i::new(holewidth, 3, holewidth),
            corridor_len_min: 1,
            corridor_len_max: 13,
            np_alt_wall: self.params.np_dungeon_alt_wall,
        };
        log::trace!(
            "dungeons: {} x {} rooms, diagonal={}",
            num_dungeons,
            num_rooms,
            diagonal_dirs
        );

        let mut dgen = DungeonGen::new(&self.ndef, dp);
        dgen.generate(vm, self.blockseed, full_min, full_max);
    }
}
