//! Voxel buffer shared by generation passes, plus the liquid transform queue.
#![forbid(unsafe_code)]

mod liquid_queue;

pub use liquid_queue::LiquidQueue;

use strata_blocks::{CONTENT_AIR, CONTENT_IGNORE, ContentId};
use strata_geom::{V3i, VoxelArea};

/// Cell is inside a generated dungeon room or corridor.
pub const VMANIP_FLAG_DUNGEON_INSIDE: u8 = 0x02;
/// Dungeon walls must not replace this cell.
pub const VMANIP_FLAG_DUNGEON_PRESERVE: u8 = 0x04;
pub const VMANIP_FLAG_DUNGEON_UNTOUCHABLE: u8 =
    VMANIP_FLAG_DUNGEON_INSIDE | VMANIP_FLAG_DUNGEON_PRESERVE;
/// Cell was hollowed out by a small cave.
pub const VMANIP_FLAG_CAVE: u8 = 0x08;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapNode {
    pub content: ContentId,
    /// Low nibble: day light bank. High nibble: night light bank.
    pub param1: u8,
    pub param2: u8,
}

impl MapNode {
    pub const IGNORE: MapNode = MapNode::new(CONTENT_IGNORE);
    pub const AIR: MapNode = MapNode::new(CONTENT_AIR);

    #[inline]
    pub const fn new(content: ContentId) -> Self {
        Self {
            content,
            param1: 0,
            param2: 0,
        }
    }

    #[inline]
    pub fn light_day(self) -> u8 {
        self.param1 & 0x0f
    }

    #[inline]
    pub fn light_night(self) -> u8 {
        self.param1 >> 4
    }

    #[inline]
    pub fn set_light(&mut self, day: u8, night: u8) {
        self.param1 = (day & 0x0f) | ((night & 0x0f) << 4);
    }
}

impl Default for MapNode {
    fn default() -> Self {
        MapNode::IGNORE
    }
}

/// Flat node buffer over an inclusive area, X-fastest then Y then Z.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelManip {
    pub area: VoxelArea,
    pub data: Vec<MapNode>,
    pub flags: Vec<u8>,
}

impl VoxelManip {
    /// Buffer over `area` with every cell set to the ignore sentinel.
    pub fn new(area: VoxelArea) -> Self {
        let n = area.volume();
        Self {
            area,
            data: vec![MapNode::IGNORE; n],
            flags: vec![0; n],
        }
    }

    #[inline]
    pub fn index(&self, p: V3i) -> usize {
        self.area.index_of(p)
    }

    #[inline]
    pub fn contains(&self, p: V3i) -> bool {
        self.area.contains(p)
    }

    /// Node at `p`, or the ignore sentinel outside the buffer.
    #[inline]
    pub fn get(&self, p: V3i) -> MapNode {
        if self.area.contains(p) {
            self.data[self.area.index_of(p)]
        } else {
            MapNode::IGNORE
        }
    }

    #[inline]
    pub fn content(&self, p: V3i) -> ContentId {
        self.get(p).content
    }

    /// Writes `node` at `p`; returns false if `p` is outside the buffer.
    #[inline]
    pub fn set(&mut self, p: V3i, node: MapNode) -> bool {
        if !self.area.contains(p) {
            return false;
        }
        let i = self.area.index_of(p);
        self.data[i] = node;
        true
    }

    /// Clears all cell flags.
    pub fn clear_flags(&mut self) {
        self.flags.iter_mut().for_each(|f| *f = 0);
    }

    /// Number of cells still holding the ignore sentinel inside `area`.
    pub fn count_ignore_in(&self, area: &VoxelArea) -> usize {
        area.iter()
            .filter(|p| self.content(*p) == CONTENT_IGNORE)
            .count()
    }
}
