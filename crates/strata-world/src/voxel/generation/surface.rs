use strata_blocks::{CONTENT_AIR, CONTENT_IGNORE};
use strata_chunk::{MapNode, VoxelManip};

use super::MapgenV7p;

impl MapgenV7p {
    /// Drops each column's biome dust onto the first non-air node below
    /// the top of the buffer. Columns whose chunk above is still ungenerated
    /// start at the core top and get their dust when that chunk is made.
    pub(super) fn dust_top_nodes(&mut self, vm: &mut VoxelManip) {
        let b = self.bounds;
        if b.node_max.y < self.water_level {
            return;
        }

        let mut index = 0usize;
        for z in b.node_min.z..=b.node_max.z {
            for x in b.node_min.x..=b.node_max.x {
                let biome = self.biomes.get(self.biomemap[index]);
                index += 1;
                let Some(c_dust) = biome.c_dust else {
                    continue;
                };

                let y_start = match vm.data[vm.area.index(x, b.full_node_max.y, z)].content {
                    CONTENT_AIR => b.full_node_max.y - 1,
                    CONTENT_IGNORE
                        if vm.data[vm.area.index(x, b.node_max.y + 1, z)].content == CONTENT_AIR =>
                    {
                        b.node_max.y
                    }
                    _ => continue,
                };

                let mut vi = vm.area.index(x, y_start, z);
                let mut y = y_start;
                while y >= b.node_min.y - 1 {
                    if vm.data[vi].content != CONTENT_AIR {
                        break;
                    }
                    vi = vm.area.add_y(vi, -1);
                    y -= 1;
                }

                let c = vm.data[vi].content;
                if !self.ndef.get(c).buildable_to && c != CONTENT_IGNORE && c != c_dust {
                    vi = vm.area.add_y(vi, 1);
                    vm.data[vi] = MapNode::new(c_dust);
                }
            }
        }
    }
}
