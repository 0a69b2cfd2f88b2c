use strata_blocks::{BlockRegistry, CONTENT_IGNORE};
use strata_chunk::{LiquidQueue, VoxelManip};
use strata_geom::V3i;

use super::MapgenV7p;

/// True if any horizontal neighbour of `p` is loaded, floodable and not
/// itself liquid.
fn is_liquid_horizontally_flowable(vm: &VoxelManip, ndef: &BlockRegistry, p: V3i) -> bool {
    [
        V3i::new(-1, 0, 0),
        V3i::new(1, 0, 0),
        V3i::new(0, 0, -1),
        V3i::new(0, 0, 1),
    ]
    .into_iter()
    .any(|d| {
        let c = vm.content(p + d);
        if c == CONTENT_IGNORE {
            return false;
        }
        let def = ndef.get(c);
        def.floodable && !def.is_liquid()
    })
}

impl MapgenV7p {
    /// Queues the liquid nodes that may flow once the chunk is loaded: the
    /// top of each liquid column with somewhere to spread, and the cell
    /// above each column bottom that rests on floodable or open ground.
    /// The outermost ring of columns is skipped.
    pub fn update_liquid(
        &self,
        vm: &VoxelManip,
        queue: &mut LiquidQueue,
        nmin: V3i,
        nmax: V3i,
    ) {
        let ndef = &*self.ndef;
        for z in nmin.z + 1..=nmax.z - 1 {
            for x in nmin.x + 1..=nmax.x - 1 {
                let mut wasignored = true;
                let mut wasliquid = false;
                let mut waschecked = false;
                let mut waspushed = false;

                for y in (nmin.y..=nmax.y).rev() {
                    let p = V3i::new(x, y, z);
                    let c = vm.content(p);
                    let isignored = c == CONTENT_IGNORE;
                    let isliquid = ndef.get(c).is_liquid();

                    if isignored || wasignored || isliquid == wasliquid {
                        waschecked = false;
                        waspushed = false;
                    } else if isliquid {
                        // Top of a liquid column.
                        let ispushed = is_liquid_horizontally_flowable(vm, ndef, p);
                        if ispushed {
                            queue.push_back(p);
                        }
                        waschecked = true;
                        waspushed = ispushed;
                    } else if !waspushed
                        && (ndef.get(c).floodable
                            || (!waschecked && is_liquid_horizontally_flowable(vm, ndef, p + V3i::UP)))
                    {
                        // First node under a liquid column.
                        queue.push_back(p + V3i::UP);
                    }

                    wasliquid = isliquid;
                    wasignored = isignored;
                }
            }
        }
    }
}
