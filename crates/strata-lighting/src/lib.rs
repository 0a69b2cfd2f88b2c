//! Sunlight and light-source propagation over a generated voxel buffer.
//!
//! `param1` packs two light banks: day in the low nibble and night in the
//! high nibble. Sunlight only ever lands in the day bank.
#![forbid(unsafe_code)]

use std::collections::VecDeque;

use strata_blocks::{BlockRegistry, CONTENT_IGNORE, LIGHT_SUN};
use strata_chunk::VoxelManip;
use strata_geom::{V3i, VoxelArea};

const DAY_MASK: u8 = 0x0F;
const NIGHT_MASK: u8 = 0xF0;

/// Lights a freshly generated chunk: sunlight down the columns of `core`,
/// then source and sun light spread through `full`.
///
/// With `propagate_shadow`, a column whose node just above `core` is
/// loaded but not in full sun stays dark. A column capped by an unloaded
/// node is lit unless the whole core lies at or below `water_level`.
pub fn calc_lighting(
    vm: &mut VoxelManip,
    ndef: &BlockRegistry,
    core: VoxelArea,
    full: VoxelArea,
    water_level: i32,
    propagate_shadow: bool,
) {
    let lit = propagate_sunlight(vm, ndef, core, water_level, propagate_shadow);
    let spread = spread_light(vm, ndef, full);
    log::trace!(
        "lighting {:?}: {} sunlit columns, {} spread steps",
        core,
        lit,
        spread
    );
}

/// Writes full sun into each `core` column from the top down until a node
/// that blocks sunlight. Returns the number of columns lit.
pub fn propagate_sunlight(
    vm: &mut VoxelManip,
    ndef: &BlockRegistry,
    core: VoxelArea,
    water_level: i32,
    propagate_shadow: bool,
) -> usize {
    let underground = water_level >= core.max.y;
    let mut lit = 0;

    for z in core.min.z..=core.max.z {
        for x in core.min.x..=core.max.x {
            let top = V3i::new(x, core.max.y + 1, z);
            let above = vm.get(top);
            if above.content == CONTENT_IGNORE {
                if underground {
                    continue;
                }
            } else if above.param1 & DAY_MASK != LIGHT_SUN && propagate_shadow {
                continue;
            }

            lit += 1;
            for y in (core.min.y..=core.max.y).rev() {
                let p = V3i::new(x, y, z);
                if !vm.contains(p) {
                    break;
                }
                let i = vm.index(p);
                if !ndef.get(vm.data[i].content).sunlight_propagates {
                    break;
                }
                vm.data[i].param1 = LIGHT_SUN;
            }
        }
    }
    lit
}

/// Seeds light sources inside `area` and floods both banks outward, one
/// level of decay per step. Returns the number of queued spread steps.
pub fn spread_light(vm: &mut VoxelManip, ndef: &BlockRegistry, area: VoxelArea) -> usize {
    let mut queue: VecDeque<(V3i, u8)> = VecDeque::new();

    for z in area.min.z..=area.max.z {
        for y in area.min.y..=area.max.y {
            for x in area.min.x..=area.max.x {
                let p = V3i::new(x, y, z);
                if !vm.contains(p) {
                    continue;
                }
                let i = vm.index(p);
                let n = &mut vm.data[i];
                if n.content == CONTENT_IGNORE {
                    continue;
                }
                let def = ndef.get(n.content);
                if !def.light_propagates {
                    continue;
                }
                if def.light_source != 0 {
                    n.param1 = def.light_source | (def.light_source << 4);
                }
                let light = n.param1;
                if light != 0 {
                    for d in V3i::FACES {
                        light_spread(vm, ndef, &area, &mut queue, p + d, light);
                    }
                }
            }
        }
    }

    let mut steps = 0usize;
    while let Some((p, light)) = queue.pop_front() {
        steps += 1;
        for d in V3i::FACES {
            light_spread(vm, ndef, &area, &mut queue, p + d, light);
        }
    }
    steps
}

fn light_spread(
    vm: &mut VoxelManip,
    ndef: &BlockRegistry,
    area: &VoxelArea,
    queue: &mut VecDeque<(V3i, u8)>,
    p: V3i,
    light: u8,
) {
    if light <= 1 || !area.contains(p) || !vm.contains(p) {
        return;
    }
    let i = vm.index(p);
    let n = &mut vm.data[i];

    let light_day = (light & DAY_MASK).saturating_sub(0x01);
    let light_night = (light & NIGHT_MASK).saturating_sub(0x10);
    let cur_day = n.param1 & DAY_MASK;
    let cur_night = n.param1 & NIGHT_MASK;

    if (light_day <= cur_day && light_night <= cur_night) || !ndef.get(n.content).light_propagates {
        return;
    }

    let light = light_day.max(cur_day) | light_night.max(cur_night);
    n.param1 = light;
    queue.push_back((p, light));
}

#[cfg(test)]
mod tests;
