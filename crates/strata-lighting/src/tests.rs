use super::*;
use strata_blocks::{CONTENT_AIR, ContentId};
use strata_chunk::MapNode;

fn registry() -> BlockRegistry {
    BlockRegistry::builtin().expect("builtin registry")
}

fn id(reg: &BlockRegistry, name: &str) -> ContentId {
    reg.id_by_name(name).expect(name)
}

/// 5x7x5 buffer at the origin: stone floor at y = 0, air above.
fn floored_air(reg: &BlockRegistry) -> VoxelManip {
    let area = VoxelArea::new(V3i::ZERO, V3i::new(4, 6, 4));
    let mut vm = VoxelManip::new(area);
    let stone = id(reg, "stone");
    for p in area.iter() {
        let c = if p.y == 0 { stone } else { CONTENT_AIR };
        vm.set(p, MapNode::new(c));
    }
    vm
}

fn core_below_top(vm: &VoxelManip) -> VoxelArea {
    VoxelArea::new(vm.area.min, vm.area.max - V3i::UP)
}

#[test]
fn open_sky_lights_columns_down_to_stone() {
    let reg = registry();
    let mut vm = floored_air(&reg);
    for x in 0..=4 {
        for z in 0..=4 {
            vm.set(V3i::new(x, 6, z), MapNode::IGNORE);
        }
    }
    let core = core_below_top(&vm);
    let full = vm.area;
    calc_lighting(&mut vm, &reg, core, full, -10, true);

    for p in core.iter() {
        let n = vm.get(p);
        if p.y == 0 {
            assert_eq!(n.param1, 0, "stone at {p:?} must stay dark");
        } else {
            assert_eq!(n.light_day(), LIGHT_SUN, "air at {p:?}");
            assert_eq!(n.light_night(), 0);
        }
    }
}

#[test]
fn unloaded_sky_above_underground_core_stays_dark() {
    let reg = registry();
    let mut vm = floored_air(&reg);
    for x in 0..=4 {
        for z in 0..=4 {
            vm.set(V3i::new(x, 6, z), MapNode::IGNORE);
        }
    }
    let core = core_below_top(&vm);
    let lit = propagate_sunlight(&mut vm, &reg, core, 5, true);
    assert_eq!(lit, 0);
    assert!(core.iter().all(|p| vm.get(p).param1 == 0));
}

#[test]
fn loaded_roof_casts_shadow_only_when_asked() {
    let reg = registry();
    let stone = id(&reg, "stone");
    let mut vm = floored_air(&reg);
    for x in 0..=4 {
        for z in 0..=4 {
            vm.set(V3i::new(x, 6, z), MapNode::new(stone));
        }
    }
    let core = core_below_top(&vm);

    let mut shadowed = vm.clone();
    assert_eq!(propagate_sunlight(&mut shadowed, &reg, core, -10, true), 0);

    assert_eq!(propagate_sunlight(&mut vm, &reg, core, -10, false), 25);
    assert_eq!(vm.get(V3i::new(2, 1, 2)).light_day(), LIGHT_SUN);
}

#[test]
fn sunlit_roof_cell_lets_sun_through() {
    let reg = registry();
    let mut vm = floored_air(&reg);
    let mut top = vm.get(V3i::new(1, 6, 1));
    top.param1 = LIGHT_SUN;
    vm.set(V3i::new(1, 6, 1), top);

    let core = core_below_top(&vm);
    assert_eq!(propagate_sunlight(&mut vm, &reg, core, 100, true), 1);
    assert_eq!(vm.get(V3i::new(1, 1, 1)).light_day(), LIGHT_SUN);
    assert_eq!(vm.get(V3i::new(2, 1, 1)).light_day(), 0);
}

#[test]
fn torch_light_falls_off_by_manhattan_distance() {
    let reg = registry();
    let mut vm = floored_air(&reg);
    let torch = V3i::new(2, 3, 2);
    vm.set(torch, MapNode::new(id(&reg, "torch")));

    let core = core_below_top(&vm);
    let full = vm.area;
    calc_lighting(&mut vm, &reg, core, full, 100, true);

    let n = vm.get(torch);
    assert_eq!((n.light_day(), n.light_night()), (14, 14));
    for p in vm.area.iter().filter(|p| p.y > 0) {
        let d = p - torch;
        let dist = (d.x.abs() + d.y.abs() + d.z.abs()) as u8;
        let n = vm.get(p);
        assert_eq!(n.light_day(), 14 - dist, "day light at {p:?}");
        assert_eq!(n.light_night(), 14 - dist, "night light at {p:?}");
    }
}

#[test]
fn stone_wall_stops_spread() {
    let reg = registry();
    let stone = id(&reg, "stone");
    let mut vm = floored_air(&reg);
    for y in 0..=6 {
        for z in 0..=4 {
            vm.set(V3i::new(2, y, z), MapNode::new(stone));
        }
    }
    vm.set(V3i::new(0, 3, 0), MapNode::new(id(&reg, "torch")));

    let full = vm.area;
    spread_light(&mut vm, &reg, full);
    assert!(vm.get(V3i::new(1, 3, 0)).light_day() > 0);
    for p in vm.area.iter().filter(|p| p.x >= 2) {
        assert_eq!(vm.get(p).param1, 0, "light leaked to {p:?}");
    }
}

#[test]
fn spread_respects_area_bounds() {
    let reg = registry();
    let mut vm = floored_air(&reg);
    vm.set(V3i::new(0, 3, 0), MapNode::new(id(&reg, "torch")));
    let inner = VoxelArea::new(V3i::new(0, 1, 0), V3i::new(1, 6, 4));

    spread_light(&mut vm, &reg, inner);
    assert_eq!(vm.get(V3i::new(1, 3, 0)).light_day(), 13);
    assert_eq!(vm.get(V3i::new(2, 3, 0)).param1, 0);
}
