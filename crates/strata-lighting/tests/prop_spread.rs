use proptest::prelude::*;
use strata_blocks::{BlockRegistry, CONTENT_AIR};
use strata_chunk::{MapNode, VoxelManip};
use strata_geom::{V3i, VoxelArea};
use strata_lighting::spread_light;

const SIZE: i32 = 6;

fn cells() -> impl Strategy<Value = Vec<u8>> {
    // 0 = air, 1 = stone, 2 = torch
    prop::collection::vec(prop_oneof![6 => Just(0u8), 3 => Just(1u8), 1 => Just(2u8)], (SIZE * SIZE * SIZE) as usize)
}

fn build(reg: &BlockRegistry, kinds: &[u8]) -> VoxelManip {
    let area = VoxelArea::new(V3i::ZERO, V3i::splat(SIZE - 1));
    let stone = reg.id_by_name("stone").unwrap();
    let torch = reg.id_by_name("torch").unwrap();
    let mut vm = VoxelManip::new(area);
    for (i, k) in kinds.iter().enumerate() {
        vm.data[i] = MapNode::new(match k {
            0 => CONTENT_AIR,
            1 => stone,
            _ => torch,
        });
    }
    vm
}

proptest! {
    #[test]
    fn lit_cells_are_one_below_their_brightest_neighbour(kinds in cells()) {
        let reg = BlockRegistry::builtin().unwrap();
        let torch = reg.id_by_name("torch").unwrap();
        let mut vm = build(&reg, &kinds);
        let area = vm.area;
        spread_light(&mut vm, &reg, area);

        for p in area.iter() {
            let n = vm.get(p);
            let def = reg.get(n.content);
            prop_assert_eq!(n.light_day(), n.light_night());
            if !def.light_propagates {
                prop_assert_eq!(n.param1, 0);
                continue;
            }
            if n.content == torch {
                prop_assert_eq!(n.light_day(), 14);
                continue;
            }
            let brightest = V3i::FACES
                .iter()
                .map(|d| vm.get(p + *d))
                .filter(|m| reg.get(m.content).light_propagates)
                .map(|m| m.light_day())
                .max()
                .unwrap_or(0);
            prop_assert_eq!(n.light_day(), brightest.saturating_sub(1));
        }
    }

    #[test]
    fn spread_is_idempotent(kinds in cells()) {
        let reg = BlockRegistry::builtin().unwrap();
        let mut vm = build(&reg, &kinds);
        let area = vm.area;
        spread_light(&mut vm, &reg, area);
        let once = vm.data.clone();
        spread_light(&mut vm, &reg, area);
        prop_assert_eq!(once, vm.data);
    }
}
