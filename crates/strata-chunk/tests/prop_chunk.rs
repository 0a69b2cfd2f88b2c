use proptest::prelude::*;
use strata_blocks::{CONTENT_AIR, CONTENT_IGNORE};
use strata_chunk::{LiquidQueue, MapNode, VoxelManip};
use strata_geom::{V3i, VoxelArea};

fn small_area() -> VoxelArea {
    VoxelArea::new(V3i::new(-2, -3, -4), V3i::new(5, 6, 7))
}

#[test]
fn new_buffer_is_all_ignore() {
    let vm = VoxelManip::new(small_area());
    assert_eq!(vm.data.len(), small_area().volume());
    assert!(vm.data.iter().all(|n| n.content == CONTENT_IGNORE));
    assert!(vm.flags.iter().all(|f| *f == 0));
    assert_eq!(vm.count_ignore_in(&small_area()), small_area().volume());
}

#[test]
fn out_of_bounds_reads_ignore_and_writes_fail() {
    let mut vm = VoxelManip::new(small_area());
    let outside = V3i::new(100, 0, 0);
    assert_eq!(vm.get(outside), MapNode::IGNORE);
    assert!(!vm.set(outside, MapNode::AIR));
}

#[test]
fn light_banks_pack_into_param1() {
    let mut n = MapNode::AIR;
    n.set_light(15, 3);
    assert_eq!(n.light_day(), 15);
    assert_eq!(n.light_night(), 3);
    assert_eq!(n.param1, 0x3f);
}

#[test]
fn liquid_queue_is_fifo() {
    let mut q = LiquidQueue::new();
    assert!(q.push_back(V3i::new(1, 2, 3)));
    assert!(q.push_back(V3i::new(4, 5, 6)));
    assert_eq!(q.pop_front(), Some(V3i::new(1, 2, 3)));
    assert_eq!(q.pop_front(), Some(V3i::new(4, 5, 6)));
    assert_eq!(q.pop_front(), None);
}

proptest! {
    // A written node is read back at the same position and nowhere else.
    #[test]
    fn set_then_get(x in -2i32..=5, y in -3i32..=6, z in -4i32..=7) {
        let mut vm = VoxelManip::new(small_area());
        let p = V3i::new(x, y, z);
        prop_assert!(vm.set(p, MapNode::AIR));
        prop_assert_eq!(vm.content(p), CONTENT_AIR);
        prop_assert_eq!(vm.count_ignore_in(&small_area()), small_area().volume() - 1);
    }

    // Re-pushing a queued position never grows the queue.
    #[test]
    fn liquid_queue_unique(points in prop::collection::vec((-4i32..4, -4i32..4, -4i32..4), 0..64)) {
        let mut q = LiquidQueue::new();
        let mut distinct = std::collections::HashSet::new();
        for p in points {
            let p = V3i::from(p);
            prop_assert_eq!(q.push_back(p), distinct.insert(p));
        }
        prop_assert_eq!(q.len(), distinct.len());
    }
}
