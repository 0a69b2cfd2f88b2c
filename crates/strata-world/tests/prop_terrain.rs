use std::sync::Arc;

use proptest::prelude::*;
use strata_blocks::BlockRegistry;
use strata_world::voxel::generation::{
    TerrainChannel, base_terrain_level, mountain_level, surface_level,
};
use strata_world::{MapgenV7p, WorldGenParams};

fn channels(
    hselect: f32,
    base: f32,
    alt: f32,
) -> impl FnMut(TerrainChannel) -> f32 {
    move |ch| match ch {
        TerrainChannel::HeightSelect => hselect,
        TerrainChannel::TerrainBase => base,
        TerrainChannel::TerrainAlt => alt,
        TerrainChannel::MountHeight | TerrainChannel::Mountain => 0.0,
    }
}

proptest! {
    // With alt at or below base, the blend stays between the two.
    #[test]
    fn blend_lies_between_alt_and_base(
        hselect in -20.0f32..20.0,
        base in -200.0f32..200.0,
        drop in 0.0f32..200.0,
    ) {
        let alt = base - drop;
        let h = base_terrain_level(channels(hselect, base, alt));
        let eps = 1e-4 * (base.abs() + alt.abs() + 1.0);
        prop_assert!(h >= alt - eps && h <= base + eps, "h {} alt {} base {}", h, alt, base);
    }

    // A higher alt channel wins outright.
    #[test]
    fn higher_alt_wins(hselect in -2.0f32..2.0, base in -200.0f32..200.0, rise in 0.001f32..100.0) {
        let alt = base + rise;
        prop_assert_eq!(base_terrain_level(channels(hselect, base, alt)), alt);
    }

    #[test]
    fn mountain_level_is_product(height in -300.0f32..300.0, m in -2.0f32..2.0) {
        let v = mountain_level(|ch| match ch {
            TerrainChannel::MountHeight => height,
            TerrainChannel::Mountain => m,
            _ => f32::NAN,
        });
        prop_assert_eq!(v, height * m);
    }

    #[test]
    fn surface_level_never_below_base(base in -500.0f32..500.0, m in proptest::option::of(-500.0f32..500.0)) {
        let s = surface_level(base, m);
        prop_assert!(s >= base as i32);
        if let Some(m) = m {
            prop_assert!(s >= m as i32);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Suitable spawn heights sit in a shallow band above the water.
    #[test]
    fn spawn_levels_stay_near_water(seed in any::<u64>(), x in -20000i32..20000, z in -20000i32..20000) {
        let params = WorldGenParams { seed, ..WorldGenParams::default() };
        let wl = params.water_level;
        let reg = Arc::new(BlockRegistry::builtin().unwrap());
        let mg = MapgenV7p::new(Arc::new(params), reg).unwrap();
        if let Some(y) = mg.spawn_level_at_point(x, z) {
            prop_assert!(y > wl + 2 && y <= wl + 18, "spawn y {}", y);
        }
    }
}
