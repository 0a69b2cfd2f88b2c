use super::*;
use crate::flags::{read_flag_string, write_flag_string};
use crate::perlin::{bilerp, ease_curve};

fn terrain_like() -> NoiseParams {
    NoiseParams::new(4.0, 35.0, [600.0; 3], 82341, 5, 0.6, 2.0)
}

#[test]
fn lattice_hash_reference_values() {
    assert!((noise2d(0, 0, 0) - (-0.281_790_97)).abs() < 1e-6);
    assert!((noise2d(1, 0, 0) - 0.171_733_14).abs() < 1e-6);
    assert!((noise2d(7, -3, 1337) - (-0.924_210_43)).abs() < 1e-6);
}

#[test]
fn lattice_values_stay_in_unit_range() {
    for x in -50..50 {
        for y in -50..50 {
            let v = noise2d(x, y, 99);
            assert!(v > -1.0 && v <= 1.0);
            let w = noise3d(x, y, x ^ y, -7);
            assert!(w > -1.0 && w <= 1.0);
        }
    }
}

#[test]
fn ease_curve_fixes_endpoints() {
    assert_eq!(ease_curve(0.0), 0.0);
    assert!((ease_curve(1.0) - 1.0).abs() < 1e-6);
    assert!((ease_curve(0.5) - 0.5).abs() < 1e-6);
}

#[test]
fn bilerp_hits_corners() {
    for eased in [false, true] {
        assert_eq!(bilerp(1.0, 2.0, 3.0, 4.0, 0.0, 0.0, eased), 1.0);
        assert!((bilerp(1.0, 2.0, 3.0, 4.0, 1.0, 0.0, eased) - 2.0).abs() < 1e-6);
        assert!((bilerp(1.0, 2.0, 3.0, 4.0, 0.0, 1.0, eased) - 3.0).abs() < 1e-6);
        assert!((bilerp(1.0, 2.0, 3.0, 4.0, 1.0, 1.0, eased) - 4.0).abs() < 1e-6);
    }
}

#[test]
fn gradient_noise_matches_lattice_on_integer_points() {
    for (x, y) in [(0, 0), (5, -9), (-13, 21)] {
        let g = noise2d_gradient(x as f32, y as f32, 3, true);
        assert!((g - noise2d(x, y, 3)).abs() < 1e-6);
    }
}

#[test]
fn point_sampling_is_deterministic() {
    let np = terrain_like();
    let a = noise_perlin_2d(&np, 123.0, -456.0, 42);
    let b = noise_perlin_2d(&np, 123.0, -456.0, 42);
    assert_eq!(a.to_bits(), b.to_bits());
    let c = noise_perlin_2d(&np, 123.0, -456.0, 43);
    assert_ne!(a.to_bits(), c.to_bits());
}

#[test]
fn map_2d_matches_point_sampling() {
    let np = terrain_like();
    let (sx, sz) = (80u32, 80u32);
    for (seed, ox, oz) in [(0, 0, 0), (1234, -160, 320), (-77, 31000 - 80, -31000)] {
        let mut noise = Noise::new_2d(np, seed, sx, sz);
        let map = noise.perlin_map_2d(ox as f32, oz as f32, None).to_vec();
        for z in (0..sz).step_by(7) {
            for x in (0..sx).step_by(5) {
                let i = (z * sx + x) as usize;
                let p = noise_perlin_2d(&np, (ox + x as i32) as f32, (oz + z as i32) as f32, seed);
                assert!(
                    (map[i] - p).abs() < 1e-2,
                    "seed {seed} at ({x},{z}): map {} point {p}",
                    map[i]
                );
            }
        }
    }
}

#[test]
fn map_3d_matches_point_sampling() {
    let np = NoiseParams::new(0.9, 0.5, [50.0; 3], 0, 2, 0.8, 2.0);
    let (sx, sy, sz) = (16u32, 12u32, 10u32);
    let mut noise = Noise::new(np, 17, sx, sy, sz);
    let map = noise.perlin_map_3d(-30.0, 5.0, 64.0, None).to_vec();
    for z in 0..sz {
        for y in 0..sy {
            for x in 0..sx {
                let i = ((z * sy + y) * sx + x) as usize;
                let p = noise_perlin_3d(
                    &np,
                    -30.0 + x as f32,
                    5.0 + y as f32,
                    64.0 + z as f32,
                    17,
                );
                assert!((map[i] - p).abs() < 1e-3);
            }
        }
    }
}

#[test]
fn uniform_persistence_map_equals_point_override() {
    let np = terrain_like();
    let (sx, sz) = (32u32, 24u32);
    let persist = vec![0.45f32; (sx * sz) as usize];
    let mut noise = Noise::new_2d(np, 9, sx, sz);
    let map = noise.perlin_map_2d(64.0, -64.0, Some(&persist)).to_vec();
    let overridden = np.with_persistence(0.45);
    for z in 0..sz {
        for x in 0..sx {
            let i = (z * sx + x) as usize;
            let p = noise_perlin_2d(&overridden, 64.0 + x as f32, -64.0 + z as f32, 9);
            assert!((map[i] - p).abs() < 1e-2);
        }
    }
}

#[test]
fn persistence_map_is_per_point() {
    let np = terrain_like();
    let (sx, sz) = (16u32, 1u32);
    let mut persist = vec![0.2f32; sx as usize];
    persist[8..].fill(0.9);
    let mut noise = Noise::new_2d(np, 5, sx, sz);
    let map = noise.perlin_map_2d(0.0, 0.0, Some(&persist)).to_vec();
    for x in 0..sx as usize {
        let p = noise_perlin_2d(&np.with_persistence(persist[x]), x as f32, 0.0, 5);
        assert!((map[x] - p).abs() < 1e-2);
    }
}

#[test]
fn absvalue_octaves_are_non_negative() {
    let np = NoiseParams::new(0.0, 1.0, [40.0; 3], 3, 4, 0.5, 2.0)
        .with_flags(NoiseFlags::ABSVALUE.union(NoiseFlags::DEFAULTS));
    let mut noise = Noise::new_2d(np, 0, 20, 20);
    assert!(noise.perlin_map_2d(0.0, 0.0, None).iter().all(|v| *v >= 0.0));
    assert!(noise_perlin_2d(&np, 3.5, 7.25, 0) >= 0.0);
}

#[test]
fn result_is_overwritten_per_call() {
    let np = terrain_like();
    let mut noise = Noise::new_2d(np, 1, 8, 8);
    let first = noise.perlin_map_2d(0.0, 0.0, None).to_vec();
    noise.perlin_map_2d(8000.0, 8000.0, None);
    let again = noise.perlin_map_2d(0.0, 0.0, None).to_vec();
    assert_eq!(first, again);
}

#[test]
fn validate_rejects_degenerate_params() {
    assert!(terrain_like().validate().is_ok());
    let mut np = terrain_like();
    np.spread[1] = 0.0;
    assert_eq!(
        np.validate(),
        Err(NoiseParamsError::SpreadNotPositive {
            axis: 'y',
            value: 0.0
        })
    );
    let np = NoiseParams {
        lacunarity: 0.0,
        ..terrain_like()
    };
    assert_eq!(
        np.validate(),
        Err(NoiseParamsError::LacunarityNotPositive(0.0))
    );
    let np = NoiseParams {
        octaves: 0,
        ..terrain_like()
    };
    assert_eq!(np.validate(), Err(NoiseParamsError::ZeroOctaves));
    let np = NoiseParams {
        scale: f32::NAN,
        ..terrain_like()
    };
    assert_eq!(np.validate(), Err(NoiseParamsError::NotFinite("scale")));
}

#[test]
fn flag_strings_set_and_clear() {
    let desc: &flags::FlagDesc = &[("caves", 1), ("dungeons", 2), ("light", 4)];
    assert_eq!(read_flag_string("caves, nodungeons", desc, 0b110), 0b101);
    assert_eq!(read_flag_string(" LIGHT ,bogus", desc, 0), 0b100);
    assert_eq!(read_flag_string("", desc, 0b011), 0b011);
    assert_eq!(write_flag_string(0b101, desc), "caves, nodungeons, light");
    assert_eq!(NoiseFlags::from("eased, absvalue".to_string()).0, 0x06);
    assert_eq!(String::from(NoiseFlags::DEFAULTS), "defaults");
}

#[test]
fn pseudo_random_reference_sequence() {
    let mut r = PseudoRandom::new(0);
    let seq: Vec<i32> = (0..6).map(|_| r.next()).collect();
    assert_eq!(seq, vec![0, 21469, 9989, 22118, 3498, 16928]);
}

#[test]
fn pseudo_random_range_bounds() {
    let mut r = PseudoRandom::new(1032);
    for _ in 0..1000 {
        let v = r.range(-3, 9);
        assert!((-3..=9).contains(&v));
    }
    assert!(matches!(
        r.try_range(5, 4),
        Err(RandomError::Inverted { .. })
    ));
    assert!(matches!(
        r.try_range(0, 10_000),
        Err(RandomError::TooWide { .. })
    ));
}

#[test]
fn pcg_matches_reference_stream() {
    let mut r = PcgRandom::with_sequence(42, 54);
    let seq: Vec<u32> = (0..6).map(|_| r.next()).collect();
    assert_eq!(
        seq,
        vec![0xa15c02b7, 0x7b47f409, 0xba1d3330, 0x83d2f293, 0xbfa4784b, 0xcbed606e]
    );
    let mut d = PcgRandom::new(0);
    assert_eq!(d.next(), 174_444_157);
}

#[test]
fn pcg_range_is_inclusive() {
    let mut r = PcgRandom::new(7);
    let mut seen = [false; 5];
    for _ in 0..500 {
        let v = r.range(-2, 2);
        seen[(v + 2) as usize] = true;
    }
    assert!(seen.iter().all(|s| *s));
    assert_eq!(r.range(i32::MIN, i32::MIN), i32::MIN);
}
