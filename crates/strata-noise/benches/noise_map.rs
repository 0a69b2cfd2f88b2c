use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use strata_noise::{Noise, NoiseParams, noise_perlin_2d};

fn bench_noise(c: &mut Criterion) {
    let np = NoiseParams::new(4.0, 35.0, [600.0; 3], 82341, 5, 0.6, 2.0);
    let persist = vec![0.6f32; 80 * 80];

    c.bench_function("perlin_map_2d_80x80", |b| {
        let mut noise = Noise::new_2d(np, 0, 80, 80);
        b.iter(|| {
            let r = noise.perlin_map_2d(black_box(160.0), black_box(-320.0), None);
            black_box(r[0]);
        })
    });

    c.bench_function("perlin_map_2d_80x80_persist", |b| {
        let mut noise = Noise::new_2d(np, 0, 80, 80);
        b.iter(|| {
            let r = noise.perlin_map_2d(black_box(160.0), black_box(-320.0), Some(&persist));
            black_box(r[0]);
        })
    });

    c.bench_function("perlin_point_2d_x6400", |b| {
        b.iter(|| {
            let mut acc = 0.0f32;
            for z in 0..80 {
                for x in 0..80 {
                    acc += noise_perlin_2d(&np, 160.0 + x as f32, -320.0 + z as f32, 0);
                }
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, bench_noise);
criterion_main!(benches);
