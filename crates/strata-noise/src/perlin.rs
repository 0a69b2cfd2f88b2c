use crate::params::NoiseParams;

const NOISE_MAGIC_X: u32 = 1619;
const NOISE_MAGIC_Y: u32 = 31337;
const NOISE_MAGIC_Z: u32 = 52591;
const NOISE_MAGIC_SEED: u32 = 1013;

#[inline]
fn scramble(n: u32) -> f32 {
    let n = n & 0x7fff_ffff;
    let n = (n >> 13) ^ n;
    let n = n
        .wrapping_mul(n.wrapping_mul(n).wrapping_mul(60493).wrapping_add(19_990_303))
        .wrapping_add(1_376_312_589)
        & 0x7fff_ffff;
    1.0 - n as i32 as f32 / 0x4000_0000 as f32
}

/// Lattice value in `(-1, 1]` for an integer 2D point.
#[inline]
pub fn noise2d(x: i32, y: i32, seed: i32) -> f32 {
    scramble(
        NOISE_MAGIC_X
            .wrapping_mul(x as u32)
            .wrapping_add(NOISE_MAGIC_Y.wrapping_mul(y as u32))
            .wrapping_add(NOISE_MAGIC_SEED.wrapping_mul(seed as u32)),
    )
}

/// Lattice value in `(-1, 1]` for an integer 3D point.
#[inline]
pub fn noise3d(x: i32, y: i32, z: i32, seed: i32) -> f32 {
    scramble(
        NOISE_MAGIC_X
            .wrapping_mul(x as u32)
            .wrapping_add(NOISE_MAGIC_Y.wrapping_mul(y as u32))
            .wrapping_add(NOISE_MAGIC_Z.wrapping_mul(z as u32))
            .wrapping_add(NOISE_MAGIC_SEED.wrapping_mul(seed as u32)),
    )
}

#[inline]
pub(crate) fn ease_curve(t: f32) -> f32 {
    t * t * t * (t * (6.0 * t - 15.0) + 10.0)
}

#[inline]
pub(crate) fn lerp(v0: f32, v1: f32, t: f32) -> f32 {
    v0 + (v1 - v0) * t
}

#[inline]
pub(crate) fn bilerp(v00: f32, v10: f32, v01: f32, v11: f32, x: f32, y: f32, eased: bool) -> f32 {
    let (tx, ty) = if eased {
        (ease_curve(x), ease_curve(y))
    } else {
        (x, y)
    };
    let u = lerp(v00, v10, tx);
    let v = lerp(v01, v11, tx);
    lerp(u, v, ty)
}

#[inline]
pub(crate) fn trilerp(c: [f32; 8], x: f32, y: f32, z: f32, eased: bool) -> f32 {
    // Corner order: 000 100 010 110 001 101 011 111 (x fastest).
    let (tx, ty, tz) = if eased {
        (ease_curve(x), ease_curve(y), ease_curve(z))
    } else {
        (x, y, z)
    };
    let u = bilerp(c[0], c[1], c[2], c[3], tx, ty, false);
    let v = bilerp(c[4], c[5], c[6], c[7], tx, ty, false);
    lerp(u, v, tz)
}

/// Interpolated lattice noise at a real 2D point.
pub fn noise2d_gradient(x: f32, y: f32, seed: i32, eased: bool) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let (xl, yl) = (x - x0, y - y0);
    let (x0, y0) = (x0 as i32, y0 as i32);
    let v00 = noise2d(x0, y0, seed);
    let v10 = noise2d(x0.wrapping_add(1), y0, seed);
    let v01 = noise2d(x0, y0.wrapping_add(1), seed);
    let v11 = noise2d(x0.wrapping_add(1), y0.wrapping_add(1), seed);
    bilerp(v00, v10, v01, v11, xl, yl, eased)
}

/// Interpolated lattice noise at a real 3D point.
pub fn noise3d_gradient(x: f32, y: f32, z: f32, seed: i32, eased: bool) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let z0 = z.floor();
    let (xl, yl, zl) = (x - x0, y - y0, z - z0);
    let (x0, y0, z0) = (x0 as i32, y0 as i32, z0 as i32);
    let mut c = [0.0f32; 8];
    for (i, v) in c.iter_mut().enumerate() {
        let dx = (i & 1) as i32;
        let dy = ((i >> 1) & 1) as i32;
        let dz = ((i >> 2) & 1) as i32;
        *v = noise3d(
            x0.wrapping_add(dx),
            y0.wrapping_add(dy),
            z0.wrapping_add(dz),
            seed,
        );
    }
    trilerp(c, xl, yl, zl, eased)
}

/// Fractal sum of `np.octaves` octaves at one 2D point. `y` is the world Z
/// axis for terrain channels and is scaled by `spread[1]`.
pub fn noise_perlin_2d(np: &NoiseParams, x: f32, y: f32, seed: i32) -> f32 {
    let eased = np.eased_2d();
    let x = x / np.spread[0];
    let y = y / np.spread[1];
    let seed = seed.wrapping_add(np.seed);
    let mut a = 0.0f32;
    let mut f = 1.0f32;
    let mut g = 1.0f32;
    for i in 0..np.octaves as i32 {
        let mut v = noise2d_gradient(x * f, y * f, seed.wrapping_add(i), eased);
        if np.absvalue() {
            v = v.abs();
        }
        a += g * v;
        f *= np.lacunarity;
        g *= np.persistence;
    }
    np.offset + a * np.scale
}

/// Fractal sum of `np.octaves` octaves at one 3D point.
pub fn noise_perlin_3d(np: &NoiseParams, x: f32, y: f32, z: f32, seed: i32) -> f32 {
    let eased = np.eased_3d();
    let x = x / np.spread[0];
    let y = y / np.spread[1];
    let z = z / np.spread[2];
    let seed = seed.wrapping_add(np.seed);
    let mut a = 0.0f32;
    let mut f = 1.0f32;
    let mut g = 1.0f32;
    for i in 0..np.octaves as i32 {
        let mut v = noise3d_gradient(x * f, y * f, z * f, seed.wrapping_add(i), eased);
        if np.absvalue() {
            v = v.abs();
        }
        a += g * v;
        f *= np.lacunarity;
        g *= np.persistence;
    }
    np.offset + a * np.scale
}
