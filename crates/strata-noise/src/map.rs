use crate::params::NoiseParams;
use crate::perlin::{bilerp, noise2d, noise3d, trilerp};

/// Map-mode evaluator for one noise channel over a fixed region size.
///
/// Scratch buffers are owned by the instance; `result` is overwritten by every
/// map call. Instances are not meant to be shared between threads while in use.
#[derive(Clone, Debug)]
pub struct Noise {
    pub np: NoiseParams,
    pub seed: i32,
    pub sx: u32,
    pub sy: u32,
    pub sz: u32,
    noise_buf: Vec<f32>,
    gradient_buf: Vec<f32>,
    persist_buf: Vec<f32>,
    pub result: Vec<f32>,
}

impl Noise {
    /// `sz == 1` for 2D use; `sy` is then the world Z extent.
    pub fn new(np: NoiseParams, seed: i32, sx: u32, sy: u32, sz: u32) -> Self {
        let mut n = Self {
            np,
            seed,
            sx: 0,
            sy: 0,
            sz: 0,
            noise_buf: Vec::new(),
            gradient_buf: Vec::new(),
            persist_buf: Vec::new(),
            result: Vec::new(),
        };
        n.set_size(sx, sy, sz);
        n
    }

    pub fn new_2d(np: NoiseParams, seed: i32, sx: u32, sy: u32) -> Self {
        Self::new(np, seed, sx, sy, 1)
    }

    pub fn set_size(&mut self, sx: u32, sy: u32, sz: u32) {
        self.sx = sx;
        self.sy = sy;
        self.sz = sz.max(1);
        let n = self.len();
        self.gradient_buf.resize(n, 0.0);
        self.result.resize(n, 0.0);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sx as usize * self.sy as usize * self.sz as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fills `result` for the `sx * sy` region starting at `(x, y)`.
    ///
    /// With `persistence_map`, each point carries its own octave gain: it
    /// starts at 1 and is multiplied by that point's persistence after every
    /// octave. The channel's own persistence is ignored in that case.
    pub fn perlin_map_2d(&mut self, x: f32, y: f32, persistence_map: Option<&[f32]>) -> &[f32] {
        let np = self.np;
        let bufsize = (self.sx * self.sy) as usize;
        let x = x / np.spread[0];
        let y = y / np.spread[1];
        let mut f = 1.0f32;
        let mut g = 1.0f32;

        self.result[..bufsize].fill(0.0);
        if let Some(pmap) = persistence_map {
            assert!(pmap.len() >= bufsize, "persistence map smaller than region");
            self.persist_buf.clear();
            self.persist_buf.resize(bufsize, 1.0);
        }

        for oct in 0..np.octaves as i32 {
            let seed = self.seed.wrapping_add(np.seed).wrapping_add(oct);
            self.gradient_map_2d(x * f, y * f, f / np.spread[0], f / np.spread[1], seed);
            self.accumulate(g, persistence_map, bufsize);
            f *= np.lacunarity;
            g *= np.persistence;
        }

        self.apply_scale_offset(bufsize);
        &self.result[..bufsize]
    }

    /// Fills `result` for the `sx * sy * sz` box starting at `(x, y, z)`,
    /// X fastest then Y then Z.
    pub fn perlin_map_3d(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        persistence_map: Option<&[f32]>,
    ) -> &[f32] {
        let np = self.np;
        let bufsize = self.len();
        let x = x / np.spread[0];
        let y = y / np.spread[1];
        let z = z / np.spread[2];
        let mut f = 1.0f32;
        let mut g = 1.0f32;

        self.result[..bufsize].fill(0.0);
        if let Some(pmap) = persistence_map {
            assert!(pmap.len() >= bufsize, "persistence map smaller than region");
            self.persist_buf.clear();
            self.persist_buf.resize(bufsize, 1.0);
        }

        for oct in 0..np.octaves as i32 {
            let seed = self.seed.wrapping_add(np.seed).wrapping_add(oct);
            self.gradient_map_3d(
                x * f,
                y * f,
                z * f,
                f / np.spread[0],
                f / np.spread[1],
                f / np.spread[2],
                seed,
            );
            self.accumulate(g, persistence_map, bufsize);
            f *= np.lacunarity;
            g *= np.persistence;
        }

        self.apply_scale_offset(bufsize);
        &self.result[..bufsize]
    }

    fn accumulate(&mut self, g: f32, persistence_map: Option<&[f32]>, bufsize: usize) {
        let abs = self.np.absvalue();
        let grad = &self.gradient_buf[..bufsize];
        let result = &mut self.result[..bufsize];
        match persistence_map {
            Some(pmap) => {
                let gmap = &mut self.persist_buf[..bufsize];
                for i in 0..bufsize {
                    let v = if abs { grad[i].abs() } else { grad[i] };
                    result[i] += gmap[i] * v;
                    gmap[i] *= pmap[i];
                }
            }
            None => {
                for i in 0..bufsize {
                    let v = if abs { grad[i].abs() } else { grad[i] };
                    result[i] += g * v;
                }
            }
        }
    }

    fn apply_scale_offset(&mut self, bufsize: usize) {
        let np = &self.np;
        if (np.offset - 0.0).abs() > 0.00001 || (np.scale - 1.0).abs() > 0.00001 {
            for v in &mut self.result[..bufsize] {
                *v = *v * np.scale + np.offset;
            }
        }
    }

    /// One octave of interpolated lattice noise into `gradient_buf`, stepping
    /// the lattice coordinate incrementally across the region.
    fn gradient_map_2d(&mut self, x: f32, y: f32, step_x: f32, step_y: f32, seed: i32) {
        let eased = self.np.eased_2d();
        let (sx, sy) = (self.sx, self.sy);
        let x0 = x.floor();
        let y0 = y.floor();
        let orig_u = x - x0;
        let mut v = y - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        // One spare lattice row per axis absorbs rounding in the stepped coordinates.
        let nlx = (orig_u + sx as f32 * step_x) as u32 + 3;
        let nly = (v + sy as f32 * step_y) as u32 + 3;
        let nlx_us = nlx as usize;
        self.noise_buf.clear();
        self.noise_buf.reserve((nlx * nly) as usize);
        for j in 0..nly as i32 {
            for i in 0..nlx as i32 {
                self.noise_buf
                    .push(noise2d(x0.wrapping_add(i), y0.wrapping_add(j), seed));
            }
        }

        let lattice = &self.noise_buf;
        let at = |i: usize, j: usize| lattice[j * nlx_us + i];
        let mut index = 0usize;
        let mut noisey = 0usize;
        for _ in 0..sy {
            let mut v00 = at(0, noisey);
            let mut v10 = at(1, noisey);
            let mut v01 = at(0, noisey + 1);
            let mut v11 = at(1, noisey + 1);

            let mut u = orig_u;
            let mut noisex = 0usize;
            for _ in 0..sx {
                self.gradient_buf[index] = bilerp(v00, v10, v01, v11, u, v, eased);
                index += 1;

                u += step_x;
                if u >= 1.0 {
                    u -= 1.0;
                    noisex += 1;
                    v00 = v10;
                    v01 = v11;
                    v10 = at(noisex + 1, noisey);
                    v11 = at(noisex + 1, noisey + 1);
                }
            }

            v += step_y;
            if v >= 1.0 {
                v -= 1.0;
                noisey += 1;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn gradient_map_3d(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        step_x: f32,
        step_y: f32,
        step_z: f32,
        seed: i32,
    ) {
        let eased = self.np.eased_3d();
        let (sx, sy, sz) = (self.sx, self.sy, self.sz);
        let x0 = x.floor();
        let y0 = y.floor();
        let z0 = z.floor();
        let orig_u = x - x0;
        let orig_v = y - y0;
        let mut w = z - z0;
        let (x0, y0, z0) = (x0 as i32, y0 as i32, z0 as i32);

        let nlx = (orig_u + sx as f32 * step_x) as u32 + 3;
        let nly = (orig_v + sy as f32 * step_y) as u32 + 3;
        let nlz = (w + sz as f32 * step_z) as u32 + 3;
        let (nlx_us, nly_us) = (nlx as usize, nly as usize);
        self.noise_buf.clear();
        self.noise_buf.reserve((nlx * nly * nlz) as usize);
        for k in 0..nlz as i32 {
            for j in 0..nly as i32 {
                for i in 0..nlx as i32 {
                    self.noise_buf.push(noise3d(
                        x0.wrapping_add(i),
                        y0.wrapping_add(j),
                        z0.wrapping_add(k),
                        seed,
                    ));
                }
            }
        }

        let lattice = &self.noise_buf;
        let at = |i: usize, j: usize, k: usize| lattice[(k * nly_us + j) * nlx_us + i];
        let mut index = 0usize;
        let mut noisez = 0usize;
        for _ in 0..sz {
            let mut v = orig_v;
            let mut noisey = 0usize;
            for _ in 0..sy {
                let mut c = [
                    at(0, noisey, noisez),
                    at(1, noisey, noisez),
                    at(0, noisey + 1, noisez),
                    at(1, noisey + 1, noisez),
                    at(0, noisey, noisez + 1),
                    at(1, noisey, noisez + 1),
                    at(0, noisey + 1, noisez + 1),
                    at(1, noisey + 1, noisez + 1),
                ];

                let mut u = orig_u;
                let mut noisex = 0usize;
                for _ in 0..sx {
                    self.gradient_buf[index] = trilerp(c, u, v, w, eased);
                    index += 1;

                    u += step_x;
                    if u >= 1.0 {
                        u -= 1.0;
                        noisex += 1;
                        c[0] = c[1];
                        c[2] = c[3];
                        c[4] = c[5];
                        c[6] = c[7];
                        c[1] = at(noisex + 1, noisey, noisez);
                        c[3] = at(noisex + 1, noisey + 1, noisez);
                        c[5] = at(noisex + 1, noisey, noisez + 1);
                        c[7] = at(noisex + 1, noisey + 1, noisez + 1);
                    }
                }

                v += step_y;
                if v >= 1.0 {
                    v -= 1.0;
                    noisey += 1;
                }
            }

            w += step_z;
            if w >= 1.0 {
                w -= 1.0;
                noisez += 1;
            }
        }
    }
}
