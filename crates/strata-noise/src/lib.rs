//! Fractal lattice noise (point and map sampling) and the deterministic
//! random generators used by terrain generation.
//!
//! Point sampling ([`noise_perlin_2d`], [`noise_perlin_3d`]) and map sampling
//! ([`Noise::perlin_map_2d`], [`Noise::perlin_map_3d`]) evaluate the same
//! field; they agree for a given absolute coordinate up to float rounding.
#![forbid(unsafe_code)]

pub mod flags;
mod map;
mod params;
mod perlin;
mod random;

pub use map::Noise;
pub use params::{NoiseFlags, NoiseParams, NoiseParamsError};
pub use perlin::{
    noise_perlin_2d, noise_perlin_3d, noise2d, noise2d_gradient, noise3d, noise3d_gradient,
};
pub use random::{PcgRandom, PseudoRandom, RandomError};

#[cfg(test)]
mod tests;
