use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flags::{FlagDesc, read_flag_string};

/// Per-channel noise flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub struct NoiseFlags(pub u32);

impl NoiseFlags {
    /// Engine defaults: eased in 2D, linear in 3D.
    pub const DEFAULTS: NoiseFlags = NoiseFlags(0x01);
    /// Ease lattice interpolation in both 2D and 3D.
    pub const EASED: NoiseFlags = NoiseFlags(0x02);
    /// Take the absolute value of each octave before summing.
    pub const ABSVALUE: NoiseFlags = NoiseFlags(0x04);

    pub const DESC: &'static FlagDesc = &[
        ("defaults", Self::DEFAULTS.0),
        ("eased", Self::EASED.0),
        ("absvalue", Self::ABSVALUE.0),
    ];

    #[inline]
    pub const fn intersects(self, other: NoiseFlags) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn union(self, other: NoiseFlags) -> NoiseFlags {
        NoiseFlags(self.0 | other.0)
    }
}

impl Default for NoiseFlags {
    fn default() -> Self {
        NoiseFlags::DEFAULTS
    }
}

impl From<String> for NoiseFlags {
    fn from(s: String) -> Self {
        NoiseFlags(read_flag_string(&s, NoiseFlags::DESC, 0))
    }
}

impl From<NoiseFlags> for String {
    fn from(f: NoiseFlags) -> Self {
        NoiseFlags::DESC
            .iter()
            .filter(|(_, bit)| f.0 & bit != 0)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum NoiseParamsError {
    #[error("spread component {axis} must be positive, got {value}")]
    SpreadNotPositive { axis: char, value: f32 },
    #[error("lacunarity must be positive, got {0}")]
    LacunarityNotPositive(f32),
    #[error("octaves must be at least 1")]
    ZeroOctaves,
    #[error("{0} must be finite")]
    NotFinite(&'static str),
}

/// Immutable description of one fractal noise channel.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NoiseParams {
    pub offset: f32,
    pub scale: f32,
    /// Distance (in nodes) between lattice points of the first octave, per axis.
    pub spread: [f32; 3],
    pub seed: i32,
    pub octaves: u16,
    pub persistence: f32,
    pub lacunarity: f32,
    pub flags: NoiseFlags,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self::new(0.0, 1.0, [250.0; 3], 12345, 3, 0.6, 2.0)
    }
}

impl NoiseParams {
    #[inline]
    pub const fn new(
        offset: f32,
        scale: f32,
        spread: [f32; 3],
        seed: i32,
        octaves: u16,
        persistence: f32,
        lacunarity: f32,
    ) -> Self {
        Self {
            offset,
            scale,
            spread,
            seed,
            octaves,
            persistence,
            lacunarity,
            flags: NoiseFlags::DEFAULTS,
        }
    }

    #[inline]
    pub const fn with_flags(self, flags: NoiseFlags) -> Self {
        Self { flags, ..self }
    }

    /// Same channel with its octave gain replaced; the point-sampling
    /// counterpart of a per-point persistence map.
    #[inline]
    pub const fn with_persistence(self, persistence: f32) -> Self {
        Self {
            persistence,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), NoiseParamsError> {
        for (name, v) in [
            ("offset", self.offset),
            ("scale", self.scale),
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
        ] {
            if !v.is_finite() {
                return Err(NoiseParamsError::NotFinite(name));
            }
        }
        for (axis, value) in ['x', 'y', 'z'].into_iter().zip(self.spread) {
            // NaN fails this comparison as well.
            if !(value > 0.0) || !value.is_finite() {
                return Err(NoiseParamsError::SpreadNotPositive { axis, value });
            }
        }
        if self.lacunarity <= 0.0 {
            return Err(NoiseParamsError::LacunarityNotPositive(self.lacunarity));
        }
        if self.octaves == 0 {
            return Err(NoiseParamsError::ZeroOctaves);
        }
        Ok(())
    }

    /// 2D sampling eases unless the flags say otherwise.
    #[inline]
    pub(crate) fn eased_2d(&self) -> bool {
        self.flags
            .intersects(NoiseFlags::DEFAULTS.union(NoiseFlags::EASED))
    }

    #[inline]
    pub(crate) fn eased_3d(&self) -> bool {
        self.flags.intersects(NoiseFlags::EASED)
    }

    #[inline]
    pub(crate) fn absvalue(&self) -> bool {
        self.flags.intersects(NoiseFlags::ABSVALUE)
    }
}
