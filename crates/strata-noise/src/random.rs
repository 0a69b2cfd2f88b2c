use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RandomError {
    #[error("invalid random range: max {max} < min {min}")]
    Inverted { min: i32, max: i32 },
    #[error("random range {min}..={max} is wider than {limit}")]
    TooWide { min: i32, max: i32, limit: i32 },
}

/// Small linear congruential generator; `next()` yields `0..=32767`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PseudoRandom {
    state: i32,
}

impl PseudoRandom {
    pub const RANGE: i32 = 32767;

    #[inline]
    pub const fn new(seed: i32) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn seed(&mut self, seed: i32) {
        self.state = seed;
    }

    #[inline]
    pub fn next(&mut self) -> i32 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12345);
        ((self.state / 65536) as u32 % 32768) as i32
    }

    /// Uniform-ish value in `min..=max`. The width is limited to a fifth of
    /// the generator range to keep the modulo bias small.
    pub fn try_range(&mut self, min: i32, max: i32) -> Result<i32, RandomError> {
        if max < min {
            return Err(RandomError::Inverted { min, max });
        }
        let limit = (Self::RANGE + 1) / 5;
        if max as i64 - min as i64 > limit as i64 {
            return Err(RandomError::TooWide { min, max, limit });
        }
        Ok(min + self.next() % (max - min + 1))
    }

    /// [`PseudoRandom::try_range`] for bounds fixed by the caller's code.
    ///
    /// # Panics
    /// If the bounds are inverted or too wide.
    #[inline]
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        match self.try_range(min, max) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

/// PCG32 (XSH-RR) generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PcgRandom {
    state: u64,
    inc: u64,
}

impl PcgRandom {
    const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
    const DEFAULT_SEQ: u64 = 0xda3e_39cb_94b9_5bdb;

    pub fn new(seed: u64) -> Self {
        Self::with_sequence(seed, Self::DEFAULT_SEQ)
    }

    pub fn with_sequence(seed: u64, seq: u64) -> Self {
        let mut r = Self {
            state: 0,
            inc: (seq << 1) | 1,
        };
        r.next();
        r.state = r.state.wrapping_add(seed);
        r.next();
        r
    }

    #[inline]
    pub fn next(&mut self) -> u32 {
        let old = self.state;
        self.state = old.wrapping_mul(Self::MULTIPLIER).wrapping_add(self.inc);
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Unbiased value in `0..bound`; `bound == 0` yields the raw output.
    pub fn range_u32(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return self.next();
        }
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.next();
            if r >= threshold {
                return r % bound;
            }
        }
    }

    pub fn try_range(&mut self, min: i32, max: i32) -> Result<i32, RandomError> {
        if max < min {
            return Err(RandomError::Inverted { min, max });
        }
        let bound = (max as i64 - min as i64 + 1) as u32;
        Ok(min.wrapping_add(self.range_u32(bound) as i32))
    }

    /// # Panics
    /// If `max < min`.
    #[inline]
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        match self.try_range(min, max) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}
