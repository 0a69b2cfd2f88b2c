//! Integer and float vector types plus voxel-box indexing shared by engine crates.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

mod area;

pub use area::VoxelArea;

/// Integer voxel coordinate (node or block space).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct V3i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl V3i {
    pub const ZERO: V3i = V3i { x: 0, y: 0, z: 0 };
    pub const ONE: V3i = V3i { x: 1, y: 1, z: 1 };
    pub const UP: V3i = V3i { x: 0, y: 1, z: 0 };

    /// The six face neighbours, +X first.
    pub const FACES: [V3i; 6] = [
        V3i::new(1, 0, 0),
        V3i::new(-1, 0, 0),
        V3i::new(0, 1, 0),
        V3i::new(0, -1, 0),
        V3i::new(0, 0, 1),
        V3i::new(0, 0, -1),
    ];

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v, z: v }
    }

    #[inline]
    pub fn with_y(self, y: i32) -> Self {
        Self { y, ..self }
    }

    #[inline]
    pub fn xz(self) -> V2i {
        V2i::new(self.x, self.z)
    }

    #[inline]
    pub fn min(self, rhs: V3i) -> V3i {
        V3i::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    #[inline]
    pub fn max(self, rhs: V3i) -> V3i {
        V3i::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }

    #[inline]
    pub fn to_f32(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl Add for V3i {
    type Output = V3i;
    #[inline]
    fn add(self, rhs: V3i) -> V3i {
        V3i::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for V3i {
    #[inline]
    fn add_assign(&mut self, rhs: V3i) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for V3i {
    type Output = V3i;
    #[inline]
    fn sub(self, rhs: V3i) -> V3i {
        V3i::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for V3i {
    #[inline]
    fn sub_assign(&mut self, rhs: V3i) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<i32> for V3i {
    type Output = V3i;
    #[inline]
    fn mul(self, rhs: i32) -> V3i {
        V3i::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for V3i {
    type Output = V3i;
    #[inline]
    fn neg(self) -> V3i {
        V3i::new(-self.x, -self.y, -self.z)
    }
}

impl From<(i32, i32, i32)> for V3i {
    #[inline]
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        V3i::new(x, y, z)
    }
}

/// Integer column coordinate (x, z).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct V2i {
    pub x: i32,
    pub y: i32,
}

impl V2i {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Truncates each component toward zero.
    #[inline]
    pub fn to_i32(self) -> V3i {
        V3i::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}
