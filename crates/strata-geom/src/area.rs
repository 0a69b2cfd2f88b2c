use crate::V3i;

/// Inclusive axis-aligned box of voxel positions with flat X-fastest indexing.
///
/// Index layout: `(z - min.z) * zstride + (y - min.y) * ystride + (x - min.x)`
/// where `ystride = extent.x` and `zstride = extent.x * extent.y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoxelArea {
    pub min: V3i,
    pub max: V3i,
}

impl VoxelArea {
    #[inline]
    pub const fn new(min: V3i, max: V3i) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    #[inline]
    pub fn extent(&self) -> V3i {
        if self.is_empty() {
            return V3i::ZERO;
        }
        self.max - self.min + V3i::ONE
    }

    #[inline]
    pub fn volume(&self) -> usize {
        let e = self.extent();
        e.x as usize * e.y as usize * e.z as usize
    }

    #[inline]
    pub fn ystride(&self) -> usize {
        self.extent().x as usize
    }

    #[inline]
    pub fn zstride(&self) -> usize {
        let e = self.extent();
        e.x as usize * e.y as usize
    }

    #[inline]
    pub fn contains(&self, p: V3i) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    #[inline]
    pub fn contains_area(&self, other: &VoxelArea) -> bool {
        other.is_empty() || (self.contains(other.min) && self.contains(other.max))
    }

    /// Flat index of `(x, y, z)`. The caller guarantees containment.
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        debug_assert!(self.contains(V3i::new(x, y, z)));
        let e = self.extent();
        (z - self.min.z) as usize * (e.x as usize * e.y as usize)
            + (y - self.min.y) as usize * e.x as usize
            + (x - self.min.x) as usize
    }

    #[inline]
    pub fn index_of(&self, p: V3i) -> usize {
        self.index(p.x, p.y, p.z)
    }

    /// Inverse of [`VoxelArea::index`].
    #[inline]
    pub fn position(&self, i: usize) -> V3i {
        let e = self.extent();
        let ex = e.x as usize;
        let exy = ex * e.y as usize;
        let z = i / exy;
        let rem = i % exy;
        let y = rem / ex;
        let x = rem % ex;
        self.min + V3i::new(x as i32, y as i32, z as i32)
    }

    /// Moves a flat index by `dy` rows along Y.
    #[inline]
    pub fn add_y(&self, i: usize, dy: i32) -> usize {
        (i as isize + dy as isize * self.ystride() as isize) as usize
    }

    /// Iterates all positions in index order.
    pub fn iter(&self) -> impl Iterator<Item = V3i> + '_ {
        let (min, max) = (self.min, self.max);
        (min.z..=max.z).flat_map(move |z| {
            (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| V3i::new(x, y, z)))
        })
    }
}
