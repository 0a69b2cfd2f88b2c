use std::collections::VecDeque;

use hashbrown::HashSet;
use strata_geom::V3i;

/// FIFO of node positions awaiting liquid transformation. A position is
/// queued at most once until popped.
#[derive(Clone, Debug, Default)]
pub struct LiquidQueue {
    order: VecDeque<V3i>,
    queued: HashSet<V3i>,
}

impl LiquidQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `p` was already queued.
    pub fn push_back(&mut self, p: V3i) -> bool {
        if !self.queued.insert(p) {
            return false;
        }
        self.order.push_back(p);
        true
    }

    pub fn pop_front(&mut self) -> Option<V3i> {
        let p = self.order.pop_front()?;
        self.queued.remove(&p);
        Some(p)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &V3i> {
        self.order.iter()
    }
}
