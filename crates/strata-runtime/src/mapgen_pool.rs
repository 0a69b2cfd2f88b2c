use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use strata_blocks::BlockRegistry;
use strata_world::{ConfigError, MapgenV7p, WorldGenParams};

/// Lock-free pool of generator instances. An instance is checked out by one
/// worker at a time; its noise and heightmap scratch is never shared.
pub struct MapgenPool {
    params: Arc<WorldGenParams>,
    registry: Arc<BlockRegistry>,
    available_tx: Sender<MapgenV7p>,
    available_rx: Receiver<MapgenV7p>,
    allocated: AtomicUsize,
    max_instances: usize,
}

impl MapgenPool {
    /// Builds the pool and its first instance, so configuration errors
    /// surface here rather than on a worker.
    pub fn new(
        params: Arc<WorldGenParams>,
        registry: Arc<BlockRegistry>,
        max_instances: usize,
    ) -> Result<Self, ConfigError> {
        let max_instances = max_instances.max(1);
        let (tx, rx) = bounded(max_instances);
        let first = MapgenV7p::new(params.clone(), registry.clone())?;
        let _ = tx.send(first);
        Ok(Self {
            params,
            registry,
            available_tx: tx,
            available_rx: rx,
            allocated: AtomicUsize::new(1),
            max_instances,
        })
    }

    pub fn with_capacity_from_workers(
        params: Arc<WorldGenParams>,
        registry: Arc<BlockRegistry>,
        worker_count: usize,
    ) -> Result<Arc<Self>, ConfigError> {
        Self::new(params, registry, worker_count.max(1)).map(Arc::new)
    }

    #[inline]
    pub fn params(&self) -> &Arc<WorldGenParams> {
        &self.params
    }

    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    /// Instances created so far.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    /// Takes an idle instance, creates one while under capacity, or blocks
    /// until another worker returns one.
    pub fn acquire(&self) -> Result<PooledMapgen<'_>, ConfigError> {
        if let Ok(mg) = self.available_rx.try_recv() {
            return Ok(self.wrap(mg));
        }

        loop {
            let current = self.allocated.load(Ordering::Acquire);
            if current < self.max_instances {
                let prev = self.allocated.fetch_add(1, Ordering::AcqRel);
                if prev < self.max_instances {
                    return match MapgenV7p::new(self.params.clone(), self.registry.clone()) {
                        Ok(mg) => Ok(self.wrap(mg)),
                        Err(e) => {
                            self.allocated.fetch_sub(1, Ordering::AcqRel);
                            Err(e)
                        }
                    };
                }
                self.allocated.fetch_sub(1, Ordering::AcqRel);
            }

            // The pool owns a sender, so this only wakes on a returned instance.
            if let Ok(mg) = self.available_rx.recv() {
                return Ok(self.wrap(mg));
            }
        }
    }

    fn wrap(&self, mg: MapgenV7p) -> PooledMapgen<'_> {
        PooledMapgen {
            mapgen: Some(mg),
            pool: self,
        }
    }

    fn release(&self, mg: MapgenV7p) {
        let _ = self.available_tx.send(mg);
    }
}

/// Checked-out generator; returns to its pool on drop.
pub struct PooledMapgen<'pool> {
    mapgen: Option<MapgenV7p>,
    pool: &'pool MapgenPool,
}

impl Deref for PooledMapgen<'_> {
    type Target = MapgenV7p;

    fn deref(&self) -> &Self::Target {
        self.mapgen.as_ref().expect("mapgen already released")
    }
}

impl DerefMut for PooledMapgen<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.mapgen.as_mut().expect("mapgen already released")
    }
}

impl Drop for PooledMapgen<'_> {
    fn drop(&mut self) {
        if let Some(mg) = self.mapgen.take() {
            self.pool.release(mg);
        }
    }
}
