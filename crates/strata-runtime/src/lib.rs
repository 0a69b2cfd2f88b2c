//! Emerge runtime: chunk generation fanned out over a worker pool, each
//! worker checking a generator instance out of a shared pool.
#![forbid(unsafe_code)]

mod mapgen_pool;
mod spawn;

pub use mapgen_pool::{MapgenPool, PooledMapgen};
pub use spawn::{SPAWN_TRIES, find_spawn_pos};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use strata_blocks::BlockRegistry;
use strata_chunk::{LiquidQueue, VoxelManip};
use strata_geom::V3i;
use strata_world::{BlockMakeData, ChunkBounds, ChunkTiming, ConfigError, WorldGenParams};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmergeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("chunk at block {blockpos_min:?}: {source}")]
    Chunk {
        blockpos_min: V3i,
        source: ConfigError,
    },
    #[error("emerge workers have shut down")]
    Disconnected,
}

#[derive(Clone, Copy, Debug)]
pub struct EmergeJob {
    pub job_id: u64,
    pub blockpos_min: V3i,
}

/// One generated chunk: the full overgeneration buffer plus the liquid
/// positions the mapgen queued for flow updates.
#[derive(Debug)]
pub struct ChunkResult {
    pub job_id: u64,
    pub blockpos_min: V3i,
    pub vmanip: VoxelManip,
    pub liquid_queue: LiquidQueue,
    pub timing: ChunkTiming,
    pub t_total_ms: u32,
}

pub type JobOutcome = Result<ChunkResult, EmergeError>;

pub struct EmergeRuntime {
    job_tx: Option<Sender<EmergeJob>>,
    res_rx: Receiver<JobOutcome>,
    _pool: Arc<rayon::ThreadPool>,
    mapgens: Arc<MapgenPool>,
    next_job_id: AtomicU64,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    workers: usize,
}

impl EmergeRuntime {
    /// Starts `workers` emerge threads; zero picks one per available core.
    pub fn new(
        params: Arc<WorldGenParams>,
        registry: Arc<BlockRegistry>,
        workers: usize,
    ) -> Result<Self, EmergeError> {
        let workers = if workers == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
        } else {
            workers
        };
        let mapgens = MapgenPool::with_capacity_from_workers(params, registry, workers)?;

        let pool = Arc::new(
            rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("emerge-{i}"))
                .build()?,
        );

        let (job_tx, job_rx) = unbounded::<EmergeJob>();
        let (res_tx, res_rx) = unbounded::<JobOutcome>();
        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));

        for w in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let mapgens = mapgens.clone();
            let queued = queued.clone();
            let inflight = inflight.clone();
            pool.spawn(move || {
                log::debug!("emerge worker {w} started");
                while let Ok(job) = rx.recv() {
                    queued.fetch_sub(1, Ordering::Relaxed);
                    inflight.fetch_add(1, Ordering::Relaxed);
                    let outcome = process_emerge_job(job, &mapgens);
                    inflight.fetch_sub(1, Ordering::Relaxed);
                    if tx.send(outcome).is_err() {
                        break;
                    }
                }
                log::debug!("emerge worker {w} stopped");
            });
        }

        Ok(Self {
            job_tx: Some(job_tx),
            res_rx,
            _pool: pool,
            mapgens,
            next_job_id: AtomicU64::new(1),
            queued,
            inflight,
            workers,
        })
    }

    /// Queues the chunk starting at `blockpos_min`; returns its job id.
    pub fn submit(&self, blockpos_min: V3i) -> Result<u64, EmergeError> {
        let tx = self.job_tx.as_ref().ok_or(EmergeError::Disconnected)?;
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        self.queued.fetch_add(1, Ordering::Relaxed);
        if tx.send(EmergeJob { job_id, blockpos_min }).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
            return Err(EmergeError::Disconnected);
        }
        Ok(job_id)
    }

    /// Blocks until the next job finishes.
    pub fn recv_result(&self) -> Result<JobOutcome, EmergeError> {
        self.res_rx.recv().map_err(|_| EmergeError::Disconnected)
    }

    pub fn drain_results(&self) -> Vec<JobOutcome> {
        self.res_rx.try_iter().collect()
    }

    /// Generates every chunk in `chunks` and returns the results in
    /// submission order.
    pub fn generate_all(
        &self,
        chunks: impl IntoIterator<Item = V3i>,
    ) -> Result<Vec<ChunkResult>, EmergeError> {
        let mut submitted = 0usize;
        for blockpos_min in chunks {
            self.submit(blockpos_min)?;
            submitted += 1;
        }
        let mut results = Vec::with_capacity(submitted);
        for _ in 0..submitted {
            results.push(self.recv_result()??);
        }
        results.sort_by_key(|r| r.job_id);
        Ok(results)
    }

    /// Runs the spawn search on a pooled generator.
    pub fn find_spawn_pos(&self) -> Result<V3i, EmergeError> {
        let mut mg = self.mapgens.acquire()?;
        Ok(find_spawn_pos(&mut mg))
    }

    /// Jobs waiting for a worker and jobs being generated.
    pub fn queue_debug_counts(&self) -> (usize, usize) {
        (
            self.queued.load(Ordering::Relaxed),
            self.inflight.load(Ordering::Relaxed),
        )
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    #[inline]
    pub fn mapgens(&self) -> &Arc<MapgenPool> {
        &self.mapgens
    }

    #[inline]
    pub fn params(&self) -> &Arc<WorldGenParams> {
        self.mapgens.params()
    }
}

impl Drop for EmergeRuntime {
    fn drop(&mut self) {
        // Closing the job channel ends every worker loop.
        self.job_tx.take();
    }
}

fn process_emerge_job(job: EmergeJob, mapgens: &MapgenPool) -> JobOutcome {
    let t0 = Instant::now();
    let mut mg = mapgens.acquire().map_err(|source| EmergeError::Chunk {
        blockpos_min: job.blockpos_min,
        source,
    })?;

    let bounds = ChunkBounds::for_chunk(job.blockpos_min, mapgens.params().chunksize);
    let mut vmanip = VoxelManip::new(bounds.full());
    let mut liquid_queue = LiquidQueue::new();
    let timing = {
        let mut data = BlockMakeData {
            blockpos_min: bounds.blockpos_min,
            blockpos_max: bounds.blockpos_max,
            vmanip: &mut vmanip,
            transforming_liquid: &mut liquid_queue,
        };
        mg.make_chunk(&mut data)
    };
    drop(mg);

    Ok(ChunkResult {
        job_id: job.job_id,
        blockpos_min: job.blockpos_min,
        vmanip,
        liquid_queue,
        timing,
        t_total_ms: t0.elapsed().as_millis() as u32,
    })
}
