use std::fmt;
use std::time::Duration;

/// Passes of one `make_chunk` call, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapgenStage {
    Bedrock,
    Terrain,
    Ridges,
    Heightmap,
    Biomes,
    Caves,
    Dungeons,
    Decorations,
    Ores,
    Dust,
    Liquid,
    Lighting,
}

pub const MAPGEN_STAGE_COUNT: usize = 12;

pub const MAPGEN_STAGE_LABELS: [&str; MAPGEN_STAGE_COUNT] = [
    "bedrock",
    "terrain",
    "ridges",
    "heightmap",
    "biomes",
    "caves",
    "dungeons",
    "decorations",
    "ores",
    "dust",
    "liquid",
    "lighting",
];

impl MapgenStage {
    pub const ALL: [MapgenStage; MAPGEN_STAGE_COUNT] = [
        MapgenStage::Bedrock,
        MapgenStage::Terrain,
        MapgenStage::Ridges,
        MapgenStage::Heightmap,
        MapgenStage::Biomes,
        MapgenStage::Caves,
        MapgenStage::Dungeons,
        MapgenStage::Decorations,
        MapgenStage::Ores,
        MapgenStage::Dust,
        MapgenStage::Liquid,
        MapgenStage::Lighting,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn label(self) -> &'static str {
        MAPGEN_STAGE_LABELS[self as usize]
    }
}

/// Wall time spent per stage of one chunk. Stages that did not run are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkTiming {
    stages: [Option<Duration>; MAPGEN_STAGE_COUNT],
}

impl ChunkTiming {
    #[inline]
    pub fn get(&self, stage: MapgenStage) -> Option<Duration> {
        self.stages[stage.index()]
    }

    #[inline]
    pub fn ran(&self, stage: MapgenStage) -> bool {
        self.stages[stage.index()].is_some()
    }

    pub fn total(&self) -> Duration {
        self.stages.iter().flatten().sum()
    }

    /// Stages that ran, in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (MapgenStage, Duration)> + '_ {
        MapgenStage::ALL
            .iter()
            .filter_map(|s| self.get(*s).map(|d| (*s, d)))
    }
}

impl fmt::Display for ChunkTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total={:.2}ms", self.total().as_secs_f64() * 1e3)?;
        for (stage, d) in self.iter() {
            write!(f, " {}={:.2}ms", stage.label(), d.as_secs_f64() * 1e3)?;
        }
        Ok(())
    }
}

/// Collects stage durations for the chunk currently being generated.
#[derive(Clone, Debug, Default)]
pub struct StageProfiler {
    current: ChunkTiming,
    active: Option<MapgenStage>,
}

impl StageProfiler {
    pub fn reset(&mut self) {
        self.current = ChunkTiming::default();
        self.active = None;
    }

    #[inline]
    pub fn begin_stage(&mut self, stage: MapgenStage) {
        debug_assert!(self.active.is_none(), "stage {:?} still open", self.active);
        self.active = Some(stage);
    }

    #[inline]
    pub fn record_stage_duration(&mut self, stage: MapgenStage, elapsed: Duration) {
        let slot = &mut self.current.stages[stage.index()];
        *slot = Some(slot.unwrap_or_default() + elapsed);
        self.active = None;
    }

    #[inline]
    pub fn snapshot(&self) -> ChunkTiming {
        self.current
    }
}
