use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;
use thiserror::Error;

use strata_noise::flags::{FlagDesc, read_flag_string, write_flag_string};
use strata_noise::{NoiseParams, NoiseParamsError};

use crate::voxel::MAX_MAP_GENERATION_LIMIT;

/// Generic mapgen feature flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapgenFlags(pub u32);

impl MapgenFlags {
    pub const CAVES: MapgenFlags = MapgenFlags(0x02);
    pub const DUNGEONS: MapgenFlags = MapgenFlags(0x04);
    pub const LIGHT: MapgenFlags = MapgenFlags(0x10);
    pub const DECORATIONS: MapgenFlags = MapgenFlags(0x20);
    pub const BIOMES: MapgenFlags = MapgenFlags(0x40);

    pub const DEFAULT: MapgenFlags = MapgenFlags(0x02 | 0x04 | 0x10 | 0x20 | 0x40);

    pub const DESC: &'static FlagDesc = &[
        ("caves", 0x02),
        ("dungeons", 0x04),
        ("light", 0x10),
        ("decorations", 0x20),
        ("biomes", 0x40),
    ];

    #[inline]
    pub const fn contains(self, other: MapgenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn parse(s: &str) -> Self {
        MapgenFlags(read_flag_string(s, Self::DESC, Self::DEFAULT.0))
    }

    pub fn to_flag_string(self) -> String {
        write_flag_string(self.0, Self::DESC)
    }
}

impl Default for MapgenFlags {
    fn default() -> Self {
        MapgenFlags::DEFAULT
    }
}

/// V7P specific options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct V7pFlags(pub u32);

impl V7pFlags {
    pub const MOUNTAINS: V7pFlags = V7pFlags(0x01);
    pub const RIDGES: V7pFlags = V7pFlags(0x02);

    pub const DEFAULT: V7pFlags = V7pFlags(0x01 | 0x02);

    pub const DESC: &'static FlagDesc = &[("mountains", 0x01), ("ridges", 0x02)];

    #[inline]
    pub const fn contains(self, other: V7pFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn parse(s: &str) -> Self {
        V7pFlags(read_flag_string(s, Self::DESC, Self::DEFAULT.0))
    }

    pub fn to_flag_string(self) -> String {
        write_flag_string(self.0, Self::DESC)
    }
}

impl Default for V7pFlags {
    fn default() -> Self {
        V7pFlags::DEFAULT
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub mapgen: MapgenSection,
    #[serde(default)]
    pub v7p: V7pSection,
    #[serde(default)]
    pub climate: ClimateSection,
    #[serde(default)]
    pub dungeons: DungeonSection,
    #[serde(default = "default_biomes")]
    pub biomes: Vec<BiomeDef>,
    #[serde(default = "default_ores")]
    pub ores: Vec<OreDef>,
    #[serde(default = "default_decorations")]
    pub decorations: Vec<DecorationDef>,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            mapgen: MapgenSection::default(),
            v7p: V7pSection::default(),
            climate: ClimateSection::default(),
            dungeons: DungeonSection::default(),
            biomes: default_biomes(),
            ores: default_ores(),
            decorations: default_decorations(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MapgenSection {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_water_level")]
    pub water_level: i32,
    /// Chunk edge in blocks.
    #[serde(default = "default_chunksize")]
    pub chunksize: i32,
    #[serde(default = "default_mapgen_limit")]
    pub mapgen_limit: i32,
    #[serde(default = "default_mapgen_flags")]
    pub flags: String,
}
fn default_water_level() -> i32 {
    1
}
fn default_chunksize() -> i32 {
    5
}
fn default_mapgen_limit() -> i32 {
    MAX_MAP_GENERATION_LIMIT
}
fn default_mapgen_flags() -> String {
    MapgenFlags::DEFAULT.to_flag_string()
}
impl Default for MapgenSection {
    fn default() -> Self {
        Self {
            seed: 0,
            water_level: default_water_level(),
            chunksize: default_chunksize(),
            mapgen_limit: default_mapgen_limit(),
            flags: default_mapgen_flags(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct V7pSection {
    #[serde(default = "default_v7p_spflags")]
    pub spflags: String,
    #[serde(default = "np_terrain_base")]
    pub np_terrain_base: NoiseParams,
    #[serde(default = "np_terrain_alt")]
    pub np_terrain_alt: NoiseParams,
    #[serde(default = "np_terrain_persist")]
    pub np_terrain_persist: NoiseParams,
    #[serde(default = "np_height_select")]
    pub np_height_select: NoiseParams,
    #[serde(default = "np_filler_depth")]
    pub np_filler_depth: NoiseParams,
    #[serde(default = "np_mount_height")]
    pub np_mount_height: NoiseParams,
    #[serde(default = "np_ridge_uwater")]
    pub np_ridge_uwater: NoiseParams,
    #[serde(default = "np_mountain")]
    pub np_mountain: NoiseParams,
    #[serde(default = "np_ridge")]
    pub np_ridge: NoiseParams,
}
fn default_v7p_spflags() -> String {
    V7pFlags::DEFAULT.to_flag_string()
}
fn np_terrain_base() -> NoiseParams {
    NoiseParams::new(4.0, 35.0, [600.0; 3], 82341, 5, 0.6, 2.0)
}
fn np_terrain_alt() -> NoiseParams {
    NoiseParams::new(4.0, 25.0, [600.0; 3], 5934, 5, 0.6, 2.0)
}
fn np_terrain_persist() -> NoiseParams {
    NoiseParams::new(0.6, 0.1, [2000.0; 3], 539, 3, 0.6, 2.0)
}
fn np_height_select() -> NoiseParams {
    NoiseParams::new(-8.0, 16.0, [500.0; 3], 4213, 6, 0.7, 2.0)
}
fn np_filler_depth() -> NoiseParams {
    NoiseParams::new(0.0, 1.2, [150.0; 3], 261, 3, 0.7, 2.0)
}
fn np_mount_height() -> NoiseParams {
    NoiseParams::new(128.0, 56.0, [1000.0; 3], 72449, 3, 0.6, 2.0)
}
fn np_ridge_uwater() -> NoiseParams {
    NoiseParams::new(0.0, 1.0, [1000.0; 3], 85039, 5, 0.6, 2.0)
}
fn np_mountain() -> NoiseParams {
    NoiseParams::new(-0.6, 1.0, [250.0; 3], 5333, 5, 0.63, 2.0)
}
fn np_ridge() -> NoiseParams {
    NoiseParams::new(0.0, 1.0, [100.0; 3], 6467, 4, 0.75, 2.0)
}
impl Default for V7pSection {
    fn default() -> Self {
        Self {
            spflags: default_v7p_spflags(),
            np_terrain_base: np_terrain_base(),
            np_terrain_alt: np_terrain_alt(),
            np_terrain_persist: np_terrain_persist(),
            np_height_select: np_height_select(),
            np_filler_depth: np_filler_depth(),
            np_mount_height: np_mount_height(),
            np_ridge_uwater: np_ridge_uwater(),
            np_mountain: np_mountain(),
            np_ridge: np_ridge(),
        }
    }
}

/// Heat and humidity fields that select biomes.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClimateSection {
    #[serde(default = "np_heat")]
    pub np_heat: NoiseParams,
    #[serde(default = "np_humidity")]
    pub np_humidity: NoiseParams,
    #[serde(default = "np_heat_blend")]
    pub np_heat_blend: NoiseParams,
    #[serde(default = "np_humidity_blend")]
    pub np_humidity_blend: NoiseParams,
}
fn np_heat() -> NoiseParams {
    NoiseParams::new(50.0, 50.0, [1000.0; 3], 5349, 3, 0.5, 2.0)
}
fn np_humidity() -> NoiseParams {
    NoiseParams::new(50.0, 50.0, [1000.0; 3], 842, 3, 0.5, 2.0)
}
fn np_heat_blend() -> NoiseParams {
    NoiseParams::new(0.0, 1.5, [8.0; 3], 13, 2, 1.0, 2.0)
}
fn np_humidity_blend() -> NoiseParams {
    NoiseParams::new(0.0, 1.5, [8.0; 3], 90003, 2, 1.0, 2.0)
}
impl Default for ClimateSection {
    fn default() -> Self {
        Self {
            np_heat: np_heat(),
            np_humidity: np_humidity(),
            np_heat_blend: np_heat_blend(),
            np_humidity_blend: np_humidity_blend(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DungeonSection {
    /// Per-chunk dungeon count field, sampled at `node_min`.
    #[serde(default = "np_dungeons")]
    pub np_dungeons: NoiseParams,
    /// Wall variant selector: positive values turn walls into the alt wall.
    #[serde(default = "np_alt_wall")]
    pub np_alt_wall: NoiseParams,
    #[serde(default = "default_dungeon_wall")]
    pub wall: String,
    #[serde(default = "default_dungeon_alt_wall")]
    pub alt_wall: String,
    #[serde(default = "default_dungeon_stair")]
    pub stair: String,
}
fn np_dungeons() -> NoiseParams {
    NoiseParams::new(0.9, 0.5, [500.0; 3], 0, 2, 0.8, 2.0)
}
fn np_alt_wall() -> NoiseParams {
    NoiseParams::new(-0.4, 1.0, [40.0; 3], 32474, 6, 1.1, 2.0)
}
fn default_dungeon_wall() -> String {
    "cobble".into()
}
fn default_dungeon_alt_wall() -> String {
    "mossycobble".into()
}
fn default_dungeon_stair() -> String {
    "stair_cobble".into()
}
impl Default for DungeonSection {
    fn default() -> Self {
        Self {
            np_dungeons: np_dungeons(),
            np_alt_wall: np_alt_wall(),
            wall: default_dungeon_wall(),
            alt_wall: default_dungeon_alt_wall(),
            stair: default_dungeon_stair(),
        }
    }
}

fn d_y_min() -> i32 {
    -MAX_MAP_GENERATION_LIMIT
}
fn d_y_max() -> i32 {
    MAX_MAP_GENERATION_LIMIT
}
fn d_climate_point() -> f32 {
    50.0
}

/// One biome. Unset nodes fall back to the mapgen's stone and water.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BiomeDef {
    pub name: String,
    #[serde(default)]
    pub node_dust: Option<String>,
    #[serde(default)]
    pub node_top: Option<String>,
    #[serde(default)]
    pub depth_top: i32,
    #[serde(default)]
    pub node_filler: Option<String>,
    #[serde(default)]
    pub depth_filler: i32,
    #[serde(default)]
    pub node_stone: Option<String>,
    #[serde(default)]
    pub node_water_top: Option<String>,
    #[serde(default)]
    pub depth_water_top: i32,
    #[serde(default)]
    pub node_water: Option<String>,
    #[serde(default = "d_y_min")]
    pub y_min: i32,
    #[serde(default = "d_y_max")]
    pub y_max: i32,
    #[serde(default = "d_climate_point")]
    pub heat_point: f32,
    #[serde(default = "d_climate_point")]
    pub humidity_point: f32,
}

impl BiomeDef {
    fn named(name: &str) -> Self {
        Self {
            name: name.into(),
            node_dust: None,
            node_top: None,
            depth_top: 0,
            node_filler: None,
            depth_filler: 0,
            node_stone: None,
            node_water_top: None,
            depth_water_top: 0,
            node_water: None,
            y_min: d_y_min(),
            y_max: d_y_max(),
            heat_point: d_climate_point(),
            humidity_point: d_climate_point(),
        }
    }
}

pub fn default_biomes() -> Vec<BiomeDef> {
    vec![
        BiomeDef {
            node_top: Some("dirt_with_grass".into()),
            depth_top: 1,
            node_filler: Some("dirt".into()),
            depth_filler: 1,
            y_min: 6,
            heat_point: 50.0,
            humidity_point: 35.0,
            ..BiomeDef::named("grassland")
        },
        BiomeDef {
            node_top: Some("sand".into()),
            depth_top: 1,
            node_filler: Some("sand".into()),
            depth_filler: 3,
            y_min: -255,
            y_max: 5,
            heat_point: 50.0,
            humidity_point: 35.0,
            ..BiomeDef::named("grassland_ocean")
        },
        BiomeDef {
            node_top: Some("desert_sand".into()),
            depth_top: 1,
            node_filler: Some("desert_sand".into()),
            depth_filler: 1,
            node_stone: Some("desert_stone".into()),
            y_min: 5,
            heat_point: 92.0,
            humidity_point: 16.0,
            ..BiomeDef::named("desert")
        },
        BiomeDef {
            node_dust: Some("snow".into()),
            node_top: Some("dirt_with_snow".into()),
            depth_top: 1,
            node_filler: Some("dirt".into()),
            depth_filler: 3,
            node_water_top: Some("ice".into()),
            depth_water_top: 10,
            y_min: 2,
            heat_point: 25.0,
            humidity_point: 70.0,
            ..BiomeDef::named("taiga")
        },
        BiomeDef {
            y_max: -256,
            ..BiomeDef::named("underground")
        },
    ]
}

fn d_wherein() -> Vec<String> {
    vec!["stone".into()]
}

/// Scatter ore: `volume / clust_scarcity` clusters of `clust_size`³ cells,
/// each cell filled with probability `clust_num_ores / clust_size³`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OreDef {
    pub ore: String,
    #[serde(default = "d_wherein")]
    pub wherein: Vec<String>,
    pub clust_scarcity: u32,
    pub clust_num_ores: u32,
    pub clust_size: i32,
    #[serde(default = "d_y_min")]
    pub y_min: i32,
    #[serde(default = "d_y_max")]
    pub y_max: i32,
    /// Clusters whose origin samples below `noise_threshold` are skipped.
    #[serde(default)]
    pub noise_params: Option<NoiseParams>,
    #[serde(default)]
    pub noise_threshold: f32,
    #[serde(default)]
    pub biomes: Vec<String>,
}

pub fn default_ores() -> Vec<OreDef> {
    vec![
        OreDef {
            ore: "stone_with_coal".into(),
            wherein: d_wherein(),
            clust_scarcity: 8 * 8 * 8,
            clust_num_ores: 8,
            clust_size: 3,
            y_min: -MAX_MAP_GENERATION_LIMIT,
            y_max: 64,
            noise_params: None,
            noise_threshold: 0.0,
            biomes: Vec::new(),
        },
        OreDef {
            ore: "stone_with_iron".into(),
            wherein: d_wherein(),
            clust_scarcity: 12 * 12 * 12,
            clust_num_ores: 3,
            clust_size: 2,
            y_min: -MAX_MAP_GENERATION_LIMIT,
            y_max: -64,
            noise_params: None,
            noise_threshold: 0.0,
            biomes: Vec::new(),
        },
    ]
}

fn d_sidelen() -> i32 {
    16
}
fn d_height() -> i32 {
    1
}

/// Simple decoration: a column of `height` (or `height..=height_max`)
/// nodes on top of a `place_on` surface node.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DecorationDef {
    pub place_on: Vec<String>,
    pub decoration: Vec<String>,
    #[serde(default = "d_sidelen")]
    pub sidelen: i32,
    #[serde(default)]
    pub fill_ratio: f32,
    /// Replaces `fill_ratio` with a 2D field sampled at each division center.
    #[serde(default)]
    pub noise_params: Option<NoiseParams>,
    #[serde(default)]
    pub biomes: Vec<String>,
    #[serde(default = "d_y_min")]
    pub y_min: i32,
    #[serde(default = "d_y_max")]
    pub y_max: i32,
    #[serde(default = "d_height")]
    pub height: i32,
    #[serde(default)]
    pub height_max: i32,
}

pub fn default_decorations() -> Vec<DecorationDef> {
    vec![
        DecorationDef {
            place_on: vec!["dirt_with_grass".into()],
            decoration: vec!["grass".into()],
            sidelen: 16,
            fill_ratio: 0.05,
            noise_params: None,
            biomes: vec!["grassland".into()],
            y_min: 1,
            y_max: MAX_MAP_GENERATION_LIMIT,
            height: 1,
            height_max: 0,
        },
        DecorationDef {
            place_on: vec!["desert_sand".into()],
            decoration: vec!["dry_shrub".into()],
            sidelen: 16,
            fill_ratio: 0.005,
            noise_params: None,
            biomes: vec!["desert".into()],
            y_min: 2,
            y_max: MAX_MAP_GENERATION_LIMIT,
            height: 1,
            height_max: 0,
        },
        DecorationDef {
            place_on: vec!["desert_sand".into()],
            decoration: vec!["cactus".into()],
            sidelen: 16,
            fill_ratio: 0.0,
            noise_params: Some(NoiseParams::new(-0.012, 0.024, [100.0; 3], 230, 3, 0.6, 2.0)),
            biomes: vec!["desert".into()],
            y_min: 5,
            y_max: MAX_MAP_GENERATION_LIMIT,
            height: 2,
            height_max: 4,
        },
    ]
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("noise channel `{channel}`: {source}")]
    Noise {
        channel: String,
        #[source]
        source: NoiseParamsError,
    },
    #[error("chunksize must be at least 1 block, got {0}")]
    ChunkSize(i32),
    #[error("mapgen_limit must be within 0..={max}, got {value}")]
    MapgenLimit { value: i32, max: i32 },
    #[error("water_level {0} is outside the generation limit")]
    WaterLevel(i32),
    #[error("{kind} `{name}`: {reason}")]
    Invalid {
        kind: &'static str,
        name: String,
        reason: String,
    },
    #[error("too many biomes: {0} (at most 255)")]
    TooManyBiomes(usize),
    #[error("{kind} refers to unknown biome `{biome}`")]
    UnknownBiome { kind: &'static str, biome: String },
    #[error("unknown node `{0}`")]
    UnknownNode(String),
}

fn invalid(kind: &'static str, name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        kind,
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Flattened, validated snapshot of [`WorldGenConfig`] shared by every
/// mapgen instance.
#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub seed: u64,
    pub water_level: i32,
    pub chunksize: i32,
    pub mapgen_limit: i32,
    pub flags: MapgenFlags,
    pub spflags: V7pFlags,
    pub np_terrain_base: NoiseParams,
    pub np_terrain_alt: NoiseParams,
    pub np_terrain_persist: NoiseParams,
    pub np_height_select: NoiseParams,
    pub np_filler_depth: NoiseParams,
    pub np_mount_height: NoiseParams,
    pub np_ridge_uwater: NoiseParams,
    pub np_mountain: NoiseParams,
    pub np_ridge: NoiseParams,
    pub np_heat: NoiseParams,
    pub np_humidity: NoiseParams,
    pub np_heat_blend: NoiseParams,
    pub np_humidity_blend: NoiseParams,
    pub np_dungeons: NoiseParams,
    pub np_dungeon_alt_wall: NoiseParams,
    pub dungeon_wall: String,
    pub dungeon_alt_wall: String,
    pub dungeon_stair: String,
    pub biomes: Vec<BiomeDef>,
    pub ores: Vec<OreDef>,
    pub decorations: Vec<DecorationDef>,
}

impl Default for WorldGenParams {
    fn default() -> Self {
        Self::flatten(&WorldGenConfig::default())
    }
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig) -> Result<Self, ConfigError> {
        let params = Self::flatten(cfg);
        params.validate()?;
        Ok(params)
    }

    fn flatten(cfg: &WorldGenConfig) -> Self {
        Self {
            seed: cfg.mapgen.seed,
            water_level: cfg.mapgen.water_level,
            chunksize: cfg.mapgen.chunksize,
            mapgen_limit: cfg.mapgen.mapgen_limit,
            flags: MapgenFlags::parse(&cfg.mapgen.flags),
            spflags: V7pFlags::parse(&cfg.v7p.spflags),
            np_terrain_base: cfg.v7p.np_terrain_base,
            np_terrain_alt: cfg.v7p.np_terrain_alt,
            np_terrain_persist: cfg.v7p.np_terrain_persist,
            np_height_select: cfg.v7p.np_height_select,
            np_filler_depth: cfg.v7p.np_filler_depth,
            np_mount_height: cfg.v7p.np_mount_height,
            np_ridge_uwater: cfg.v7p.np_ridge_uwater,
            np_mountain: cfg.v7p.np_mountain,
            np_ridge: cfg.v7p.np_ridge,
            np_heat: cfg.climate.np_heat,
            np_humidity: cfg.climate.np_humidity,
            np_heat_blend: cfg.climate.np_heat_blend,
            np_humidity_blend: cfg.climate.np_humidity_blend,
            np_dungeons: cfg.dungeons.np_dungeons,
            np_dungeon_alt_wall: cfg.dungeons.np_alt_wall,
            dungeon_wall: cfg.dungeons.wall.clone(),
            dungeon_alt_wall: cfg.dungeons.alt_wall.clone(),
            dungeon_stair: cfg.dungeons.stair.clone(),
            biomes: cfg.biomes.clone(),
            ores: cfg.ores.clone(),
            decorations: cfg.decorations.clone(),
        }
    }

    /// Inverse of [`WorldGenParams::from_config`].
    pub fn to_config(&self) -> WorldGenConfig {
        WorldGenConfig {
            mapgen: MapgenSection {
                seed: self.seed,
                water_level: self.water_level,
                chunksize: self.chunksize,
                mapgen_limit: self.mapgen_limit,
                flags: self.flags.to_flag_string(),
            },
            v7p: V7pSection {
                spflags: self.spflags.to_flag_string(),
                np_terrain_base: self.np_terrain_base,
                np_terrain_alt: self.np_terrain_alt,
                np_terrain_persist: self.np_terrain_persist,
                np_height_select: self.np_height_select,
                np_filler_depth: self.np_filler_depth,
                np_mount_height: self.np_mount_height,
                np_ridge_uwater: self.np_ridge_uwater,
                np_mountain: self.np_mountain,
                np_ridge: self.np_ridge,
            },
            climate: ClimateSection {
                np_heat: self.np_heat,
                np_humidity: self.np_humidity,
                np_heat_blend: self.np_heat_blend,
                np_humidity_blend: self.np_humidity_blend,
            },
            dungeons: DungeonSection {
                np_dungeons: self.np_dungeons,
                np_alt_wall: self.np_dungeon_alt_wall,
                wall: self.dungeon_wall.clone(),
                alt_wall: self.dungeon_alt_wall.clone(),
                stair: self.dungeon_stair.clone(),
            },
            biomes: self.biomes.clone(),
            ores: self.ores.clone(),
            decorations: self.decorations.clone(),
        }
    }

    /// Map seed as used by noise and block seeds (low 32 bits).
    #[inline]
    pub fn seed_i32(&self) -> i32 {
        self.seed as i32
    }

    /// Highest node that is always bedrock.
    #[inline]
    pub fn bedrock_level(&self) -> i32 {
        self.water_level - 64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunksize < 1 {
            return Err(ConfigError::ChunkSize(self.chunksize));
        }
        if !(0..=MAX_MAP_GENERATION_LIMIT).contains(&self.mapgen_limit) {
            return Err(ConfigError::MapgenLimit {
                value: self.mapgen_limit,
                max: MAX_MAP_GENERATION_LIMIT,
            });
        }
        if self.water_level.abs() >= MAX_MAP_GENERATION_LIMIT {
            return Err(ConfigError::WaterLevel(self.water_level));
        }
        for (channel, np) in self.noise_channels() {
            np.validate().map_err(|source| ConfigError::Noise {
                channel: channel.to_string(),
                source,
            })?;
        }

        if self.biomes.len() > usize::from(u8::MAX) {
            return Err(ConfigError::TooManyBiomes(self.biomes.len()));
        }
        for b in &self.biomes {
            if b.name.trim().is_empty() {
                return Err(invalid("biome", &b.name, "name must not be empty"));
            }
            if b.y_min > b.y_max {
                return Err(invalid("biome", &b.name, "y_min is above y_max"));
            }
            if b.depth_top < 0 || b.depth_filler < 0 || b.depth_water_top < 0 {
                return Err(invalid("biome", &b.name, "depths must not be negative"));
            }
        }

        for o in &self.ores {
            if o.clust_size < 1 {
                return Err(invalid("ore", &o.ore, "clust_size must be at least 1"));
            }
            if o.clust_scarcity == 0 {
                return Err(invalid("ore", &o.ore, "clust_scarcity must be at least 1"));
            }
            if o.y_min > o.y_max {
                return Err(invalid("ore", &o.ore, "y_min is above y_max"));
            }
            if o.wherein.is_empty() {
                return Err(invalid("ore", &o.ore, "wherein must name at least one node"));
            }
            if let Some(np) = &o.noise_params {
                np.validate().map_err(|source| ConfigError::Noise {
                    channel: format!("ore {}", o.ore),
                    source,
                })?;
            }
            self.check_biome_refs("ore", &o.biomes)?;
        }

        for d in &self.decorations {
            let name = d.decoration.first().map(String::as_str).unwrap_or("");
            if d.decoration.is_empty() || d.place_on.is_empty() {
                return Err(invalid(
                    "decoration",
                    name,
                    "decoration and place_on must name at least one node",
                ));
            }
            if d.sidelen < 1 {
                return Err(invalid("decoration", name, "sidelen must be at least 1"));
            }
            if d.height < 1 || d.height_max < 0 || (d.height_max > 0 && d.height_max < d.height) {
                return Err(invalid("decoration", name, "invalid height range"));
            }
            if d.y_min > d.y_max {
                return Err(invalid("decoration", name, "y_min is above y_max"));
            }
            if let Some(np) = &d.noise_params {
                np.validate().map_err(|source| ConfigError::Noise {
                    channel: format!("decoration {name}"),
                    source,
                })?;
            }
            self.check_biome_refs("decoration", &d.biomes)?;
        }
        Ok(())
    }

    fn check_biome_refs(&self, kind: &'static str, names: &[String]) -> Result<(), ConfigError> {
        for n in names {
            if !self.biomes.iter().any(|b| &b.name == n) {
                return Err(ConfigError::UnknownBiome {
                    kind,
                    biome: n.clone(),
                });
            }
        }
        Ok(())
    }

    fn noise_channels(&self) -> [(&'static str, &NoiseParams); 15] {
        [
            ("np_terrain_base", &self.np_terrain_base),
            ("np_terrain_alt", &self.np_terrain_alt),
            ("np_terrain_persist", &self.np_terrain_persist),
            ("np_height_select", &self.np_height_select),
            ("np_filler_depth", &self.np_filler_depth),
            ("np_mount_height", &self.np_mount_height),
            ("np_ridge_uwater", &self.np_ridge_uwater),
            ("np_mountain", &self.np_mountain),
            ("np_ridge", &self.np_ridge),
            ("np_heat", &self.np_heat),
            ("np_humidity", &self.np_humidity),
            ("np_heat_blend", &self.np_heat_blend),
            ("np_humidity_blend", &self.np_humidity_blend),
            ("np_dungeons", &self.np_dungeons),
            ("np_alt_wall", &self.np_dungeon_alt_wall),
        ]
    }
}

pub fn load_params_from_path(path: &Path) -> Result<WorldGenParams, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let params = params_from_toml_str(&s)?;
    log::info!(
        "loaded worldgen config {} (seed {}, water_level {})",
        path.display(),
        params.seed,
        params.water_level
    );
    Ok(params)
}

pub fn params_from_toml_str(s: &str) -> Result<WorldGenParams, Box<dyn Error>> {
    let cfg: WorldGenConfig = toml::from_str(s)?;
    Ok(WorldGenParams::from_config(&cfg)?)
}
