use serde::{Deserialize, Serialize};

use crate::types::{DrawType, LiquidKind};

/// Top-level shape of a `blocks.toml` file.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

/// One node entry. Omitted properties fall back to a solid, opaque,
/// ground-content node.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct BlockDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<u16>,
    #[serde(default)]
    pub drawtype: Option<DrawType>,
    #[serde(default)]
    pub walkable: Option<bool>,
    #[serde(default)]
    pub is_ground_content: Option<bool>,
    #[serde(default)]
    pub liquid: Option<LiquidKind>,
    #[serde(default)]
    pub floodable: Option<bool>,
    #[serde(default)]
    pub buildable_to: Option<bool>,
    #[serde(default)]
    pub sunlight_propagates: Option<bool>,
    #[serde(default)]
    pub light_propagates: Option<bool>,
    #[serde(default)]
    pub light_source: Option<u8>,
}
