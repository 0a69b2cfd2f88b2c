use serde::{Deserialize, Serialize};

pub type ContentId = u16;

/// Placeholder for content ids that have no definition.
pub const CONTENT_UNKNOWN: ContentId = 125;
pub const CONTENT_AIR: ContentId = 126;
/// "Not generated yet" sentinel. Generation only writes into cells holding this id.
pub const CONTENT_IGNORE: ContentId = 127;

/// Brightest artificial light level.
pub const LIGHT_MAX: u8 = 14;
/// Direct sunlight level; only sunlight reaches it.
pub const LIGHT_SUN: u8 = 15;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidKind {
    #[default]
    None,
    Source,
    Flowing,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawType {
    #[default]
    Normal,
    Airlike,
    Liquid,
    Plantlike,
}

/// Resolved node definition as consumed by generation and lighting.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDef {
    pub id: ContentId,
    pub name: String,
    pub drawtype: DrawType,
    pub walkable: bool,
    pub is_ground_content: bool,
    pub liquid: LiquidKind,
    pub floodable: bool,
    pub buildable_to: bool,
    pub sunlight_propagates: bool,
    pub light_propagates: bool,
    pub light_source: u8,
}

impl NodeDef {
    /// Definition used for ids nobody registered.
    pub fn unknown(id: ContentId) -> Self {
        Self {
            id,
            name: "unknown".into(),
            drawtype: DrawType::Normal,
            walkable: true,
            is_ground_content: false,
            liquid: LiquidKind::None,
            floodable: false,
            buildable_to: false,
            sunlight_propagates: false,
            light_propagates: false,
            light_source: 0,
        }
    }

    pub fn air() -> Self {
        Self {
            id: CONTENT_AIR,
            name: "air".into(),
            drawtype: DrawType::Airlike,
            walkable: false,
            is_ground_content: false,
            liquid: LiquidKind::None,
            floodable: true,
            buildable_to: true,
            sunlight_propagates: true,
            light_propagates: true,
            light_source: 0,
        }
    }

    pub fn ignore() -> Self {
        Self {
            id: CONTENT_IGNORE,
            name: "ignore".into(),
            drawtype: DrawType::Airlike,
            walkable: false,
            is_ground_content: false,
            liquid: LiquidKind::None,
            floodable: false,
            buildable_to: true,
            sunlight_propagates: false,
            light_propagates: false,
            light_source: 0,
        }
    }

    #[inline]
    pub fn is_liquid(&self) -> bool {
        self.liquid != LiquidKind::None
    }

    #[inline]
    pub fn is_airlike(&self) -> bool {
        self.drawtype == DrawType::Airlike
    }
}
