use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use thiserror::Error;

use super::config::{BlockDef, BlocksConfig};
use super::types::{
    CONTENT_AIR, CONTENT_IGNORE, CONTENT_UNKNOWN, ContentId, DrawType, LIGHT_MAX, LiquidKind,
    NodeDef,
};

/// Node set shipped with the generator: everything the default mapgen,
/// biomes, ores and decorations refer to.
pub const BUILTIN_BLOCKS_TOML: &str = include_str!("../builtin_blocks.toml");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("node name `{0}` is defined more than once")]
    DuplicateName(String),
    #[error("node `{name}` requests reserved content id {id}")]
    ReservedId { name: String, id: ContentId },
    #[error("node `{name}` requests content id {id}, already taken")]
    DuplicateId { name: String, id: ContentId },
    #[error("node `{name}` has light_source {value}, above {max}")]
    LightTooBright { name: String, value: u8, max: u8 },
    #[error("content id space exhausted")]
    Exhausted,
}

#[inline]
fn is_reserved(id: ContentId) -> bool {
    matches!(id, CONTENT_UNKNOWN | CONTENT_AIR | CONTENT_IGNORE)
}

#[derive(Clone, Debug)]
pub struct BlockRegistry {
    pub defs: Vec<NodeDef>,
    pub by_name: HashMap<String, ContentId>,
    unknown: NodeDef,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    /// Registry holding only the reserved `unknown`, `air` and `ignore` nodes.
    pub fn new() -> Self {
        let mut defs: Vec<NodeDef> = (0..=CONTENT_IGNORE).map(NodeDef::unknown).collect();
        defs[CONTENT_AIR as usize] = NodeDef::air();
        defs[CONTENT_IGNORE as usize] = NodeDef::ignore();
        let by_name = HashMap::from([
            ("unknown".to_string(), CONTENT_UNKNOWN),
            ("air".to_string(), CONTENT_AIR),
            ("ignore".to_string(), CONTENT_IGNORE),
        ]);
        Self {
            defs,
            by_name,
            unknown: NodeDef::unknown(CONTENT_UNKNOWN),
        }
    }

    /// Definition for `id`; unregistered ids resolve to the unknown node.
    #[inline]
    pub fn get(&self, id: ContentId) -> &NodeDef {
        self.defs.get(id as usize).unwrap_or(&self.unknown)
    }

    pub fn id_by_name(&self, name: &str) -> Option<ContentId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// The built-in node set.
    pub fn builtin() -> Result<Self, Box<dyn Error>> {
        Self::from_toml_str(BUILTIN_BLOCKS_TOML)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(s)?;
        Ok(Self::from_configs(cfg)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_configs(cfg: BlocksConfig) -> Result<Self, RegistryError> {
        let mut reg = BlockRegistry::new();
        let mut taken: Vec<bool> = vec![false; reg.defs.len()];
        taken[CONTENT_UNKNOWN as usize] = true;
        taken[CONTENT_AIR as usize] = true;
        taken[CONTENT_IGNORE as usize] = true;

        // Explicit ids first so auto-assigned ones never steal them.
        let (explicit, auto): (Vec<BlockDef>, Vec<BlockDef>) =
            cfg.blocks.into_iter().partition(|d| d.id.is_some());
        for def in explicit {
            let id = def.id.unwrap_or(CONTENT_UNKNOWN);
            if is_reserved(id) {
                return Err(RegistryError::ReservedId { name: def.name, id });
            }
            if taken.get(id as usize).copied().unwrap_or(false) {
                return Err(RegistryError::DuplicateId { name: def.name, id });
            }
            reg.insert(&mut taken, id, def)?;
        }
        let mut next: ContentId = 0;
        for def in auto {
            while taken.get(next as usize).copied().unwrap_or(false) {
                next = next.checked_add(1).ok_or(RegistryError::Exhausted)?;
            }
            reg.insert(&mut taken, next, def)?;
        }
        Ok(reg)
    }

    fn insert(
        &mut self,
        taken: &mut Vec<bool>,
        id: ContentId,
        def: BlockDef,
    ) -> Result<(), RegistryError> {
        if self.by_name.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        let node = compile_def(id, def)?;
        let slot = id as usize;
        if slot >= self.defs.len() {
            let start = self.defs.len() as ContentId;
            self.defs.extend((start..=id).map(NodeDef::unknown));
            taken.resize(self.defs.len(), false);
        }
        taken[slot] = true;
        self.by_name.insert(node.name.clone(), id);
        self.defs[slot] = node;
        Ok(())
    }
}

fn compile_def(id: ContentId, def: BlockDef) -> Result<NodeDef, RegistryError> {
    let liquid = def.liquid.unwrap_or(LiquidKind::None);
    let drawtype = def.drawtype.unwrap_or(if liquid != LiquidKind::None {
        DrawType::Liquid
    } else {
        DrawType::Normal
    });
    let see_through = drawtype != DrawType::Normal;
    let light_source = def.light_source.unwrap_or(0);
    if light_source > LIGHT_MAX {
        return Err(RegistryError::LightTooBright {
            name: def.name,
            value: light_source,
            max: LIGHT_MAX,
        });
    }
    Ok(NodeDef {
        id,
        drawtype,
        walkable: def.walkable.unwrap_or(drawtype == DrawType::Normal),
        is_ground_content: def.is_ground_content.unwrap_or(false),
        liquid,
        floodable: def.floodable.unwrap_or(false),
        buildable_to: def
            .buildable_to
            .unwrap_or(liquid != LiquidKind::None || drawtype == DrawType::Airlike),
        sunlight_propagates: def
            .sunlight_propagates
            .unwrap_or(matches!(drawtype, DrawType::Airlike | DrawType::Plantlike)),
        light_propagates: def.light_propagates.unwrap_or(see_through),
        light_source,
        name: def.name,
    })
}
