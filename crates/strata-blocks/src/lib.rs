//! Node definitions and the content-id registry.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;
pub mod types;

pub use registry::{BlockRegistry, RegistryError};
pub use types::{
    CONTENT_AIR, CONTENT_IGNORE, CONTENT_UNKNOWN, ContentId, DrawType, LIGHT_MAX, LIGHT_SUN,
    LiquidKind, NodeDef,
};
