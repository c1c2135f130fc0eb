//! Domain vocabulary shared by validation, rules, storage and transport.

use serde_json::Value as JsonValue;

pub mod entity;
pub mod registry;

pub use entity::EntityDef;
pub use registry::EntityRegistry;

/// A row or request body: field name -> JSON value.
pub type Record = serde_json::Map<String, JsonValue>;
