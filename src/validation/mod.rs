//! Request validation: field rules, their interpreter and the per-entity schemas.

pub mod engine;
pub mod registry;
pub mod result;
pub mod rule;
pub mod schema;
pub mod schemas;

pub use engine::{to_optional, validate};
pub use registry::SchemaRegistry;
pub use result::ValidationResult;
pub use rule::{Constraint, FieldRule, FieldType, Predicate};
pub use schema::{Schema, ValidationMode};
