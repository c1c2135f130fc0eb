use crate::rules::RuleSet;
use crate::validation::Schema;
use std::sync::Arc;

/// One CRUD-exposed entity: where it lives, how it is validated and which
/// database rules guard its writes.
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Path segment under `/api/`.
    pub name: &'static str,
    pub table: &'static str,
    pub key_field: &'static str,
    pub schema: Arc<Schema>,
    pub rules: RuleSet,
    /// Columns carrying a unique constraint in the database.
    pub unique_fields: &'static [&'static str],
}

impl EntityDef {
    /// Fields a list query may filter or order by.
    pub fn is_queryable(&self, field: &str) -> bool {
        field == self.key_field || self.schema.has_field(field)
    }
}
