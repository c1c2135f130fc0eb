//! SchemaRegistry mapping entity names to their schemas.

use crate::validation::schema::Schema;
use crate::validation::schemas;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only after construction; shared behind `Arc` by every request.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Registry holding every built-in entity schema.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for schema in schemas::all() {
            registry.register(schema);
        }
        registry
    }

    pub fn register(&mut self, schema: Schema) {
        self.schemas.insert(schema.entity(), Arc::new(schema));
    }

    pub fn get(&self, entity: &str) -> Option<Arc<Schema>> {
        self.schemas.get(entity).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
