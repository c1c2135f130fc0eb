//! EntityRegistry mapping API entity names to their definitions.

use crate::domain::EntityDef;
use crate::rules::RuleSet;
use crate::validation::SchemaRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// (entity / table, business rules, unique columns)
const STANDARD_ENTITIES: &[(&str, RuleSet, &[&str])] = &[
    ("aves", RuleSet::Ave, &["color_anillo"]),
    ("jaulas", RuleSet::Jaula, &["codigo"]),
    ("razas", RuleSet::Raza, &["nombre"]),
    ("clientes", RuleSet::Cliente, &["identificacion", "email"]),
    ("huevos", RuleSet::Huevo, &[]),
    ("ventas", RuleSet::Venta, &[]),
    ("compras", RuleSet::None, &[]),
    ("suministros", RuleSet::None, &[]),
    ("medicamentos", RuleSet::Tratamiento, &[]),
    ("vacunas", RuleSet::Tratamiento, &[]),
    ("incubaciones", RuleSet::None, &[]),
];

/// A registry that maps entity names to their definitions. Read-only once built.
pub struct EntityRegistry {
    entities: HashMap<&'static str, Arc<EntityDef>>,
}

impl EntityRegistry {
    /// Creates a new empty EntityRegistry.
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
        }
    }

    /// Every farm entity, bound to the schemas in `schemas`.
    pub fn standard(schemas: &SchemaRegistry) -> anyhow::Result<Self> {
        let mut registry = Self::new();
        for &(name, rules, unique_fields) in STANDARD_ENTITIES {
            let schema = schemas
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("no schema registered for entity '{}'", name))?;
            registry.register(EntityDef {
                name,
                table: name,
                key_field: "id",
                schema,
                rules,
                unique_fields,
            });
        }
        Ok(registry)
    }

    pub fn register(&mut self, entity: EntityDef) {
        self.entities.insert(entity.name, Arc::new(entity));
    }

    /// Retrieves an entity by name. Returns None if it is not registered.
    pub fn get(&self, name: &str) -> Option<Arc<EntityDef>> {
        self.entities.get(name).cloned()
    }

    /// All registered entities, sorted by name.
    pub fn list(&self) -> Vec<Arc<EntityDef>> {
        let mut all: Vec<_> = self.entities.values().cloned().collect();
        all.sort_by_key(|e| e.name);
        all
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
