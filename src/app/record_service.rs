//! Generic CRUD over every registered entity.
//!
//! Writes follow one pipeline: project the payload onto the schema, validate
//! it, run the entity's business rules against the store, then persist.
//! Each stage only runs when the previous one passed.

use crate::app::error::{ServiceError, ServiceResult};
use crate::domain::{EntityDef, EntityRegistry, Record};
use crate::rules::OwnRecord;
use crate::storage::{Filter, OrderDirection, SelectQuery, Store, StoreError};
use crate::validation::{FieldType, ValidationResult};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 500;

/// A persisted record plus the payload fields that were dropped on the way in.
#[derive(Debug, Clone)]
pub struct Saved {
    pub record: Record,
    pub warnings: Vec<String>,
}

/// Paging, ordering and filters of a list request.
///
/// Filters are `field=value` pairs; a `.gte`, `.lte`, `.neq` or `.like`
/// suffix on the field picks another comparison.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: Option<String>,
    pub direction: Option<OrderDirection>,
    pub filters: Vec<(String, String)>,
}

fn non_negative(name: &str, raw: &str, errors: &mut Vec<String>) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(format!("{} must be a non-negative integer", name));
            None
        }
    }
}

impl ListParams {
    /// Splits a raw query string map into paging keys and filters.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ValidationResult> {
        let mut params = ListParams::default();
        let mut errors = Vec::new();

        for (key, raw) in query {
            match key.as_str() {
                "limit" => params.limit = non_negative("limit", raw, &mut errors),
                "offset" => params.offset = non_negative("offset", raw, &mut errors),
                "order_by" => params.order_by = Some(raw.trim().to_string()),
                "direction" => match raw.trim().to_lowercase().as_str() {
                    "asc" => params.direction = Some(OrderDirection::Asc),
                    "desc" => params.direction = Some(OrderDirection::Desc),
                    _ => errors.push("direction must be one of: asc, desc".to_string()),
                },
                _ => params.filters.push((key.clone(), raw.clone())),
            }
        }
        // HashMap order is arbitrary; keep the generated SQL stable.
        params.filters.sort();

        if errors.is_empty() {
            Ok(params)
        } else {
            Err(ValidationResult::from_errors(errors))
        }
    }
}

/// Range bounds compare numerically when they look like numbers.
fn bound(raw: &str) -> JsonValue {
    if let Ok(n) = raw.parse::<i64>() {
        return JsonValue::from(n);
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => JsonValue::from(n),
        _ => JsonValue::String(raw.to_string()),
    }
}

fn to_filter(entity: &EntityDef, key: &str, raw: &str) -> Result<Filter, String> {
    let (field, op) = match key.rsplit_once('.') {
        Some((field, op)) => (field, op),
        None => (key, "eq"),
    };
    if !entity.is_queryable(field) {
        return Err(format!("Cannot filter {} by unknown field '{}'", entity.name, field));
    }
    let numeric = matches!(
        entity.schema.field_type(field),
        Some(FieldType::Number | FieldType::Integer)
    );
    let exact = || if numeric { bound(raw) } else { JsonValue::String(raw.to_string()) };
    match op {
        "eq" => Ok(Filter::eq(field, exact())),
        "neq" => Ok(Filter::neq(field, exact())),
        "gte" => Ok(Filter::gte(field, bound(raw))),
        "lte" => Ok(Filter::lte(field, bound(raw))),
        "like" => Ok(Filter::like(field, raw)),
        other => Err(format!("Unsupported filter operator '{}' on {}", other, field)),
    }
}

fn select_query(entity: &EntityDef, params: &ListParams) -> ServiceResult<SelectQuery> {
    let mut errors = Vec::new();
    let mut query = SelectQuery::new();

    for (key, raw) in &params.filters {
        match to_filter(entity, key, raw) {
            Ok(filter) => query = query.filter(filter),
            Err(e) => errors.push(e),
        }
    }

    let order_field = params.order_by.as_deref().unwrap_or(entity.key_field);
    if !entity.is_queryable(order_field) {
        errors.push(format!("Cannot order {} by unknown field '{}'", entity.name, order_field));
    }
    if !errors.is_empty() {
        return Err(ServiceError::Validation(ValidationResult::from_errors(errors)));
    }

    Ok(query
        .order_by(order_field, params.direction.unwrap_or_default())
        .limit(params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT))
        .offset(params.offset.unwrap_or(0)))
}

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn Store>,
    entities: Arc<EntityRegistry>,
}

impl RecordService {
    pub fn new(store: Arc<dyn Store>, entities: Arc<EntityRegistry>) -> Self {
        Self { store, entities }
    }

    pub fn entity(&self, name: &str) -> ServiceResult<Arc<EntityDef>> {
        self.entities
            .get(name)
            .ok_or_else(|| ServiceError::UnknownEntity(name.to_string()))
    }

    fn not_found(entity: &EntityDef, id: &str) -> impl FnOnce(StoreError) -> ServiceError {
        let (name, id) = (entity.name.to_string(), id.to_string());
        move |e| match e {
            StoreError::NotFound { .. } => ServiceError::NotFound { entity: name, id },
            other => ServiceError::Store(other),
        }
    }

    #[instrument(skip(self, params))]
    pub async fn list(&self, entity: &str, params: &ListParams) -> ServiceResult<Vec<Record>> {
        let entity = self.entity(entity)?;
        let query = select_query(&entity, params)?;
        Ok(self.store.select(entity.table, &query).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, entity: &str, id: &str) -> ServiceResult<Record> {
        let entity = self.entity(entity)?;
        self.store
            .get(entity.table, entity.key_field, id)
            .await
            .map_err(Self::not_found(&entity, id))
    }

    #[instrument(skip(self, payload))]
    pub async fn create(&self, entity: &str, payload: &JsonValue) -> ServiceResult<Saved> {
        let entity = self.entity(entity)?;
        let (record, warnings) = entity.schema.project(payload).map_err(ServiceError::Validation)?;
        for warning in &warnings {
            tracing::warn!(entity = entity.name, "{}", warning);
        }

        let validation = entity.schema.validate_create(&record);
        if !validation.is_valid() {
            tracing::info!(entity = entity.name, errors = ?validation.errors(), "create rejected by validation");
            return Err(ServiceError::Validation(validation.with_warnings(warnings)));
        }

        let outcome = entity.rules.check(self.store.as_ref(), &record, None).await?;
        if !outcome.is_valid() {
            tracing::info!(entity = entity.name, errors = ?outcome.errors(), "create rejected by business rules");
            return Err(ServiceError::BusinessRule(outcome.with_warnings(warnings)));
        }

        let stored = self.store.insert(entity.table, &record).await?;
        tracing::info!(entity = entity.name, id = ?stored.get(entity.key_field), "record created");
        Ok(Saved {
            record: stored,
            warnings,
        })
    }

    /// Partial update. Cross-field checks and business rules see the stored
    /// row with the patch applied.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, entity: &str, id: &str, payload: &JsonValue) -> ServiceResult<Saved> {
        let entity = self.entity(entity)?;
        let (patch, warnings) = entity.schema.project(payload).map_err(ServiceError::Validation)?;

        let validation = entity.schema.validate_update(&patch);
        if !validation.is_valid() {
            tracing::info!(entity = entity.name, id, errors = ?validation.errors(), "update rejected by validation");
            return Err(ServiceError::Validation(validation.with_warnings(warnings)));
        }

        let stored = self
            .store
            .get(entity.table, entity.key_field, id)
            .await
            .map_err(Self::not_found(&entity, id))?;
        if patch.is_empty() {
            return Ok(Saved {
                record: stored,
                warnings,
            });
        }

        let mut merged = stored;
        for (field, value) in &patch {
            merged.insert(field.clone(), value.clone());
        }
        let validation = entity.schema.validate_merged(&merged);
        if !validation.is_valid() {
            tracing::info!(entity = entity.name, id, errors = ?validation.errors(), "update rejected by cross-field checks");
            return Err(ServiceError::Validation(validation.with_warnings(warnings)));
        }

        let own = OwnRecord {
            key_field: entity.key_field,
            id,
        };
        let outcome = entity.rules.check(self.store.as_ref(), &merged, Some(own)).await?;
        if !outcome.is_valid() {
            tracing::info!(entity = entity.name, id, errors = ?outcome.errors(), "update rejected by business rules");
            return Err(ServiceError::BusinessRule(outcome.with_warnings(warnings)));
        }

        let updated = self
            .store
            .update(entity.table, entity.key_field, id, &patch)
            .await
            .map_err(Self::not_found(&entity, id))?;
        tracing::info!(entity = entity.name, id, "record updated");
        Ok(Saved {
            record: updated,
            warnings,
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, entity: &str, id: &str) -> ServiceResult<()> {
        let entity = self.entity(entity)?;
        self.store
            .delete(entity.table, entity.key_field, id)
            .await
            .map_err(Self::not_found(&entity, id))?;
        tracing::info!(entity = entity.name, id, "record deleted");
        Ok(())
    }
}
