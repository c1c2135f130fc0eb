//! Primitive business-rule checks and their aggregation.

use crate::domain::Record;
use crate::rules::MAX_HUEVOS_DIARIOS;
use crate::storage::{Filter, SelectQuery, Store, StoreError};
use crate::validation::engine::{as_number, format_number, value_text};
use crate::validation::schemas::huevo;
use crate::validation::ValidationResult;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Same shape as a schema validation result, produced after database lookups.
pub type BusinessRuleOutcome = ValidationResult;

/// The record being updated, excluded from uniqueness and capacity counts.
#[derive(Debug, Clone, Copy)]
pub struct OwnRecord<'a> {
    pub key_field: &'a str,
    pub id: &'a str,
}

#[derive(Debug, Error)]
pub enum CheckError {
    /// A lookup failed, so the rule could be neither confirmed nor refuted.
    #[error("{check} check on {table} was inconclusive: {source}")]
    Inconclusive {
        check: &'static str,
        table: String,
        #[source]
        source: StoreError,
    },
}

fn inconclusive(check: &'static str, table: &str) -> impl FnOnce(StoreError) -> CheckError {
    let table = table.to_string();
    move |source| {
        tracing::error!(check, table = %table, error = %source, "business rule check inconclusive");
        CheckError::Inconclusive {
            check,
            table,
            source,
        }
    }
}

/// Collects violations across several checks so callers see all of them at once.
///
/// Checks run one after another in call order. A storage failure stops the
/// run with [`CheckError::Inconclusive`]; it is never counted as pass or fail.
pub struct BusinessRuleChecker<'a> {
    store: &'a dyn Store,
    errors: Vec<String>,
}

impl<'a> BusinessRuleChecker<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            errors: Vec::new(),
        }
    }

    /// Fails when another row of `table` already holds `value` in `field`.
    pub async fn unique(
        &mut self,
        table: &str,
        field: &str,
        value: &JsonValue,
        own: Option<OwnRecord<'_>>,
    ) -> Result<(), CheckError> {
        let mut filters = vec![Filter::eq(field, value.clone())];
        if let Some(own) = own {
            filters.push(Filter::neq(own.key_field, own.id));
        }
        let taken = self
            .store
            .count(table, &filters)
            .await
            .map_err(inconclusive("uniqueness", table))?;
        if taken > 0 {
            self.errors
                .push(format!("{} '{}' is already in use", field, value_text(value)));
        }
        Ok(())
    }

    /// Fails when the referenced row is missing, or when `active` is given and
    /// the row's state field holds a value outside the allowed set.
    pub async fn exists(
        &mut self,
        table: &str,
        label: &str,
        id: &JsonValue,
        active: Option<(&str, &[&str])>,
    ) -> Result<(), CheckError> {
        let id_text = value_text(id);
        match self.store.get(table, "id", &id_text).await {
            Ok(row) => {
                let Some((state_field, allowed)) = active else {
                    return Ok(());
                };
                if let Some(state) = row.get(state_field).filter(|v| !v.is_null()) {
                    let state = value_text(state);
                    if !allowed.contains(&state.as_str()) {
                        self.errors.push(format!(
                            "{} {} is not active ({}: {})",
                            label, id_text, state_field, state
                        ));
                    }
                }
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => {
                self.errors.push(format!("{} {} does not exist", label, id_text));
                Ok(())
            }
            Err(e) => Err(inconclusive("existence", table)(e)),
        }
    }

    /// Fails when adding one more member to the group would pass `ceiling`.
    pub async fn capacity(
        &mut self,
        table: &str,
        group_field: &str,
        group_key: &JsonValue,
        ceiling: u64,
        members_only: &[Filter],
        own: Option<OwnRecord<'_>>,
    ) -> Result<(), CheckError> {
        let mut filters = vec![Filter::eq(group_field, group_key.clone())];
        filters.extend_from_slice(members_only);
        if let Some(own) = own {
            filters.push(Filter::neq(own.key_field, own.id));
        }
        let current = self
            .store
            .count(table, &filters)
            .await
            .map_err(inconclusive("capacity", table))?;
        if current + 1 > ceiling {
            self.errors.push(format!(
                "{} {} is at capacity: {} of {} places taken",
                group_field,
                value_text(group_key),
                current,
                ceiling
            ));
        }
        Ok(())
    }

    /// Egg batch totals: classified counts within the declared total, and the
    /// day's collection (other batches of the same date plus this one) within
    /// [`MAX_HUEVOS_DIARIOS`].
    pub async fn egg_totals(
        &mut self,
        record: &Record,
        own: Option<OwnRecord<'_>>,
    ) -> Result<(), CheckError> {
        if let Some(error) = huevo::classified_exceeds_total(record) {
            self.errors.push(error);
        }

        let total = record.get("cantidad_total").and_then(as_number);
        let date = record.get("fecha_recoleccion").filter(|v| !v.is_null());
        let (Some(total), Some(date)) = (total, date) else {
            return Ok(());
        };

        let mut query = SelectQuery::new().filter(Filter::eq("fecha_recoleccion", date.clone()));
        if let Some(own) = own {
            query = query.filter(Filter::neq(own.key_field, own.id));
        }
        let same_day = self
            .store
            .select("huevos", &query)
            .await
            .map_err(inconclusive("daily egg total", "huevos"))?;
        let collected: f64 = same_day
            .iter()
            .filter_map(|row| row.get("cantidad_total").and_then(as_number))
            .sum();

        if collected + total > MAX_HUEVOS_DIARIOS as f64 {
            self.errors.push(format!(
                "Daily egg ceiling exceeded for {}: {} already collected + {} > {}",
                value_text(date),
                format_number(collected),
                format_number(total),
                MAX_HUEVOS_DIARIOS
            ));
        }
        Ok(())
    }

    pub fn finish(self) -> BusinessRuleOutcome {
        ValidationResult::from_errors(self.errors)
    }
}
