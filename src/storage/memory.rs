//! In-process [`Store`] for local development (`STORAGE_BACKEND=memory`) and tests.
//!
//! Mirrors the parts of the Postgres behaviour the API relies on: generated
//! integer keys, declared unique columns, text-form key comparison and
//! null-safe inequality. Foreign keys are not enforced.

use crate::domain::Record;
use crate::storage::{Filter, FilterOp, SelectQuery, Store, StoreError, StoreResult};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct TableSpec {
    key_field: String,
    unique: Vec<String>,
}

impl Default for TableSpec {
    fn default() -> Self {
        Self {
            key_field: "id".to_string(),
            unique: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Table {
    rows: Vec<Record>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    specs: HashMap<String, TableSpec>,
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the key column of `table` (defaults to `id`).
    pub fn with_table(mut self, table: &str, key_field: &str) -> Self {
        self.specs.entry(table.to_string()).or_default().key_field = key_field.to_string();
        self
    }

    /// Declares a unique column, enforced on insert and update.
    pub fn with_unique(mut self, table: &str, field: &str) -> Self {
        self.specs
            .entry(table.to_string())
            .or_default()
            .unique
            .push(field.to_string());
        self
    }

    /// Inserts rows as-is, returning them with generated keys.
    pub async fn seed(&self, table: &str, rows: Vec<Record>) -> StoreResult<Vec<Record>> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(self.insert(table, &row).await?);
        }
        Ok(out)
    }

    fn spec(&self, table: &str) -> TableSpec {
        self.specs.get(table).cloned().unwrap_or_default()
    }
}

fn text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn present<'r>(record: &'r Record, field: &str) -> Option<&'r JsonValue> {
    record.get(field).filter(|v| !v.is_null())
}

fn number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Numeric filter values match by value, everything else by text.
fn same(value: &JsonValue, expected: &JsonValue) -> bool {
    match (expected.is_number(), number(value), number(expected)) {
        (true, Some(x), Some(y)) => x == y,
        _ => text(value) == text(expected),
    }
}

/// Numeric when both sides are numeric, text otherwise.
fn compare(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (number(a), number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => text(a).cmp(&text(b)),
    }
}

fn like_regex(pattern: &str) -> StoreResult<Regex> {
    let mut re = String::from("(?is)^");
    for c in pattern.chars() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| StoreError::InvalidQuery(e.to_string()))
}

fn matches(record: &Record, filter: &Filter) -> StoreResult<bool> {
    let value = present(record, &filter.field);
    Ok(match &filter.op {
        FilterOp::Eq(expected) => value.map(|v| same(v, expected)).unwrap_or(false),
        FilterOp::Neq(expected) => value.map(|v| !same(v, expected)).unwrap_or(true),
        FilterOp::Gte(bound) => value
            .map(|v| compare(v, bound) != Ordering::Less)
            .unwrap_or(false),
        FilterOp::Lte(bound) => value
            .map(|v| compare(v, bound) != Ordering::Greater)
            .unwrap_or(false),
        FilterOp::Like(pattern) => {
            let re = like_regex(pattern)?;
            value.map(|v| re.is_match(&text(v))).unwrap_or(false)
        }
    })
}

fn matches_all(record: &Record, filters: &[Filter]) -> StoreResult<bool> {
    for filter in filters {
        if !matches(record, filter)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn check_unique(
    table: &str,
    spec: &TableSpec,
    rows: &[Record],
    candidate: &Record,
    skip: Option<usize>,
) -> StoreResult<()> {
    let mut fields = spec.unique.clone();
    fields.push(spec.key_field.clone());
    for field in &fields {
        let Some(value) = present(candidate, field) else {
            continue;
        };
        let clash = rows.iter().enumerate().any(|(idx, row)| {
            Some(idx) != skip && present(row, field).map(|v| text(v) == text(value)).unwrap_or(false)
        });
        if clash {
            return Err(StoreError::UniqueViolation {
                constraint: format!("{}_{}_key", table, field),
            });
        }
    }
    Ok(())
}

fn position(rows: &[Record], key_field: &str, id: &str) -> Option<usize> {
    rows.iter()
        .position(|row| present(row, key_field).map(|v| text(v) == id).unwrap_or(false))
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, table: &str, query: &SelectQuery) -> StoreResult<Vec<Record>> {
        let tables = self.tables.read().await;
        let Some(t) = tables.get(table) else {
            return Ok(Vec::new());
        };

        let mut rows = Vec::new();
        for row in &t.rows {
            if matches_all(row, &query.filters)? {
                rows.push(row.clone());
            }
        }

        if let Some((field, direction)) = &query.order_by {
            rows.sort_by(|a, b| {
                let ord = match (present(a, field), present(b, field)) {
                    (Some(x), Some(y)) => compare(x, y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match direction {
                    crate::storage::OrderDirection::Asc => ord,
                    crate::storage::OrderDirection::Desc => ord.reverse(),
                }
            });
        }

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> StoreResult<u64> {
        let tables = self.tables.read().await;
        let Some(t) = tables.get(table) else {
            return Ok(0);
        };
        let mut n = 0;
        for row in &t.rows {
            if matches_all(row, filters)? {
                n += 1;
            }
        }
        Ok(n)
    }

    async fn get(&self, table: &str, key_field: &str, id: &str) -> StoreResult<Record> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .and_then(|t| position(&t.rows, key_field, id).map(|idx| t.rows[idx].clone()))
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
            })
    }

    async fn insert(&self, table: &str, record: &Record) -> StoreResult<Record> {
        if record.is_empty() {
            return Err(StoreError::InvalidQuery("cannot insert an empty record".into()));
        }
        let spec = self.spec(table);
        let mut tables = self.tables.write().await;
        let t = tables.entry(table.to_string()).or_default();

        let mut row = record.clone();
        match present(&row, &spec.key_field).and_then(number) {
            Some(explicit) => t.next_id = t.next_id.max(explicit as i64),
            None if present(&row, &spec.key_field).is_none() => {
                t.next_id += 1;
                row.insert(spec.key_field.clone(), JsonValue::from(t.next_id));
            }
            None => {}
        }

        check_unique(table, &spec, &t.rows, &row, None)?;
        t.rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        key_field: &str,
        id: &str,
        patch: &Record,
    ) -> StoreResult<Record> {
        let spec = self.spec(table);
        let mut tables = self.tables.write().await;
        let not_found = || StoreError::NotFound {
            table: table.to_string(),
        };
        let t = tables.get_mut(table).ok_or_else(not_found)?;
        let idx = position(&t.rows, key_field, id).ok_or_else(not_found)?;

        let mut updated = t.rows[idx].clone();
        for (field, value) in patch {
            if field != key_field {
                updated.insert(field.clone(), value.clone());
            }
        }
        check_unique(table, &spec, &t.rows, &updated, Some(idx))?;
        t.rows[idx] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, table: &str, key_field: &str, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let idx = tables
            .get(table)
            .and_then(|t| position(&t.rows, key_field, id));
        match (tables.get_mut(table), idx) {
            (Some(t), Some(idx)) => {
                t.rows.remove(idx);
                Ok(())
            }
            _ => Err(StoreError::NotFound {
                table: table.to_string(),
            }),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::OrderDirection;
    use serde_json::json;

    fn rec(v: JsonValue) -> Record {
        v.as_object().cloned().unwrap()
    }

    async fn birds() -> MemoryStore {
        let store = MemoryStore::new().with_unique("aves", "color_anillo");
        store
            .seed(
                "aves",
                vec![
                    rec(json!({ "color_anillo": "ROJO-1", "id_jaula": 1, "peso": 1.5 })),
                    rec(json!({ "color_anillo": "AZUL-2", "id_jaula": 1, "peso": 2.25, "estado": "muerta" })),
                    rec(json!({ "color_anillo": "ROJO-3", "id_jaula": 2, "peso": 1.9 })),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn generates_sequential_keys() {
        let store = birds().await;
        let rows = store
            .select("aves", &SelectQuery::new().order_by("id", OrderDirection::Asc))
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    }

    #[tokio::test]
    async fn enforces_declared_unique_columns() {
        let store = birds().await;
        let err = store
            .insert("aves", &rec(json!({ "color_anillo": "ROJO-1", "id_jaula": 3 })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { ref constraint } if constraint == "aves_color_anillo_key"));

        let err = store
            .update("aves", "id", "3", &rec(json!({ "color_anillo": "AZUL-2" })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));

        // Re-saving a row's own value is not a clash.
        store
            .update("aves", "id", "1", &rec(json!({ "color_anillo": "ROJO-1", "peso": 1.6 })))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn filters_compare_by_text_and_number() {
        let store = birds().await;
        let in_cage_one = store.count("aves", &[Filter::eq("id_jaula", "1")]).await.unwrap();
        assert_eq!(in_cage_one, 2);

        let alive = store
            .count("aves", &[Filter::eq("id_jaula", 1), Filter::neq("estado", "muerta")])
            .await
            .unwrap();
        assert_eq!(alive, 1, "rows without estado match a null-safe inequality");

        let heavy = store.count("aves", &[Filter::gte("peso", 1.9)]).await.unwrap();
        assert_eq!(heavy, 2);

        // numeric filter values ignore how the number was written
        assert_eq!(store.count("aves", &[Filter::eq("id_jaula", 1.0)]).await.unwrap(), 2);
        assert_eq!(store.count("aves", &[Filter::neq("peso", 2.25)]).await.unwrap(), 2);

        let rojos = store
            .select("aves", &SelectQuery::new().filter(Filter::like("color_anillo", "rojo%")))
            .await
            .unwrap();
        assert_eq!(rojos.len(), 2);
    }

    #[tokio::test]
    async fn paging_and_ordering() {
        let store = birds().await;
        let page = store
            .select(
                "aves",
                &SelectQuery::new()
                    .order_by("peso", OrderDirection::Desc)
                    .limit(1)
                    .offset(1),
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["color_anillo"], json!("ROJO-3"));
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = birds().await;
        assert!(matches!(
            store.get("aves", "id", "99").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("aves", "id", "99").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.update("jaulas", "id", "1", &Record::new()).await,
            Err(StoreError::NotFound { .. })
        ));

        store.delete("aves", "id", "2").await.unwrap();
        assert_eq!(store.count("aves", &[]).await.unwrap(), 2);
    }
}
