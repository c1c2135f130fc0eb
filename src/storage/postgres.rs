//! Postgres-backed [`Store`].
//!
//! Rows come back through `row_to_json(...)`; writes go through
//! `jsonb_populate_record`, so column casting is left to Postgres and only the
//! columns present in the record are touched (omitted columns keep their defaults).

use crate::domain::Record;
use crate::storage::{Filter, FilterOp, SelectQuery, Store, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Instant;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bundled schema migrations (`migrations/`).
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// SQL identifiers are interpolated, never bound, so they must be plain names.
pub fn validate_ident(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn ident(name: &str) -> StoreResult<&str> {
    if validate_ident(name) {
        Ok(name)
    } else {
        Err(StoreError::InvalidQuery(format!("invalid identifier '{}'", name)))
    }
}

fn text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) -> StoreResult<()> {
    for (idx, filter) in filters.iter().enumerate() {
        let field = ident(&filter.field)?;
        qb.push(if idx == 0 { " WHERE " } else { " AND " });
        qb.push(field);
        match &filter.op {
            FilterOp::Eq(JsonValue::Null) => {
                qb.push(" IS NULL");
            }
            FilterOp::Neq(JsonValue::Null) => {
                qb.push(" IS NOT NULL");
            }
            // numbers compare by value; NUMERIC text carries its scale ('1.50')
            FilterOp::Eq(JsonValue::Number(n)) => {
                qb.push(" = ").push_bind(n.as_f64());
            }
            FilterOp::Neq(JsonValue::Number(n)) => {
                qb.push(" IS DISTINCT FROM ").push_bind(n.as_f64());
            }
            FilterOp::Eq(value) => {
                qb.push("::text = ").push_bind(text(value));
            }
            FilterOp::Neq(value) => {
                qb.push("::text IS DISTINCT FROM ").push_bind(text(value));
            }
            FilterOp::Gte(bound) | FilterOp::Lte(bound) => {
                let op = if matches!(filter.op, FilterOp::Gte(_)) { " >= " } else { " <= " };
                match bound.as_f64() {
                    Some(n) => {
                        qb.push(op).push_bind(n);
                    }
                    // dates and other text compare in their ISO text form
                    None => {
                        qb.push("::text").push(op).push_bind(text(bound));
                    }
                }
            }
            FilterOp::Like(pattern) => {
                qb.push("::text ILIKE ").push_bind(pattern.clone());
            }
        }
    }
    Ok(())
}

fn row_record(row: &PgRow) -> StoreResult<Record> {
    let value: JsonValue = row.try_get("record")?;
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(StoreError::Backend(format!("expected a JSON row, got {}", other))),
    }
}

fn column_list(record: &Record) -> StoreResult<String> {
    if record.is_empty() {
        return Err(StoreError::InvalidQuery("no columns to write".to_string()));
    }
    let cols = record
        .keys()
        .map(|k| ident(k))
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(cols.join(", "))
}

fn observe<T>(op: &'static str, table: &str, started: Instant, result: StoreResult<T>) -> StoreResult<T> {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => tracing::debug!(op, table, elapsed_ms, "store operation"),
        Err(StoreError::NotFound { .. }) => tracing::debug!(op, table, elapsed_ms, "no matching row"),
        Err(e) => tracing::warn!(op, table, elapsed_ms, error = %e, "store operation failed"),
    }
    result.map_err(|e| match e {
        StoreError::NotFound { .. } => StoreError::NotFound {
            table: table.to_string(),
        },
        other => other,
    })
}

impl PgStore {
    async fn select_inner(&self, table: &str, query: &SelectQuery) -> StoreResult<Vec<Record>> {
        let table = ident(table)?;
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT row_to_json(t.*) AS record FROM ");
        qb.push(table).push(" t");
        push_filters(&mut qb, &query.filters)?;

        if let Some((field, direction)) = &query.order_by {
            qb.push(" ORDER BY ")
                .push(ident(field)?)
                .push(" ")
                .push(direction.as_sql());
        }
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            qb.push(" OFFSET ").push_bind(offset as i64);
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_record).collect()
    }

    async fn count_inner(&self, table: &str, filters: &[Filter]) -> StoreResult<u64> {
        let table = ident(table)?;
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(table);
        push_filters(&mut qb, filters)?;
        let n: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(n.max(0) as u64)
    }

    async fn insert_inner(&self, table: &str, record: &Record) -> StoreResult<Record> {
        let table = ident(table)?;
        let cols = column_list(record)?;
        let sql = format!(
            "INSERT INTO {table} ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) \
             RETURNING row_to_json({table}.*) AS record"
        );
        let row = sqlx::query(&sql)
            .bind(JsonValue::Object(record.clone()))
            .fetch_one(&self.pool)
            .await?;
        row_record(&row)
    }

    async fn update_inner(
        &self,
        table: &str,
        key_field: &str,
        id: &str,
        patch: &Record,
    ) -> StoreResult<Record> {
        let table = ident(table)?;
        let key_field = ident(key_field)?;
        let cols = column_list(patch)?;
        let sql = format!(
            "UPDATE {table} SET ({cols}) = (SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1)) \
             WHERE {key_field}::text = $2 RETURNING row_to_json({table}.*) AS record"
        );
        let row = sqlx::query(&sql)
            .bind(JsonValue::Object(patch.clone()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row_record(&row),
            None => Err(StoreError::NotFound {
                table: table.to_string(),
            }),
        }
    }

    async fn delete_inner(&self, table: &str, key_field: &str, id: &str) -> StoreResult<()> {
        let table = ident(table)?;
        let key_field = ident(key_field)?;
        let sql = format!("DELETE FROM {table} WHERE {key_field}::text = $1");
        let done = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: table.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn select(&self, table: &str, query: &SelectQuery) -> StoreResult<Vec<Record>> {
        let started = Instant::now();
        observe("select", table, started, self.select_inner(table, query).await)
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> StoreResult<u64> {
        let started = Instant::now();
        observe("count", table, started, self.count_inner(table, filters).await)
    }

    async fn get(&self, table: &str, key_field: &str, id: &str) -> StoreResult<Record> {
        let started = Instant::now();
        let query = SelectQuery::new().filter(Filter::eq(key_field, id)).limit(1);
        let result = match self.select_inner(table, &query).await {
            Ok(rows) => rows.into_iter().next().ok_or(StoreError::NotFound {
                table: table.to_string(),
            }),
            Err(e) => Err(e),
        };
        observe("get", table, started, result)
    }

    async fn insert(&self, table: &str, record: &Record) -> StoreResult<Record> {
        let started = Instant::now();
        observe("insert", table, started, self.insert_inner(table, record).await)
    }

    async fn update(
        &self,
        table: &str,
        key_field: &str,
        id: &str,
        patch: &Record,
    ) -> StoreResult<Record> {
        let started = Instant::now();
        let result = self.update_inner(table, key_field, id, patch).await;
        observe("update", table, started, result)
    }

    async fn delete(&self, table: &str, key_field: &str, id: &str) -> StoreResult<()> {
        let started = Instant::now();
        observe("delete", table, started, self.delete_inner(table, key_field, id).await)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
