//! Persistence collaborator.
//!
//! Records travel as JSON objects (`row_to_json` on the Postgres side), so the
//! validation and business-rule layers never need per-table Rust types.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;

use crate::domain::Record;
use async_trait::async_trait;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use query::{Filter, FilterOp, OrderDirection, SelectQuery};

/// Filterable reads, keyed single-row writes and counts over named tables.
///
/// Keys are compared in their text form, so `"7"` and `7` address the same row.
#[async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, table: &str, query: &SelectQuery) -> StoreResult<Vec<Record>>;

    async fn count(&self, table: &str, filters: &[Filter]) -> StoreResult<u64>;

    /// Fetches one row by key. Missing rows are `StoreError::NotFound`.
    async fn get(&self, table: &str, key_field: &str, id: &str) -> StoreResult<Record>;

    /// Inserts one row and returns it as stored (defaults and generated keys filled in).
    async fn insert(&self, table: &str, record: &Record) -> StoreResult<Record>;

    /// Applies `patch` to the row with the given key and returns the updated row.
    async fn update(
        &self,
        table: &str,
        key_field: &str,
        id: &str,
        patch: &Record,
    ) -> StoreResult<Record>;

    async fn delete(&self, table: &str, key_field: &str, id: &str) -> StoreResult<()>;

    /// Cheap liveness probe.
    async fn ping(&self) -> StoreResult<()>;
}
