//! Application services: the validate, check, persist flow behind every write.

pub mod account_service;
pub mod error;
pub mod record_service;
pub mod report_service;

pub use account_service::{AccountService, Profile};
pub use error::{ServiceError, ServiceResult};
pub use record_service::{ListParams, RecordService, Saved};
pub use report_service::{ReportService, Resumen};

use crate::auth::local::CREDENTIALS_TABLE;
use crate::auth::roles::PROFILE_TABLE;
use crate::domain::EntityRegistry;
use crate::storage::MemoryStore;

/// A [`MemoryStore`] with the same unique columns as `migrations/`.
pub fn memory_store(entities: &EntityRegistry) -> MemoryStore {
    let mut store = MemoryStore::new()
        .with_unique(PROFILE_TABLE, "email")
        .with_unique(CREDENTIALS_TABLE, "email");
    for entity in entities.list() {
        store = store.with_table(entity.table, entity.key_field);
        for field in entity.unique_fields {
            store = store.with_unique(entity.table, field);
        }
    }
    store
}
