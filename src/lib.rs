pub mod app;
pub mod auth;
pub mod domain;
pub mod infra;
pub mod rules;
pub mod storage;
pub mod transport;
pub mod validation;

// Convenience re-exports (keeps call-sites clean)
pub use app::{AccountService, RecordService, ReportService};
pub use domain::{EntityRegistry, Record};
pub use storage::{MemoryStore, PgStore, Store};
pub use validation::{SchemaRegistry, ValidationResult};
