//! Business rules that need persisted state.
//!
//! These run strictly after schema validation has passed. They are advisory
//! pre-checks: nothing locks the rows between the check and the write, so the
//! database's own constraints remain the backstop.

pub mod checker;
pub mod entities;

pub use checker::{BusinessRuleChecker, BusinessRuleOutcome, CheckError, OwnRecord};
pub use entities::RuleSet;

/// Most birds a single cage may hold.
pub const MAX_AVES_POR_JAULA: u64 = 20;

/// Most eggs the farm can collect in one day across all batches.
pub const MAX_HUEVOS_DIARIOS: u64 = 5000;
