pub mod error;
pub mod extract;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod auth;
    pub mod common;
    pub mod health;
    pub mod records;
    pub mod reports;
}

pub use error::ApiError;
pub use router::{create_router, ApiDoc};
pub use types::{ApiResponse, AppState};
