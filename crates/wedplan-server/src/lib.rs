//! wedplan Server: HTTP API over the booking and auth services.

pub mod config;
pub mod context;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::app_router;
pub use state::AppState;
