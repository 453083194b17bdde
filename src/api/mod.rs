//! HTTP API module for the configuration loader.
//!
//! This module provides REST endpoints to validate configuration documents
//! and to inspect the configurations loaded at startup.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::ValidateParams;
pub use response::{ApiError, ConfigSummary, HealthResponse, ValidationResponse};
pub use state::AppState;
