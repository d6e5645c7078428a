//! HTTP layer
//!
//! Axum server with:
//! - cookie sessions resolved by extractors
//! - JSON API under `/api`, server-rendered pages everywhere else
//! - request tracing, timeout and graceful shutdown
//! - JSON error responses

pub mod cookies;
pub mod error;
pub mod extractors;
pub mod form;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, mailer_for, run_server, AppState, ServerError};
