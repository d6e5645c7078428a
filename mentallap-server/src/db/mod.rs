//! Database layer - connection pool and repositories
//!
//! # Design Principles
//!
//! - One shared PgPool, no Arc<Mutex<Connection>>
//! - List operations use JOINs or correlated counts, no N+1 queries
//! - Rely on DB constraints and handle conflicts, no check-then-insert
//! - Transactions for multi-step operations

pub mod error;
pub mod pool;
pub mod repos;

pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options, migrate};
pub use repos::*;
