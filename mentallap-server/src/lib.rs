//! mentallap-server: The Mental Lap web application
//!
//! Athlete journals, workshops and registrations, 1:1 session bookings,
//! video form analysis, articles, a contact form and admin analytics,
//! served as a JSON API plus minimal server-rendered pages.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod mail;
pub mod models;
pub mod seed;
pub mod views;

pub use config::{AppConfig, ConfigError};
pub use db::{create_pool, migrate, DbError};
pub use http::{build_router, mailer_for, run_server, ApiError, AppState, ServerError};
