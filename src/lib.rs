//! # Campus
//!
//! Learning-management backend: course authoring, enrollment and
//! monetization, progress tracking, assessments, certificates, community
//! features and media delivery behind a REST API.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Status enums, value types and pure business rules
//! - **application**: Use-case services wired together in [`AppServices`]
//! - **infrastructure**: Database, cache, crypto and third-party adapters
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: Process lifecycle (startup, background tasks, shutdown)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{Adapters, AppServices};

// Re-export database types for easy access
pub use infrastructure::{init_database, run_migrations, DatabaseConfig};

pub use interfaces::http::{create_api_router, AppState};

pub use server::{init_tracing, ServerHandle, ServerOptions};
