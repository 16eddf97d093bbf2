//! Infrastructure layer: persistence, cache, crypto and third-party adapters

pub mod cache;
pub mod catalogs;
pub mod cloudflare;
pub mod crypto;
pub mod database;
pub mod email;

pub use cache::{CacheService, CacheTtl};
pub use database::{init_database, run_migrations, DatabaseConfig};
