//! Application layer: use-case services orchestrating domain rules,
//! persistence and external adapters.
//!
//! HTTP handlers are thin wrappers that delegate to these services.

pub mod services;

pub use services::{Adapters, AppServices};
