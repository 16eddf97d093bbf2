//! HTTP REST API
//!
//! - `common`: response envelope, errors, validated JSON
//! - `middleware`: JWT authentication
//! - `modules`: handlers and DTOs per feature
//! - `router`: route table with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, AppState};
