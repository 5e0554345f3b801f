// Library Crate Root
// lib.rs

pub mod analytics;
pub mod api;
pub mod auth;
pub mod clients;
pub mod config;
pub mod database;
pub mod geo;
pub mod ingest;
pub mod jobs;

// pub use = re-export at crate root
pub use api::{create_router, ApiError, AppState};
pub use database::{establish_connection_pool, DatabaseError, DatabasePool};
