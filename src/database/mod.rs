/// Database module for PostgreSQL integration
///
/// This module provides:
/// - r2d2 connection pooling
/// - Repository pattern implementations for every persisted entity
/// - Database models and schema
/// - Diesel ORM integration
pub mod connection;
pub mod enums;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{establish_connection_pool, DatabaseError, DatabasePool};
