//! Survey Intake API Library
//!
//! Collects store-operations surveys over HTTP, keeps them in a local SQLite
//! file and lets an operator holding the admin key page through them or
//! download them as CSV.
//!
//! # Modules
//!
//! - `api`: Router and middleware stack (CORS, rate limiting, body limit, tracing).
//! - `config`: Configuration management.
//! - `db`: SQLite connection pool and schema bootstrap.
//! - `db_storage`: Survey insert and read operations.
//! - `errors`: Error handling types.
//! - `export`: CSV rendering of stored surveys.
//! - `handlers`: HTTP request handlers.
//! - `models`: Data models.
//! - `normalize`: Coercion of untrusted survey payloads.

pub mod api;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod models;
pub mod normalize;
