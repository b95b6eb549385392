//! # Claxon Shared Library
//!
//! Shared types and business logic for the Claxon plate-to-plate
//! messaging service.
//!
//! ## Module Organization
//!
//! - `db`: connection pooling and migrations
//! - `auth`: bearer token validation for the external identity provider
//! - `models`: database row models and their SQL
//! - `services`: the framework-agnostic business flows the API exposes

pub mod auth;
pub mod db;
pub mod models;
pub mod services;

/// Current version of the Claxon shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
