//! API route handlers, one module per resource:
//!
//! - `health`: health check
//! - `users`: account lifecycle (create, me, edit, delete)
//! - `vehicles`: owner-scoped CRUD + public plate search
//! - `templates`: public localized reads, admin mutations
//! - `claxons`: the message exchange

pub mod claxons;
pub mod health;
pub mod templates;
pub mod users;
pub mod vehicles;
