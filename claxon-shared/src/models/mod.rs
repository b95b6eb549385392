//! Database models for Claxon.
//!
//! One module per table, each owning its row struct and SQL:
//!
//! - `user`: accounts keyed by the identity provider's external id
//! - `vehicle`: user-owned vehicles, searchable by plate
//! - `template`: admin-managed multi-language canned messages
//! - `claxon`: the directed messages exchanged between users
//!
//! Business rules (uniqueness checks, ownership resolution, the
//! transactional create flow) live in the `services` module; models stay
//! at the level of single statements.

pub mod claxon;
pub mod template;
pub mod user;
pub mod vehicle;
