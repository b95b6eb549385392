//! Authentication utilities.
//!
//! Identity is owned by an external provider (phone-OTP signup); this
//! crate only validates the bearer tokens it issues.
//!
//! - [`jwt`]: HS256 token validation (and creation, for tests/tooling)
//! - [`middleware`]: bearer header parsing into an [`middleware::AuthContext`]

pub mod jwt;
pub mod middleware;
