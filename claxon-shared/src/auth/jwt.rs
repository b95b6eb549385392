//! JWT validation for the external identity provider.
//!
//! Callers authenticate with a bearer token issued by the identity
//! provider after phone verification. The service only *verifies* tokens;
//! it never runs a credential flow of its own. The verified `sub` claim is
//! the caller's external id and is the key used for every ownership check
//! in the services.
//!
//! Tokens are HS256-signed with a shared secret. Token creation is kept
//! here for the test suite and local tooling, which stand in for the
//! provider.
//!
//! # Example
//!
//! ```
//! use claxon_shared::auth::jwt::{create_token, validate_token, Claims};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let claims = Claims::new("user_2abc123", None, "claxon-auth");
//! let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
//!
//! let validated = validate_token(&token, "your-secret-key-at-least-32-bytes", "claxon-auth")?;
//! assert_eq!(validated.sub, "user_2abc123");
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Claims carried by an identity-provider token.
///
/// `sub` is the provider-issued external id (e.g. `user_2abc123`) that
/// keys the `users` table. The optional `role` claim gates admin-only
/// operations such as template management.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - external user id
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Optional role ("admin" unlocks template mutations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Claims {
    /// Creates claims with the default 24-hour expiration.
    pub fn new(external_id: impl Into<String>, role: Option<String>, issuer: &str) -> Self {
        Self::with_expiration(external_id, role, issuer, Duration::hours(24))
    }

    /// Creates claims with a custom expiration.
    pub fn with_expiration(
        external_id: impl Into<String>,
        role: Option<String>,
        issuer: &str,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: external_id.into(),
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            role,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Whether the claims carry the admin role
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Signs claims into a token (HS256).
///
/// Used by the test suite and local tooling in place of the identity
/// provider. The secret must be at least 32 bytes.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims.
///
/// Verifies the signature, expiration, `nbf`, and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` when past `exp`
/// - `JwtError::InvalidIssuer` when `iss` doesn't match
/// - `JwtError::ValidationError` for any other failure
pub fn validate_token(token: &str, secret: &str, issuer: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: issuer.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
