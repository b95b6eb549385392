//! Bearer authentication for Axum.
//!
//! Parses the `Authorization: Bearer <token>` header, validates the token
//! against the identity provider's signing secret, and produces an
//! [`AuthContext`] that the API layer inserts into request extensions.
//! Handlers extract it with Axum's `Extension` extractor; the
//! `external_id` inside is the only caller identity the services ever see.

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_token, JwtError};

/// Authenticated caller identity added to request extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Provider-issued external id (the `sub` claim)
    pub external_id: String,

    /// Optional role claim
    pub role: Option<String>,
}

impl AuthContext {
    /// Whether the caller may perform admin operations
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Error type for authentication failures
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Malformed authorization header
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// Authenticates a request from its headers.
///
/// Extracts the bearer token, validates it, and returns the caller's
/// [`AuthContext`]. The API layer wraps this in an axum middleware that
/// has access to the configured secret and issuer.
///
/// # Errors
///
/// - `AuthError::MissingCredentials` when the header is absent
/// - `AuthError::InvalidFormat` when it isn't a bearer token
/// - `AuthError::InvalidToken` when validation fails
pub fn authenticate_bearer(
    headers: &HeaderMap,
    secret: &str,
    issuer: &str,
) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, secret, issuer).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(AuthContext {
        external_id: claims.sub,
        role: claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims};
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
    const ISSUER: &str = "claxon-auth";

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_authenticate_bearer_ok() {
        let claims = Claims::new("user_abc123", None, ISSUER);
        let token = create_token(&claims, SECRET).unwrap();

        let ctx = authenticate_bearer(&headers_with_token(&token), SECRET, ISSUER).unwrap();
        assert_eq!(ctx.external_id, "user_abc123");
        assert!(!ctx.is_admin());
    }

    #[test]
    fn test_authenticate_bearer_admin_role() {
        let claims = Claims::new("user_admin", Some("admin".to_string()), ISSUER);
        let token = create_token(&claims, SECRET).unwrap();

        let ctx = authenticate_bearer(&headers_with_token(&token), SECRET, ISSUER).unwrap();
        assert!(ctx.is_admin());
    }

    #[test]
    fn test_missing_header() {
        let err = authenticate_bearer(&HeaderMap::new(), SECRET, ISSUER).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[test]
    fn test_non_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        let err = authenticate_bearer(&headers, SECRET, ISSUER).unwrap_err();
        assert!(matches!(err, AuthError::InvalidFormat(_)));
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
