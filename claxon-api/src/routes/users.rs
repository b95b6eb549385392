//! User account endpoints.
//!
//! The caller's identity always comes from the verified bearer token;
//! there is no way to act on another user's account.
//!
//! # Endpoints
//!
//! - `POST /users` - create the caller's account after signup
//! - `GET /users/me` - fetch own profile
//! - `PATCH /users/me` - edit own profile
//! - `DELETE /users/me` - delete own account (vehicles/claxons cascade)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::NaiveDate;
use claxon_shared::auth::middleware::AuthContext;
use claxon_shared::models::user::{
    CreateUser, NotificationPreferences, PrivacySettings, UpdateUser, User,
};
use serde::Deserialize;
use validator::Validate;

/// Create account request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// E.164-ish phone number, already verified by the identity provider
    #[validate(length(min = 5, max = 32, message = "Phone must be 5-32 characters"))]
    pub phone: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 20, message = "Gender must be at most 20 characters"))]
    pub gender: Option<String>,

    /// Language code (en/ro/ru); defaults to ro
    #[validate(length(min = 2, max = 5, message = "Language must be a short code"))]
    pub language: Option<String>,

    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
}

/// Profile edit request; all fields optional
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 20, message = "Gender must be at most 20 characters"))]
    pub gender: Option<String>,

    #[validate(length(min = 2, max = 5, message = "Language must be a short code"))]
    pub language: Option<String>,

    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,

    pub privacy_settings: Option<PrivacySettings>,
    pub notification_preferences: Option<NotificationPreferences>,
}

/// `POST /users`
///
/// Creates the account row keyed by the caller's external id. Fails with
/// 409 when the id, phone, or email is already taken.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate().map_err(ApiError::from)?;

    let user = state
        .services
        .users
        .create(
            &auth.external_id,
            CreateUser {
                phone: req.phone,
                email: req.email,
                first_name: req.first_name,
                last_name: req.last_name,
                date_of_birth: req.date_of_birth,
                gender: req.gender,
                language: req.language,
                avatar_url: req.avatar_url,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/me`
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = state
        .services
        .users
        .find_by_external_id(&auth.external_id)
        .await?;

    Ok(Json(user))
}

/// `PATCH /users/me`
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    req.validate().map_err(ApiError::from)?;

    let user = state
        .services
        .users
        .update(
            &auth.external_id,
            UpdateUser {
                email: req.email,
                first_name: req.first_name,
                last_name: req.last_name,
                date_of_birth: req.date_of_birth,
                gender: req.gender,
                language: req.language,
                avatar_url: req.avatar_url,
                privacy_settings: req.privacy_settings,
                notification_preferences: req.notification_preferences,
            },
        )
        .await?;

    Ok(Json(user))
}

/// `DELETE /users/me`
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    state.services.users.remove(&auth.external_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_validation() {
        let valid = CreateUserRequest {
            phone: "+40712345678".to_string(),
            email: "ana@example.com".to_string(),
            first_name: Some("Ana".to_string()),
            last_name: None,
            date_of_birth: None,
            gender: None,
            language: Some("ro".to_string()),
            avatar_url: None,
        };
        assert!(valid.validate().is_ok());

        let bad_email = CreateUserRequest {
            phone: "+40712345678".to_string(),
            email: "not-an-email".to_string(),
            first_name: None,
            last_name: None,
            date_of_birth: None,
            gender: None,
            language: None,
            avatar_url: None,
        };
        assert!(bad_email.validate().is_err());

        let short_phone = CreateUserRequest {
            phone: "123".to_string(),
            email: "ana@example.com".to_string(),
            first_name: None,
            last_name: None,
            date_of_birth: None,
            gender: None,
            language: None,
            avatar_url: None,
        };
        assert!(short_phone.validate().is_err());
    }

    #[test]
    fn test_update_user_request_empty_is_valid() {
        assert!(UpdateUserRequest::default().validate().is_ok());
    }
}
