//! User model and database operations.
//!
//! Users are keyed by the identity provider's external id, so the primary
//! key is a provider-issued string rather than a UUID minted here. A row
//! is created on first successful phone-verification signup and removed on
//! account deletion; vehicles and claxons cascade away with it.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id TEXT PRIMARY KEY,
//!     phone VARCHAR(32) NOT NULL UNIQUE,
//!     email VARCHAR(255) NOT NULL UNIQUE,
//!     first_name VARCHAR(100),
//!     last_name VARCHAR(100),
//!     date_of_birth DATE,
//!     gender VARCHAR(20),
//!     language VARCHAR(5) NOT NULL DEFAULT 'ro',
//!     avatar_url VARCHAR(512),
//!     privacy_settings JSONB NOT NULL DEFAULT '{}',
//!     notification_preferences JSONB NOT NULL DEFAULT '{}',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

fn default_true() -> bool {
    true
}

/// Privacy settings stored as typed JSONB.
///
/// Serde defaults let the `'{}'` column default decode cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
    /// Whether the owner's name appears in public plate search results
    #[serde(default = "default_true")]
    pub show_name_in_search: bool,

    /// Whether any user may claxon this user's vehicles
    #[serde(default = "default_true")]
    pub allow_claxons_from_anyone: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            show_name_in_search: true,
            allow_claxons_from_anyone: true,
        }
    }
}

/// Notification preferences stored as typed JSONB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    /// Push notifications on incoming claxons
    #[serde(default = "default_true")]
    pub push_enabled: bool,

    /// Email notifications on incoming claxons
    #[serde(default)]
    pub email_enabled: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push_enabled: true,
            email_enabled: false,
        }
    }
}

/// User model representing an account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// External id issued by the identity provider
    pub id: String,

    /// Verified phone number, unique across all users
    pub phone: String,

    /// Email address, unique across all users
    pub email: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,

    /// Preferred UI language code (en/ro/ru)
    pub language: String,

    pub avatar_url: Option<String>,

    /// Typed privacy settings (JSONB column)
    pub privacy_settings: Json<PrivacySettings>,

    /// Typed notification preferences (JSONB column)
    pub notification_preferences: Json<NotificationPreferences>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Restricted projection of a user for embedding in public views.
///
/// This is the only shape of user data ever exposed to callers other than
/// the user themselves. Phone and email never leave the full row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub phone: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    /// Defaults to "ro" when omitted
    pub language: Option<String>,
    pub avatar_url: Option<String>,
}

/// Input for updating a user profile.
///
/// Only non-None fields are written. Settings are replaced whole rather
/// than merged field-by-field. Phone changes require re-verification with
/// the identity provider and are not part of profile edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub language: Option<String>,
    pub avatar_url: Option<String>,
    pub privacy_settings: Option<PrivacySettings>,
    pub notification_preferences: Option<NotificationPreferences>,
}

impl User {
    /// Inserts a new user whose primary key is the external id.
    ///
    /// Uniqueness of id/phone/email is checked by the service layer before
    /// this runs; the DB constraints are the backstop.
    pub async fn insert<'e, E>(
        executor: E,
        external_id: &str,
        data: CreateUser,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, phone, email, first_name, last_name, date_of_birth,
                               gender, language, avatar_url, privacy_settings,
                               notification_preferences)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, phone, email, first_name, last_name, date_of_birth, gender,
                      language, avatar_url, privacy_settings, notification_preferences,
                      created_at, updated_at
            "#,
        )
        .bind(external_id)
        .bind(data.phone)
        .bind(data.email)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.date_of_birth)
        .bind(data.gender)
        .bind(data.language.unwrap_or_else(|| "ro".to_string()))
        .bind(data.avatar_url)
        .bind(Json(PrivacySettings::default()))
        .bind(Json(NotificationPreferences::default()))
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by external id.
    ///
    /// Generic over the executor so the claxon create flow can run it
    /// inside its transaction.
    pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, phone, email, first_name, last_name, date_of_birth, gender,
                   language, avatar_url, privacy_settings, notification_preferences,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by phone number
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, phone, email, first_name, last_name, date_of_birth, gender,
                   language, avatar_url, privacy_settings, notification_preferences,
                   created_at, updated_at
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, phone, email, first_name, last_name, date_of_birth, gender,
                   language, avatar_url, privacy_settings, notification_preferences,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates a user profile.
    ///
    /// Only non-None fields are written; `updated_at` is always stamped.
    /// Returns None when the user doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the update statement from whichever fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.first_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", first_name = ${}", bind_count));
        }
        if data.last_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", last_name = ${}", bind_count));
        }
        if data.date_of_birth.is_some() {
            bind_count += 1;
            query.push_str(&format!(", date_of_birth = ${}", bind_count));
        }
        if data.gender.is_some() {
            bind_count += 1;
            query.push_str(&format!(", gender = ${}", bind_count));
        }
        if data.language.is_some() {
            bind_count += 1;
            query.push_str(&format!(", language = ${}", bind_count));
        }
        if data.avatar_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", avatar_url = ${}", bind_count));
        }
        if data.privacy_settings.is_some() {
            bind_count += 1;
            query.push_str(&format!(", privacy_settings = ${}", bind_count));
        }
        if data.notification_preferences.is_some() {
            bind_count += 1;
            query.push_str(&format!(", notification_preferences = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, phone, email, first_name, last_name, \
             date_of_birth, gender, language, avatar_url, privacy_settings, \
             notification_preferences, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(first_name) = data.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = data.last_name {
            q = q.bind(last_name);
        }
        if let Some(date_of_birth) = data.date_of_birth {
            q = q.bind(date_of_birth);
        }
        if let Some(gender) = data.gender {
            q = q.bind(gender);
        }
        if let Some(language) = data.language {
            q = q.bind(language);
        }
        if let Some(avatar_url) = data.avatar_url {
            q = q.bind(avatar_url);
        }
        if let Some(privacy) = data.privacy_settings {
            q = q.bind(Json(privacy));
        }
        if let Some(notifications) = data.notification_preferences {
            q = q.bind(Json(notifications));
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user by external id.
    ///
    /// Vehicles and claxons cascade away at the database level.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Restricted projection for embedding in public views
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_settings_default() {
        let settings = PrivacySettings::default();
        assert!(settings.show_name_in_search);
        assert!(settings.allow_claxons_from_anyone);
    }

    #[test]
    fn test_settings_decode_from_empty_object() {
        // The JSONB columns default to '{}'
        let privacy: PrivacySettings = serde_json::from_str("{}").unwrap();
        assert_eq!(privacy, PrivacySettings::default());

        let notifications: NotificationPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(notifications, NotificationPreferences::default());
    }

    #[test]
    fn test_settings_decode_partial() {
        let privacy: PrivacySettings =
            serde_json::from_str(r#"{"show_name_in_search": false}"#).unwrap();
        assert!(!privacy.show_name_in_search);
        assert!(privacy.allow_claxons_from_anyone);
    }

    #[test]
    fn test_update_user_default_is_empty() {
        let update = UpdateUser::default();
        assert!(update.email.is_none());
        assert!(update.first_name.is_none());
        assert!(update.privacy_settings.is_none());
    }
}
