//! Claxon template model and database operations.
//!
//! Templates are admin-managed canned messages stored in all three
//! supported languages at once. Read endpoints project the three message
//! columns down to a single `message` in the requested language; Romanian
//! is the fallback for unrecognized or missing language codes.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE claxon_templates (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     category VARCHAR(50) NOT NULL,
//!     message_en TEXT NOT NULL,
//!     message_ro TEXT NOT NULL,
//!     message_ru TEXT NOT NULL,
//!     is_active BOOLEAN NOT NULL DEFAULT TRUE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Supported message languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ro,
    Ru,
}

impl Language {
    /// Parses a language code, falling back to Romanian for anything that
    /// isn't exactly `en`/`ro`/`ru`.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("en") => Language::En,
            Some("ru") => Language::Ru,
            _ => Language::Ro,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ro => "ro",
            Language::Ru => "ru",
        }
    }
}

/// Claxon template row with all three localizations
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClaxonTemplate {
    pub id: Uuid,

    /// Grouping key (e.g. "parking", "lights", "alarm")
    pub category: String,

    pub message_en: String,
    pub message_ro: String,
    pub message_ru: String,

    /// Inactive templates are hidden from listings but stay referenced
    /// by existing claxons
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A template projected to a single language for client consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedTemplate {
    pub id: Uuid,
    pub category: String,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplate {
    pub category: String,
    pub message_en: String,
    pub message_ro: String,
    pub message_ru: String,
    pub is_active: Option<bool>,
}

/// Input for updating a template; only non-None fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplate {
    pub category: Option<String>,
    pub message_en: Option<String>,
    pub message_ro: Option<String>,
    pub message_ru: Option<String>,
    pub is_active: Option<bool>,
}

impl ClaxonTemplate {
    /// The stored message in the given language
    pub fn message(&self, language: Language) -> &str {
        match language {
            Language::En => &self.message_en,
            Language::Ro => &self.message_ro,
            Language::Ru => &self.message_ru,
        }
    }

    /// Projects the row to a single language
    pub fn localize(self, language: Language) -> LocalizedTemplate {
        let message = self.message(language).to_string();
        LocalizedTemplate {
            id: self.id,
            category: self.category,
            message,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Inserts a new template
    pub async fn insert(pool: &PgPool, data: CreateTemplate) -> Result<Self, sqlx::Error> {
        let template = sqlx::query_as::<_, ClaxonTemplate>(
            r#"
            INSERT INTO claxon_templates (category, message_en, message_ro, message_ru, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, category, message_en, message_ro, message_ru, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(data.category)
        .bind(data.message_en)
        .bind(data.message_ro)
        .bind(data.message_ru)
        .bind(data.is_active.unwrap_or(true))
        .fetch_one(pool)
        .await?;

        Ok(template)
    }

    /// Lists active templates, optionally restricted to a category,
    /// newest first.
    pub async fn list_active(
        pool: &PgPool,
        category: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let templates = match category {
            Some(category) => {
                sqlx::query_as::<_, ClaxonTemplate>(
                    r#"
                    SELECT id, category, message_en, message_ro, message_ru, is_active,
                           created_at, updated_at
                    FROM claxon_templates
                    WHERE is_active = TRUE AND category = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(category)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ClaxonTemplate>(
                    r#"
                    SELECT id, category, message_en, message_ro, message_ru, is_active,
                           created_at, updated_at
                    FROM claxon_templates
                    WHERE is_active = TRUE
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(pool)
                .await?
            }
        };

        Ok(templates)
    }

    /// Finds a template by id.
    ///
    /// Generic over the executor for use inside the claxon create
    /// transaction.
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let template = sqlx::query_as::<_, ClaxonTemplate>(
            r#"
            SELECT id, category, message_en, message_ro, message_ru, is_active,
                   created_at, updated_at
            FROM claxon_templates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(template)
    }

    /// Updates a template; only non-None fields are written.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTemplate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE claxon_templates SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.category.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category = ${}", bind_count));
        }
        if data.message_en.is_some() {
            bind_count += 1;
            query.push_str(&format!(", message_en = ${}", bind_count));
        }
        if data.message_ro.is_some() {
            bind_count += 1;
            query.push_str(&format!(", message_ro = ${}", bind_count));
        }
        if data.message_ru.is_some() {
            bind_count += 1;
            query.push_str(&format!(", message_ru = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, category, message_en, message_ro, message_ru, \
             is_active, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, ClaxonTemplate>(&query).bind(id);

        if let Some(category) = data.category {
            q = q.bind(category);
        }
        if let Some(message_en) = data.message_en {
            q = q.bind(message_en);
        }
        if let Some(message_ro) = data.message_ro {
            q = q.bind(message_ro);
        }
        if let Some(message_ru) = data.message_ru {
            q = q.bind(message_ru);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let template = q.fetch_optional(pool).await?;

        Ok(template)
    }

    /// Deletes a template.
    ///
    /// Referencing claxons keep their message text but lose the reference
    /// (FK is ON DELETE SET NULL).
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM claxon_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> ClaxonTemplate {
        ClaxonTemplate {
            id: Uuid::new_v4(),
            category: "parking".to_string(),
            message_en: "Your car is blocking the exit".to_string(),
            message_ro: "Mașina dvs. blochează ieșirea".to_string(),
            message_ru: "Ваша машина блокирует выезд".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_language_from_code() {
        assert_eq!(Language::from_code(Some("en")), Language::En);
        assert_eq!(Language::from_code(Some("ro")), Language::Ro);
        assert_eq!(Language::from_code(Some("ru")), Language::Ru);

        // Romanian is the fallback
        assert_eq!(Language::from_code(Some("de")), Language::Ro);
        assert_eq!(Language::from_code(Some("")), Language::Ro);
        assert_eq!(Language::from_code(None), Language::Ro);
    }

    #[test]
    fn test_message_projection() {
        let t = template();
        assert_eq!(t.message(Language::En), "Your car is blocking the exit");
        assert_eq!(t.message(Language::Ro), "Mașina dvs. blochează ieșirea");
        assert_eq!(t.message(Language::Ru), "Ваша машина блокирует выезд");
    }

    #[test]
    fn test_localize() {
        let t = template();
        let expected = t.message_en.clone();
        let localized = t.localize(Language::En);
        assert_eq!(localized.message, expected);
        assert_eq!(localized.category, "parking");
    }

    #[test]
    fn test_localize_fallback_language() {
        let t = template();
        let expected = t.message_ro.clone();
        let localized = t.localize(Language::from_code(Some("fr")));
        assert_eq!(localized.message, expected);
    }
}
