//! Claxon model and database operations.
//!
//! A claxon is a directed message from one user to another about a
//! specific vehicle, carrying either a template reference or a custom
//! message. Its only state transition is `read = false` → `read = true`
//! (with `read_at` stamped), and only the recipient may drive it.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE claxons (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     sender_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     recipient_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     vehicle_id UUID NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
//!     template_id UUID REFERENCES claxon_templates(id) ON DELETE SET NULL,
//!     claxon_type VARCHAR(20) NOT NULL DEFAULT 'custom',
//!     custom_message TEXT,
//!     sender_language VARCHAR(5) NOT NULL DEFAULT 'ro',
//!     read BOOLEAN NOT NULL DEFAULT FALSE,
//!     read_at TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::template::ClaxonTemplate;
use super::user::UserSummary;

/// Claxon row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Claxon {
    pub id: Uuid,

    /// Sending user's external id; always the authenticated creator
    pub sender_id: String,

    /// Receiving user's external id; owner of the vehicle
    pub recipient_id: String,

    pub vehicle_id: Uuid,

    /// Optional canned-message reference
    pub template_id: Option<Uuid>,

    /// "template" or "custom"
    pub claxon_type: String,

    pub custom_message: Option<String>,

    /// Language of the sender at send time; inbox-filterable
    pub sender_language: String,

    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolved insert data.
///
/// Produced by the service after all existence/ownership checks passed;
/// `sender_id` is passed separately and always comes from the
/// authenticated caller, never from client input.
#[derive(Debug, Clone)]
pub struct NewClaxon {
    pub recipient_id: String,
    pub vehicle_id: Uuid,
    pub template_id: Option<Uuid>,
    pub claxon_type: String,
    pub custom_message: Option<String>,
    pub sender_language: String,
}

/// Resolved list filters; defaults already applied by the service
#[derive(Debug, Clone)]
pub struct ClaxonFilters {
    pub read: Option<bool>,
    pub claxon_type: Option<String>,
    pub sender_language: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ClaxonFilters {
    fn default() -> Self {
        Self {
            read: None,
            claxon_type: None,
            sender_language: None,
            limit: 20,
            offset: 0,
        }
    }
}

/// Which side of the exchange a listing is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaxonSide {
    /// Claxons received by the caller
    Inbox,
    /// Claxons sent by the caller
    Sent,
}

impl ClaxonSide {
    fn column(&self) -> &'static str {
        match self {
            ClaxonSide::Inbox => "recipient_id",
            ClaxonSide::Sent => "sender_id",
        }
    }
}

/// Composite view of a claxon: the row plus restricted sender/recipient
/// projections, a vehicle summary, and the referenced template when one
/// exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaxonView {
    pub id: Uuid,
    pub sender_id: String,
    pub recipient_id: String,
    pub vehicle_id: Uuid,
    pub template_id: Option<Uuid>,
    pub claxon_type: String,
    pub custom_message: Option<String>,
    pub sender_language: String,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub sender: UserSummary,
    pub recipient: UserSummary,
    pub vehicle: VehicleSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<ClaxonTemplate>,
}

/// Vehicle fields embedded in a claxon view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: Uuid,
    pub plate_number: String,
    pub plate_country: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ClaxonViewRow {
    id: Uuid,
    sender_id: String,
    recipient_id: String,
    vehicle_id: Uuid,
    template_id: Option<Uuid>,
    claxon_type: String,
    custom_message: Option<String>,
    sender_language: String,
    read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    sender_first_name: Option<String>,
    sender_last_name: Option<String>,
    recipient_first_name: Option<String>,
    recipient_last_name: Option<String>,
    vehicle_plate_number: String,
    vehicle_plate_country: Option<String>,
    vehicle_brand: Option<String>,
    vehicle_model: Option<String>,
    vehicle_color: Option<String>,
    template_category: Option<String>,
    template_message_en: Option<String>,
    template_message_ro: Option<String>,
    template_message_ru: Option<String>,
    template_is_active: Option<bool>,
    template_created_at: Option<DateTime<Utc>>,
    template_updated_at: Option<DateTime<Utc>>,
}

impl ClaxonViewRow {
    fn into_view(self) -> ClaxonView {
        let template = match (
            self.template_id,
            self.template_category,
            self.template_message_en,
            self.template_message_ro,
            self.template_message_ru,
            self.template_is_active,
            self.template_created_at,
            self.template_updated_at,
        ) {
            (
                Some(id),
                Some(category),
                Some(message_en),
                Some(message_ro),
                Some(message_ru),
                Some(is_active),
                Some(created_at),
                Some(updated_at),
            ) => Some(ClaxonTemplate {
                id,
                category,
                message_en,
                message_ro,
                message_ru,
                is_active,
                created_at,
                updated_at,
            }),
            _ => None,
        };

        ClaxonView {
            id: self.id,
            sender: UserSummary {
                id: self.sender_id.clone(),
                first_name: self.sender_first_name,
                last_name: self.sender_last_name,
            },
            recipient: UserSummary {
                id: self.recipient_id.clone(),
                first_name: self.recipient_first_name,
                last_name: self.recipient_last_name,
            },
            vehicle: VehicleSummary {
                id: self.vehicle_id,
                plate_number: self.vehicle_plate_number,
                plate_country: self.vehicle_plate_country,
                brand: self.vehicle_brand,
                model: self.vehicle_model,
                color: self.vehicle_color,
            },
            template,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            vehicle_id: self.vehicle_id,
            template_id: self.template_id,
            claxon_type: self.claxon_type,
            custom_message: self.custom_message,
            sender_language: self.sender_language,
            read: self.read,
            read_at: self.read_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Shared SELECT for all view queries. Users are projected down to
/// id + names only; phone/email never appear here.
const VIEW_SELECT: &str = r#"
SELECT c.id, c.sender_id, c.recipient_id, c.vehicle_id, c.template_id,
       c.claxon_type, c.custom_message, c.sender_language, c.read, c.read_at,
       c.created_at, c.updated_at,
       s.first_name AS sender_first_name, s.last_name AS sender_last_name,
       r.first_name AS recipient_first_name, r.last_name AS recipient_last_name,
       v.plate_number AS vehicle_plate_number, v.plate_country AS vehicle_plate_country,
       v.brand AS vehicle_brand, v.model AS vehicle_model, v.color AS vehicle_color,
       t.category AS template_category, t.message_en AS template_message_en,
       t.message_ro AS template_message_ro, t.message_ru AS template_message_ru,
       t.is_active AS template_is_active, t.created_at AS template_created_at,
       t.updated_at AS template_updated_at
FROM claxons c
INNER JOIN users s ON s.id = c.sender_id
INNER JOIN users r ON r.id = c.recipient_id
INNER JOIN vehicles v ON v.id = c.vehicle_id
LEFT JOIN claxon_templates t ON t.id = c.template_id
"#;

impl Claxon {
    /// Inserts a claxon in the unread state.
    ///
    /// Runs on the create transaction's connection; all referential
    /// checks have already passed on the same transaction.
    pub async fn insert<'e, E>(
        executor: E,
        sender_id: &str,
        data: NewClaxon,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let claxon = sqlx::query_as::<_, Claxon>(
            r#"
            INSERT INTO claxons (sender_id, recipient_id, vehicle_id, template_id,
                                 claxon_type, custom_message, sender_language)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, sender_id, recipient_id, vehicle_id, template_id, claxon_type,
                      custom_message, sender_language, read, read_at, created_at, updated_at
            "#,
        )
        .bind(sender_id)
        .bind(data.recipient_id)
        .bind(data.vehicle_id)
        .bind(data.template_id)
        .bind(data.claxon_type)
        .bind(data.custom_message)
        .bind(data.sender_language)
        .fetch_one(executor)
        .await?;

        Ok(claxon)
    }

    /// Fetches the composite view of a claxon by id, with no access
    /// scoping. Used by the create flow to return what was just inserted.
    pub async fn find_view_by_id<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<ClaxonView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("{} WHERE c.id = $1", VIEW_SELECT);

        let row = sqlx::query_as::<_, ClaxonViewRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(row.map(ClaxonViewRow::into_view))
    }

    /// Fetches the composite view of a claxon the given user participates
    /// in, as sender or recipient. Returns None for anyone else.
    pub async fn find_view_for_participant(
        pool: &PgPool,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<ClaxonView>, sqlx::Error> {
        let query = format!(
            "{} WHERE c.id = $1 AND (c.sender_id = $2 OR c.recipient_id = $2)",
            VIEW_SELECT
        );

        let row = sqlx::query_as::<_, ClaxonViewRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(ClaxonViewRow::into_view))
    }

    /// Lists one side of a user's exchange with optional equality filters,
    /// newest first, paginated.
    pub async fn list(
        pool: &PgPool,
        side: ClaxonSide,
        user_id: &str,
        filters: &ClaxonFilters,
    ) -> Result<Vec<ClaxonView>, sqlx::Error> {
        let mut query = format!("{} WHERE c.{} = $1", VIEW_SELECT, side.column());
        let mut bind_count = 1;

        if filters.read.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND c.read = ${}", bind_count));
        }
        if filters.claxon_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND c.claxon_type = ${}", bind_count));
        }
        if filters.sender_language.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND c.sender_language = ${}", bind_count));
        }

        query.push_str(" ORDER BY c.created_at DESC");
        query.push_str(&format!(" LIMIT ${} OFFSET ${}", bind_count + 1, bind_count + 2));

        let mut q = sqlx::query_as::<_, ClaxonViewRow>(&query).bind(user_id);

        if let Some(read) = filters.read {
            q = q.bind(read);
        }
        if let Some(ref claxon_type) = filters.claxon_type {
            q = q.bind(claxon_type);
        }
        if let Some(ref sender_language) = filters.sender_language {
            q = q.bind(sender_language);
        }

        let rows = q
            .bind(filters.limit)
            .bind(filters.offset)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(ClaxonViewRow::into_view).collect())
    }

    /// Counts unread claxons addressed to a user
    pub async fn count_unread(pool: &PgPool, recipient_id: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM claxons WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Sets the read flag, recipient-only.
    ///
    /// `read_at` follows the flag: stamped when marking read, nulled
    /// otherwise. The recipient check lives in the WHERE clause so a
    /// non-recipient (including the sender) observes a plain miss.
    pub async fn set_read(
        pool: &PgPool,
        id: Uuid,
        recipient_id: &str,
        read: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let claxon = sqlx::query_as::<_, Claxon>(
            r#"
            UPDATE claxons
            SET read = $3,
                read_at = CASE WHEN $3 THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1 AND recipient_id = $2
            RETURNING id, sender_id, recipient_id, vehicle_id, template_id, claxon_type,
                      custom_message, sender_language, read, read_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(recipient_id)
        .bind(read)
        .fetch_optional(pool)
        .await?;

        Ok(claxon)
    }
}
