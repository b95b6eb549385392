//! Claxon exchange flows: creation, inbox/sent listings, unread count,
//! and the recipient-only read transition.

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::claxon::{Claxon, ClaxonFilters, ClaxonSide, ClaxonView, NewClaxon};
use crate::models::template::ClaxonTemplate;
use crate::models::user::User;
use crate::models::vehicle::Vehicle;

/// Typed, validated input for creating a claxon.
///
/// There is deliberately no sender field: the sender is always the
/// authenticated caller.
#[derive(Debug, Clone)]
pub struct CreateClaxonInput {
    pub recipient_id: String,
    pub vehicle_id: Uuid,
    pub template_id: Option<Uuid>,
    pub custom_message: Option<String>,
    /// Defaults from template presence when omitted
    pub claxon_type: Option<String>,
    /// Defaults from the sender's profile language when omitted
    pub sender_language: Option<String>,
}

/// Patch for the read status. The only mutable thing about a claxon.
#[derive(Debug, Clone, Default)]
pub struct UpdateClaxonInput {
    pub read: Option<bool>,
}

#[derive(Clone)]
pub struct ClaxonsService {
    pool: PgPool,
}

impl ClaxonsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a claxon from the authenticated sender.
    ///
    /// The whole sequence runs in one transaction so a referenced row
    /// cannot disappear between its check and the insert:
    ///
    /// 1. resolve the sender by external id,
    /// 2. resolve the recipient,
    /// 3. resolve the vehicle scoped to the recipient - claxoning a
    ///    vehicle the stated recipient doesn't own is a plain miss,
    /// 4. resolve the template when one is referenced,
    /// 5. insert with `sender_id` taken from the resolved sender,
    /// 6. read back the composite view before committing.
    ///
    /// Notifying the recipient is an external collaborator's job; the
    /// accepted claxon is only logged here.
    pub async fn create(
        &self,
        sender_external_id: &str,
        input: CreateClaxonInput,
    ) -> ServiceResult<ClaxonView> {
        let mut tx = self.pool.begin().await?;

        let sender = User::find_by_id(&mut *tx, sender_external_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Sender not found".to_string()))?;

        let recipient = User::find_by_id(&mut *tx, &input.recipient_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Recipient not found".to_string()))?;

        let vehicle = Vehicle::find_by_id_and_owner(&mut *tx, input.vehicle_id, &recipient.id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(
                    "Vehicle not found or does not belong to recipient".to_string(),
                )
            })?;

        if let Some(template_id) = input.template_id {
            ClaxonTemplate::find_by_id(&mut *tx, template_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Template not found".to_string()))?;
        }

        let claxon_type = input.claxon_type.unwrap_or_else(|| {
            if input.template_id.is_some() {
                "template".to_string()
            } else {
                "custom".to_string()
            }
        });
        let sender_language = input
            .sender_language
            .unwrap_or_else(|| sender.language.clone());

        let claxon = Claxon::insert(
            &mut *tx,
            &sender.id,
            NewClaxon {
                recipient_id: recipient.id.clone(),
                vehicle_id: vehicle.id,
                template_id: input.template_id,
                claxon_type,
                custom_message: input.custom_message,
                sender_language,
            },
        )
        .await?;

        let view = Claxon::find_view_by_id(&mut *tx, claxon.id)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal("Inserted claxon missing from view query".to_string())
            })?;

        tx.commit().await?;

        info!(
            claxon_id = %view.id,
            sender_id = %view.sender_id,
            recipient_id = %view.recipient_id,
            vehicle_id = %view.vehicle_id,
            "Claxon created; recipient notification delegated to the notification pipeline"
        );

        Ok(view)
    }

    /// Lists claxons addressed to the caller, newest first.
    pub async fn inbox(
        &self,
        external_id: &str,
        filters: &ClaxonFilters,
    ) -> ServiceResult<Vec<ClaxonView>> {
        self.list_side(ClaxonSide::Inbox, external_id, filters).await
    }

    /// Lists claxons the caller sent, newest first.
    pub async fn sent(
        &self,
        external_id: &str,
        filters: &ClaxonFilters,
    ) -> ServiceResult<Vec<ClaxonView>> {
        self.list_side(ClaxonSide::Sent, external_id, filters).await
    }

    async fn list_side(
        &self,
        side: ClaxonSide,
        external_id: &str,
        filters: &ClaxonFilters,
    ) -> ServiceResult<Vec<ClaxonView>> {
        let caller = User::find_by_id(&self.pool, external_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        debug!(user_id = %caller.id, ?side, ?filters, "Listing claxons");

        Ok(Claxon::list(&self.pool, side, &caller.id, filters).await?)
    }

    /// Fetches one claxon the caller participates in, as sender or
    /// recipient. Anyone else sees a plain miss.
    pub async fn find_one(&self, id: Uuid, external_id: &str) -> ServiceResult<ClaxonView> {
        Claxon::find_view_for_participant(&self.pool, id, external_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Claxon not found".to_string()))
    }

    /// Counts unread claxons addressed to the caller.
    pub async fn unread_count(&self, external_id: &str) -> ServiceResult<i64> {
        let caller = User::find_by_id(&self.pool, external_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        Ok(Claxon::count_unread(&self.pool, &caller.id).await?)
    }

    /// Applies a read-status patch, recipient-only.
    ///
    /// Marking read stamps `read_at`; any other patch nulls it. The
    /// sender attempting this observes `NotFound`, exactly like a
    /// stranger would.
    pub async fn update(
        &self,
        id: Uuid,
        external_id: &str,
        patch: UpdateClaxonInput,
    ) -> ServiceResult<Claxon> {
        let read = patch.read.unwrap_or(false);

        Claxon::set_read(&self.pool, id, external_id, read)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Claxon not found".to_string()))
    }
}
