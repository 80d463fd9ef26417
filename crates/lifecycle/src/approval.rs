//! Approval workflow for role entities.
//!
//! Institutions and companies carry an approval status independent of their
//! owning account's identity. Any of the four states may transition to any
//! other; the owning account's status is derived from the result (suspended
//! entity locks the account, everything else unlocks it).

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use talentbridge_core::{AccountId, ApprovalStatus, Collection, Role, RoleEntity};
use talentbridge_stores::{QueryOp, RecordStore};

use crate::error::{LifecycleError, LifecycleResult};
use crate::manager::decode;

/// Admin-driven status transitions on role entities.
pub struct ApprovalWorkflow {
    records: Arc<dyn RecordStore>,
}

impl ApprovalWorkflow {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Move a role entity to a new approval status and derive the owning
    /// account's status from it.
    ///
    /// The two writes are sequential; if the account half fails after the
    /// entity half succeeded, the distinct [`LifecycleError::PartialStatusUpdate`]
    /// tells operators to retry just the account write.
    pub async fn update_status(
        &self,
        role: Role,
        entity_id: AccountId,
        new_status: &str,
    ) -> LifecycleResult<ApprovalStatus> {
        let status: ApprovalStatus = new_status
            .parse()
            .map_err(|_| LifecycleError::InvalidStatus(new_status.to_string()))?;
        let collection = role.entity_collection().ok_or_else(|| {
            LifecycleError::Validation("admin accounts have no approval status".into())
        })?;

        let id = entity_id.to_string();
        if self.records.get(collection, &id).await?.is_none() {
            return Err(LifecycleError::NotFound("entity"));
        }

        let now = Utc::now();
        self.records
            .update(
                collection,
                &id,
                json!({"approvalStatus": status, "updatedAt": now}),
            )
            .await?;

        let account_status = status.implied_account_status();
        if let Err(e) = self
            .records
            .update(
                Collection::Accounts,
                &id,
                json!({"status": account_status, "updatedAt": now}),
            )
            .await
        {
            tracing::warn!(
                entity_id = %entity_id,
                status = %status,
                error = %e,
                "entity status applied but account status write failed"
            );
            return Err(LifecycleError::PartialStatusUpdate(e.to_string()));
        }

        tracing::info!(entity_id = %entity_id, status = %status, "approval status updated");
        Ok(status)
    }

    /// List role entities, optionally filtered by approval status.
    pub async fn list_entities(
        &self,
        role: Role,
        status: Option<ApprovalStatus>,
    ) -> LifecycleResult<Vec<RoleEntity>> {
        let collection = role
            .entity_collection()
            .ok_or_else(|| LifecycleError::Validation("admin accounts have no entities".into()))?;

        let docs = match status {
            Some(status) => {
                self.records
                    .query(collection, "approvalStatus", QueryOp::Eq, &json!(status))
                    .await?
            }
            None => self.records.list(collection).await?,
        };
        docs.iter().map(decode).collect()
    }
}
