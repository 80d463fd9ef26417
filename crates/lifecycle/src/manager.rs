//! Account lifecycle orchestration.
//!
//! Registration, email verification, login, and account deletion across the
//! identity provider and the document database. Registration is the one
//! operation that writes to both stores and therefore runs under the saga
//! compensation ledger; verification deliberately treats the database as
//! authoritative and the identity store as best-effort (see `verify_email`).

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use talentbridge_auth::{generate_verification_code, hash_password, verify_password, TokenIssuer};
use talentbridge_core::{
    Account, AccountId, AccountProfile, AccountStatus, ApprovalStatus, Collection, PlatformConfig,
    Role, RoleEntity,
};
use talentbridge_stores::{
    Document, IdentityStore, IdentityStoreError, NotificationGateway, QueryOp, RecordStore,
};

use crate::cascade::{CascadeDeletionPlanner, CascadeReport};
use crate::error::{LifecycleError, LifecycleResult};
use crate::saga::Saga;

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
    /// Role-specific attributes, stored on the role entity as-is.
    #[serde(default)]
    pub attributes: JsonValue,
}

/// Successful authentication: a session token plus the account view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSuccess {
    pub token: String,
    pub account: AccountProfile,
}

/// Orchestrates account lifecycle operations across both stores.
pub struct AccountLifecycleManager {
    identity: Arc<dyn IdentityStore>,
    records: Arc<dyn RecordStore>,
    notifier: Arc<dyn NotificationGateway>,
    tokens: TokenIssuer,
    planner: CascadeDeletionPlanner,
}

impl AccountLifecycleManager {
    pub fn new(
        config: &PlatformConfig,
        identity: Arc<dyn IdentityStore>,
        records: Arc<dyn RecordStore>,
        notifier: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            tokens: TokenIssuer::new(config),
            planner: CascadeDeletionPlanner::new(identity.clone(), records.clone()),
            identity,
            records,
            notifier,
        }
    }

    /// Register a new account.
    ///
    /// Ordered steps: principal in the identity store, account document,
    /// role-entity document (non-admin), verification mail. Every completed
    /// write registers a compensation; any failure after the principal exists
    /// aborts the ledger and surfaces the original error. Mail delivery
    /// failure is non-fatal; the account stays unverified and the code can
    /// be resent.
    pub async fn register(&self, req: NewRegistration) -> LifecycleResult<AccountProfile> {
        let email = normalize_email(&req.email);
        validate_registration(&email, &req.password, &req.display_name)?;

        // Point-in-time duplicate check; the identity store repeats it
        // authoritatively on create.
        if self.find_account_by_email(&email).await?.is_some() {
            return Err(LifecycleError::AlreadyExists);
        }

        let principal = self
            .identity
            .create_principal(&email, &req.password, &req.display_name)
            .await
            .map_err(|e| match e {
                IdentityStoreError::DuplicateIdentity => LifecycleError::AlreadyExists,
                other => LifecycleError::Identity(other),
            })?;
        let account_id = principal.id;

        let mut saga = Saga::new("register");
        {
            let identity = self.identity.clone();
            saga.on_abort("identity principal", async move {
                identity
                    .delete_principal(account_id)
                    .await
                    .map_err(|e| e.to_string())
            });
        }

        match self
            .write_registration_records(&mut saga, account_id, &email, &req)
            .await
        {
            Ok(account) => {
                saga.commit();

                // Step 5 is outside the ledger: a failed dispatch leaves a
                // valid unverified account behind.
                let code = account.verification_code.as_deref().unwrap_or_default();
                if let Err(e) = self.notifier.send_code(&email, code).await {
                    tracing::warn!(
                        account_id = %account_id,
                        error = %e,
                        "verification mail failed; account created unverified"
                    );
                }

                tracing::info!(account_id = %account_id, role = %account.role, "account registered");
                Ok(account.profile())
            }
            Err(e) => {
                tracing::warn!(account_id = %account_id, error = %e, "registration failed; compensating");
                saga.abort().await;
                Err(e)
            }
        }
    }

    /// Database writes of registration (steps 2–4), pushing a compensation
    /// per completed write.
    async fn write_registration_records(
        &self,
        saga: &mut Saga,
        account_id: AccountId,
        email: &str,
        req: &NewRegistration,
    ) -> LifecycleResult<Account> {
        let now = Utc::now();
        let account = Account {
            id: account_id,
            email: email.to_string(),
            display_name: req.display_name.trim().to_string(),
            role: req.role,
            password_hash: hash_password(&req.password)?,
            verified: false,
            verification_code: Some(generate_verification_code()),
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let id = account_id.to_string();
        self.records
            .put(Collection::Accounts, &id, encode(&account)?)
            .await?;
        {
            let records = self.records.clone();
            let id = id.clone();
            saga.on_abort("account record", async move {
                records
                    .delete(Collection::Accounts, &id)
                    .await
                    .map_err(|e| e.to_string())
            });
        }

        if let Some(collection) = req.role.entity_collection() {
            let entity = RoleEntity {
                id: account_id,
                email: email.to_string(),
                display_name: account.display_name.clone(),
                approval_status: ApprovalStatus::Pending,
                attributes: req.attributes.clone(),
                created_at: now,
                updated_at: now,
            };
            self.records.put(collection, &id, encode(&entity)?).await?;
            let records = self.records.clone();
            let id = id.clone();
            saga.on_abort("role entity record", async move {
                records
                    .delete(collection, &id)
                    .await
                    .map_err(|e| e.to_string())
            });
        }

        Ok(account)
    }

    /// Verify an email address with the code sent at registration.
    ///
    /// The database write is authoritative: once `verified` is set and the
    /// code cleared, the operation succeeds even if propagating the flag to
    /// the identity store fails (logged for reconciliation).
    pub async fn verify_email(&self, email: &str, code: &str) -> LifecycleResult<AuthSuccess> {
        let email = normalize_email(email);
        let mut account = self
            .find_account_by_email(&email)
            .await?
            .ok_or(LifecycleError::NotFound("account"))?;

        if account.verification_code.as_deref() != Some(code) {
            return Err(LifecycleError::InvalidCode);
        }

        self.records
            .update(
                Collection::Accounts,
                &account.id.to_string(),
                json!({
                    "verified": true,
                    "verificationCode": null,
                    "updatedAt": Utc::now(),
                }),
            )
            .await?;
        account.verified = true;
        account.verification_code = None;

        if let Err(e) = self.identity.update_verified(account.id, true).await {
            tracing::warn!(
                account_id = %account.id,
                error = %e,
                "verified flag not propagated to identity store"
            );
        }

        let token = self.tokens.issue(account.id, account.role, &account.email)?;
        tracing::info!(account_id = %account.id, "email verified");
        Ok(AuthSuccess {
            token,
            account: account.profile(),
        })
    }

    /// Re-send the stored verification code. No regeneration.
    pub async fn resend_verification(&self, email: &str) -> LifecycleResult<()> {
        let email = normalize_email(email);
        let account = self
            .find_account_by_email(&email)
            .await?
            .ok_or(LifecycleError::NotFound("account"))?;

        if account.verified {
            return Err(LifecycleError::AlreadyVerified);
        }
        let code = account
            .verification_code
            .as_deref()
            .ok_or_else(|| LifecycleError::Validation("no verification code on file".into()))?;

        self.notifier.send_code(&email, code).await?;
        Ok(())
    }

    /// Authenticate with email and password, issuing a session token.
    pub async fn login(&self, email: &str, password: &str) -> LifecycleResult<AuthSuccess> {
        let email = normalize_email(email);
        // Missing account and wrong password collapse into one error.
        let account = self
            .find_account_by_email(&email)
            .await?
            .ok_or(LifecycleError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash)? {
            return Err(LifecycleError::InvalidCredentials);
        }
        if !account.verified {
            return Err(LifecycleError::EmailNotVerified);
        }
        if account.status != AccountStatus::Active {
            return Err(LifecycleError::AccountInactive);
        }

        let token = self.tokens.issue(account.id, account.role, &account.email)?;
        tracing::info!(account_id = %account.id, "login");
        Ok(AuthSuccess {
            token,
            account: account.profile(),
        })
    }

    /// Delete an account and everything keyed off it (admin operation).
    pub async fn delete_account(&self, id: AccountId) -> LifecycleResult<CascadeReport> {
        self.planner.delete_account(id).await
    }

    /// All account profiles (admin listing).
    pub async fn list_accounts(&self) -> LifecycleResult<Vec<AccountProfile>> {
        let docs = self.records.list(Collection::Accounts).await?;
        docs.iter()
            .map(|doc| decode::<Account>(doc).map(|a| a.profile()))
            .collect()
    }

    async fn find_account_by_email(&self, email: &str) -> LifecycleResult<Option<Account>> {
        let hits = self
            .records
            .query(Collection::Accounts, "email", QueryOp::Eq, &json!(email))
            .await?;
        hits.first().map(decode).transpose()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(email: &str, password: &str, display_name: &str) -> LifecycleResult<()> {
    if email.is_empty() || !email.contains('@') {
        return Err(LifecycleError::Validation("invalid email format".into()));
    }
    if password.len() < 6 {
        return Err(LifecycleError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }
    if display_name.trim().is_empty() {
        return Err(LifecycleError::Validation(
            "display name cannot be empty".into(),
        ));
    }
    Ok(())
}

fn encode<T: Serialize>(value: &T) -> LifecycleResult<JsonValue> {
    serde_json::to_value(value).map_err(|e| {
        LifecycleError::Records(talentbridge_stores::RecordStoreError::Serialization(
            e.to_string(),
        ))
    })
}

pub(crate) fn decode<T: DeserializeOwned>(doc: &Document) -> LifecycleResult<T> {
    serde_json::from_value(doc.body.clone()).map_err(|e| {
        LifecycleError::Records(talentbridge_stores::RecordStoreError::Serialization(
            e.to_string(),
        ))
    })
}
