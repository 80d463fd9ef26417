//! Cascade deletion planning and execution.
//!
//! Deleting an account (or a role entity directly) touches both stores plus
//! an open-ended set of dependent resources. The planner computes an explicit
//! [`DeletionPlan`] first, then executes it with a best-effort policy: the
//! principal and the primary record are authoritative, everything after them
//! is cleanup whose failures are collected as warnings rather than aborting
//! siblings.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use talentbridge_core::{Account, AccountId, Collection, Role};
use talentbridge_stores::{IdentityStore, IdentityStoreError, QueryOp, RecordStore};

use crate::error::{LifecycleError, LifecycleResult};
use crate::manager::decode;

/// A single document address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub collection: Collection,
    pub id: String,
}

impl core::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Dependent resources referencing an owner: everything in `collection`
/// whose `owner_field` equals the owner id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentQuery {
    pub collection: Collection,
    pub owner_field: &'static str,
    pub owner_id: String,
}

/// Ordered deletion work for one account or role entity.
#[derive(Debug, Clone)]
pub struct DeletionPlan {
    /// Identity principal to remove first. Not-found is tolerated here; any
    /// other identity failure aborts before the database is touched.
    pub principal_id: AccountId,
    /// The authoritative record; failure to delete it fails the operation.
    pub primary: DocumentRef,
    /// Best-effort single documents (the mirror half of the pair).
    pub cleanup: Vec<DocumentRef>,
    /// Dependent resources, deleted concurrently and independently.
    pub dependents: Vec<DependentQuery>,
}

/// One failed best-effort step.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeWarning {
    pub target: String,
    pub cause: String,
}

/// Outcome of a completed cascade. `deleted` lists everything removed;
/// `warnings` lists cleanup steps that failed and may need manual follow-up.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CascadeReport {
    pub deleted: Vec<String>,
    pub warnings: Vec<CascadeWarning>,
}

impl CascadeReport {
    fn deleted(&mut self, target: impl Into<String>) {
        self.deleted.push(target.into());
    }

    fn warn(&mut self, target: impl Into<String>, cause: impl ToString) {
        let target = target.into();
        let cause = cause.to_string();
        tracing::warn!(%target, %cause, "cascade cleanup step failed");
        self.warnings.push(CascadeWarning { target, cause });
    }
}

/// Computes and executes multi-store deletion plans.
pub struct CascadeDeletionPlanner {
    identity: Arc<dyn IdentityStore>,
    records: Arc<dyn RecordStore>,
}

impl CascadeDeletionPlanner {
    pub fn new(identity: Arc<dyn IdentityStore>, records: Arc<dyn RecordStore>) -> Self {
        Self { identity, records }
    }

    /// Delete an account, its role entity, and its dependent resources.
    pub async fn delete_account(&self, id: AccountId) -> LifecycleResult<CascadeReport> {
        let doc = self
            .records
            .get(Collection::Accounts, &id.to_string())
            .await?
            .ok_or(LifecycleError::NotFound("account"))?;
        let account: Account = decode(&doc)?;

        self.execute(plan_for_account(&account)).await
    }

    /// Delete a role entity directly (admin removes an institution or
    /// company). Same shape as an account deletion, oriented at the entity:
    /// its owning account shares the id and goes with it.
    pub async fn delete_role_entity(
        &self,
        role: Role,
        id: AccountId,
    ) -> LifecycleResult<CascadeReport> {
        let collection = role
            .entity_collection()
            .ok_or_else(|| LifecycleError::Validation("admin accounts have no entity".into()))?;
        if self
            .records
            .get(collection, &id.to_string())
            .await?
            .is_none()
        {
            return Err(LifecycleError::NotFound("entity"));
        }

        self.execute(plan_for_entity(role, collection, id)).await
    }

    async fn execute(&self, plan: DeletionPlan) -> LifecycleResult<CascadeReport> {
        let mut report = CascadeReport::default();

        // 1. Identity principal. A missing principal means the database
        // record outlived it after an earlier partial failure; continue.
        // Anything else aborts before mutating the database.
        match self.identity.delete_principal(plan.principal_id).await {
            Ok(()) => report.deleted(format!("principal/{}", plan.principal_id)),
            Err(IdentityStoreError::NotFound) => {
                report.warn(
                    format!("principal/{}", plan.principal_id),
                    "not present in identity store",
                );
            }
            Err(e) => return Err(LifecycleError::Identity(e)),
        }

        // 2. Primary record: authoritative.
        self.records
            .delete(plan.primary.collection, &plan.primary.id)
            .await?;
        report.deleted(plan.primary.to_string());

        // 3. Mirror-half cleanup, best-effort.
        for target in &plan.cleanup {
            match self.records.delete(target.collection, &target.id).await {
                Ok(()) => report.deleted(target.to_string()),
                Err(e) => report.warn(target.to_string(), e),
            }
        }

        // 4. Dependent resources: enumerate, then delete concurrently so one
        // stuck or failing deletion cannot block its siblings.
        for dep in &plan.dependents {
            let hits = match self
                .records
                .query(
                    dep.collection,
                    dep.owner_field,
                    QueryOp::Eq,
                    &serde_json::json!(dep.owner_id),
                )
                .await
            {
                Ok(hits) => hits,
                Err(e) => {
                    report.warn(format!("{}?{}", dep.collection, dep.owner_field), e);
                    continue;
                }
            };

            let deletions = hits.into_iter().map(|doc| {
                let records = self.records.clone();
                let collection = dep.collection;
                async move {
                    let target = format!("{collection}/{}", doc.id);
                    (target, records.delete(collection, &doc.id).await)
                }
            });
            for (target, result) in join_all(deletions).await {
                match result {
                    Ok(()) => report.deleted(target),
                    Err(e) => report.warn(target, e),
                }
            }
        }

        tracing::info!(
            primary = %plan.primary,
            deleted = report.deleted.len(),
            warnings = report.warnings.len(),
            "cascade deletion completed"
        );
        Ok(report)
    }
}

fn plan_for_account(account: &Account) -> DeletionPlan {
    let id = account.id.to_string();
    DeletionPlan {
        principal_id: account.id,
        primary: DocumentRef {
            collection: Collection::Accounts,
            id: id.clone(),
        },
        cleanup: account
            .role
            .entity_collection()
            .map(|collection| DocumentRef {
                collection,
                id: id.clone(),
            })
            .into_iter()
            .collect(),
        dependents: dependents_of(account.role, &id),
    }
}

fn plan_for_entity(role: Role, collection: Collection, id: AccountId) -> DeletionPlan {
    let id_str = id.to_string();
    DeletionPlan {
        principal_id: id,
        primary: DocumentRef {
            collection,
            id: id_str.clone(),
        },
        cleanup: vec![DocumentRef {
            collection: Collection::Accounts,
            id: id_str.clone(),
        }],
        dependents: dependents_of(role, &id_str),
    }
}

fn dependents_of(role: Role, owner_id: &str) -> Vec<DependentQuery> {
    role.dependents()
        .iter()
        .map(|(collection, owner_field)| DependentQuery {
            collection: *collection,
            owner_field,
            owner_id: owner_id.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use talentbridge_core::{AccountStatus, ApprovalStatus, RoleEntity};
    use talentbridge_stores::{InMemoryIdentityStore, InMemoryRecordStore};

    struct Fixture {
        identity: Arc<InMemoryIdentityStore>,
        records: Arc<InMemoryRecordStore>,
        planner: CascadeDeletionPlanner,
    }

    fn fixture() -> Fixture {
        let identity = InMemoryIdentityStore::arc();
        let records = InMemoryRecordStore::arc();
        let planner = CascadeDeletionPlanner::new(identity.clone(), records.clone());
        Fixture {
            identity,
            records,
            planner,
        }
    }

    /// Seed a company with an identity principal, account + entity records,
    /// and `jobs` dependent job postings. Returns the account id.
    async fn seed_company(fx: &Fixture, email: &str, jobs: usize) -> AccountId {
        let principal = fx
            .identity
            .create_principal(email, "pw", "Corp")
            .await
            .unwrap();
        let id = principal.id;
        let now = Utc::now();

        let account = Account {
            id,
            email: email.to_string(),
            display_name: "Corp".into(),
            role: Role::Company,
            password_hash: "hash".into(),
            verified: true,
            verification_code: None,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };
        fx.records
            .put(
                Collection::Accounts,
                &id.to_string(),
                serde_json::to_value(&account).unwrap(),
            )
            .await
            .unwrap();

        let entity = RoleEntity {
            id,
            email: email.to_string(),
            display_name: "Corp".into(),
            approval_status: ApprovalStatus::Approved,
            attributes: json!({}),
            created_at: now,
            updated_at: now,
        };
        fx.records
            .put(
                Collection::Companies,
                &id.to_string(),
                serde_json::to_value(&entity).unwrap(),
            )
            .await
            .unwrap();

        for n in 0..jobs {
            fx.records
                .insert(
                    Collection::Jobs,
                    json!({"companyId": id.to_string(), "title": format!("role {n}")}),
                )
                .await
                .unwrap();
        }
        id
    }

    #[tokio::test]
    async fn company_deletion_removes_account_entity_and_jobs() {
        let fx = fixture();
        let id = seed_company(&fx, "c@corp.test", 3).await;

        let report = fx.planner.delete_account(id).await.unwrap();

        assert!(!fx.identity.contains(id));
        assert_eq!(fx.records.count(Collection::Accounts), 0);
        assert_eq!(fx.records.count(Collection::Companies), 0);
        assert_eq!(fx.records.count(Collection::Jobs), 0);
        // principal + account + entity + 3 jobs
        assert_eq!(report.deleted.len(), 6);
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn one_failing_job_does_not_block_its_siblings() {
        let fx = fixture();
        let id = seed_company(&fx, "c@corp.test", 3).await;

        let stuck = fx
            .records
            .query(
                Collection::Jobs,
                "companyId",
                QueryOp::Eq,
                &json!(id.to_string()),
            )
            .await
            .unwrap()[0]
            .id
            .clone();
        fx.records.fail_delete_of(Collection::Jobs, stuck.clone());

        let report = fx.planner.delete_account(id).await.unwrap();

        // Overall success: account and entity are gone, the two healthy jobs
        // are gone, and the stuck one is reported as a warning.
        assert_eq!(fx.records.count(Collection::Accounts), 0);
        assert_eq!(fx.records.count(Collection::Companies), 0);
        assert_eq!(fx.records.count(Collection::Jobs), 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].target, format!("jobs/{stuck}"));
    }

    #[tokio::test]
    async fn second_deletion_is_not_found_with_no_side_effects() {
        let fx = fixture();
        let id = seed_company(&fx, "c@corp.test", 1).await;

        fx.planner.delete_account(id).await.unwrap();
        let second = fx.planner.delete_account(id).await;
        assert!(matches!(second, Err(LifecycleError::NotFound(_))));
    }

    #[tokio::test]
    async fn missing_principal_is_tolerated() {
        let fx = fixture();
        let id = seed_company(&fx, "c@corp.test", 0).await;

        // Simulate an earlier partial failure: principal already gone.
        fx.identity.delete_principal(id).await.unwrap();

        let report = fx.planner.delete_account(id).await.unwrap();
        assert_eq!(fx.records.count(Collection::Accounts), 0);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].target.starts_with("principal/"));
    }

    #[tokio::test]
    async fn identity_permission_failure_aborts_before_database_mutation() {
        let fx = fixture();
        let id = seed_company(&fx, "c@corp.test", 2).await;

        fx.identity.deny_deletes(true);
        let result = fx.planner.delete_account(id).await;

        assert!(matches!(
            result,
            Err(LifecycleError::Identity(
                IdentityStoreError::PermissionDenied(_)
            ))
        ));
        assert_eq!(fx.records.count(Collection::Accounts), 1);
        assert_eq!(fx.records.count(Collection::Companies), 1);
        assert_eq!(fx.records.count(Collection::Jobs), 2);
    }

    #[tokio::test]
    async fn entity_record_failure_is_a_warning_not_a_failure() {
        let fx = fixture();
        let id = seed_company(&fx, "c@corp.test", 0).await;

        fx.records
            .fail_delete_of(Collection::Companies, id.to_string());
        let report = fx.planner.delete_account(id).await.unwrap();

        assert_eq!(fx.records.count(Collection::Accounts), 0);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].target.starts_with("companies/"));
    }

    #[tokio::test]
    async fn deleting_entity_directly_takes_the_account_with_it() {
        let fx = fixture();
        let id = seed_company(&fx, "c@corp.test", 2).await;

        let report = fx
            .planner
            .delete_role_entity(Role::Company, id)
            .await
            .unwrap();

        assert!(!fx.identity.contains(id));
        assert_eq!(fx.records.count(Collection::Companies), 0);
        assert_eq!(fx.records.count(Collection::Accounts), 0);
        assert_eq!(fx.records.count(Collection::Jobs), 0);
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn deleting_missing_entity_is_not_found() {
        let fx = fixture();
        let result = fx
            .planner
            .delete_role_entity(Role::Institution, AccountId::new())
            .await;
        assert!(matches!(result, Err(LifecycleError::NotFound(_))));
    }

    #[tokio::test]
    async fn plans_scope_dependents_by_role() {
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            email: "i@uni.test".into(),
            display_name: "Uni".into(),
            role: Role::Institution,
            password_hash: "hash".into(),
            verified: true,
            verification_code: None,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let plan = plan_for_account(&account);
        assert_eq!(plan.primary.collection, Collection::Accounts);
        assert_eq!(plan.cleanup[0].collection, Collection::Institutions);
        assert_eq!(plan.dependents.len(), 1);
        assert_eq!(plan.dependents[0].collection, Collection::Courses);
        assert_eq!(plan.dependents[0].owner_field, "institutionId");
    }
}
