//! End-to-end lifecycle scenarios across manager, approval workflow, and
//! cascade planner, running against the in-memory collaborators.

use std::sync::Arc;

use serde_json::json;

use talentbridge_core::{Collection, PlatformConfig, Role};
use talentbridge_stores::{InMemoryIdentityStore, InMemoryRecordStore, RecordStore, RecordingMailer};

use crate::approval::ApprovalWorkflow;
use crate::error::LifecycleError;
use crate::manager::{AccountLifecycleManager, NewRegistration};
use crate::response::ApiResponse;

struct Platform {
    identity: Arc<InMemoryIdentityStore>,
    records: Arc<InMemoryRecordStore>,
    mailer: Arc<RecordingMailer>,
    manager: AccountLifecycleManager,
    approval: ApprovalWorkflow,
}

fn platform() -> Platform {
    talentbridge_observability::init();
    let identity = InMemoryIdentityStore::arc();
    let records = InMemoryRecordStore::arc();
    let mailer = RecordingMailer::arc();
    let config = PlatformConfig::new("integration-secret", "noreply@test");
    Platform {
        manager: AccountLifecycleManager::new(
            &config,
            identity.clone(),
            records.clone(),
            mailer.clone(),
        ),
        approval: ApprovalWorkflow::new(records.clone()),
        identity,
        records,
        mailer,
    }
}

fn registration(email: &str, role: Role) -> NewRegistration {
    NewRegistration {
        email: email.to_string(),
        password: "integration-pw".to_string(),
        display_name: "Integration User".to_string(),
        role,
        attributes: json!({}),
    }
}

async fn register_and_verify(p: &Platform, email: &str, role: Role) -> talentbridge_core::AccountId {
    let profile = p.manager.register(registration(email, role)).await.unwrap();
    let code = p.mailer.last_code_for(email).unwrap();
    p.manager.verify_email(email, &code).await.unwrap();
    profile.id
}

#[tokio::test]
async fn register_verify_login_round_trip() {
    let p = platform();
    let id = register_and_verify(&p, "student@uni.test", Role::Student).await;

    let success = p
        .manager
        .login("student@uni.test", "integration-pw")
        .await
        .unwrap();
    assert_eq!(success.account.id, id);
    assert!(success.account.verified);
}

#[tokio::test]
async fn suspended_entity_locks_its_account_out_of_login() {
    let p = platform();
    let id = register_and_verify(&p, "inst@uni.test", Role::Institution).await;

    p.approval
        .update_status(Role::Institution, id, "suspended")
        .await
        .unwrap();

    let result = p.manager.login("inst@uni.test", "integration-pw").await;
    assert!(matches!(result, Err(LifecycleError::AccountInactive)));

    // Approval unlocks it again.
    p.approval
        .update_status(Role::Institution, id, "approved")
        .await
        .unwrap();
    p.manager
        .login("inst@uni.test", "integration-pw")
        .await
        .unwrap();
}

#[tokio::test]
async fn company_deletion_cascades_through_job_postings() {
    let p = platform();
    let id = register_and_verify(&p, "corp@co.test", Role::Company).await;

    for n in 0..4 {
        p.records
            .insert(
                Collection::Jobs,
                json!({"companyId": id.to_string(), "title": format!("opening {n}")}),
            )
            .await
            .unwrap();
    }

    let report = p.manager.delete_account(id).await.unwrap();
    assert_eq!(p.records.count(Collection::Jobs), 0);
    assert_eq!(p.records.count(Collection::Companies), 0);
    assert_eq!(p.records.count(Collection::Accounts), 0);
    assert!(report.warnings.is_empty());

    // Both stores emptied: the email is registrable again.
    p.manager
        .register(registration("corp@co.test", Role::Company))
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_then_delete_again_is_not_found() {
    let p = platform();
    let id = register_and_verify(&p, "corp@co.test", Role::Company).await;

    p.manager.delete_account(id).await.unwrap();
    let second = p.manager.delete_account(id).await;
    assert!(matches!(second, Err(LifecycleError::NotFound(_))));
    assert!(p.identity.is_empty());
}

#[tokio::test]
async fn partial_registration_failure_leaves_both_stores_clean() {
    let p = platform();
    p.records.fail_puts_to(Collection::Institutions);

    let result = p
        .manager
        .register(registration("inst@uni.test", Role::Institution))
        .await;
    assert!(result.is_err());

    // Invariant: account exists iff principal exists. Here, neither does.
    assert!(p.identity.is_empty());
    assert_eq!(p.records.count(Collection::Accounts), 0);
    assert_eq!(p.records.count(Collection::Institutions), 0);

    p.records.clear_faults();
    register_and_verify(&p, "inst@uni.test", Role::Institution).await;
}

#[tokio::test]
async fn every_outcome_fits_the_response_envelope() {
    let p = platform();
    let ok = p
        .manager
        .register(registration("env@x.test", Role::Student))
        .await;
    let envelope: ApiResponse<_> = ok.into();
    assert!(envelope.success);

    let err = p.manager.login("env@x.test", "integration-pw").await;
    let envelope: ApiResponse<_> = err.into();
    assert!(!envelope.success);
    assert_eq!(envelope.needs_verification, Some(true));
}
