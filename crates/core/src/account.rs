//! Account and role-entity document models.
//!
//! These are the database-side halves of an identity: an `Account` mirrors an
//! identity-store principal (same id), and a `RoleEntity` extends a non-admin
//! account with role-specific state. Field names follow the stored document
//! shape (camelCase).

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::DomainError;
use crate::id::AccountId;
use crate::role::Role;

/// Account activity status, derived from the role entity's approval state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account can authenticate.
    #[default]
    Active,
    /// Account is locked out of login.
    Suspended,
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// Approval state of a role entity, mutated only by the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Suspended,
    Rejected,
}

impl ApprovalStatus {
    /// Account status implied by this approval state.
    pub fn implied_account_status(&self) -> AccountStatus {
        match self {
            ApprovalStatus::Suspended => AccountStatus::Suspended,
            _ => AccountStatus::Active,
        }
    }
}

impl core::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Suspended => "suspended",
            ApprovalStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

impl FromStr for ApprovalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "suspended" => Ok(ApprovalStatus::Suspended),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(DomainError::validation(format!("invalid status: {other}"))),
        }
    }
}

/// Database-side profile record mirroring an identity-store principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub password_hash: String,
    pub verified: bool,
    pub verification_code: Option<String>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Public projection, safe to return to callers.
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            verified: self.verified,
            status: self.status,
        }
    }
}

/// Role-specific extension record for non-admin accounts.
///
/// Shares its id with the owning account. `attributes` carries the
/// role-specific registration payload as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleEntity {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub attributes: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-facing account view (no credentials, no verification code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub verified: bool,
    pub status: AccountStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_approval_implies_suspended_account() {
        assert_eq!(
            ApprovalStatus::Suspended.implied_account_status(),
            AccountStatus::Suspended
        );
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            assert_eq!(status.implied_account_status(), AccountStatus::Active);
        }
    }

    #[test]
    fn approval_status_membership_check() {
        assert!("approved".parse::<ApprovalStatus>().is_ok());
        assert!("rejected".parse::<ApprovalStatus>().is_ok());
        assert!("banned".parse::<ApprovalStatus>().is_err());
    }

    #[test]
    fn account_document_uses_camel_case_fields() {
        let account = Account {
            id: AccountId::new(),
            email: "a@b.test".into(),
            display_name: "A".into(),
            role: Role::Student,
            password_hash: "hash".into(),
            verified: false,
            verification_code: Some("123456".into()),
            status: AccountStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let doc = serde_json::to_value(&account).unwrap();
        assert!(doc.get("displayName").is_some());
        assert!(doc.get("verificationCode").is_some());
        assert!(doc.get("passwordHash").is_some());
        assert!(doc.get("display_name").is_none());
    }

    #[test]
    fn profile_drops_credentials() {
        let account = Account {
            id: AccountId::new(),
            email: "a@b.test".into(),
            display_name: "A".into(),
            role: Role::Company,
            password_hash: "hash".into(),
            verified: true,
            verification_code: None,
            status: AccountStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let profile = serde_json::to_value(account.profile()).unwrap();
        assert!(profile.get("passwordHash").is_none());
        assert!(profile.get("verificationCode").is_none());
    }
}
