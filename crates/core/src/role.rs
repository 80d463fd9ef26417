//! Account roles and the collections they map to.
//!
//! The role→collection mapping is an explicit enumeration rather than string
//! concatenation, so an unknown role cannot reach the database layer.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Role attached to an account at registration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Institution,
    Company,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Institution => "institution",
            Role::Company => "company",
            Role::Admin => "admin",
        }
    }

    /// Collection holding this role's `RoleEntity` documents.
    ///
    /// Admins have no role entity.
    pub fn entity_collection(&self) -> Option<Collection> {
        match self {
            Role::Student => Some(Collection::Students),
            Role::Institution => Some(Collection::Institutions),
            Role::Company => Some(Collection::Companies),
            Role::Admin => None,
        }
    }

    /// Dependent-resource collections owned by this role, with the document
    /// field that references the owner.
    pub fn dependents(&self) -> &'static [(Collection, &'static str)] {
        match self {
            Role::Company => &[(Collection::Jobs, "companyId")],
            Role::Institution => &[(Collection::Courses, "institutionId")],
            Role::Student | Role::Admin => &[],
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "institution" => Ok(Role::Institution),
            "company" => Ok(Role::Company),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

/// Document collections in the record store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Accounts,
    Students,
    Institutions,
    Companies,
    Jobs,
    Courses,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Accounts => "accounts",
            Collection::Students => "students",
            Collection::Institutions => "institutions",
            Collection::Companies => "companies",
            Collection::Jobs => "jobs",
            Collection::Courses => "courses",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
