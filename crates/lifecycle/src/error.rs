//! Lifecycle error taxonomy.
//!
//! Validation and not-found errors are reported before any side effect;
//! conflicts before any write; auth failures carry a discriminating flag only
//! where it cannot leak account existence; dependency errors are the fatal
//! class that aborts the current step.

use thiserror::Error;

use talentbridge_auth::{PasswordError, TokenError};
use talentbridge_core::DomainError;
use talentbridge_stores::{DeliveryError, IdentityStoreError, RecordStoreError};

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Error surface of every lifecycle operation.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Malformed or missing input; nothing was attempted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced account/entity does not exist; no side effects.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate email/identity, reported before any write.
    #[error("an account with this email already exists")]
    AlreadyExists,

    /// Bad credentials. Identical for "no such account" and "wrong password";
    /// never reveals which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Login gate: the account exists but its email is unverified. Carries a
    /// machine-readable flag in the response envelope.
    #[error("email not verified")]
    EmailNotVerified,

    /// Login gate: the account is suspended.
    #[error("account is not active")]
    AccountInactive,

    /// Resend requested for an already verified account.
    #[error("email is already verified")]
    AlreadyVerified,

    /// Supplied verification code does not match the stored one.
    #[error("invalid verification code")]
    InvalidCode,

    /// Status value outside {pending, approved, suspended, rejected}.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// The role-entity status write succeeded but the derived account-status
    /// write failed; operators should retry just the account half.
    #[error("entity status updated, but account status update failed: {0}")]
    PartialStatusUpdate(String),

    /// Identity provider failure (the fatal dependency class).
    #[error("identity provider error: {0}")]
    Identity(#[from] IdentityStoreError),

    /// Document database failure (the fatal dependency class).
    #[error("record store error: {0}")]
    Records(#[from] RecordStoreError),

    /// Mail delivery failure. Fatal for a pure resend, non-fatal inside
    /// registration (handled at the call site).
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("password hashing error: {0}")]
    Password(#[from] PasswordError),

    #[error("session token error: {0}")]
    Token(#[from] TokenError),
}

impl From<DomainError> for LifecycleError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => LifecycleError::NotFound("resource"),
            DomainError::Conflict(msg) => LifecycleError::Validation(msg),
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                LifecycleError::Validation(msg)
            }
        }
    }
}

impl LifecycleError {
    /// True for the auth-failure class surfaced to users at login/verify.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            LifecycleError::InvalidCredentials
                | LifecycleError::EmailNotVerified
                | LifecycleError::AccountInactive
        )
    }

    /// Whether the caller should be told to verify their email first.
    pub fn needs_verification(&self) -> bool {
        matches!(self, LifecycleError::EmailNotVerified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_one_message() {
        // Both lookup failure and hash mismatch must surface this exact text.
        assert_eq!(
            LifecycleError::InvalidCredentials.to_string(),
            "invalid credentials"
        );
    }

    #[test]
    fn unverified_login_is_flagged() {
        assert!(LifecycleError::EmailNotVerified.needs_verification());
        assert!(!LifecycleError::InvalidCredentials.needs_verification());
    }

    #[test]
    fn dependency_errors_convert() {
        let err: LifecycleError = IdentityStoreError::Transport("boom".into()).into();
        assert!(matches!(err, LifecycleError::Identity(_)));
    }
}
