//! Identity provider surface.
//!
//! One principal per authenticatable credential set, keyed by the same id as
//! the database-side account record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use talentbridge_core::AccountId;

/// An identity-store record representing one credential set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub verified: bool,
}

/// Identity provider error surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityStoreError {
    #[error("a principal already exists for this email")]
    DuplicateIdentity,
    #[error("principal not found")]
    NotFound,
    #[error("identity provider rejected credentials: {0}")]
    PermissionDenied(String),
    #[error("identity provider transport failure: {0}")]
    Transport(String),
}

/// Authentication identity provider.
///
/// Every call is a network round-trip to an external service; callers own
/// sequencing and compensation.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create a principal. The password reaches the provider as supplied;
    /// hashing for the database half is the caller's concern.
    async fn create_principal(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Principal, IdentityStoreError>;

    /// Delete a principal by id.
    async fn delete_principal(&self, id: AccountId) -> Result<(), IdentityStoreError>;

    /// Update the verified flag on a principal.
    async fn update_verified(&self, id: AccountId, verified: bool)
        -> Result<(), IdentityStoreError>;

    /// Look up a principal by email.
    async fn lookup_principal_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Principal>, IdentityStoreError>;
}

/// In-memory identity provider for dev/tests.
///
/// Fault knobs plant failures for compensation and cascade tests:
/// `fail_creates` makes `create_principal` fail with a transport error,
/// `deny_deletes` makes `delete_principal` fail with a permission error, and
/// `fail_updates` makes `update_verified` fail with a transport error.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    principals: RwLock<HashMap<AccountId, Principal>>,
    fail_creates: AtomicBool,
    deny_deletes: AtomicBool,
    fail_updates: AtomicBool,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn deny_deletes(&self, deny: bool) {
        self.deny_deletes.store(deny, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of stored principals.
    pub fn len(&self) -> usize {
        self.principals.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a principal with this id exists.
    pub fn contains(&self, id: AccountId) -> bool {
        self.principals.read().unwrap().contains_key(&id)
    }
}

#[async_trait::async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn create_principal(
        &self,
        email: &str,
        _password: &str,
        display_name: &str,
    ) -> Result<Principal, IdentityStoreError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(IdentityStoreError::Transport(
                "injected create failure".to_string(),
            ));
        }

        let mut principals = self.principals.write().unwrap();
        if principals.values().any(|p| p.email == email) {
            return Err(IdentityStoreError::DuplicateIdentity);
        }

        let principal = Principal {
            id: AccountId::new(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            verified: false,
        };
        principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn delete_principal(&self, id: AccountId) -> Result<(), IdentityStoreError> {
        if self.deny_deletes.load(Ordering::SeqCst) {
            return Err(IdentityStoreError::PermissionDenied(
                "injected permission failure".to_string(),
            ));
        }

        let mut principals = self.principals.write().unwrap();
        principals
            .remove(&id)
            .map(|_| ())
            .ok_or(IdentityStoreError::NotFound)
    }

    async fn update_verified(
        &self,
        id: AccountId,
        verified: bool,
    ) -> Result<(), IdentityStoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(IdentityStoreError::Transport(
                "injected update failure".to_string(),
            ));
        }

        let mut principals = self.principals.write().unwrap();
        match principals.get_mut(&id) {
            Some(p) => {
                p.verified = verified;
                Ok(())
            }
            None => Err(IdentityStoreError::NotFound),
        }
    }

    async fn lookup_principal_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Principal>, IdentityStoreError> {
        let principals = self.principals.read().unwrap();
        Ok(principals.values().find(|p| p.email == email).cloned())
    }
}
