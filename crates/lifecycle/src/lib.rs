//! `talentbridge-lifecycle`: the account lifecycle core.
//!
//! Orchestrates registration, email verification, login, approval-state
//! transitions, and cascade deletion across the identity provider and the
//! document database. The two stores share no transaction boundary, so every
//! multi-store operation here is a finite ordered sequence of steps with
//! explicit compensation (registration) or best-effort continuation
//! (deletion).

pub mod approval;
pub mod cascade;
pub mod error;
pub mod manager;
pub mod response;
pub mod saga;

pub use approval::ApprovalWorkflow;
pub use cascade::{
    CascadeDeletionPlanner, CascadeReport, CascadeWarning, DeletionPlan, DependentQuery,
    DocumentRef,
};
pub use error::{LifecycleError, LifecycleResult};
pub use manager::{AccountLifecycleManager, AuthSuccess, NewRegistration};
pub use response::ApiResponse;

#[cfg(test)]
mod integration_tests;
