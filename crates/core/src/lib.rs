//! `talentbridge-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, role/collection mappings, account document models, the domain
//! error type, and the process configuration struct.

pub mod account;
pub mod config;
pub mod error;
pub mod id;
pub mod role;

pub use account::{Account, AccountProfile, AccountStatus, ApprovalStatus, RoleEntity};
pub use config::PlatformConfig;
pub use error::{DomainError, DomainResult};
pub use id::AccountId;
pub use role::{Collection, Role};
