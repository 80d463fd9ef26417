//! `talentbridge-stores`: external collaborator surfaces.
//!
//! The identity provider, the document database, and the notification
//! gateway are independent network services with no shared transaction
//! boundary. This crate defines their capability traits and provides
//! in-memory implementations for dev/tests, with targeted fault-injection
//! knobs so failures can be planted at any step of an operation.

pub mod identity;
pub mod notify;
pub mod records;

pub use identity::{IdentityStore, IdentityStoreError, InMemoryIdentityStore, Principal};
pub use notify::{DeliveryError, LogMailer, NotificationGateway, RecordingMailer};
pub use records::{Document, InMemoryRecordStore, QueryOp, RecordStore, RecordStoreError};
