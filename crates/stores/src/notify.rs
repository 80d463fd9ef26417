//! Notification gateway surface.
//!
//! The platform only needs one capability from mail transport: deliver a
//! verification code to an address, or fail with a delivery error. SMTP
//! mechanics live behind this trait, out of scope here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mail delivery failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("verification mail delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Sends verification codes.
#[async_trait::async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), DeliveryError>;
}

/// Test gateway that records every dispatched code.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make every subsequent send fail with a delivery error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All `(email, code)` pairs dispatched so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// The most recent code sent to an address.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait::async_trait]
impl NotificationGateway for RecordingMailer {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError("injected delivery failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

/// Dev gateway that logs the code instead of delivering it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait::async_trait]
impl NotificationGateway for LogMailer {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), DeliveryError> {
        tracing::info!(email = %email, code = %code, "verification code (not delivered)");
        Ok(())
    }
}
