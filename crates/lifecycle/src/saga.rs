//! Compensation ledger for multi-store operations.
//!
//! There is no transaction spanning the identity provider and the document
//! database, so a multi-step write sequence keeps an explicit ledger of undo
//! actions. Each completed step pushes its compensation; on abort the ledger
//! runs them newest-first. A failed compensation is logged at error level as
//! the operator's manual-cleanup signal, and the remaining compensations
//! still run.

use std::future::Future;
use std::pin::Pin;

type UndoFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;

struct Compensation {
    label: String,
    undo: UndoFuture,
}

/// Ordered ledger of compensations for one in-flight operation.
pub struct Saga {
    operation: &'static str,
    compensations: Vec<Compensation>,
}

impl Saga {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            compensations: Vec::new(),
        }
    }

    /// Register the undo for a step that just completed.
    pub fn on_abort<F>(&mut self, label: impl Into<String>, undo: F)
    where
        F: Future<Output = Result<(), String>> + Send + 'static,
    {
        self.compensations.push(Compensation {
            label: label.into(),
            undo: Box::pin(undo),
        });
    }

    /// Number of registered compensations.
    pub fn len(&self) -> usize {
        self.compensations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compensations.is_empty()
    }

    /// The operation completed; drop all compensations.
    pub fn commit(mut self) {
        self.compensations.clear();
    }

    /// The operation failed; run every compensation in reverse order.
    pub async fn abort(self) {
        let operation = self.operation;
        for comp in self.compensations.into_iter().rev() {
            match comp.undo.await {
                Ok(()) => {
                    tracing::debug!(operation, step = %comp.label, "compensated");
                }
                Err(cause) => {
                    tracing::error!(
                        operation,
                        step = %comp.label,
                        %cause,
                        "compensation failed; manual cleanup required"
                    );
                }
            }
        }
    }
}
