//! Stable response envelope.
//!
//! Every operation's outcome is echoed by the (out-of-scope) transport layer
//! as `{success, data | error}`. Internal causes are logged, never required
//! to appear verbatim here.

use serde::Serialize;

use crate::error::LifecycleError;

/// `{success, data | error}` envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_verification: Option<bool>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            needs_verification: None,
        }
    }

    pub fn err(err: &LifecycleError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            needs_verification: err.needs_verification().then_some(true),
        }
    }
}

impl<T: Serialize> From<Result<T, LifecycleError>> for ApiResponse<T> {
    fn from(result: Result<T, LifecycleError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(&err),
        }
    }
}
