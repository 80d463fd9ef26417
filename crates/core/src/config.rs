//! Process configuration.
//!
//! Built once at startup and passed by reference into the lifecycle manager
//! and notification gateway constructors. Nothing below this struct reads the
//! process environment.

use std::time::Duration;

/// Platform-wide configuration.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// HMAC secret for session-token signing.
    pub token_secret: String,
    /// Session token validity window.
    pub token_ttl: Duration,
    /// Sender address for verification mail.
    pub mail_from: String,
}

impl PlatformConfig {
    pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn new(token_secret: impl Into<String>, mail_from: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_ttl: Self::DEFAULT_TOKEN_TTL,
            mail_from: mail_from.into(),
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Load configuration from the process environment.
    ///
    /// Missing values fall back to insecure development defaults, loudly.
    pub fn from_env() -> Self {
        let token_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });
        let mail_from = std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| "no-reply@talentbridge.local".to_string());

        Self::new(token_secret, mail_from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_24_hours() {
        let config = PlatformConfig::new("secret", "x@y.test");
        assert_eq!(config.token_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn ttl_is_configurable() {
        let config =
            PlatformConfig::new("secret", "x@y.test").with_token_ttl(Duration::from_secs(60));
        assert_eq!(config.token_ttl, Duration::from_secs(60));
    }
}
