//! Account service state and configuration.

use std::sync::Arc;

use crate::api::email::Mailer;
use crate::auth::TokenSigner;
use crate::auth::reset::RESET_TOKEN_TTL_SECONDS;
use crate::auth::token::DEFAULT_SESSION_TTL_SECONDS;

#[derive(Clone, Debug)]
pub struct AccountConfig {
    frontend_base_url: String,
    session_ttl_seconds: i64,
    reset_token_ttl_seconds: i64,
}

impl AccountConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            reset_token_ttl_seconds: RESET_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_reset_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.reset_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(super) fn reset_token_ttl_seconds(&self) -> i64 {
        self.reset_token_ttl_seconds
    }
}

/// Collaborators for the account handlers: configuration, the token signer
/// and the notification sink. Injected at construction so tests can swap
/// any of them.
pub struct AccountState {
    config: AccountConfig,
    signer: TokenSigner,
    mailer: Arc<dyn Mailer>,
}

impl AccountState {
    #[must_use]
    pub fn new(config: AccountConfig, signer: TokenSigner, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config,
            signer,
            mailer,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub(super) fn mailer(&self) -> Arc<dyn Mailer> {
        Arc::clone(&self.mailer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogMailer;
    use secrecy::SecretString;

    #[test]
    fn config_defaults_and_overrides() {
        let config = AccountConfig::new("https://app.anagrafe.dev".to_string());
        assert_eq!(config.frontend_base_url(), "https://app.anagrafe.dev");
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.reset_token_ttl_seconds(), RESET_TOKEN_TTL_SECONDS);

        let config = config
            .with_session_ttl_seconds(3600)
            .with_reset_token_ttl_seconds(120);
        assert_eq!(config.session_ttl_seconds(), 3600);
        assert_eq!(config.reset_token_ttl_seconds(), 120);
    }

    #[test]
    fn state_exposes_collaborators() {
        let config = AccountConfig::new("https://app.anagrafe.dev".to_string());
        let signer = TokenSigner::new(&SecretString::from("secret"), config.session_ttl_seconds());
        let state = AccountState::new(config, signer, Arc::new(LogMailer));
        assert_eq!(state.config().frontend_base_url(), "https://app.anagrafe.dev");
        assert!(state.mailer().send("a@example.com", "s", "b").is_ok());
    }
}
