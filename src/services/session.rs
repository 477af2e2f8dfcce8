//! Process-wide session storage.
//!
//! Holds the bearer token under the configured storage key. The hosting app
//! writes it after login; the request gateway only reads it through
//! [`CredentialProvider`].

use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::debug;

use crate::config::AuthConfig;
use crate::services::gateway::CredentialProvider;

#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Arc<DashMap<String, SecretString>>,
    token_key: String,
}

impl SessionStore {
    pub fn new(token_key: impl Into<String>) -> Self {
        Self {
            storage: Arc::new(DashMap::new()),
            token_key: token_key.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.token_key.clone())
    }

    pub fn set_token(&self, token: SecretString) {
        debug!(key = %self.token_key, "session token stored");
        self.storage.insert(self.token_key.clone(), token);
    }

    pub fn clear_token(&self) {
        if self.storage.remove(&self.token_key).is_some() {
            debug!(key = %self.token_key, "session token cleared");
        }
    }

    pub fn has_token(&self) -> bool {
        self.storage.contains_key(&self.token_key)
    }
}

impl CredentialProvider for SessionStore {
    fn bearer_token(&self) -> Option<SecretString> {
        self.storage
            .get(&self.token_key)
            .map(|token| SecretString::from(token.expose_secret().to_string()))
    }
}
