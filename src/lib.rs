pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod validation;

use std::sync::Arc;

pub use cache::{Cache, CacheConfig, PatientCache};
pub use crate::config::Config;
pub use error::{Error, FieldErrors, Result, ValidationErrors};

use services::{HttpExecutor, ListQueryController, MutationOrchestrator, PatientService, RequestGateway, SessionStore};

/// Load configuration from environment variables
pub fn load_config() -> Result<Config> {
    Ok(Config::load()?)
}

/// Everything a patient screen needs, wired from one config.
///
/// Clones share the session, cache and HTTP client.
#[derive(Clone)]
pub struct PatientClient {
    pub config: Config,
    pub session: SessionStore,
    pub cache: PatientCache,
    pub service: PatientService,
}

impl PatientClient {
    /// Builds the reqwest-backed client. Must be called inside a tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        let executor = HttpExecutor::new(&config.api)?;
        let session = SessionStore::from_config(&config.auth);
        let gateway = RequestGateway::with_defaults(Arc::new(executor), Arc::new(session.clone()));
        let cache = PatientCache::new(CacheConfig::from(&config.cache));

        Ok(Self {
            service: PatientService::new(gateway),
            config,
            session,
            cache,
        })
    }

    pub fn list_controller(&self) -> ListQueryController {
        ListQueryController::new(self.service.clone(), self.cache.clone(), &self.config)
    }

    pub fn mutations(&self) -> MutationOrchestrator {
        MutationOrchestrator::new(self.service.clone(), self.cache.clone())
    }
}
