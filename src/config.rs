use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub environment: String,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
    pub search: SearchConfig,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL the `/patients` resource is mounted under
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Extra attempts the HTTP executor makes when no response was received
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Session storage key holding the bearer token
    pub token_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    /// How long list pages and records stay fresh (None keeps them until invalidated)
    pub ttl_seconds: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables, with defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let mut defaults = Self::default();
        if let Ok(environment) = std::env::var("POCO__ENVIRONMENT") {
            defaults.api.base_url = default_base_url(&environment).to_string();
            defaults.environment = environment;
        }

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            // Override with environment variables using `POCO__` prefix and `__` separator
            // e.g., POCO__API__BASE_URL="https://api.example.com/api/v1"
            .add_source(
                config::Environment::with_prefix("POCO")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Clamps a requested page size into `[1, max_page_size]`.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.pagination.default_page_size)
            .clamp(1, self.pagination.max_page_size.max(1))
    }
}

/// Per-environment API base URL.
fn default_base_url(environment: &str) -> &'static str {
    match environment {
        "production" => "https://api.pococlinic.com/api/v1",
        _ => "http://localhost:8080/api/v1",
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            pagination: PaginationConfig::default(),
            search: SearchConfig::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url("development").to_string(),
            timeout_seconds: 30,
            max_retries: 1,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_key: "poco_token".to_string(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: Some(300),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(&self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "Error serializing config"),
        }
    }
}
