//! reqwest-backed [`RequestExecutor`].

use async_trait::async_trait;
use http::Method;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::services::gateway::{ApiRequest, ApiResponse, RequestExecutor, TransportError};

/// Executes API requests over HTTP against a fixed base URL.
///
/// Requests that got no response are retried up to `max_retries` times, but
/// only for idempotent methods; a `POST` is never replayed.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl HttpExecutor {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Poco-Client/1.0")
            .build()
            .map_err(|e| Error::Setup(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    fn url_for(&self, request: &ApiRequest) -> std::result::Result<Url, TransportError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path))
            .map_err(|e| TransportError::Setup(format!("invalid URL '{}{}': {}", self.base_url, request.path, e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    async fn attempt(&self, request: &ApiRequest, url: Url) -> std::result::Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify_reqwest)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::NoResponse(format!("failed to read response body: {}", e)))?;

        Ok(ApiResponse::new(status, body))
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

fn classify_reqwest(error: reqwest::Error) -> TransportError {
    if error.is_builder() {
        TransportError::Setup(error.to_string())
    } else {
        TransportError::NoResponse(error.to_string())
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let url = self.url_for(&request)?;
        let retries = if is_idempotent(&request.method) { self.max_retries } else { 0 };

        let mut attempt = 0;
        loop {
            match self.attempt(&request, url.clone()).await {
                Err(TransportError::NoResponse(detail)) if attempt < retries => {
                    attempt += 1;
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        attempt,
                        "no response, retrying: {}",
                        detail
                    );
                }
                outcome => {
                    debug!(method = %request.method, path = %request.path, attempts = attempt + 1, "request finished");
                    return outcome;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(base_url: &str) -> HttpExecutor {
        HttpExecutor::new(&ApiConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            max_retries: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_url_keeps_base_path_and_query() {
        let executor = executor("http://localhost:8080/api/v1/");
        let mut request = ApiRequest::new(Method::GET, "/patients");
        request.query = vec![
            ("page".to_string(), "2".to_string()),
            ("search".to_string(), "ann lee".to_string()),
        ];
        let url = executor.url_for(&request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/patients?page=2&search=ann+lee");
    }

    #[test]
    fn test_bad_base_url_is_setup_failure() {
        let executor = executor("not a url");
        let request = ApiRequest::new(Method::GET, "/patients");
        assert!(matches!(executor.url_for(&request), Err(TransportError::Setup(_))));
    }

    #[test]
    fn test_post_is_not_retried() {
        assert!(!is_idempotent(&Method::POST));
        assert!(is_idempotent(&Method::PUT));
        assert!(is_idempotent(&Method::GET));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_no_response() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let executor = executor("http://127.0.0.1:9");
        let outcome = executor.execute(ApiRequest::new(Method::GET, "/patients")).await;
        assert!(matches!(outcome, Err(TransportError::NoResponse(_))));
    }
}
