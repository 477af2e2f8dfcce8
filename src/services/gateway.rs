//! Request gateway over a pluggable request executor.
//!
//! The gateway is the single path every API call takes. It attaches the bearer
//! credential supplied by a [`CredentialProvider`], hands the request to a
//! [`RequestExecutor`] and turns every failure into one of the error kinds
//! produced by an [`ErrorClassifier`]:
//!
//! - [`Error::ServerValidation`] for `VALIDATION_ERROR` responses with a field map
//! - [`Error::NotFound`] for `404`
//! - [`Error::Server`] for any other non-2xx response
//! - [`Error::Network`] when no response was received
//! - [`Error::Setup`] when the request could not be built or sent
//!
//! No other error shape leaves this module. Retries are left to the executor.

use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, Method, StatusCode, header::AUTHORIZATION};
use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ApiValidationError, Error, Result, VALIDATION_ERROR_CODE};
use crate::utils::string::{MAX_PREVIEW_LEN, safe_preview};

/// A request as handed to the executor. `path` is relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// A response that made it back from the server, whatever its status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Why an executor produced no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request was sent but nothing came back (timeout, connection reset, ...)
    NoResponse(String),
    /// The request could not be built or dispatched
    Setup(String),
}

/// Sends a request and returns the raw response.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError>;
}

/// Source of the bearer credential. Read-only from the gateway's point of view.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<SecretString>;
}

/// Credential provider for unauthenticated use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}

/// Maps failed exchanges onto the crate's error taxonomy.
pub trait ErrorClassifier: Send + Sync {
    /// Classifies a response whose status is not 2xx.
    fn classify_response(&self, response: &ApiResponse) -> Error;

    /// Classifies an exchange that produced no response.
    fn classify_transport(&self, failure: TransportError) -> Error;
}

/// Error body shape shared by the `/patients` endpoints.
#[derive(Debug, Default, Deserialize, Serialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    /// Older servers report the summary under `error`
    #[serde(default)]
    error: Option<String>,
    #[serde(default, alias = "details")]
    errors: Option<IndexMap<String, Vec<String>>>,
}

/// Fallback when a server error carries no message.
pub const GENERIC_SERVER_MESSAGE: &str = "An error occurred";

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorClassifier;

impl ErrorClassifier for DefaultErrorClassifier {
    fn classify_response(&self, response: &ApiResponse) -> Error {
        let body: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
        let message = body
            .message
            .clone()
            .or(body.error.clone())
            .unwrap_or_else(|| GENERIC_SERVER_MESSAGE.to_string());

        if body.code.as_deref() == Some(VALIDATION_ERROR_CODE) {
            if let Some(errors) = body.errors {
                return Error::ServerValidation(ApiValidationError::new(message, errors));
            }
        }

        if response.status == StatusCode::NOT_FOUND {
            return Error::NotFound(message);
        }

        Error::Server {
            status: response.status.as_u16(),
            message,
        }
    }

    fn classify_transport(&self, failure: TransportError) -> Error {
        match failure {
            TransportError::NoResponse(detail) => Error::Network(detail),
            TransportError::Setup(detail) => Error::Setup(detail),
        }
    }
}

/// Gateway every API call goes through.
#[derive(Clone)]
pub struct RequestGateway {
    executor: Arc<dyn RequestExecutor>,
    credentials: Arc<dyn CredentialProvider>,
    classifier: Arc<dyn ErrorClassifier>,
}

impl RequestGateway {
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        credentials: Arc<dyn CredentialProvider>,
        classifier: Arc<dyn ErrorClassifier>,
    ) -> Self {
        Self {
            executor,
            credentials,
            classifier,
        }
    }

    /// Gateway with the default error classifier.
    pub fn with_defaults(
        executor: Arc<dyn RequestExecutor>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self::new(executor, credentials, Arc::new(DefaultErrorClassifier))
    }

    /// Sends a request and returns the 2xx response, or a classified error.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        if let Some(token) = self.credentials.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Setup(format!("invalid bearer token: {}", e)))?;
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
        }

        let method = request.method.clone();
        let path = request.path.clone();
        debug!(%method, %path, "sending API request");

        let response = match self.executor.execute(request).await {
            Ok(response) => response,
            Err(failure) => {
                warn!(%method, %path, ?failure, "API request produced no response");
                return Err(self.classifier.classify_transport(failure));
            }
        };

        if response.status.is_success() {
            return Ok(response);
        }

        warn!(
            %method,
            %path,
            status = response.status.as_u16(),
            body = %safe_preview(&response.body, MAX_PREVIEW_LEN),
            "API request failed"
        );
        Err(self.classifier.classify_response(&response))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        let mut request = ApiRequest::new(Method::GET, path);
        request.query = query;
        let response = self.send(request).await?;
        decode(&response)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = with_body(ApiRequest::new(Method::POST, path), body)?;
        let response = self.send(request).await?;
        decode(&response)
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = with_body(ApiRequest::new(Method::PUT, path), body)?;
        let response = self.send(request).await?;
        decode(&response)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::new(Method::DELETE, path)).await?;
        Ok(())
    }
}

fn with_body<B: Serialize>(mut request: ApiRequest, body: &B) -> Result<ApiRequest> {
    let value = serde_json::to_value(body)
        .map_err(|e| Error::Setup(format!("failed to serialize request body: {}", e)))?;
    request.body = Some(value);
    Ok(request)
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|e| {
        warn!(
            error = %e,
            body = %safe_preview(&response.body, MAX_PREVIEW_LEN),
            "undecodable API response"
        );
        Error::Server {
            status: response.status.as_u16(),
            message: "Unexpected response from server".to_string(),
        }
    })
}
