//! In-memory request executor with scripted responses and delays

use async_trait::async_trait;
use http::StatusCode;
use poco_client::services::{ApiRequest, ApiResponse, RequestExecutor, TransportError};
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted reply
pub struct Scripted {
    pub delay: Duration,
    pub outcome: Result<ApiResponse, TransportError>,
}

impl Scripted {
    pub fn ok(response: ApiResponse) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(response),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn no_response() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(TransportError::NoResponse("connection reset".to_string())),
        }
    }
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> ApiResponse {
    ApiResponse::new(status, serde_json::to_string(body).unwrap())
}

type Handler = Box<dyn Fn(&ApiRequest, usize) -> Scripted + Send + Sync>;

/// Executor that answers every request through a closure.
///
/// The closure gets the request and its zero-based sequence number. Delays use
/// `tokio::time::sleep`, so paused-clock tests control them exactly.
pub struct ScriptedExecutor {
    handler: Handler,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedExecutor {
    pub fn new(handler: impl Fn(&ApiRequest, usize) -> Scripted + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `(page, search)` of every list request, in send order
    pub fn list_queries(&self) -> Vec<(String, String)> {
        self.requests()
            .iter()
            .filter(|r| r.path == "/patients" && r.method == http::Method::GET)
            .map(|r| (query_value(r, "page"), query_value(r, "search")))
            .collect()
    }
}

pub fn query_value(request: &ApiRequest, name: &str) -> String {
    request
        .query
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
        .unwrap_or_default()
}

#[async_trait]
impl RequestExecutor for ScriptedExecutor {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let scripted = {
            let mut requests = self.requests.lock().unwrap();
            let scripted = (self.handler)(&request, requests.len());
            requests.push(request);
            scripted
        };
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.outcome
    }
}
