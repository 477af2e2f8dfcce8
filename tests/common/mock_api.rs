//! In-process mock of the `/patients` REST API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use poco_client::Config;
use poco_client::models::{Gender, PaginatedPatients, Patient};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Email the mock treats as already registered
pub const TAKEN_EMAIL: &str = "taken@example.com";

#[derive(Clone, Default)]
struct MockState {
    patients: Arc<Mutex<Vec<Patient>>>,
    authorizations: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockState {
    fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.authorizations.lock().unwrap().push(value);
    }
}

/// Mock API server wrapper
///
/// Runs an Axum server on a random port with an in-memory patient store.
/// Each test gets its own server instance.
pub struct MockApi {
    /// Base URL including the `/api/v1` prefix
    pub base_url: String,
    state: MockState,
}

impl MockApi {
    /// Starts a server seeded with `patients`
    pub async fn start(patients: Vec<Patient>) -> Self {
        let state = MockState {
            patients: Arc::new(Mutex::new(patients)),
            ..MockState::default()
        };

        let api_routes = Router::new()
            .route("/patients", get(list_patients).post(create_patient))
            .route(
                "/patients/{id}",
                get(get_patient).put(update_patient).delete(delete_patient),
            );

        let app = Router::new()
            .nest("/api/v1", api_routes)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}/api/v1"),
            state,
        }
    }

    /// Default config pointed at this server
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.api.base_url = self.base_url.clone();
        config.api.timeout_seconds = 5;
        config
    }

    pub fn patient_count(&self) -> usize {
        self.state.patients.lock().unwrap().len()
    }

    /// `Authorization` header of every request received, in order
    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.state.authorizations.lock().unwrap().clone()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    page: Option<u32>,
    page_size: Option<u32>,
    search: Option<String>,
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "code": code, "message": message }))).into_response()
}

fn validation_response(errors: HashMap<&str, Vec<&str>>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "code": "VALIDATION_ERROR",
            "message": "Validation failed",
            "errors": errors,
        })),
    )
        .into_response()
}

async fn list_patients(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    state.record(&headers);

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(10).max(1);
    let needle = query.search.unwrap_or_default().to_lowercase();

    let patients = state.patients.lock().unwrap();
    let matching: Vec<Patient> = patients
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.full_name().to_lowercase().contains(&needle)
                || p.email.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    let total = matching.len() as u64;
    let items = matching
        .into_iter()
        .skip(((page - 1) * page_size) as usize)
        .take(page_size as usize)
        .collect();

    Json(PaginatedPatients::new(items, total, page, page_size)).into_response()
}

/// Checks a request body the way the real API does; returns the error response on failure
fn check_body(body: &Value, patients: &[Patient], own_id: Option<&str>) -> Option<Response> {
    let mut errors: HashMap<&str, Vec<&str>> = HashMap::new();

    for (field, message) in [
        ("firstName", "First name is required"),
        ("lastName", "Last name is required"),
        ("email", "Email is required"),
    ] {
        if body[field].as_str().map(str::trim).unwrap_or("").is_empty() {
            errors.entry(field).or_default().push(message);
        }
    }

    if let Some(email) = body["email"].as_str() {
        let taken = email == TAKEN_EMAIL
            || patients
                .iter()
                .any(|p| p.email == email && Some(p.id.as_str()) != own_id);
        if taken {
            errors.entry("email").or_default().push("Email already registered");
        }
    }

    (!errors.is_empty()).then(|| validation_response(errors))
}

fn patient_from_body(id: String, body: &Value, created_at: chrono::DateTime<Utc>) -> Option<Patient> {
    let date_of_birth = NaiveDate::parse_from_str(body["dateOfBirth"].as_str()?, "%Y-%m-%d").ok()?;
    let gender: Gender = serde_json::from_value(body["gender"].clone()).ok()?;
    Some(Patient {
        id,
        first_name: body["firstName"].as_str()?.to_string(),
        last_name: body["lastName"].as_str()?.to_string(),
        middle_name: body["middleName"].as_str().map(str::to_string),
        date_of_birth,
        gender,
        email: body["email"].as_str()?.to_string(),
        phone_number: body["phoneNumber"].as_str().unwrap_or_default().to_string(),
        address: serde_json::from_value(body["address"].clone()).ok(),
        height: body["height"].as_f64(),
        weight: body["weight"].as_f64(),
        created_at,
        updated_at: Utc::now(),
    })
}

async fn create_patient(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers);

    let mut patients = state.patients.lock().unwrap();
    if let Some(rejection) = check_body(&body, &patients, None) {
        return rejection;
    }

    let id = uuid::Uuid::now_v7().to_string();
    match patient_from_body(id, &body, Utc::now()) {
        Some(patient) => {
            patients.push(patient.clone());
            (StatusCode::CREATED, Json(patient)).into_response()
        }
        None => error_response(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Malformed patient"),
    }
}

async fn get_patient(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(&headers);

    let patients = state.patients.lock().unwrap();
    match patients.iter().find(|p| p.id == id) {
        Some(patient) => Json(patient.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Patient not found"),
    }
}

async fn update_patient(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record(&headers);

    let mut patients = state.patients.lock().unwrap();
    let Some(index) = patients.iter().position(|p| p.id == id) else {
        return error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Patient not found");
    };
    if let Some(rejection) = check_body(&body, &patients, Some(&id)) {
        return rejection;
    }

    let created_at = patients[index].created_at;
    match patient_from_body(id, &body, created_at) {
        Some(patient) => {
            patients[index] = patient.clone();
            Json(patient).into_response()
        }
        None => error_response(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Malformed patient"),
    }
}

async fn delete_patient(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(&headers);

    let mut patients = state.patients.lock().unwrap();
    let before = patients.len();
    patients.retain(|p| p.id != id);
    if patients.len() == before {
        return error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Patient not found");
    }
    StatusCode::NO_CONTENT.into_response()
}
