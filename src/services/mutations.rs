//! Create, update and delete flows for patient forms.
//!
//! Each call validates locally, sends at most one request, and on success
//! invalidates the affected cache entries before handing back the outcome. A
//! failed call never navigates.

use strum_macros::Display;
use tracing::{error, info, warn};

use crate::cache::PatientCache;
use crate::error::{Error, Result};
use crate::models::{Patient, PatientApiData, PatientForm};
use crate::services::codec::{to_api_data, to_form_data};
use crate::services::patients::PatientService;
use crate::validation::validate_patient_form;

/// Fallback notification text when a save fails without a server message.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save patient";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete patient";

/// Where the UI should go after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    PatientList,
    PatientDetail(String),
}

impl Navigation {
    pub fn path(&self) -> String {
        match self {
            Navigation::PatientList => "/patients".to_string(),
            Navigation::PatientDetail(id) => format!("/patients/{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A global toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }
}

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved {
        patient: Patient,
        notification: Notification,
        navigation: Navigation,
    },
    /// Local validation failed; the form carries the errors and nothing was sent
    Invalid,
    /// The server reported field errors; they were written into the form
    Rejected,
    Failed(Notification),
}

impl SubmitOutcome {
    pub fn navigation(&self) -> Option<&Navigation> {
        match self {
            SubmitOutcome::Saved { navigation, .. } => Some(navigation),
            _ => None,
        }
    }

    pub fn notification(&self) -> Option<&Notification> {
        match self {
            SubmitOutcome::Saved { notification, .. } | SubmitOutcome::Failed(notification) => {
                Some(notification)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted {
        notification: Notification,
        navigation: Navigation,
    },
    Failed(Notification),
}

#[derive(Clone)]
pub struct MutationOrchestrator {
    service: PatientService,
    cache: PatientCache,
}

impl MutationOrchestrator {
    pub fn new(service: PatientService, cache: PatientCache) -> Self {
        Self { service, cache }
    }

    /// Validates `form` and creates the patient.
    pub async fn create(&self, form: &mut PatientForm) -> SubmitOutcome {
        let data = match self.prepare(form) {
            Ok(data) => data,
            Err(outcome) => return outcome,
        };

        match self.service.create(&data).await {
            Ok(patient) => {
                self.cache.invalidate_lists().await;
                SubmitOutcome::Saved {
                    patient,
                    notification: Notification::success("Patient created successfully"),
                    navigation: Navigation::PatientList,
                }
            }
            Err(e) => reject(form, e),
        }
    }

    /// Validates `form` and replaces the patient `id`.
    pub async fn update(&self, id: &str, form: &mut PatientForm) -> SubmitOutcome {
        let data = match self.prepare(form) {
            Ok(data) => data,
            Err(outcome) => return outcome,
        };

        match self.service.update(id, &data).await {
            Ok(patient) => {
                self.cache.invalidate_lists().await;
                self.cache.invalidate_record(id).await;
                SubmitOutcome::Saved {
                    patient,
                    notification: Notification::success("Patient updated successfully"),
                    navigation: Navigation::PatientDetail(id.to_string()),
                }
            }
            Err(e) => reject(form, e),
        }
    }

    pub async fn delete(&self, id: &str) -> DeleteOutcome {
        match self.service.delete(id).await {
            Ok(()) => {
                self.cache.invalidate_lists().await;
                self.cache.invalidate_record(id).await;
                DeleteOutcome::Deleted {
                    notification: Notification::success("Patient deleted successfully"),
                    navigation: Navigation::PatientList,
                }
            }
            Err(e) => {
                error!(patient_id = %id, "failed to delete patient: {}", e);
                DeleteOutcome::Failed(Notification::error(failure_message(&e, DELETE_FAILED_MESSAGE)))
            }
        }
    }

    /// Reads a patient through the record cache.
    pub async fn get_patient(&self, id: &str) -> Result<Patient> {
        if let Some(patient) = self.cache.get_record(id).await {
            return Ok(patient);
        }

        let patient = self.service.get(id).await?;
        self.cache.put_record(patient.clone()).await;
        Ok(patient)
    }

    /// Builds an edit form for patient `id`.
    pub async fn load_for_edit(&self, id: &str) -> Result<PatientForm> {
        let patient = self.get_patient(id).await?;
        Ok(PatientForm::new(to_form_data(&patient)))
    }

    /// Runs local validation and translation. On failure the outcome to return is in `Err`.
    fn prepare(&self, form: &mut PatientForm) -> std::result::Result<PatientApiData, SubmitOutcome> {
        form.errors = validate_patient_form(&form.data, form.units);
        if form.has_errors() {
            return Err(SubmitOutcome::Invalid);
        }

        to_api_data(&form.data, form.units).map_err(|e| {
            warn!("form could not be translated: {}", e);
            SubmitOutcome::Failed(Notification::error(failure_message(&e, SAVE_FAILED_MESSAGE)))
        })
    }
}

/// Routes a failed save: field errors go into the form, anything else becomes a toast.
fn reject(form: &mut PatientForm, error: Error) -> SubmitOutcome {
    if let Some(fields) = error.field_errors() {
        info!(fields = fields.len(), "server rejected patient form");
        form.errors.overwrite_with(fields);
        return SubmitOutcome::Rejected;
    }

    error!("failed to save patient: {}", error);
    SubmitOutcome::Failed(Notification::error(failure_message(&error, SAVE_FAILED_MESSAGE)))
}

fn failure_message(error: &Error, fallback: &str) -> String {
    let message = error.user_message();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
