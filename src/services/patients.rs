//! Client for the `/patients` REST resource.

use tracing::{info, instrument};

use crate::error::Result;
use crate::models::{ListPatientsParams, PaginatedPatients, Patient, PatientApiData};
use crate::services::gateway::RequestGateway;

const PATIENTS_PATH: &str = "/patients";

fn patient_path(id: &str) -> String {
    format!("{}/{}", PATIENTS_PATH, id)
}

#[derive(Clone)]
pub struct PatientService {
    gateway: RequestGateway,
}

impl PatientService {
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// `GET /patients?page=&pageSize=&search=`
    #[instrument(skip(self), fields(page = params.page, page_size = params.page_size))]
    pub async fn list(&self, params: &ListPatientsParams) -> Result<PaginatedPatients> {
        let mut query = vec![
            ("page".to_string(), params.page.to_string()),
            ("pageSize".to_string(), params.page_size.to_string()),
        ];
        if !params.search.is_empty() {
            query.push(("search".to_string(), params.search.clone()));
        }
        self.gateway.get_json(PATIENTS_PATH, query).await
    }

    /// `GET /patients/{id}`; a missing record is [`crate::Error::NotFound`].
    pub async fn get(&self, id: &str) -> Result<Patient> {
        self.gateway.get_json(&patient_path(id), Vec::new()).await
    }

    /// `POST /patients`
    pub async fn create(&self, data: &PatientApiData) -> Result<Patient> {
        let patient: Patient = self.gateway.post_json(PATIENTS_PATH, data).await?;
        info!(patient_id = %patient.id, "patient created");
        Ok(patient)
    }

    /// `PUT /patients/{id}`
    pub async fn update(&self, id: &str, data: &PatientApiData) -> Result<Patient> {
        let patient: Patient = self.gateway.put_json(&patient_path(id), data).await?;
        info!(patient_id = %patient.id, "patient updated");
        Ok(patient)
    }

    /// `DELETE /patients/{id}`
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.gateway.delete(&patient_path(id)).await?;
        info!(patient_id = %id, "patient deleted");
        Ok(())
    }
}
