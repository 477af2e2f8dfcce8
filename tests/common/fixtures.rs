//! Shared test data

use chrono::{NaiveDate, TimeZone, Utc};
use poco_client::models::{Gender, PaginatedPatients, Patient, PatientForm, PatientFormData};

/// A fully populated patient with fixed timestamps
pub fn sample_patient(id: &str, first_name: &str, last_name: &str) -> Patient {
    let created = Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0).unwrap();
    Patient {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        middle_name: None,
        date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 20).unwrap(),
        gender: Gender::Female,
        email: format!("{}@example.com", first_name.to_lowercase()),
        phone_number: "+1 555-0100".to_string(),
        address: None,
        height: Some(165.0),
        weight: Some(60.0),
        created_at: created,
        updated_at: created,
    }
}

/// Builds page `page` of a result set with `total_count` patients in it
pub fn patient_page(total_count: u64, page: u32, page_size: u32) -> PaginatedPatients {
    let start = (page.saturating_sub(1) as u64) * page_size as u64;
    let end = (start + page_size as u64).min(total_count);
    let patients = (start..end)
        .map(|i| sample_patient(&format!("p-{}", i + 1), &format!("Patient{}", i + 1), "Test"))
        .collect();
    PaginatedPatients::new(patients, total_count, page, page_size)
}

/// The minimally valid form: Ann Lee, born in the past, female, a@b.com
pub fn valid_form() -> PatientForm {
    PatientForm::new(PatientFormData {
        first_name: "Ann".to_string(),
        last_name: "Lee".to_string(),
        date_of_birth: Some(NaiveDate::from_ymd_opt(1990, 6, 15).unwrap()),
        gender: Some(Gender::Female),
        email: "a@b.com".to_string(),
        phone_number: "+1 555-0100".to_string(),
        ..PatientFormData::default()
    })
}
