//! Translation between fetched patients, editable forms and request bodies.
//!
//! [`to_api_data`] is the only place form state becomes wire state: strings are
//! trimmed, measurements converted to canonical units and the flat address
//! fields composed.

use crate::error::{Error, Result};
use crate::models::{DisplayUnits, Patient, PatientApiData, PatientFormData};
use crate::utils::address::{compose, decompose};
use crate::utils::string::non_empty_trimmed;
use crate::utils::units::{round_canonical, to_canonical_height, to_canonical_weight};

/// Populates an edit form from a fetched patient. Measurements stay metric.
pub fn to_form_data(patient: &Patient) -> PatientFormData {
    let address = decompose(patient.address.as_ref());
    PatientFormData {
        first_name: patient.first_name.clone(),
        last_name: patient.last_name.clone(),
        middle_name: patient.middle_name.clone().unwrap_or_default(),
        date_of_birth: Some(patient.date_of_birth),
        gender: Some(patient.gender),
        email: patient.email.clone(),
        phone_number: patient.phone_number.clone(),
        street: address.street,
        city: address.city,
        state: address.state,
        postal_code: address.postal_code,
        country: patient
            .address
            .as_ref()
            .and_then(|a| non_empty_trimmed(&a.country)),
        height: patient.height,
        weight: patient.weight,
    }
}

/// Builds the request body for a create or update.
///
/// Fails with [`Error::InvalidInput`] when the date of birth or gender is unset.
pub fn to_api_data(form: &PatientFormData, units: DisplayUnits) -> Result<PatientApiData> {
    let date_of_birth = form
        .date_of_birth
        .ok_or_else(|| Error::InvalidInput("date of birth is required".to_string()))?;
    let gender = form
        .gender
        .ok_or_else(|| Error::InvalidInput("gender is required".to_string()))?;

    Ok(PatientApiData {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        middle_name: non_empty_trimmed(&form.middle_name),
        date_of_birth,
        gender,
        email: form.email.trim().to_string(),
        phone_number: form.phone_number.trim().to_string(),
        address: compose(
            &form.street,
            &form.city,
            &form.state,
            &form.postal_code,
            form.country.as_deref(),
        ),
        height: form
            .height
            .map(|h| round_canonical(to_canonical_height(h, units.height))),
        weight: form
            .weight
            .map(|w| round_canonical(to_canonical_weight(w, units.weight))),
    })
}
