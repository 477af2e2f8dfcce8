//! Client-side validation of patient forms.
//!
//! Each field has its own validator. Within a field the first failing rule
//! wins; across fields every validator runs so the form can show all messages
//! at once. The resulting [`FieldErrors`] blocks submission when non-empty.

use chrono::{NaiveDate, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, FieldErrors, Result, ValidationErrors};
use crate::models::{DisplayUnit, DisplayUnits, Gender, PatientField, PatientFormData};
use crate::utils::units::{round_canonical, to_canonical_height, to_canonical_weight};

pub const MAX_HEIGHT_CM: f64 = 300.0;
pub const MAX_WEIGHT_KG: f64 = 500.0;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("phone pattern compiles"));
static POSTAL_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("postal code pattern compiles"));

fn invalid(field: PatientField, message: &str) -> Error {
    Error::Validation(ValidationErrors::single(field.as_ref(), message))
}

/// Validates that a name field is not blank
///
/// # Arguments
/// * `value` - The raw input
/// * `field` - Which name field this is, for the error key and message
pub fn validate_required_name(value: &str, field: PatientField) -> Result<()> {
    if value.trim().is_empty() {
        let message = match field {
            PatientField::LastName => "Last name is required",
            _ => "First name is required",
        };
        return Err(invalid(field, message));
    }
    Ok(())
}

/// Validates that a date of birth is set and not after `today`
pub fn validate_date_of_birth(date_of_birth: Option<NaiveDate>, today: NaiveDate) -> Result<()> {
    match date_of_birth {
        None => Err(invalid(PatientField::DateOfBirth, "Date of birth is required")),
        Some(date) if date > today => Err(invalid(
            PatientField::DateOfBirth,
            "Date of birth cannot be in the future",
        )),
        Some(_) => Ok(()),
    }
}

pub fn validate_gender(gender: Option<Gender>) -> Result<()> {
    match gender {
        Some(_) => Ok(()),
        None => Err(invalid(PatientField::Gender, "Gender is required")),
    }
}

/// Validates email format with a permissive `local@domain.tld` check
///
/// # Examples
/// ```
/// use poco_client::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(invalid(PatientField::Email, "Email is required"));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(invalid(PatientField::Email, "Invalid email format"));
    }

    Ok(())
}

/// Validates a phone number: optional leading `+`, then digits, spaces, dashes, parentheses
pub fn validate_phone_number(phone: &str) -> Result<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(invalid(PatientField::PhoneNumber, "Phone number is required"));
    }

    if !PHONE_PATTERN.is_match(phone) {
        return Err(invalid(PatientField::PhoneNumber, "Invalid phone number format"));
    }

    Ok(())
}

/// Validates a postal code as `NNNNN` or `NNNNN-NNNN`; blank is allowed
pub fn validate_postal_code(postal_code: &str) -> Result<()> {
    let postal_code = postal_code.trim();

    if !postal_code.is_empty() && !POSTAL_CODE_PATTERN.is_match(postal_code) {
        return Err(invalid(
            PatientField::PostalCode,
            "Invalid postal code format (e.g., 12345 or 12345-6789)",
        ));
    }

    Ok(())
}

/// Checks an optional height against `(0, 300]` cm after converting from `unit`
///
/// The bound applies to the rounded value that is actually sent.
pub fn validate_height(height: Option<f64>, unit: DisplayUnit) -> Result<()> {
    if let Some(value) = height {
        let cm = round_canonical(to_canonical_height(value, unit));
        if !(cm > 0.0 && cm <= MAX_HEIGHT_CM) {
            return Err(invalid(PatientField::Height, "Height must be between 1 and 300 cm"));
        }
    }
    Ok(())
}

/// Checks an optional weight against `(0, 500]` kg after converting from `unit`
pub fn validate_weight(weight: Option<f64>, unit: DisplayUnit) -> Result<()> {
    if let Some(value) = weight {
        let kg = round_canonical(to_canonical_weight(value, unit));
        if !(kg > 0.0 && kg <= MAX_WEIGHT_KG) {
            return Err(invalid(PatientField::Weight, "Weight must be between 1 and 500 kg"));
        }
    }
    Ok(())
}

/// Runs every field validator against `today` and collects the messages.
pub fn validate_patient_form_on(
    data: &PatientFormData,
    units: DisplayUnits,
    today: NaiveDate,
) -> FieldErrors {
    let results = [
        validate_required_name(&data.first_name, PatientField::FirstName),
        validate_required_name(&data.last_name, PatientField::LastName),
        validate_date_of_birth(data.date_of_birth, today),
        validate_gender(data.gender),
        validate_email(&data.email),
        validate_phone_number(&data.phone_number),
        validate_postal_code(&data.postal_code),
        validate_height(data.height, units.height),
        validate_weight(data.weight, units.weight),
    ];

    let mut errors = FieldErrors::new();
    for result in results {
        if let Err(Error::Validation(failure)) = result {
            errors.overwrite_with(failure.into_field_errors());
        }
    }
    errors
}

/// Runs every field validator against the current UTC date.
pub fn validate_patient_form(data: &PatientFormData, units: DisplayUnits) -> FieldErrors {
    validate_patient_form_on(data, units, Utc::now().date_naive())
}

/// Like [`validate_patient_form`], but as a `Result` for `?` call sites.
pub fn ensure_valid(data: &PatientFormData, units: DisplayUnits) -> Result<()> {
    let fields = validate_patient_form(data, units);
    if fields.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(ValidationErrors::Multiple { fields }))
    }
}
