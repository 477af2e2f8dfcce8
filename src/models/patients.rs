use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    /// All selectable values, in display order.
    pub fn options() -> Vec<Gender> {
        Gender::iter().collect()
    }
}

/// Wire field names, used as keys for field-scoped errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum PatientField {
    FirstName,
    LastName,
    MiddleName,
    DateOfBirth,
    Gender,
    Email,
    PhoneNumber,
    Street,
    City,
    State,
    PostalCode,
    Country,
    Height,
    Weight,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    /// Serialized as `YYYY-MM-DD`
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Centimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// "First Middle Last", skipping an empty middle name.
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().map(str::trim) {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.first_name, middle, self.last_name)
            }
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Age in whole years on the given date.
    pub fn age_on(&self, date: NaiveDate) -> i32 {
        let dob = self.date_of_birth;
        let mut age = date.year() - dob.year();
        if (date.month(), date.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        age
    }
}

/// Request body for `POST /patients` and `PUT /patients/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientApiData {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(with = "iso_date")]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub email: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPatients {
    pub patients: Vec<Patient>,
    pub total_count: u64,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl PaginatedPatients {
    /// Builds a page, deriving `total_pages = ceil(total_count / page_size)`.
    pub fn new(patients: Vec<Patient>, total_count: u64, current_page: u32, page_size: u32) -> Self {
        Self {
            patients,
            total_count,
            current_page,
            page_size,
            total_pages: total_pages(total_count, page_size),
        }
    }
}

pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size as u64) as u32
}

/// Query parameters for `GET /patients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatientsParams {
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search: String,
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn patient(middle: Option<&str>) -> Patient {
        Patient {
            id: "p-1".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            middle_name: middle.map(str::to_string),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            gender: Gender::Female,
            email: "a@b.com".to_string(),
            phone_number: "+1 555-0100".to_string(),
            address: None,
            height: None,
            weight: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!(Gender::from_str("female").unwrap(), Gender::Female);
        assert!(Gender::from_str("robot").is_err());
        assert_eq!(Gender::Unknown.to_string(), "unknown");
        assert_eq!(Gender::options().len(), 4);
    }

    #[test]
    fn test_field_names_are_camel_case() {
        assert_eq!(PatientField::PhoneNumber.as_ref(), "phoneNumber");
        assert_eq!(PatientField::DateOfBirth.as_ref(), "dateOfBirth");
        assert_eq!(PatientField::Email.as_ref(), "email");
    }

    #[test]
    fn test_full_name() {
        assert_eq!(patient(None).full_name(), "Ann Lee");
        assert_eq!(patient(Some("Marie")).full_name(), "Ann Marie Lee");
        assert_eq!(patient(Some("  ")).full_name(), "Ann Lee");
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let p = patient(None);
        assert_eq!(p.age_on(NaiveDate::from_ymd_opt(2020, 6, 14).unwrap()), 29);
        assert_eq!(p.age_on(NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()), 30);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(15, 10), 2);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
    }

    #[test]
    fn test_api_data_date_wire_format() {
        let data = PatientApiData {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            middle_name: None,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 2).unwrap(),
            gender: Gender::Female,
            email: "a@b.com".to_string(),
            phone_number: "555".to_string(),
            address: None,
            height: Some(170.0),
            weight: None,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["dateOfBirth"], "1990-01-02");
        assert_eq!(json["phoneNumber"], "555");
        assert!(json.get("weight").is_none());
        assert!(json.get("address").is_none());
    }
}
