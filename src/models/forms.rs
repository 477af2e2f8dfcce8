use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::FieldErrors;
use crate::models::patients::Gender;
use crate::utils::units;

/// Unit a height or weight is displayed and typed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Metric,
    Imperial,
}

impl DisplayUnit {
    pub fn toggled(self) -> Self {
        match self {
            DisplayUnit::Metric => DisplayUnit::Imperial,
            DisplayUnit::Imperial => DisplayUnit::Metric,
        }
    }
}

/// Session-local display units for the measurement inputs. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayUnits {
    pub height: DisplayUnit,
    pub weight: DisplayUnit,
}

/// UI-local working copy of a patient record.
///
/// Height and weight hold whatever number the user typed, read under the
/// matching [`DisplayUnits`] entry. Nothing is converted until submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientFormData {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub email: String,
    pub phone_number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// Left empty the composed address falls back to the default country
    pub country: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl Default for PatientFormData {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            middle_name: String::new(),
            date_of_birth: None,
            gender: Some(Gender::Unknown),
            email: String::new(),
            phone_number: String::new(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: None,
            height: None,
            weight: None,
        }
    }
}

/// A form instance: editable data, its display units and per-field errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientForm {
    pub data: PatientFormData,
    pub units: DisplayUnits,
    pub errors: FieldErrors,
}

impl PatientForm {
    pub fn new(data: PatientFormData) -> Self {
        Self {
            data,
            units: DisplayUnits::default(),
            errors: FieldErrors::new(),
        }
    }

    /// Switches the height unit. The typed number is kept and read under the new unit.
    pub fn set_height_unit(&mut self, unit: DisplayUnit) {
        self.units.height = unit;
    }

    /// Switches the weight unit. The typed number is kept and read under the new unit.
    pub fn set_weight_unit(&mut self, unit: DisplayUnit) {
        self.units.weight = unit;
    }

    /// Typed height carried over into `to`, for a UI that offers to convert explicitly.
    pub fn recomputed_height(&self, to: DisplayUnit) -> Option<f64> {
        self.data
            .height
            .map(|h| units::recompute_height(h, self.units.height, to))
    }

    /// Typed weight carried over into `to`.
    pub fn recomputed_weight(&self, to: DisplayUnit) -> Option<f64> {
        self.data
            .weight
            .map(|w| units::recompute_weight(w, self.units.weight, to))
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
