pub mod forms;
pub mod patients;

pub use forms::{DisplayUnit, DisplayUnits, PatientForm, PatientFormData};
pub use patients::{
    Address, Gender, ListPatientsParams, PaginatedPatients, Patient, PatientApiData, PatientField,
};
