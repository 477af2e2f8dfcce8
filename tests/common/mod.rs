pub mod fixtures;
pub mod mock_api;
pub mod scripted;

pub use fixtures::{patient_page, sample_patient, valid_form};
pub use mock_api::MockApi;
pub use scripted::{Scripted, ScriptedExecutor, json_response};
