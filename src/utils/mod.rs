//! Utility modules for the patient client

pub mod address;
pub mod string;
pub mod units;

pub use address::{compose as compose_address, decompose as decompose_address, AddressFields};
pub use string::{non_empty_trimmed, safe_preview};
