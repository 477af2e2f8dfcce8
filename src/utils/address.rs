//! Flat address inputs <-> structured [`Address`].

use crate::models::Address;

/// Country used when the form leaves it blank.
pub const DEFAULT_COUNTRY: &str = "US";

/// The four flat address inputs of a patient form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFields {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Builds an address from flat inputs.
///
/// Returns `None` when street, city, state and postal code are all blank, so an
/// all-empty address never reaches the wire. Country is not considered.
pub fn compose(
    street: &str,
    city: &str,
    state: &str,
    postal_code: &str,
    country: Option<&str>,
) -> Option<Address> {
    let (street, city, state, postal_code) =
        (street.trim(), city.trim(), state.trim(), postal_code.trim());

    if [street, city, state, postal_code].iter().all(|part| part.is_empty()) {
        return None;
    }

    let country = country
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COUNTRY);

    Some(Address {
        street: street.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        postal_code: postal_code.to_string(),
        country: country.to_string(),
    })
}

/// Splits an address back into form inputs; all empty when absent.
pub fn decompose(address: Option<&Address>) -> AddressFields {
    match address {
        Some(address) => AddressFields {
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
        },
        None => AddressFields::default(),
    }
}
