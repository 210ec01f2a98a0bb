use std::str::FromStr;

use serde::de::DeserializeOwned;
use validator::{ValidationError, ValidationErrors};

use crate::error::{Error, Result};

/// Parses a free-form request field into a closed vocabulary, reporting
/// failures against `field` the same way `#[derive(Validate)]` does.
pub fn parse_field<T: FromStr>(field: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        let mut error = ValidationError::new("invalid_value");
        error.message = Some(format!("'{}' is not an accepted {} value", raw, field).into());
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        Error::Validation(errors)
    })
}

/// Decodes a JSON body that may be left out. An empty body gives the
/// default value; anything else must be valid JSON for `T`.
pub fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| Error::BadRequest(format!("Invalid JSON body: {}", e)))
}
