//! Shared request validation helpers for HTTP handlers.

use serde_json::json;

use crate::domain::{ContactNumber, Error, ListingId};

/// 400 for a field the request body must carry.
pub(crate) fn missing_field_error(field: &'static str) -> Error {
    Error::invalid_request(format!("{field} is required")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

/// Parse a path or body listing id, reporting 400 on malformed input.
pub(crate) fn parse_listing_id(raw: &str) -> Result<ListingId, Error> {
    raw.parse().map_err(|_| {
        Error::invalid_request("listing id must be a UUID").with_details(json!({
            "field": "id",
            "value": raw,
            "code": "invalid_id",
        }))
    })
}

/// Parse a required contact number field.
pub(crate) fn parse_contact_number(
    raw: Option<String>,
    field: &'static str,
) -> Result<ContactNumber, Error> {
    let raw = raw.ok_or_else(|| missing_field_error(field))?;
    ContactNumber::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": field,
            "code": "invalid_contact_number",
        }))
    })
}
