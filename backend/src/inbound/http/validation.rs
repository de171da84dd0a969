//! Shared validation helpers for inbound HTTP adapters.
//!
//! Extractor failures (malformed JSON, unparsable query strings or path
//! segments) are converted into domain `invalid_request` errors so every 400
//! response shares the same JSON envelope.

use actix_web::{HttpRequest, web};
use serde_json::json;

use crate::domain::{Error, ValidationError};

fn malformed(kind: &'static str, detail: impl std::fmt::Display) -> actix_web::Error {
    Error::invalid_request(format!("malformed {kind}: {detail}"))
        .with_details(json!({ "field": kind, "code": "malformed" }))
        .into()
}

/// JSON body extractor configuration.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req: &HttpRequest| malformed("body", err))
}

/// Query string extractor configuration.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| malformed("query", err))
}

/// Path segment extractor configuration.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| malformed("path", err))
}

/// Attribute a validation failure to the request field that carried it.
///
/// Value types only know what they validate (`location`, `weight`); the
/// handler knows which field held the value (`pickup_location`).
pub(crate) fn in_field(field: &'static str) -> impl FnOnce(ValidationError) -> Error {
    move |error| {
        Error::invalid_request(format!("{field}: {error}")).with_details(json!({
            "field": field,
            "code": error.code(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, LocationCode};
    use rstest::rstest;

    #[rstest]
    fn in_field_overrides_the_attributed_field() {
        let error = LocationCode::new(0)
            .map_err(in_field("delivery_location"))
            .expect_err("zero is not a location code");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "delivery_location", "code": "invalid_id" }))
        );
    }
}
