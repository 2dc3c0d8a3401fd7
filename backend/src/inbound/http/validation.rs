//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::Error;
use pagination::{PageParams, PageParamsError};

/// Build a `400` error that names the offending field in `details`.
pub(crate) fn field_error(field: &'static str, message: impl std::fmt::Display) -> Error {
    Error::invalid_request(message.to_string()).with_details(json!({ "field": field }))
}

/// Interpret optional `page`/`take` query parameters.
///
/// Both must be given together; pagination is off when either is absent,
/// matching the unpaginated list responses.
pub(crate) fn pagination_params(
    page: Option<u32>,
    take: Option<u32>,
) -> Result<Option<PageParams>, Error> {
    match (page, take) {
        (Some(page), Some(take)) => PageParams::new(page, take).map(Some).map_err(|error| {
            let field = match error {
                PageParamsError::PageOutOfRange { .. } => "page",
                PageParamsError::TakeOutOfRange { .. } => "take",
            };
            field_error(field, error)
        }),
        _ => Ok(None),
    }
}

/// Validate a report year against the supported range.
pub(crate) fn report_year(year: i32) -> Result<i32, Error> {
    if (2000..=2050).contains(&year) {
        Ok(year)
    } else {
        Err(field_error(
            "year",
            "Year can't be outside the years 2000 to 2050.",
        ))
    }
}
