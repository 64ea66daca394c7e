//! Common utilities for the gateway connectors

pub mod consts;
pub mod errors;
pub mod ext_traits;
pub mod request;
pub mod types;

pub use errors::{CustomResult, ParsingError, ValidationError};
pub use request::{Method, Request, RequestContent};
pub use types::{normalize_currency, to_minor_units, MinorUnit, StringMajorUnit};

pub mod date_time {
    use time::OffsetDateTime;

    /// Return the UNIX timestamp of the current date and time in UTC
    pub fn now_unix_timestamp() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }
}

/// Order code derived from the current UNIX timestamp.
///
/// Two calls within the same second yield the same code, and every new second
/// yields a new one, so callers that need idempotent order creation must pass
/// their own identifier instead.
#[inline]
pub fn generate_order_code() -> String {
    date_time::now_unix_timestamp().to_string()
}
