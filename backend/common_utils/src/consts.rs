//! Commonly used constants

/// Base64 engine used for Basic authorization credentials
pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Seconds allowed to establish a connection to a gateway
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;

/// Seconds allowed for the whole request once connected
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;

/// Fractional digits of a major-unit amount in GEL, USD and EUR
pub const DEFAULT_MINOR_UNIT_SCALE: u32 = 2;

pub const SUPPORTED_CURRENCY_SYMBOLS: &str = "GEL, USD, EUR";
