use common_utils::consts::SUPPORTED_CURRENCY_SYMBOLS;

/// Local misuse detected before any request leaves the process.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConnectorError {
    #[error("Invalid params, {field_name} is a required parameter")]
    MissingRequiredField { field_name: &'static str },
    #[error("Invalid currency code `{value}`, allowed codes: {}", SUPPORTED_CURRENCY_SYMBOLS)]
    InvalidCurrency { value: String },
    #[error("Invalid amount provided for field: {field_name}")]
    InvalidAmount { field_name: &'static str },
    #[error("Invalid item list provided for field: {field_name}")]
    InvalidItems { field_name: &'static str },
    #[error("Invalid value provided for field: {field_name}")]
    InvalidParameter { field_name: &'static str },
    #[error("Item {index} is missing required key: {key}")]
    MissingItemKey { index: usize, key: &'static str },
    #[error("Access token is missing, call `auth` first or pass `access_token`")]
    MissingAccessToken,
    #[error("Invalid connector configuration: {config}")]
    InvalidConnectorConfig { config: &'static str },
    #[error("Failed to encode connector request")]
    RequestEncodingFailed,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiClientError {
    #[error("Header map construction failed")]
    HeaderMapConstructionFailed,
    #[error("Invalid proxy configuration")]
    InvalidProxyConfiguration,
    #[error("Client construction failed")]
    ClientConstructionFailed,
    #[error("Certificate decode failed")]
    CertificateDecodeFailed,
    #[error("URL encoding of request failed")]
    UrlEncodingFailed,
    #[error("Failed to send request to connector: {0}")]
    RequestNotSent(String),
    #[error("Failed to decode response")]
    ResponseDecodingFailed,
    #[error("Server responded with Request Timeout")]
    RequestTimeoutReceived,
    #[error("Connection refused or reset by the gateway")]
    ConnectionClosed,
}

impl ApiClientError {
    /// Stable identifier recorded in the `ERROR` field of a result.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}
