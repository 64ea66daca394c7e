use std::collections::BTreeMap;

use common_utils::{request::Method, types::StringMajorUnit};

use crate::router_data::AccessToken;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// A single caller supplied business parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Bool(bool),
    Items(Vec<Params>),
}

impl ParamValue {
    /// Scalar rendered as text, `None` for item lists.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(value) => Some(value.clone()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Decimal(value) => Some(value.to_string()),
            Self::Bool(value) => Some(value.to_string()),
            Self::Items(_) => None,
        }
    }

    /// Exact decimal view; text is parsed, never routed through a float.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(value) => Some(*value),
            Self::Integer(value) => Some(Decimal::from(*value)),
            Self::Text(value) => value.trim().parse().ok(),
            Self::Bool(_) | Self::Items(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
            Self::Decimal(value) if value.fract().is_zero() => i64::try_from(*value).ok(),
            Self::Decimal(_) | Self::Bool(_) | Self::Items(_) => None,
        }
    }

    pub fn as_items(&self) -> Option<&[Params]> {
        match self {
            Self::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(value) => Value::String(value.clone()),
            Self::Integer(value) => Value::from(*value),
            Self::Decimal(value) => Value::String(value.to_string()),
            Self::Bool(value) => Value::Bool(*value),
            Self::Items(items) => Value::Array(items.iter().map(Params::to_json).collect()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<Params>> for ParamValue {
    fn from(value: Vec<Params>) -> Self {
        Self::Items(value)
    }
}

/// Keyword arguments of a connector operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(ParamValue::as_text)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum WireEncoding {
    FormUrlEncoded,
    Json,
    Multipart,
    Query,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldTransform {
    /// Symbol or numeric code to ISO 4217 numeric code.
    CurrencyCode,
    /// Major-unit decimal to integer minor units.
    MinorUnits,
}

/// Shape of a basket field such as `items` or `products`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemSpec {
    pub field: &'static str,
    pub required_keys: &'static [&'static str],
    /// Key summed into the payable total, if the gateway expects one.
    pub amount_key: Option<&'static str>,
}

/// Static description of one gateway operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub method: Method,
    /// Relative to the service url; `{field}` segments are filled from resolved params.
    pub endpoint: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub constants: &'static [(&'static str, &'static str)],
    pub transforms: &'static [(&'static str, FieldTransform)],
    pub items: Option<ItemSpec>,
    pub encoding: WireEncoding,
}

impl OperationDescriptor {
    pub const fn new(
        name: &'static str,
        method: Method,
        endpoint: &'static str,
        encoding: WireEncoding,
    ) -> Self {
        Self {
            name,
            method,
            endpoint,
            required: &[],
            optional: &[],
            constants: &[],
            transforms: &[],
            items: None,
            encoding,
        }
    }

    pub const fn required(mut self, fields: &'static [&'static str]) -> Self {
        self.required = fields;
        self
    }

    pub const fn optional(mut self, fields: &'static [&'static str]) -> Self {
        self.optional = fields;
        self
    }

    pub const fn constants(mut self, constants: &'static [(&'static str, &'static str)]) -> Self {
        self.constants = constants;
        self
    }

    pub const fn transforms(
        mut self,
        transforms: &'static [(&'static str, FieldTransform)],
    ) -> Self {
        self.transforms = transforms;
        self
    }

    pub const fn items(mut self, items: ItemSpec) -> Self {
        self.items = Some(items);
        self
    }

    /// Names of the `{placeholder}` segments of the endpoint template.
    pub fn path_placeholders(&self) -> Vec<&'static str> {
        let mut placeholders = Vec::new();
        let mut rest = self.endpoint;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            placeholders.push(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }
        placeholders
    }
}

/// Validated and transformed parameters of one call, never reused.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestPayload {
    pub method: Method,
    /// Endpoint with every placeholder substituted.
    pub endpoint: String,
    pub fields: Params,
    pub encoding: WireEncoding,
    /// Sum of the basket amounts, when the operation declares one.
    pub total: Option<StringMajorUnit>,
    /// Bearer token the call is authorized with, if any.
    pub access_token: Option<AccessToken>,
}

/// Uniform result of every gateway operation.
///
/// Holds the decoded body as a JSON object plus the captured response
/// headers. Transport failures and undecodable bodies are recorded here as
/// data instead of being returned as errors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectorResult {
    body: Map<String, Value>,
    headers: BTreeMap<String, String>,
}

impl ConnectorResult {
    pub const HTTP_STATUS_CODE: &'static str = "HTTP_STATUS_CODE";
    pub const RESULT: &'static str = "RESULT";
    pub const ERROR: &'static str = "ERROR";
    pub const DECODE_ERROR: &'static str = "DECODE_ERROR";

    pub fn from_map(body: Map<String, Value>) -> Self {
        Self {
            body,
            headers: BTreeMap::new(),
        }
    }

    /// Result of a call that never produced an HTTP response.
    pub fn transport_failure(kind: &str, description: impl Into<String>) -> Self {
        let mut result = Self::default();
        result.insert(Self::RESULT, Value::String(description.into()));
        result.insert(Self::ERROR, Value::String(kind.to_string()));
        result
    }

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.insert(Self::HTTP_STATUS_CODE, Value::from(status_code));
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.into())),
        );
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.body.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// String field, numbers are rendered as text.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.body.get(key)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.body.contains_key(key)
    }

    pub fn status_code(&self) -> Option<u16> {
        self.body
            .get(Self::HTTP_STATUS_CODE)
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
    }

    pub fn is_success(&self) -> bool {
        self.status_code()
            .is_some_and(|code| (200..300).contains(&code))
    }

    /// Network failure recorded instead of a response.
    pub fn transport_error(&self) -> Option<&str> {
        self.body.get(Self::ERROR).and_then(Value::as_str)
    }

    pub fn is_decode_error(&self) -> bool {
        self.body
            .get(Self::DECODE_ERROR)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Response header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.body
    }
}
