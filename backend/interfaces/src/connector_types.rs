use std::collections::BTreeMap;

use common_utils::{
    errors::CustomResult,
    request::{MultipartData, Request, RequestBuilder, RequestContent},
};
use domain_types::{
    connector_types::{OperationDescriptor, ParamValue, Params, RequestPayload, WireEncoding},
    errors::ConnectorError,
};
use error_stack::ResultExt;
use hyperswitch_masking::Maskable;

pub mod headers {
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_TYPE: &str = "Content-Type";
}

/// A named operation of a connector, resolved once to its static descriptor.
pub trait OperationKind: Copy + std::fmt::Debug + Send + Sync {
    fn descriptor(self) -> OperationDescriptor;
}

/// Looks up a value the connector itself can supply for a parameter, either
/// from the integrator's capability set or from cached session state.
pub trait PropertySource {
    fn property(&self, name: &str) -> Option<ParamValue>;
}

pub trait ConnectorCommon {
    /// Name of the connector, used in logs
    fn id(&self) -> &'static str;

    fn common_get_content_type(&self) -> &'static str {
        "application/json"
    }

    /// Service url every endpoint is appended to, ending in `/`
    fn base_url(&self) -> &str;
}

pub trait ConnectorIntegration<Op: OperationKind>: ConnectorCommon + Sync {
    fn get_headers(
        &self,
        _operation: Op,
        payload: &RequestPayload,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, ConnectorError> {
        Ok(content_type_for(payload.encoding, self.common_get_content_type())
            .map(|content_type| (headers::CONTENT_TYPE.to_string(), content_type.to_string().into()))
            .into_iter()
            .collect())
    }

    fn get_url(&self, _operation: Op, payload: &RequestPayload) -> CustomResult<String, ConnectorError> {
        let url = format!("{}{}", self.base_url(), payload.endpoint);
        if payload.encoding != WireEncoding::Query || payload.fields.is_empty() {
            return Ok(url);
        }
        let query = serde_urlencoded::to_string(flatten_fields(&payload.fields))
            .change_context(ConnectorError::RequestEncodingFailed)
            .attach_printable("Failed to encode query parameters")?;
        Ok(format!("{url}?{query}"))
    }

    fn get_request_body(
        &self,
        _operation: Op,
        payload: &RequestPayload,
    ) -> CustomResult<Option<RequestContent>, ConnectorError> {
        default_request_body(payload)
    }

    fn build_request(&self, operation: Op, payload: &RequestPayload) -> CustomResult<Request, ConnectorError> {
        Ok(RequestBuilder::new()
            .method(payload.method)
            .url(&self.get_url(operation, payload)?)
            .attach_default_headers()
            .headers(self.get_headers(operation, payload)?)
            .set_optional_body(self.get_request_body(operation, payload)?)
            .build())
    }
}

/// Content type matching `encoding`; `default` covers bodiless query calls.
///
/// Multipart bodies carry their own boundary in the content type.
pub fn content_type_for(encoding: WireEncoding, default: &'static str) -> Option<&'static str> {
    match encoding {
        WireEncoding::FormUrlEncoded => Some("application/x-www-form-urlencoded"),
        WireEncoding::Json => Some("application/json"),
        WireEncoding::Multipart => None,
        WireEncoding::Query => Some(default),
    }
}

/// Scalar fields as text; item lists are not representable in flat encodings.
pub fn flatten_fields(fields: &Params) -> BTreeMap<String, String> {
    fields
        .iter()
        .filter_map(|(key, value)| value.as_text().map(|text| (key.clone(), text)))
        .collect()
}

/// Body encoded straight from the resolved fields, per the payload encoding.
pub fn default_request_body(
    payload: &RequestPayload,
) -> CustomResult<Option<RequestContent>, ConnectorError> {
    Ok(match payload.encoding {
        WireEncoding::Json => Some(RequestContent::Json(Box::new(payload.fields.to_json()))),
        WireEncoding::FormUrlEncoded => Some(RequestContent::FormUrlEncoded(Box::new(
            flatten_fields(&payload.fields),
        ))),
        WireEncoding::Multipart => {
            let mut data = MultipartData::new();
            for (name, value) in flatten_fields(&payload.fields) {
                data.add_text(name, value);
            }
            Some(RequestContent::FormData(data))
        }
        WireEncoding::Query => None,
    })
}
