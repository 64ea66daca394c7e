use std::str::FromStr;

use common_utils::{
    errors::CustomResult,
    request::{Headers, Method, MultipartData, Request, RequestContent},
};
use domain_types::{
    connector_types::{ConnectorResult, RequestPayload},
    errors::{ApiClientError, ConnectorError},
    router_response_types::Response,
    types::{CertificatePair, TransportSettings},
};
use error_stack::{report, ResultExt};
use hyperswitch_masking::Maskable;
use interfaces::{
    api::ConnectorTransport,
    connector_types::{ConnectorIntegration, OperationKind},
};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::field::Empty;

use crate::normalizer;

/// TLS options of one gateway client.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Client certificate presented for mutual TLS
    pub identity: Option<CertificatePair>,
    /// Skip verification of the gateway's server certificate
    pub accept_invalid_certs: bool,
}

/// [`ConnectorTransport`] backed by a single reusable [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(settings: &TransportSettings, tls: &TlsOptions) -> CustomResult<Self, ApiClientError> {
        create_client(settings, tls).map(|client| Self { client })
    }
}

#[async_trait::async_trait]
impl ConnectorTransport for HttpClient {
    async fn send(&self, request: Request) -> CustomResult<Response, ApiClientError> {
        call_connector_api(&self.client, request).await
    }
}

/// Build, send and normalize one connector call.
///
/// Only request construction can fail. A transport failure is recorded in the
/// returned [`ConnectorResult`] and never retried.
#[tracing::instrument(
    skip_all,
    fields(
        connector = connector.id(),
        operation = ?operation,
        request.method = Empty,
        request.url = Empty,
        request.body = Empty,
        response.status_code = Empty,
        latency = Empty,
    )
)]
pub async fn execute_connector_processing_step<Op, C>(
    transport: &dyn ConnectorTransport,
    connector: &C,
    operation: Op,
    payload: &RequestPayload,
) -> CustomResult<ConnectorResult, ConnectorError>
where
    Op: OperationKind,
    C: ConnectorIntegration<Op>,
{
    let start = tokio::time::Instant::now();
    let request = connector.build_request(operation, payload)?;

    let masked_headers = request
        .headers
        .iter()
        .fold(serde_json::Map::new(), |mut acc, (k, v)| {
            let value = match v {
                Maskable::Masked(_) => Value::String("*** alloc::string::String ***".to_string()),
                Maskable::Normal(iv) => Value::String(iv.to_owned()),
            };
            acc.insert(k.clone(), value);
            acc
        });
    let masked_request = request
        .body
        .as_ref()
        .map(RequestContent::masked_value)
        .unwrap_or(Value::Null);
    tracing::info!(headers = %Value::Object(masked_headers), request = %masked_request, "request of connector");

    let span = tracing::Span::current();
    span.record("request.url", tracing::field::display(&request.url));
    span.record("request.method", tracing::field::display(request.method));
    span.record("request.body", tracing::field::display(&masked_request));

    let result = match transport.send(request).await {
        Ok(response) => {
            span.record("response.status_code", response.status_code);
            normalizer::parse_response(&response)
        }
        Err(error) => {
            let context = error.current_context();
            error_log(
                "REQUEST_FAILURE",
                &json!({ "kind": context.kind(), "error": format!("{error:?}") }),
            );
            ConnectorResult::transport_failure(context.kind(), context.to_string())
        }
    };

    let latency = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    span.record("latency", latency);
    tracing::info!(tag = ?Tag::OutgoingApi, log_type = "api", "Outgoing Request completed");
    Ok(result)
}

pub async fn call_connector_api(
    client: &Client,
    request: Request,
) -> CustomResult<Response, ApiClientError> {
    let url = reqwest::Url::parse(&request.url).change_context(ApiClientError::UrlEncodingFailed)?;
    let headers = request.headers.construct_header_map()?;

    let request = match request.method {
        Method::Get => client.get(url),
        Method::Post => {
            let client = client.post(url);
            match request.body {
                Some(RequestContent::Json(payload)) => client.json(&payload),
                Some(RequestContent::FormUrlEncoded(payload)) => client.form(&payload),
                Some(RequestContent::FormData(form)) => client.multipart(into_multipart_form(form)),
                None => client,
            }
        }
    }
    .add_headers(headers);

    let response = request.send().await.map_err(|error| {
        let api_error = match error {
            error if error.is_timeout() => ApiClientError::RequestTimeoutReceived,
            error if error.is_connect() => ApiClientError::ConnectionClosed,
            error => ApiClientError::RequestNotSent(error.to_string()),
        };
        info_log(
            "REQUEST_FAILURE",
            &json!("Unable to send request to connector."),
        );
        report!(api_error)
    });

    handle_response(response).await
}

fn into_multipart_form(data: MultipartData) -> reqwest::multipart::Form {
    data.parts
        .into_iter()
        .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
            form.text(name, value)
        })
}

pub fn create_client(
    settings: &TransportSettings,
    tls: &TlsOptions,
) -> CustomResult<Client, ApiClientError> {
    let mut client_builder = get_client_builder(settings)?;

    if let Some(certificate) = tls.identity.as_ref() {
        let identity = create_identity_from_certificate_and_key(certificate)?;
        client_builder = client_builder.identity(identity).use_rustls_tls();
    }

    client_builder
        .danger_accept_invalid_certs(tls.accept_invalid_certs)
        .build()
        .change_context(ApiClientError::ClientConstructionFailed)
        .inspect_err(|err| {
            info_log(
                "ERROR",
                &json!(format!("Failed to construct client. Error: {:?}", err)),
            );
        })
}

fn get_client_builder(
    settings: &TransportSettings,
) -> CustomResult<reqwest::ClientBuilder, ApiClientError> {
    let proxy_config = &settings.proxy;
    let mut client_builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.read_timeout());

    if let Some(idle_timeout) = proxy_config.idle_pool_connection_timeout {
        client_builder =
            client_builder.pool_idle_timeout(std::time::Duration::from_secs(idle_timeout));
    }

    if !proxy_config.is_proxy_configured() {
        return Ok(client_builder);
    }

    let bypass = reqwest::NoProxy::from_string(&proxy_config.bypass_proxy_urls.join(","));

    // Proxy all HTTPS traffic through the configured HTTPS proxy
    if let Some(url) = proxy_config.https_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::https(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .attach_printable("HTTPS proxy configuration error")?
                .no_proxy(bypass.clone()),
        );
    }

    // Proxy all HTTP traffic through the configured HTTP proxy
    if let Some(url) = proxy_config.http_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::http(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .attach_printable("HTTP proxy configuration error")?
                .no_proxy(bypass),
        );
    }

    Ok(client_builder)
}

/// Read the PEM certificate and key files into a client identity.
pub fn create_identity_from_certificate_and_key(
    certificate: &CertificatePair,
) -> CustomResult<reqwest::Identity, ApiClientError> {
    let read = |path: &std::path::Path| {
        std::fs::read_to_string(path)
            .change_context(ApiClientError::CertificateDecodeFailed)
            .attach_printable_lazy(|| format!("Unable to read {}", path.display()))
    };
    let certificate_key = read(&certificate.key_path)?;
    let certificate_pem = read(&certificate.cert_path)?;

    let key_chain = format!("{certificate_key}\n{certificate_pem}");
    reqwest::Identity::from_pem(key_chain.as_bytes())
        .change_context(ApiClientError::CertificateDecodeFailed)
        .attach_printable("Certificate pair is not a valid PEM identity")
}

async fn handle_response(
    response: CustomResult<reqwest::Response, ApiClientError>,
) -> CustomResult<Response, ApiClientError> {
    let response = response?;
    let status_code = response.status().as_u16();
    let headers = Some(response.headers().to_owned());

    if !(200..300).contains(&status_code) {
        info_log(
            "UNSUCCESSFUL_RESPONSE",
            &json!({ "status_code": status_code }),
        );
    }

    let response = response.bytes().await.map_err(|error| {
        let api_error = if error.is_timeout() {
            ApiClientError::RequestTimeoutReceived
        } else {
            ApiClientError::ResponseDecodingFailed
        };
        report!(error).change_context(api_error)
    })?;

    Ok(Response {
        headers,
        response,
        status_code,
    })
}

pub(super) trait HeaderExt {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError>;
}

impl HeaderExt for Headers {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError> {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        self.into_iter().try_fold(
            HeaderMap::new(),
            |mut header_map, (header_name, header_value)| {
                let header_name = HeaderName::from_str(&header_name)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                let header_value = header_value.into_inner();
                let header_value = HeaderValue::from_str(&header_value)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                header_map.append(header_name, header_value);
                Ok(header_map)
            },
        )
    }
}

pub(super) trait RequestBuilderExt {
    fn add_headers(self, headers: reqwest::header::HeaderMap) -> Self;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn add_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self = self.headers(headers);
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Tag {
    /// Local validation rejected a call before it was sent.
    ValidationFailure,
    /// Api Outgoing Request
    OutgoingApi,
}

#[inline]
pub fn info_log(action: &str, message: &Value) {
    tracing::info!(tags = %action, json_value= %message);
}

#[inline]
pub fn error_log(action: &str, message: &Value) {
    tracing::error!(tags = %action, json_value= %message);
}

