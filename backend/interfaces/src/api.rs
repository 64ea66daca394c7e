use common_utils::{errors::CustomResult, request::Request};
use domain_types::{errors::ApiClientError, router_response_types::Response};

/// Sends one request to a gateway.
///
/// Every HTTP status, including 4xx and 5xx, comes back as `Ok(Response)`.
/// `Err` is reserved for failures where no response arrived at all. The
/// request is attempted exactly once.
#[async_trait::async_trait]
pub trait ConnectorTransport: Send + Sync {
    async fn send(&self, request: Request) -> CustomResult<Response, ApiClientError>;
}

pub type BoxedConnectorTransport = Box<dyn ConnectorTransport>;
