//! iPay checkout and installment loans of Bank of Georgia.

pub mod transformers;

use common_utils::{errors::CustomResult, generate_order_code, request::RequestContent};
use domain_types::{
    connector_types::{ConnectorResult, ParamValue, Params, RequestPayload},
    errors,
    router_data::{AccessToken, ClientCredentials},
    types::TransportSettings,
};
use error_stack::ResultExt;
use external_services::service::{HttpClient, TlsOptions};
use hyperswitch_masking::{ExposeInterface, Maskable, Secret};
use interfaces::{
    api::BoxedConnectorTransport,
    connector_types::{default_request_body, ConnectorCommon, ConnectorIntegration, PropertySource},
};
pub use transformers::{BogOperation, BogSessionState};
use transformers::{BogCheckoutRequest, BogInstallmentCheckoutRequest};

use crate::utils;

/// Settings the integrator provides for iPay.
pub trait BogCapability: Send + Sync {
    fn client_id(&self) -> String;

    fn secret_key(&self) -> Secret<String>;

    /// Api root, e.g. `https://ipay.ge/opay/api/v1/`
    fn service_url(&self) -> String;

    /// Where the customer returns after approving or cancelling
    fn redirect_url(&self) -> String;
}

pub struct Bog<C> {
    capability: C,
    credentials: ClientCredentials,
    service_url: String,
    transport: BoxedConnectorTransport,
    state: BogSessionState,
}

impl<C: BogCapability> Bog<C> {
    pub fn new(
        capability: C,
        settings: &TransportSettings,
    ) -> CustomResult<Self, errors::ConnectorError> {
        let client = HttpClient::new(settings, &TlsOptions::default()).change_context(
            errors::ConnectorError::InvalidConnectorConfig { config: "transport" },
        )?;
        Self::with_transport(capability, Box::new(client))
    }

    pub fn with_transport(
        capability: C,
        transport: BoxedConnectorTransport,
    ) -> CustomResult<Self, errors::ConnectorError> {
        let client_id = utils::non_empty(capability.client_id(), "client_id")?;
        let secret_key = utils::non_empty(capability.secret_key().expose(), "secret_key")?;
        let credentials = ClientCredentials {
            client_id: Secret::new(client_id),
            client_secret: Secret::new(secret_key),
        };
        let service_url = utils::service_url(capability.service_url(), "service_url", true)?;
        utils::service_url(capability.redirect_url(), "redirect_url", false)?;

        Ok(Self {
            capability,
            credentials,
            service_url,
            transport,
            state: BogSessionState::default(),
        })
    }

    pub fn state(&self) -> &BogSessionState {
        &self.state
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.state.access_token.as_ref()
    }

    pub fn order_id(&self) -> Option<&str> {
        self.state.order_id.as_deref()
    }

    pub fn order_status(&self) -> Option<&str> {
        self.state.order_status.as_deref()
    }

    /// Approval link of the last created order.
    pub fn rel_approve(&self) -> Option<&str> {
        self.state.rel_approve.as_deref()
    }

    #[tracing::instrument(
        skip_all,
        fields(connector = "bog", operation = operation.descriptor().name)
    )]
    pub async fn execute(
        &mut self,
        operation: BogOperation,
        kwargs: &Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        let access_token = match operation {
            BogOperation::Auth => None,
            _ => Some(utils::resolve_access_token(
                kwargs,
                self.state.access_token.as_ref(),
            )?),
        };
        let result =
            utils::process(&*self, self.transport.as_ref(), operation, kwargs, access_token)
                .await?;
        self.state.update(operation, &result);
        Ok(result)
    }

    /// Exchange the client credentials for a bearer token and cache it.
    pub async fn auth(&mut self) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(BogOperation::Auth, &Params::new()).await
    }

    /// Create an order; caches `order_id`, its status and the approve link.
    pub async fn checkout(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(BogOperation::Checkout, &kwargs).await
    }

    pub async fn refund(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(BogOperation::Refund, &kwargs).await
    }

    pub async fn checkout_status(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(BogOperation::CheckoutStatus, &kwargs).await
    }

    pub async fn checkout_details(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(BogOperation::CheckoutDetails, &kwargs).await
    }

    pub async fn payment_details(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(BogOperation::PaymentDetails, &kwargs).await
    }
}

impl<C: BogCapability> ConnectorCommon for Bog<C> {
    fn id(&self) -> &'static str {
        "bog"
    }

    fn base_url(&self) -> &str {
        &self.service_url
    }
}

impl<C: BogCapability> ConnectorIntegration<BogOperation> for Bog<C> {
    fn get_headers(
        &self,
        operation: BogOperation,
        payload: &RequestPayload,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        utils::oauth_headers(
            self,
            &self.credentials,
            operation == BogOperation::Auth,
            payload,
        )
    }

    fn get_request_body(
        &self,
        operation: BogOperation,
        payload: &RequestPayload,
    ) -> CustomResult<Option<RequestContent>, errors::ConnectorError> {
        match operation {
            BogOperation::Checkout => {
                let request = BogCheckoutRequest::try_from(payload)?;
                Ok(Some(RequestContent::Json(Box::new(request))))
            }
            BogOperation::InstallmentCheckout => {
                let request = BogInstallmentCheckoutRequest::try_from(payload)?;
                Ok(Some(RequestContent::Json(Box::new(request))))
            }
            _ => default_request_body(payload),
        }
    }
}

impl<C: BogCapability> PropertySource for Bog<C> {
    fn property(&self, name: &str) -> Option<ParamValue> {
        match name {
            "redirect_url" | "success_redirect_url" | "fail_redirect_url"
            | "reject_redirect_url" => Some(self.capability.redirect_url().into()),
            "shop_order_id" => Some(generate_order_code().into()),
            "client_id" => Some(self.capability.client_id().into()),
            "order_id" => self.state.order_id.clone().map(ParamValue::from),
            _ => None,
        }
    }
}

impl<C> std::fmt::Debug for Bog<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bog")
            .field("service_url", &self.service_url)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Installment loans through the same iPay account.
///
/// Shares authentication and session state with [`Bog`]; order lookups and
/// refunds go through the iPay endpoints.
#[derive(Debug)]
pub struct BogInstallment<C> {
    ipay: Bog<C>,
}

impl<C: BogCapability> BogInstallment<C> {
    pub fn new(
        capability: C,
        settings: &TransportSettings,
    ) -> CustomResult<Self, errors::ConnectorError> {
        Bog::new(capability, settings).map(|ipay| Self { ipay })
    }

    pub fn with_transport(
        capability: C,
        transport: BoxedConnectorTransport,
    ) -> CustomResult<Self, errors::ConnectorError> {
        Bog::with_transport(capability, transport).map(|ipay| Self { ipay })
    }

    pub fn state(&self) -> &BogSessionState {
        self.ipay.state()
    }

    /// The underlying iPay client, for the operations both share.
    pub fn ipay(&mut self) -> &mut Bog<C> {
        &mut self.ipay
    }

    pub fn rel_approve(&self) -> Option<&str> {
        self.ipay.rel_approve()
    }

    pub async fn auth(&mut self) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.ipay.auth().await
    }

    /// Create a loan order; the `target` link leads to the application page.
    pub async fn checkout(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.ipay
            .execute(BogOperation::InstallmentCheckout, &kwargs)
            .await
    }

    /// Monthly payment options for `amount`, under `RESULT` when available.
    pub async fn calculate(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.ipay
            .execute(BogOperation::InstallmentCalculate, &kwargs)
            .await
            .map(transformers::discounts_result)
    }
}
