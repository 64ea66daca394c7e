//! Online installment applications of TBC Bank.

pub mod transformers;

use common_utils::{errors::CustomResult, request::RequestContent};
use domain_types::{
    connector_types::{ConnectorResult, ParamValue, Params, RequestPayload},
    errors,
    router_data::ClientCredentials,
    types::TransportSettings,
};
use error_stack::ResultExt;
use external_services::service::{HttpClient, TlsOptions};
use hyperswitch_masking::{ExposeInterface, Maskable, Secret};
use interfaces::{
    api::BoxedConnectorTransport,
    connector_types::{default_request_body, ConnectorCommon, ConnectorIntegration, PropertySource},
};
use transformers::TbcInstallmentApplicationRequest;
pub use transformers::{AuthData, TbcInstallmentOperation, TbcInstallmentSessionState};

use crate::utils;

pub trait TbcInstallmentCapability: Send + Sync {
    fn merchant_key(&self) -> String;

    fn campaign_id(&self) -> String;

    /// Oauth client key
    fn key(&self) -> String;

    /// Oauth client secret
    fn secret(&self) -> Secret<String>;

    /// Api root, e.g. `https://test-api.tbcbank.ge/`
    fn service_url(&self) -> String;
}

pub struct TbcInstallment<C> {
    capability: C,
    credentials: ClientCredentials,
    service_url: String,
    transport: BoxedConnectorTransport,
    state: TbcInstallmentSessionState,
}

impl<C: TbcInstallmentCapability> TbcInstallment<C> {
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
        utils::non_empty(capability.merchant_key(), "merchant_key")?;
        utils::non_empty(capability.campaign_id(), "campaign_id")?;
        let key = utils::non_empty(capability.key(), "key")?;
        let secret = utils::non_empty(capability.secret().expose(), "secret")?;
        let service_url = utils::service_url(capability.service_url(), "service_url", true)?;

        Ok(Self {
            capability,
            credentials: ClientCredentials::new(key, secret),
            service_url,
            transport,
            state: TbcInstallmentSessionState::default(),
        })
    }

    pub fn state(&self) -> &TbcInstallmentSessionState {
        &self.state
    }

    pub fn auth_data(&self) -> Option<&AuthData> {
        self.state.auth.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.state.session_id.as_deref()
    }

    /// Application page from the `Location` header of the last `create`.
    pub fn redirect_url(&self) -> Option<&str> {
        self.state.redirect_url.as_deref()
    }

    pub fn http_status_code(&self) -> Option<u16> {
        self.state.http_status_code
    }

    #[tracing::instrument(
        skip_all,
        fields(connector = "tbc_installment", operation = operation.descriptor().name)
    )]
    pub async fn execute(
        &mut self,
        operation: TbcInstallmentOperation,
        kwargs: &Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        let access_token = match operation {
            TbcInstallmentOperation::Auth => None,
            _ => {
                let cached = self.state.auth.as_ref().map(AuthData::access_token);
                Some(utils::resolve_access_token(kwargs, cached.as_ref())?)
            }
        };
        let result =
            utils::process(&*self, self.transport.as_ref(), operation, kwargs, access_token)
                .await?;
        self.state.update(operation, &result);
        Ok(result)
    }

    pub async fn auth(&mut self) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcInstallmentOperation::Auth, &Params::new())
            .await
    }

    /// Start an application; caches `sessionId` and the redirect url.
    pub async fn create(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcInstallmentOperation::Create, &kwargs).await
    }

    pub async fn confirm(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcInstallmentOperation::Confirm, &kwargs)
            .await
    }

    pub async fn cancel(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcInstallmentOperation::Cancel, &kwargs).await
    }

    pub async fn status(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcInstallmentOperation::Status, &kwargs).await
    }

    /// Applications whose status changed since the last synchronization.
    pub async fn statuses(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcInstallmentOperation::Statuses, &kwargs)
            .await
    }

    /// Acknowledge a batch returned by [`Self::statuses`].
    pub async fn status_sync(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcInstallmentOperation::StatusSync, &kwargs)
            .await
    }
}

impl<C: TbcInstallmentCapability> ConnectorCommon for TbcInstallment<C> {
    fn id(&self) -> &'static str {
        "tbc_installment"
    }

    fn base_url(&self) -> &str {
        &self.service_url
    }
}

impl<C: TbcInstallmentCapability> ConnectorIntegration<TbcInstallmentOperation>
    for TbcInstallment<C>
{
    fn get_headers(
        &self,
        operation: TbcInstallmentOperation,
        payload: &RequestPayload,
    ) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
        utils::oauth_headers(
            self,
            &self.credentials,
            operation == TbcInstallmentOperation::Auth,
            payload,
        )
    }

    fn get_request_body(
        &self,
        operation: TbcInstallmentOperation,
        payload: &RequestPayload,
    ) -> CustomResult<Option<RequestContent>, errors::ConnectorError> {
        match operation {
            TbcInstallmentOperation::Create => {
                let request = TbcInstallmentApplicationRequest::try_from(payload)?;
                Ok(Some(RequestContent::Json(Box::new(request))))
            }
            _ => default_request_body(payload),
        }
    }
}

impl<C: TbcInstallmentCapability> PropertySource for TbcInstallment<C> {
    fn property(&self, name: &str) -> Option<ParamValue> {
        match name {
            "merchantKey" => Some(self.capability.merchant_key().into()),
            "campaignId" => Some(self.capability.campaign_id().into()),
            "session_id" => self.state.session_id.clone().map(ParamValue::from),
            _ => None,
        }
    }
}

impl<C> std::fmt::Debug for TbcInstallment<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TbcInstallment")
            .field("service_url", &self.service_url)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
