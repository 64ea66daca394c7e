//! Card gateway of TBC Bank.
//!
//! A single merchant handler url accepts form encoded commands over mutual TLS
//! and answers with `KEY: value` lines.

pub mod transformers;

use common_utils::errors::CustomResult;
use domain_types::{
    connector_types::{ConnectorResult, ParamValue, Params},
    errors,
    types::{CertificatePair, TransportSettings},
};
use error_stack::ResultExt;
use external_services::service::{HttpClient, TlsOptions};
use interfaces::{
    api::BoxedConnectorTransport,
    connector_types::{ConnectorCommon, ConnectorIntegration, PropertySource},
};
pub use transformers::{TbcOperation, TbcSessionState};

use crate::utils;

/// Settings the integrator provides for the card gateway.
pub trait TbcCapability: Send + Sync {
    /// Merchant description shown to the card holder
    fn description(&self) -> String;

    /// Client ip address sent as `client_ip_addr`
    fn client_ip(&self) -> String;

    /// Client certificate and key, PEM encoded
    fn cert(&self) -> CertificatePair;

    /// Merchant handler url
    fn service_url(&self) -> String;

    /// The test and production handlers present certificates that do not
    /// chain to a public root.
    fn accept_invalid_certs(&self) -> bool {
        true
    }
}

pub struct Tbc<C> {
    capability: C,
    service_url: String,
    transport: BoxedConnectorTransport,
    state: TbcSessionState,
}

impl<C: TbcCapability> Tbc<C> {
    /// Validate the capability set and open a mutual TLS client.
    pub fn new(
        capability: C,
        settings: &TransportSettings,
    ) -> CustomResult<Self, errors::ConnectorError> {
        let tls = TlsOptions {
            identity: Some(capability.cert()),
            accept_invalid_certs: capability.accept_invalid_certs(),
        };
        let client = HttpClient::new(settings, &tls)
            .change_context(errors::ConnectorError::InvalidConnectorConfig { config: "cert" })?;
        Self::with_transport(capability, Box::new(client))
    }

    /// Same validation as [`Tbc::new`], sending through `transport`.
    pub fn with_transport(
        capability: C,
        transport: BoxedConnectorTransport,
    ) -> CustomResult<Self, errors::ConnectorError> {
        utils::non_empty(capability.description(), "description")?;
        utils::non_empty(capability.client_ip(), "client_ip")?;
        let service_url = utils::service_url(capability.service_url(), "service_url", false)?;
        Ok(Self {
            capability,
            service_url,
            transport,
            state: TbcSessionState::default(),
        })
    }

    pub fn state(&self) -> &TbcSessionState {
        &self.state
    }

    /// Last transaction id received from a transaction creating command.
    pub fn trans_id(&self) -> Option<&str> {
        self.state.trans_id.as_deref()
    }

    pub fn refund_trans_id(&self) -> Option<&str> {
        self.state.refund_trans_id.as_deref()
    }

    #[tracing::instrument(
        skip_all,
        fields(connector = "tbc", operation = operation.descriptor().name)
    )]
    pub async fn execute(
        &mut self,
        operation: TbcOperation,
        kwargs: &Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        let result =
            utils::process(&*self, self.transport.as_ref(), operation, kwargs, None).await?;
        self.state.update(operation, kwargs, &result);
        Ok(result)
    }

    /// Register an SMS transaction and cache its `TRANSACTION_ID`.
    pub async fn get_trans_id(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::GetTransId, &kwargs).await
    }

    /// `trans_id` defaults to the cached transaction.
    pub async fn check_trans_status(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::CheckTransStatus, &kwargs).await
    }

    pub async fn reversal_trans(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::ReversalTrans, &kwargs).await
    }

    pub async fn refund_trans(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::RefundTrans, &kwargs).await
    }

    /// Register a DMS authorization and cache its `TRANSACTION_ID`.
    pub async fn pre_auth_trans(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::PreAuthTrans, &kwargs).await
    }

    pub async fn confirm_pre_auth_trans(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::ConfirmPreAuthTrans, &kwargs).await
    }

    pub async fn card_register_with_deduction(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::CardRegisterWithDeduction, &kwargs)
            .await
    }

    pub async fn card_register_with_zero_auth(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::CardRegisterWithZeroAuth, &kwargs)
            .await
    }

    pub async fn recurring_payment(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::RecurringPayment, &kwargs).await
    }

    /// Credit the card of an earlier transaction and cache `REFUND_TRANS_ID`.
    pub async fn refund_to_debit_card(
        &mut self,
        kwargs: Params,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::RefundToDebitCard, &kwargs).await
    }

    pub async fn end_of_business_day(
        &mut self,
    ) -> CustomResult<ConnectorResult, errors::ConnectorError> {
        self.execute(TbcOperation::EndOfBusinessDay, &Params::new())
            .await
    }
}

impl<C: TbcCapability> ConnectorCommon for Tbc<C> {
    fn id(&self) -> &'static str {
        "tbc"
    }

    fn common_get_content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded"
    }

    fn base_url(&self) -> &str {
        &self.service_url
    }
}

impl<C: TbcCapability> ConnectorIntegration<TbcOperation> for Tbc<C> {}

impl<C: TbcCapability> PropertySource for Tbc<C> {
    fn property(&self, name: &str) -> Option<ParamValue> {
        match name {
            "description" => Some(self.capability.description().into()),
            "client_ip_addr" => Some(self.capability.client_ip().into()),
            "trans_id" => self.state.trans_id.clone().map(ParamValue::from),
            _ => None,
        }
    }
}

impl<C> std::fmt::Debug for Tbc<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tbc")
            .field("service_url", &self.service_url)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
