//! Installment widget of Credo Bank.
//!
//! Nothing is sent from here; the signed payload is handed back to be posted
//! by the customer's browser to [`transformers::ACTION_URL`].

pub mod transformers;

use common_utils::{errors::CustomResult, generate_order_code};
use domain_types::{
    connector_types::{ParamValue, Params},
    errors,
};
use hyperswitch_masking::{ExposeInterface, Secret};
use interfaces::connector_types::PropertySource;
pub use transformers::{CredoInstallment, CredoProduct};

use crate::utils;

pub trait CredoCapability: Send + Sync {
    fn merchant_id(&self) -> String;

    /// Shared secret appended to the product data before hashing
    fn password(&self) -> Secret<String>;
}

pub struct Credo<C> {
    capability: C,
    merchant_id: String,
    password: Secret<String>,
}

impl<C: CredoCapability> Credo<C> {
    pub fn new(capability: C) -> CustomResult<Self, errors::ConnectorError> {
        let merchant_id = utils::non_empty(capability.merchant_id(), "merchant_id")?;
        let password = utils::non_empty(capability.password().expose(), "password")?;
        Ok(Self {
            capability,
            merchant_id,
            password: Secret::new(password),
        })
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    /// Build the signed widget payload for `products`.
    #[tracing::instrument(skip_all, fields(connector = "credo", operation = "installment"))]
    pub fn installment(
        &self,
        kwargs: Params,
    ) -> CustomResult<CredoInstallment, errors::ConnectorError> {
        let payload = utils::collect_params(&transformers::INSTALLMENT, &kwargs, self)?;
        let installment = CredoInstallment::try_from_payload(
            &payload,
            self.merchant_id.clone(),
            &self.password,
        )?;
        tracing::info!(
            order_code = %installment.order_code,
            products = installment.products.len(),
            "installment payload signed"
        );
        Ok(installment)
    }
}

impl<C: CredoCapability> PropertySource for Credo<C> {
    fn property(&self, name: &str) -> Option<ParamValue> {
        match name {
            "orderCode" => Some(generate_order_code().into()),
            _ => None,
        }
    }
}

impl<C> std::fmt::Debug for Credo<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credo")
            .field("merchant_id", &self.merchant_id)
            .finish_non_exhaustive()
    }
}
