use common_utils::{
    consts::DEFAULT_MINOR_UNIT_SCALE,
    errors::CustomResult,
    ext_traits::ValueExt,
    request::Method,
    types::{sum_major_units, StringMajorUnit},
};
use domain_types::{
    connector_types::{
        ConnectorResult, ItemSpec, OperationDescriptor, ParamValue, Params, RequestPayload,
        WireEncoding,
    },
    errors,
    router_data::AccessToken,
};
use error_stack::{Report, ResultExt};
use hyperswitch_masking::{PeekInterface, Secret};
use interfaces::connector_types::OperationKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::utils::missing_field_err;

type Error = Report<errors::ConnectorError>;

pub const SESSION_ID: &str = "sessionId";
pub const LOCATION: &str = "location";
const FAULT: &str = "fault";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TbcInstallmentOperation {
    Auth,
    Create,
    Confirm,
    Cancel,
    Status,
    Statuses,
    StatusSync,
}

const fn merchant_call(name: &'static str, endpoint: &'static str) -> OperationDescriptor {
    OperationDescriptor::new(name, Method::Post, endpoint, WireEncoding::Json)
        .required(&["merchantKey"])
}

impl OperationKind for TbcInstallmentOperation {
    fn descriptor(self) -> OperationDescriptor {
        match self {
            Self::Auth => OperationDescriptor::new(
                "auth",
                Method::Post,
                "oauth/token",
                WireEncoding::FormUrlEncoded,
            )
            .constants(&[
                ("grant_type", "client_credentials"),
                ("scope", "online_installments"),
            ]),
            Self::Create => merchant_call("create", "v1/online-installments/applications")
                .required(&["merchantKey", "campaignId", "products"])
                .optional(&["invoiceId", "priceTotal"])
                .items(ItemSpec {
                    field: "products",
                    required_keys: &["name", "price", "quantity"],
                    amount_key: None,
                }),
            Self::Confirm => merchant_call(
                "confirm",
                "v1/online-installments/applications/{session_id}/confirm",
            ),
            Self::Cancel => merchant_call(
                "cancel",
                "v1/online-installments/applications/{session_id}/cancel",
            ),
            Self::Status => merchant_call(
                "status",
                "v1/online-installments/applications/{session_id}/status",
            ),
            Self::Statuses => merchant_call(
                "statuses",
                "v1/online-installments/merchant/applications/status-changes",
            )
            .optional(&["take"]),
            Self::StatusSync => merchant_call(
                "status_sync",
                "v1/online-installments/merchant/applications/status-changes-sync",
            )
            .required(&["merchantKey", "synchronizationRequestId"]),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TbcInstallmentApplicationRequest {
    pub merchant_key: String,
    pub campaign_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    pub price_total: StringMajorUnit,
    pub products: Vec<TbcInstallmentProduct>,
}

#[derive(Debug, Serialize)]
pub struct TbcInstallmentProduct {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i64,
}

impl TryFrom<&RequestPayload> for TbcInstallmentApplicationRequest {
    type Error = Error;

    fn try_from(payload: &RequestPayload) -> Result<Self, Self::Error> {
        let fields = &payload.fields;
        let products = fields
            .get("products")
            .and_then(ParamValue::as_items)
            .ok_or_else(missing_field_err("products"))?
            .iter()
            .map(|product| -> Result<TbcInstallmentProduct, Error> {
                let invalid = || errors::ConnectorError::InvalidItems {
                    field_name: "products",
                };
                Ok(TbcInstallmentProduct {
                    name: product.get_text("name").ok_or_else(invalid)?,
                    price: product
                        .get("price")
                        .and_then(ParamValue::as_decimal)
                        .ok_or_else(invalid)?,
                    quantity: product
                        .get("quantity")
                        .and_then(ParamValue::as_integer)
                        .ok_or_else(invalid)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let invalid_total = || errors::ConnectorError::InvalidAmount {
            field_name: "priceTotal",
        };
        let price_total = match fields.get("priceTotal") {
            Some(value) => StringMajorUnit::round_up(
                value.as_decimal().ok_or_else(invalid_total)?,
                DEFAULT_MINOR_UNIT_SCALE,
            ),
            None => {
                let lines = products
                    .iter()
                    .map(|product| {
                        product
                            .price
                            .checked_mul(Decimal::from(product.quantity))
                            .ok_or_else(invalid_total)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                sum_major_units(lines).change_context(invalid_total())?
            }
        };

        Ok(Self {
            merchant_key: fields
                .get_text("merchantKey")
                .ok_or_else(missing_field_err("merchantKey"))?,
            campaign_id: fields
                .get_text("campaignId")
                .ok_or_else(missing_field_err("campaignId"))?,
            invoice_id: fields.get_text("invoiceId"),
            price_total,
            products,
        })
    }
}

/// Token issued by the installment oauth endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthData {
    pub access_token: Secret<String>,
    pub token_type: String,
    pub scope: String,
    #[serde(deserialize_with = "string_or_number")]
    pub issued_at: String,
    pub expires_in: i64,
}

impl AuthData {
    pub fn access_token(&self) -> AccessToken {
        AccessToken::new(self.access_token.peek().clone())
    }
}

impl PartialEq for AuthData {
    fn eq(&self, other: &Self) -> bool {
        self.access_token.peek() == other.access_token.peek()
            && self.token_type == other.token_type
            && self.scope == other.scope
            && self.issued_at == other.issued_at
            && self.expires_in == other.expires_in
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

/// Values remembered between installment application calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TbcInstallmentSessionState {
    pub auth: Option<AuthData>,
    pub session_id: Option<String>,
    pub redirect_url: Option<String>,
    pub http_status_code: Option<u16>,
}

impl TbcInstallmentSessionState {
    pub(crate) fn update(&mut self, operation: TbcInstallmentOperation, result: &ConnectorResult) {
        self.http_status_code = result.status_code();

        match operation {
            TbcInstallmentOperation::Auth => {
                if result.contains_key(FAULT) {
                    return;
                }
                let parsed: CustomResult<AuthData, _> =
                    Value::Object(result.as_map().clone()).parse_value("AuthData");
                match parsed {
                    Ok(auth) => self.auth = Some(auth),
                    Err(error) => tracing::warn!(?error, "token response not cached"),
                }
            }
            TbcInstallmentOperation::Create => {
                if let Some(session_id) = result.get_string(SESSION_ID) {
                    self.session_id = Some(session_id);
                }
                if let Some(location) = result.header(LOCATION) {
                    self.redirect_url = Some(location.to_string());
                }
            }
            TbcInstallmentOperation::Confirm
            | TbcInstallmentOperation::Cancel
            | TbcInstallmentOperation::Status
            | TbcInstallmentOperation::Statuses
            | TbcInstallmentOperation::StatusSync => {}
        }
    }
}
