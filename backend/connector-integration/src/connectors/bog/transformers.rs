use common_utils::{request::Method, types::StringMajorUnit};
use domain_types::{
    connector_types::{
        ConnectorResult, ItemSpec, OperationDescriptor, ParamValue, Params, RequestPayload,
        WireEncoding,
    },
    errors,
    router_data::AccessToken,
};
use error_stack::Report;
use interfaces::connector_types::OperationKind;
use serde::Serialize;
use serde_json::Value;

use crate::utils::missing_field_err;

type Error = Report<errors::ConnectorError>;

pub const CHECKOUT_ITEM_KEYS: &[&str] = &["amount", "description", "quantity", "product_id"];
pub const CART_ITEM_KEYS: &[&str] = &[
    "total_item_amount",
    "item_description",
    "total_item_qty",
    "item_vendor_code",
    "product_image_url",
    "item_site_detail_url",
];

/// Link relation of the payment page in an iPay checkout response.
pub const REL_APPROVE: &str = "approve";
/// Link relation of the loan application page in an installment response.
pub const REL_TARGET: &str = "target";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BogOperation {
    Auth,
    Checkout,
    Refund,
    CheckoutStatus,
    CheckoutDetails,
    PaymentDetails,
    InstallmentCheckout,
    InstallmentCalculate,
}

impl OperationKind for BogOperation {
    fn descriptor(self) -> OperationDescriptor {
        match self {
            Self::Auth => OperationDescriptor::new(
                "auth",
                Method::Post,
                "oauth2/token",
                WireEncoding::FormUrlEncoded,
            )
            .constants(&[("grant_type", "client_credentials")]),
            Self::Checkout => OperationDescriptor::new(
                "checkout",
                Method::Post,
                "checkout/orders",
                WireEncoding::Json,
            )
            .required(&["redirect_url", "shop_order_id", "items"])
            .optional(&["locale"])
            .constants(&[("intent", "CAPTURE"), ("currency_code", "GEL")])
            .items(ItemSpec {
                field: "items",
                required_keys: CHECKOUT_ITEM_KEYS,
                amount_key: Some("amount"),
            }),
            Self::Refund => OperationDescriptor::new(
                "refund",
                Method::Post,
                "checkout/refund",
                WireEncoding::Json,
            )
            .required(&["order_id", "amount"]),
            Self::CheckoutStatus => OperationDescriptor::new(
                "checkout_status",
                Method::Get,
                "checkout/orders/status/{order_id}",
                WireEncoding::Query,
            ),
            Self::CheckoutDetails => OperationDescriptor::new(
                "checkout_details",
                Method::Get,
                "checkout/orders/{order_id}",
                WireEncoding::Query,
            ),
            Self::PaymentDetails => OperationDescriptor::new(
                "payment_details",
                Method::Get,
                "checkout/payment/{order_id}",
                WireEncoding::Query,
            ),
            Self::InstallmentCheckout => OperationDescriptor::new(
                "installment_checkout",
                Method::Post,
                "installment/checkout",
                WireEncoding::Json,
            )
            .required(&[
                "installment_month",
                "shop_order_id",
                "success_redirect_url",
                "fail_redirect_url",
                "reject_redirect_url",
                "cart_items",
            ])
            .constants(&[
                ("intent", "LOAN"),
                ("installment_type", "STANDARD"),
                ("locale", "ka"),
                ("currency_code", "GEL"),
            ])
            .items(ItemSpec {
                field: "cart_items",
                required_keys: CART_ITEM_KEYS,
                amount_key: Some("total_item_amount"),
            }),
            Self::InstallmentCalculate => OperationDescriptor::new(
                "installment_calculate",
                Method::Post,
                "services/installment/calculate",
                WireEncoding::Json,
            )
            .required(&["amount", "client_id"]),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BogCheckoutRequest {
    pub intent: String,
    pub redirect_url: String,
    pub shop_order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub items: Vec<BogItem>,
    pub purchase_units: Vec<BogPurchaseUnit>,
}

#[derive(Debug, Serialize)]
pub struct BogItem {
    pub amount: String,
    pub description: String,
    pub quantity: i64,
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct BogPurchaseUnit {
    pub amount: BogAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BogAmount {
    pub currency_code: String,
    pub value: StringMajorUnit,
}

impl TryFrom<&RequestPayload> for BogCheckoutRequest {
    type Error = Error;

    fn try_from(payload: &RequestPayload) -> Result<Self, Self::Error> {
        let fields = &payload.fields;
        let items = items(fields, "items")?
            .iter()
            .map(|item| -> Result<BogItem, Error> {
                Ok(BogItem {
                    amount: item_text(item, "amount")?,
                    description: item_text(item, "description")?,
                    quantity: item_integer(item, "items", "quantity")?,
                    product_id: item_text(item, "product_id")?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            intent: text(fields, "intent")?,
            redirect_url: text(fields, "redirect_url")?,
            shop_order_id: text(fields, "shop_order_id")?,
            locale: fields.get_text("locale"),
            items,
            purchase_units: vec![BogPurchaseUnit {
                amount: purchase_amount(payload, "items")?,
                industry_type: Some("ECOMMERCE".to_string()),
            }],
        })
    }
}

#[derive(Debug, Serialize)]
pub struct BogInstallmentCheckoutRequest {
    pub intent: String,
    pub installment_month: i64,
    pub installment_type: String,
    pub shop_order_id: String,
    pub success_redirect_url: String,
    pub fail_redirect_url: String,
    pub reject_redirect_url: String,
    pub validate_items: bool,
    pub locale: String,
    pub purchase_units: Vec<BogPurchaseUnit>,
    pub cart_items: Vec<BogCartItem>,
}

#[derive(Debug, Serialize)]
pub struct BogCartItem {
    pub total_item_amount: String,
    pub item_description: String,
    pub total_item_qty: i64,
    pub item_vendor_code: String,
    pub product_image_url: String,
    pub item_site_detail_url: String,
}

impl TryFrom<&RequestPayload> for BogInstallmentCheckoutRequest {
    type Error = Error;

    fn try_from(payload: &RequestPayload) -> Result<Self, Self::Error> {
        let fields = &payload.fields;
        let cart_items = items(fields, "cart_items")?
            .iter()
            .map(|item| -> Result<BogCartItem, Error> {
                Ok(BogCartItem {
                    total_item_amount: item_text(item, "total_item_amount")?,
                    item_description: item_text(item, "item_description")?,
                    total_item_qty: item_integer(item, "cart_items", "total_item_qty")?,
                    item_vendor_code: item_text(item, "item_vendor_code")?,
                    product_image_url: item_text(item, "product_image_url")?,
                    item_site_detail_url: item_text(item, "item_site_detail_url")?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            intent: text(fields, "intent")?,
            installment_month: fields
                .get("installment_month")
                .and_then(ParamValue::as_integer)
                .ok_or(errors::ConnectorError::InvalidParameter {
                    field_name: "installment_month",
                })?,
            installment_type: text(fields, "installment_type")?,
            shop_order_id: text(fields, "shop_order_id")?,
            success_redirect_url: text(fields, "success_redirect_url")?,
            fail_redirect_url: text(fields, "fail_redirect_url")?,
            reject_redirect_url: text(fields, "reject_redirect_url")?,
            validate_items: true,
            locale: text(fields, "locale")?,
            purchase_units: vec![BogPurchaseUnit {
                amount: purchase_amount(payload, "cart_items")?,
                industry_type: None,
            }],
            cart_items,
        })
    }
}

fn text(fields: &Params, name: &'static str) -> Result<String, Error> {
    fields.get_text(name).ok_or_else(missing_field_err(name))
}

fn items<'a>(fields: &'a Params, name: &'static str) -> Result<&'a [Params], Error> {
    fields
        .get(name)
        .and_then(ParamValue::as_items)
        .ok_or_else(missing_field_err(name))
}

fn item_text(item: &Params, key: &'static str) -> Result<String, Error> {
    item.get_text(key).ok_or_else(missing_field_err(key))
}

fn item_integer(item: &Params, field: &'static str, key: &'static str) -> Result<i64, Error> {
    item.get(key)
        .and_then(ParamValue::as_integer)
        .ok_or_else(|| errors::ConnectorError::InvalidItems { field_name: field }.into())
}

fn purchase_amount(payload: &RequestPayload, field: &'static str) -> Result<BogAmount, Error> {
    Ok(BogAmount {
        currency_code: text(&payload.fields, "currency_code")?,
        value: payload
            .total
            .clone()
            .ok_or(errors::ConnectorError::InvalidItems { field_name: field })?,
    })
}

/// Session values shared by the iPay checkout and installment clients.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BogSessionState {
    pub access_token: Option<AccessToken>,
    pub order_id: Option<String>,
    pub order_status: Option<String>,
    pub rel_approve: Option<String>,
}

impl BogSessionState {
    pub(crate) fn update(&mut self, operation: BogOperation, result: &ConnectorResult) {
        match operation {
            BogOperation::Auth => {
                if let Some(token) = result.get_string("access_token") {
                    self.access_token = Some(AccessToken::new(token));
                }
            }
            BogOperation::Checkout => self.update_order(result, REL_APPROVE),
            BogOperation::InstallmentCheckout => self.update_order(result, REL_TARGET),
            BogOperation::Refund
            | BogOperation::CheckoutStatus
            | BogOperation::CheckoutDetails
            | BogOperation::PaymentDetails
            | BogOperation::InstallmentCalculate => {}
        }
    }

    fn update_order(&mut self, result: &ConnectorResult, rel: &str) {
        if let Some(order_id) = result.get_string("order_id") {
            self.order_id = Some(order_id);
        }
        if let Some(status) = result.get_string("status") {
            self.order_status = Some(status);
        }
        if let Some(href) = find_link(result, rel) {
            self.rel_approve = Some(href);
        }
    }
}

/// `href` of the first hyperlink descriptor with relation `rel`.
pub fn find_link(result: &ConnectorResult, rel: &str) -> Option<String> {
    result
        .get("links")?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some(rel))?
        .get("href")?
        .as_str()
        .map(str::to_string)
}

/// Replace the calculator response with its `discounts` list when present.
pub fn discounts_result(result: ConnectorResult) -> ConnectorResult {
    let Some(discounts) = result.get("discounts").cloned() else {
        return result;
    };
    let mut discounts_only = ConnectorResult::default();
    if let Some(status_code) = result.status_code() {
        discounts_only = discounts_only.with_status_code(status_code);
    }
    discounts_only.insert(ConnectorResult::RESULT, discounts);
    discounts_only
}
