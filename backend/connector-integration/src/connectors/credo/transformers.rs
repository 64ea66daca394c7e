use common_utils::{request::Method, to_minor_units};
use domain_types::{
    connector_types::{ItemSpec, OperationDescriptor, ParamValue, Params, RequestPayload, WireEncoding},
    errors,
};
use error_stack::{Report, ResultExt};
use hyperswitch_masking::{PeekInterface, Secret};
use serde::Serialize;

use crate::utils::missing_field_err;

type Error = Report<errors::ConnectorError>;

pub const PRODUCT_KEYS: &[&str] = &["id", "title", "amount", "price", "type"];

/// Page the signed payload is posted to from the merchant's checkout form.
pub const ACTION_URL: &str = "https://ganvadeba.credo.ge/widget/index.php";

pub const INSTALLMENT: OperationDescriptor =
    OperationDescriptor::new("installment", Method::Post, ACTION_URL, WireEncoding::Json)
        .required(&["orderCode", "products"])
        .optional(&["clientFullName", "mobile", "email", "factAddress"])
        .constants(&[("installmentLength", "1")])
        .items(ItemSpec {
            field: "products",
            required_keys: PRODUCT_KEYS,
            amount_key: None,
        });

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredoInstallment {
    pub merchant_id: String,
    pub order_code: String,
    pub check: String,
    pub products: Vec<CredoProduct>,
    pub installment_length: i64,
    pub client_full_name: String,
    pub mobile: String,
    pub email: String,
    pub fact_address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CredoProduct {
    pub id: String,
    pub title: String,
    pub amount: String,
    /// Unit price in tetri
    pub price: String,
    #[serde(rename = "type")]
    pub product_type: String,
}

impl CredoProduct {
    fn try_from_item(item: &Params) -> Result<Self, Error> {
        let text = |key: &'static str| item.get_text(key).ok_or_else(missing_field_err(key));
        let price = item
            .get("price")
            .and_then(ParamValue::as_decimal)
            .ok_or(errors::ConnectorError::InvalidAmount { field_name: "price" })?;
        let price = to_minor_units(price)
            .change_context(errors::ConnectorError::InvalidAmount { field_name: "price" })?;

        Ok(Self {
            id: text("id")?,
            title: text("title")?,
            amount: text("amount")?,
            price: price.get_amount_as_i64().to_string(),
            product_type: text("type")?,
        })
    }

    fn check_segment(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.id, self.title, self.amount, self.price, self.product_type
        )
    }
}

/// Md5 hex digest of every product concatenated in order, followed by the
/// merchant password.
pub fn check(products: &[CredoProduct], password: &Secret<String>) -> String {
    let mut data: String = products.iter().map(CredoProduct::check_segment).collect();
    data.push_str(password.peek());
    format!("{:x}", md5::compute(data.as_bytes()))
}

impl CredoInstallment {
    pub(crate) fn try_from_payload(
        payload: &RequestPayload,
        merchant_id: String,
        password: &Secret<String>,
    ) -> Result<Self, Error> {
        let fields = &payload.fields;
        let products = fields
            .get("products")
            .and_then(ParamValue::as_items)
            .ok_or_else(missing_field_err("products"))?
            .iter()
            .map(CredoProduct::try_from_item)
            .collect::<Result<Vec<_>, Error>>()?;
        let installment_length = fields
            .get("installmentLength")
            .and_then(ParamValue::as_integer)
            .filter(|months| *months > 0)
            .ok_or(errors::ConnectorError::InvalidParameter {
                field_name: "installmentLength",
            })?;
        let optional = |name: &str| fields.get_text(name).unwrap_or_default();

        Ok(Self {
            merchant_id,
            order_code: fields
                .get_text("orderCode")
                .ok_or_else(missing_field_err("orderCode"))?,
            check: check(&products, password),
            products,
            installment_length,
            client_full_name: optional("clientFullName"),
            mobile: optional("mobile"),
            email: optional("email"),
            fact_address: optional("factAddress"),
        })
    }
}
