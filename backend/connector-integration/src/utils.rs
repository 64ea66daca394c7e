use common_utils::{
    errors::CustomResult,
    types::{normalize_currency, sum_major_units, to_minor_units},
};
use domain_types::{
    connector_types::{
        ConnectorResult, FieldTransform, ItemSpec, OperationDescriptor, ParamValue, Params,
        RequestPayload,
    },
    errors,
    router_data::{AccessToken, ClientCredentials},
};
use error_stack::{report, Report, ResultExt};
use external_services::service::{execute_connector_processing_step, Tag};
use hyperswitch_masking::Maskable;
use interfaces::{
    api::ConnectorTransport,
    connector_types::{
        content_type_for, headers, ConnectorCommon, ConnectorIntegration, OperationKind,
        PropertySource,
    },
};

type Error = Report<errors::ConnectorError>;

/// Kwarg that overrides the cached bearer token for a single call.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

pub fn missing_field_err(
    message: &'static str,
) -> Box<dyn Fn() -> Report<errors::ConnectorError> + 'static> {
    Box::new(move || {
        errors::ConnectorError::MissingRequiredField {
            field_name: message,
        }
        .into()
    })
}

/// Resolve every declared field of `descriptor` into a fresh payload.
///
/// Each field is looked up as an explicit kwarg first, then as a property of
/// `source`, then as a per-operation constant. Currency and amount fields are
/// normalized, item lists are checked key by key and endpoint placeholders are
/// substituted. Kwargs the operation does not declare are ignored.
pub fn collect_params(
    descriptor: &OperationDescriptor,
    kwargs: &Params,
    source: &dyn PropertySource,
) -> CustomResult<RequestPayload, errors::ConnectorError> {
    let resolve = |name: &str| {
        kwargs
            .get(name)
            .cloned()
            .or_else(|| source.property(name))
    };

    let mut fields = Params::new();
    for &name in descriptor.required {
        let value = resolve(name).ok_or_else(missing_field_err(name))?;
        fields.insert(name, value);
    }
    for &name in descriptor.optional {
        if let Some(value) = resolve(name) {
            fields.insert(name, value);
        }
    }
    for &(name, constant) in descriptor.constants {
        if !fields.contains_key(name) {
            fields.insert(name, resolve(name).unwrap_or_else(|| constant.into()));
        }
    }

    for &(name, transform) in descriptor.transforms {
        if let Some(value) = fields.remove(name) {
            fields.insert(name, apply_transform(name, transform, &value)?);
        }
    }

    let total = descriptor
        .items
        .map(|spec| validate_items(&spec, &fields))
        .transpose()?
        .flatten();

    let mut endpoint = descriptor.endpoint.to_string();
    for name in descriptor.path_placeholders() {
        let value = fields
            .remove(name)
            .or_else(|| resolve(name))
            .and_then(|value| value.as_text())
            .filter(|value| !value.is_empty())
            .ok_or_else(missing_field_err(name))?;
        endpoint = endpoint.replace(&format!("{{{name}}}"), &value);
    }

    Ok(RequestPayload {
        method: descriptor.method,
        endpoint,
        fields,
        encoding: descriptor.encoding,
        total,
        access_token: None,
    })
}

fn apply_transform(
    name: &'static str,
    transform: FieldTransform,
    value: &ParamValue,
) -> Result<ParamValue, Error> {
    match transform {
        FieldTransform::CurrencyCode => {
            let code = value.as_text().unwrap_or_default();
            normalize_currency(&code)
                .map(ParamValue::from)
                .change_context(errors::ConnectorError::InvalidCurrency { value: code })
        }
        FieldTransform::MinorUnits => {
            let amount = value
                .as_decimal()
                .ok_or(errors::ConnectorError::InvalidAmount { field_name: name })?;
            to_minor_units(amount)
                .map(|minor| ParamValue::Integer(minor.get_amount_as_i64()))
                .change_context(errors::ConnectorError::InvalidAmount { field_name: name })
        }
    }
}

/// Check every item of a basket field for its mandatory keys and sum the
/// amounts when the basket carries the payable total.
pub fn validate_items(
    spec: &ItemSpec,
    fields: &Params,
) -> CustomResult<Option<common_utils::types::StringMajorUnit>, errors::ConnectorError> {
    let Some(value) = fields.get(spec.field) else {
        return Ok(None);
    };
    let items = value
        .as_items()
        .filter(|items| !items.is_empty())
        .ok_or(errors::ConnectorError::InvalidItems {
            field_name: spec.field,
        })?;

    for (index, item) in items.iter().enumerate() {
        if let Some(key) = spec
            .required_keys
            .iter()
            .copied()
            .find(|key| !item.contains_key(key))
        {
            return Err(report!(errors::ConnectorError::MissingItemKey { index, key }));
        }
    }

    let Some(amount_key) = spec.amount_key else {
        return Ok(None);
    };
    let amounts = items
        .iter()
        .map(|item| {
            item.get(amount_key)
                .and_then(ParamValue::as_decimal)
                .ok_or(errors::ConnectorError::InvalidAmount {
                    field_name: amount_key,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    sum_major_units(amounts)
        .map(Some)
        .change_context(errors::ConnectorError::InvalidAmount {
            field_name: amount_key,
        })
}

/// Token passed explicitly for this call, otherwise the one cached by `auth`.
pub fn resolve_access_token(
    kwargs: &Params,
    cached: Option<&AccessToken>,
) -> CustomResult<AccessToken, errors::ConnectorError> {
    kwargs
        .get_text(ACCESS_TOKEN_PARAM)
        .filter(|token| !token.is_empty())
        .map(AccessToken::new)
        .or_else(|| cached.cloned())
        .ok_or_else(|| report!(errors::ConnectorError::MissingAccessToken))
}

/// Headers of an oauth-protected gateway: `Basic` client credentials on the
/// token request, the payload's bearer token on every other call.
pub(crate) fn oauth_headers(
    connector: &dyn ConnectorCommon,
    credentials: &ClientCredentials,
    token_request: bool,
    payload: &RequestPayload,
) -> CustomResult<Vec<(String, Maskable<String>)>, errors::ConnectorError> {
    let authorization = if token_request {
        credentials.generate_authorization_value()
    } else {
        payload
            .access_token
            .as_ref()
            .map(AccessToken::authorization_value)
            .ok_or_else(|| report!(errors::ConnectorError::MissingAccessToken))?
    };

    let mut header = vec![(
        headers::AUTHORIZATION.to_string(),
        Maskable::new_masked(authorization),
    )];
    if let Some(content_type) =
        content_type_for(payload.encoding, connector.common_get_content_type())
    {
        header.push((
            headers::CONTENT_TYPE.to_string(),
            content_type.to_string().into(),
        ));
    }
    Ok(header)
}

/// Validate, build, send and normalize one operation.
pub(crate) async fn process<Op, C>(
    connector: &C,
    transport: &dyn ConnectorTransport,
    operation: Op,
    kwargs: &Params,
    access_token: Option<AccessToken>,
) -> CustomResult<ConnectorResult, errors::ConnectorError>
where
    Op: OperationKind,
    C: ConnectorIntegration<Op> + PropertySource,
{
    let descriptor = operation.descriptor();
    let mut payload = collect_params(&descriptor, kwargs, connector).inspect_err(|error| {
        tracing::warn!(
            tag = ?Tag::ValidationFailure,
            operation = descriptor.name,
            error = %error.current_context(),
            "request rejected before sending"
        );
    })?;
    payload.access_token = access_token;
    execute_connector_processing_step(transport, connector, operation, &payload).await
}

/// Reject an empty capability value.
pub(crate) fn non_empty(value: String, config: &'static str) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(
            report!(errors::ConnectorError::InvalidConnectorConfig { config })
                .attach_printable(format!("`{config}` must not be empty")),
        );
    }
    Ok(value)
}

/// Parse an absolute http(s) service url, optionally forcing a trailing `/`
/// so relative endpoints can be appended.
pub(crate) fn service_url(
    value: String,
    config: &'static str,
    trailing_slash: bool,
) -> Result<String, Error> {
    let url = url::Url::parse(value.trim())
        .change_context(errors::ConnectorError::InvalidConnectorConfig { config })
        .attach_printable_lazy(|| format!("`{config}` is not a valid url"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(
            report!(errors::ConnectorError::InvalidConnectorConfig { config })
                .attach_printable("service url must use http or https"),
        );
    }

    let mut url = value.trim().to_string();
    if trailing_slash && !url.ends_with('/') {
        url.push('/');
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use common_utils::request::Method;
    use domain_types::connector_types::WireEncoding;
    use rust_decimal::Decimal;

    use super::*;

    struct Capability;

    impl PropertySource for Capability {
        fn property(&self, name: &str) -> Option<ParamValue> {
            match name {
                "description" => Some("merchant description".into()),
                "client_ip_addr" => Some("127.0.0.1".into()),
                "order_id" => Some("cached-order".into()),
                _ => None,
            }
        }
    }

    const CHARGE: OperationDescriptor =
        OperationDescriptor::new("charge", Method::Post, "", WireEncoding::FormUrlEncoded)
            .required(&["amount", "currency", "client_ip_addr", "description"])
            .constants(&[("command", "v"), ("language", "ka")])
            .transforms(&[
                ("amount", FieldTransform::MinorUnits),
                ("currency", FieldTransform::CurrencyCode),
            ]);

    const BASKET: OperationDescriptor =
        OperationDescriptor::new("basket", Method::Post, "orders", WireEncoding::Json)
            .required(&["items"])
            .optional(&["locale"])
            .items(ItemSpec {
                field: "items",
                required_keys: &["amount", "description", "quantity", "product_id"],
                amount_key: Some("amount"),
            });

    const DETAILS: OperationDescriptor = OperationDescriptor::new(
        "details",
        Method::Get,
        "checkout/orders/{order_id}",
        WireEncoding::Query,
    );

    fn item(amount: &str) -> Params {
        Params::new()
            .with("amount", amount)
            .with("description", "phone")
            .with("quantity", 1)
            .with("product_id", "123")
    }

    #[test]
    fn missing_required_field_is_named() {
        let kwargs = Params::new().with("amount", "23.50");
        let err = collect_params(&CHARGE, &kwargs, &Capability).unwrap_err();
        assert_eq!(
            err.current_context(),
            &errors::ConnectorError::MissingRequiredField {
                field_name: "currency"
            }
        );
    }

    #[test]
    fn fields_resolve_from_kwargs_properties_and_constants() {
        let kwargs = Params::new()
            .with("amount", Decimal::new(2350, 2))
            .with("currency", "GEL")
            .with("description", "order 17")
            .with("unknown", "ignored");
        let payload = collect_params(&CHARGE, &kwargs, &Capability).unwrap();

        assert_eq!(payload.fields.get("amount"), Some(&ParamValue::Integer(2350)));
        assert_eq!(payload.fields.get_text("currency").as_deref(), Some("981"));
        assert_eq!(payload.fields.get_text("description").as_deref(), Some("order 17"));
        assert_eq!(payload.fields.get_text("client_ip_addr").as_deref(), Some("127.0.0.1"));
        assert_eq!(payload.fields.get_text("command").as_deref(), Some("v"));
        assert_eq!(payload.fields.get_text("language").as_deref(), Some("ka"));
        assert!(!payload.fields.contains_key("unknown"));
        assert_eq!(payload.method, Method::Post);
    }

    #[test]
    fn kwarg_overrides_constant() {
        let kwargs = Params::new()
            .with("amount", "1")
            .with("currency", "USD")
            .with("language", "en");
        let payload = collect_params(&CHARGE, &kwargs, &Capability).unwrap();
        assert_eq!(payload.fields.get_text("language").as_deref(), Some("en"));
        assert_eq!(payload.fields.get_text("currency").as_deref(), Some("840"));
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let kwargs = Params::new().with("amount", "1").with("currency", "GBP");
        let err = collect_params(&CHARGE, &kwargs, &Capability).unwrap_err();
        assert_eq!(
            err.current_context(),
            &errors::ConnectorError::InvalidCurrency {
                value: "GBP".to_string()
            }
        );
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let kwargs = Params::new().with("amount", "twelve").with("currency", "GEL");
        let err = collect_params(&CHARGE, &kwargs, &Capability).unwrap_err();
        assert_eq!(
            err.current_context(),
            &errors::ConnectorError::InvalidAmount { field_name: "amount" }
        );
    }

    #[test]
    fn item_missing_key_reports_index_and_key() {
        let incomplete = Params::new()
            .with("amount", "3.00")
            .with("description", "case")
            .with("product_id", "9");
        let kwargs = Params::new().with("items", vec![item("10.00"), incomplete]);
        let err = collect_params(&BASKET, &kwargs, &Capability).unwrap_err();
        assert_eq!(
            err.current_context(),
            &errors::ConnectorError::MissingItemKey {
                index: 1,
                key: "quantity"
            }
        );
    }

    #[test]
    fn empty_basket_is_invalid() {
        let kwargs = Params::new().with("items", Vec::<Params>::new());
        let err = collect_params(&BASKET, &kwargs, &Capability).unwrap_err();
        assert_eq!(
            err.current_context(),
            &errors::ConnectorError::InvalidItems { field_name: "items" }
        );
    }

    #[test]
    fn basket_total_is_exact_sum() {
        let kwargs = Params::new().with("items", vec![item("10.10"), item("0.20"), item("4.455")]);
        let payload = collect_params(&BASKET, &kwargs, &Capability).unwrap();
        assert_eq!(
            payload.total.map(|total| total.get_amount_as_string()).as_deref(),
            Some("14.76")
        );
    }

    #[test]
    fn placeholder_falls_back_to_property_and_leaves_body() {
        let payload = collect_params(&DETAILS, &Params::new(), &Capability).unwrap();
        assert_eq!(payload.endpoint, "checkout/orders/cached-order");
        assert!(payload.fields.is_empty());

        let kwargs = Params::new().with("order_id", "explicit");
        let payload = collect_params(&DETAILS, &kwargs, &Capability).unwrap();
        assert_eq!(payload.endpoint, "checkout/orders/explicit");
    }

    #[test]
    fn explicit_token_wins_over_cached() {
        let cached = AccessToken::new("cached");
        let kwargs = Params::new().with(ACCESS_TOKEN_PARAM, "explicit");
        assert_eq!(
            resolve_access_token(&kwargs, Some(&cached)).unwrap(),
            AccessToken::new("explicit")
        );
        assert_eq!(
            resolve_access_token(&Params::new(), Some(&cached)).unwrap(),
            cached
        );
        assert_eq!(
            resolve_access_token(&Params::new(), None)
                .unwrap_err()
                .current_context(),
            &errors::ConnectorError::MissingAccessToken
        );
    }

    #[test]
    fn service_url_is_validated() {
        assert_eq!(
            service_url("https://api.example.ge/v1".to_string(), "service_url", true).unwrap(),
            "https://api.example.ge/v1/"
        );
        assert!(service_url("not a url".to_string(), "service_url", false).is_err());
        assert!(service_url("ftp://files.example.ge".to_string(), "service_url", false).is_err());
        assert!(non_empty("  ".to_string(), "description").is_err());
    }

    #[test]
    fn token_request_uses_basic_and_others_bearer() {
        struct Gateway;

        impl ConnectorCommon for Gateway {
            fn id(&self) -> &'static str {
                "gateway"
            }

            fn base_url(&self) -> &str {
                "https://api.example.ge/"
            }
        }

        let credentials = ClientCredentials::new("ipay-client", "s3cret");
        let payload = |encoding: WireEncoding, access_token: Option<AccessToken>| RequestPayload {
            method: Method::Post,
            endpoint: "oauth2/token".to_string(),
            fields: Params::new(),
            encoding,
            total: None,
            access_token,
        };
        let as_text = |headers: Vec<(String, Maskable<String>)>| {
            headers
                .into_iter()
                .map(|(name, value)| (name, value.into_inner()))
                .collect::<Vec<_>>()
        };

        let token = oauth_headers(
            &Gateway,
            &credentials,
            true,
            &payload(WireEncoding::FormUrlEncoded, None),
        )
        .unwrap();
        assert_eq!(
            as_text(token),
            vec![
                (
                    "Authorization".to_string(),
                    "Basic aXBheS1jbGllbnQ6czNjcmV0".to_string()
                ),
                (
                    "Content-Type".to_string(),
                    "application/x-www-form-urlencoded".to_string()
                ),
            ]
        );

        let call = oauth_headers(
            &Gateway,
            &credentials,
            false,
            &payload(WireEncoding::Json, Some(AccessToken::new("abc"))),
        )
        .unwrap();
        assert_eq!(
            as_text(call),
            vec![
                ("Authorization".to_string(), "Bearer abc".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );

        let err = oauth_headers(
            &Gateway,
            &credentials,
            false,
            &payload(WireEncoding::Query, None),
        )
        .unwrap_err();
        assert_eq!(
            err.current_context(),
            &errors::ConnectorError::MissingAccessToken
        );
    }
}
