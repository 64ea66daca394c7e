//! Turns raw gateway responses into a [`ConnectorResult`].
//!
//! Three body formats are understood: JSON objects, the `KEY: value` line
//! format of the legacy card gateway, and anything else as raw text. No input
//! makes normalization fail; undecodable bodies are flagged with
//! [`ConnectorResult::DECODE_ERROR`].

use domain_types::{connector_types::ConnectorResult, router_response_types::Response};
use serde_json::{Map, Value};

/// Normalize a full response, keeping its headers on the result.
pub fn parse_response(response: &Response) -> ConnectorResult {
    let headers = response
        .headers
        .iter()
        .flat_map(|headers| headers.iter())
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect::<Vec<_>>();

    parse(
        &response.response,
        response.content_type(),
        response.status_code,
    )
    .with_headers(headers)
}

/// Decode `body` trying JSON, then the legacy line format, then raw text.
///
/// A declared JSON content type skips the line format. The status code is
/// always attached under [`ConnectorResult::HTTP_STATUS_CODE`].
pub fn parse(body: &[u8], content_type: Option<&str>, status_code: u16) -> ConnectorResult {
    let is_success = (200..300).contains(&status_code);
    let declared_json = content_type.is_some_and(|content_type| content_type.contains("json"));

    let result = match parse_json_with_bom_handling(body) {
        Ok(Value::Object(map)) => ConnectorResult::from_map(map),
        Ok(other) => single_value(other),
        Err(_) => match strip_bom_and_convert_to_string(body) {
            Some(text) if text.trim().is_empty() => {
                if is_success {
                    ConnectorResult::default()
                } else {
                    single_value(Value::String(error_reason(status_code)))
                }
            }
            Some(text) if !is_success => single_value(Value::String(text)),
            Some(text) if declared_json => decode_failure(text),
            Some(text) => match parse_key_value_lines(&text) {
                Some(map) => ConnectorResult::from_map(map),
                None => decode_failure(text),
            },
            None => decode_failure(String::from_utf8_lossy(body).into_owned()),
        },
    };

    result.with_status_code(status_code)
}

/// Parse `KEY: value` lines; blank lines are skipped and any other line
/// makes the whole body unparseable. `KEY:` with nothing after it maps to an
/// empty value.
pub fn parse_key_value_lines(text: &str) -> Option<Map<String, Value>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let line = line.trim_end_matches('\r');
            line.split_once(": ")
                .or_else(|| line.trim_end().strip_suffix(':').map(|key| (key, "")))
                .map(|(key, value)| {
                    (key.trim().to_string(), Value::String(value.trim().to_string()))
                })
        })
        .collect()
}

fn single_value(value: Value) -> ConnectorResult {
    let mut result = ConnectorResult::default();
    result.insert(ConnectorResult::RESULT, value);
    result
}

fn decode_failure(text: String) -> ConnectorResult {
    tracing::warn!(body_length = text.len(), "Unable to decode connector response body");
    let mut result = single_value(Value::String(text));
    result.insert(ConnectorResult::DECODE_ERROR, Value::Bool(true));
    result
}

fn error_reason(status_code: u16) -> String {
    match status_code {
        400 => "Bad request, missing parameters".to_string(),
        401 => "Unauthorized, missing basic authorization credentials".to_string(),
        403 => "Forbidden".to_string(),
        405 => "Method Not Allowed".to_string(),
        406 => "Method Not Acceptable".to_string(),
        415 => "Unsupported Media Type".to_string(),
        _ => http::StatusCode::from_u16(status_code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown status")
            .to_string(),
    }
}

/// Helper function to remove BOM from response bytes and convert to string
pub(crate) fn strip_bom_and_convert_to_string(response_bytes: &[u8]) -> Option<String> {
    String::from_utf8(response_bytes.to_vec())
        .ok()
        .map(|s| s.trim_start_matches('\u{FEFF}').to_string())
}

/// Helper function to parse JSON from response bytes with BOM handling
fn parse_json_with_bom_handling(response_bytes: &[u8]) -> Result<Value, serde_json::Error> {
    match serde_json::from_slice::<Value>(response_bytes) {
        Ok(value) => Ok(value),
        Err(_) => {
            let cleaned_response = response_bytes
                .strip_prefix(&[0xEF, 0xBB, 0xBF])
                .unwrap_or(response_bytes);
            serde_json::from_slice::<Value>(cleaned_response)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn status_code(result: &ConnectorResult) -> Option<u16> {
        result.status_code()
    }

    #[test]
    fn json_object_round_trips_with_status_code() {
        let body = json!({
            "id": "93ba3fe0-1a6f-4b8c-8ad0-1b3c2d4e5f60",
            "status": "CREATED",
            "links": [{"href": "https://ipay.ge/?order_id=1", "rel": "approve", "method": "REDIRECT"}],
            "amount": 12.5
        });
        let result = parse(body.to_string().as_bytes(), Some("application/json"), 200);

        let mut expected = body.as_object().cloned().unwrap_or_default();
        expected.insert(ConnectorResult::HTTP_STATUS_CODE.to_string(), json!(200));
        assert_eq!(result.as_map(), &expected);
    }

    #[test]
    fn legacy_line_format_is_split_on_first_separator() {
        let result = parse(b"TRANSACTION_ID: abc123", Some("text/plain"), 200);
        assert_eq!(result.get_string("TRANSACTION_ID").as_deref(), Some("abc123"));
        assert_eq!(status_code(&result), Some(200));
        assert!(!result.is_decode_error());

        let result = parse(
            b"RESULT: OK\nRESULT_CODE: 000\n\nRRN: 123456789012\nCARD_NUMBER: 4***********1111\nMESSAGE: a: b\n",
            None,
            200,
        );
        assert_eq!(result.get_string("RESULT").as_deref(), Some("OK"));
        assert_eq!(result.get_string("RESULT_CODE").as_deref(), Some("000"));
        assert_eq!(result.get_string("MESSAGE").as_deref(), Some("a: b"));
    }

    #[test]
    fn empty_values_keep_the_rest_of_the_body() {
        let result = parse(
            b"RESULT: OK\r\nRESULT_CODE: 000\r\nRRN: \r\nAPPROVAL_CODE:\r\n3DSECURE: ATTEMPTED\r\n",
            Some("text/plain"),
            200,
        );
        assert!(!result.is_decode_error());
        assert_eq!(result.get_string("RESULT").as_deref(), Some("OK"));
        assert_eq!(result.get_string("RESULT_CODE").as_deref(), Some("000"));
        assert_eq!(result.get_string("RRN").as_deref(), Some(""));
        assert_eq!(result.get_string("APPROVAL_CODE").as_deref(), Some(""));
        assert_eq!(result.get_string("3DSECURE").as_deref(), Some("ATTEMPTED"));
    }

    #[test]
    fn unparseable_text_falls_back_to_raw_body() {
        let result = parse(b"<html>maintenance</html>", Some("text/html"), 200);
        assert!(result.is_decode_error());
        assert_eq!(
            result.get_string(ConnectorResult::RESULT).as_deref(),
            Some("<html>maintenance</html>")
        );
        assert_eq!(status_code(&result), Some(200));
    }

    #[test]
    fn declared_json_skips_line_format() {
        let result = parse(b"KEY: value", Some("application/json; charset=utf-8"), 200);
        assert!(result.is_decode_error());
    }

    #[test]
    fn invalid_utf8_is_flagged_not_raised() {
        let result = parse(&[0xff, 0xfe, 0x00], None, 200);
        assert!(result.is_decode_error());
        assert_eq!(status_code(&result), Some(200));
    }

    #[test]
    fn bom_prefixed_json_is_decoded() {
        let mut body = vec![0xEF, 0xBB, 0xBF];
        body.extend_from_slice(br#"{"access_token": "token"}"#);
        let result = parse(&body, Some("application/json"), 200);
        assert_eq!(result.get_string("access_token").as_deref(), Some("token"));
    }

    #[test]
    fn error_status_keeps_raw_text() {
        let result = parse(b"error: wrong trans_id", Some("text/plain"), 500);
        assert_eq!(
            result.get_string(ConnectorResult::RESULT).as_deref(),
            Some("error: wrong trans_id")
        );
        assert_eq!(status_code(&result), Some(500));
        assert!(!result.is_decode_error());
    }

    #[test]
    fn empty_error_bodies_get_a_reason() {
        let result = parse(b"", None, 401);
        assert_eq!(
            result.get_string(ConnectorResult::RESULT).as_deref(),
            Some("Unauthorized, missing basic authorization credentials")
        );
        let result = parse(b"", None, 404);
        assert_eq!(result.get_string(ConnectorResult::RESULT).as_deref(), Some("Not Found"));
    }

    #[test]
    fn error_json_objects_are_kept() {
        let body = br#"{"fault": {"faultstring": "Invalid ApiKey", "detail": {"errorcode": "oauth.v2.InvalidApiKey"}}}"#;
        let result = parse(body, Some("application/json"), 401);
        assert!(result.contains_key("fault"));
        assert_eq!(status_code(&result), Some(401));
    }

    #[test]
    fn empty_success_body_is_only_status() {
        let result = parse(b"", None, 200);
        assert_eq!(result.as_map().len(), 1);
        assert_eq!(status_code(&result), Some(200));
    }

    #[test]
    fn non_object_json_is_wrapped() {
        let result = parse(br#"[{"month": 3}]"#, Some("application/json"), 200);
        assert_eq!(result.get(ConnectorResult::RESULT), Some(&json!([{"month": 3}])));
    }
}
