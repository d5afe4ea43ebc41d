//! Response decoding shared by every operation.
//!
//! Each operation ends the same way: check the HTTP status, turn an error
//! envelope into [`ClientError::Server`], and for successful calls either
//! hand back the raw body (EXPORT), nothing (mutations), or a value projected
//! out of `{"response": {"result": ...}}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{Action, ClientError, Result};
use reportclient_core::lenient;

#[derive(Deserialize)]
struct ErrorEnvelope {
    response: ErrorResponse,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(deserialize_with = "lenient::integer")]
    code: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    message: String,
}

/// Remove one level of backslash escaping: `\x` becomes `x`, `\\` becomes `\`
pub fn unescape(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut bytes = body.iter();
    while let Some(&b) = bytes.next() {
        if b == b'\\' {
            if let Some(&next) = bytes.next() {
                out.push(next);
            }
        } else {
            out.push(b);
        }
    }
    out
}

/// Parse a body as JSON, retrying once on the unescaped body
pub fn parse_json<T: DeserializeOwned>(action: Action, body: &[u8]) -> Result<T> {
    match serde_json::from_slice(body) {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::warn!(%action, error = %first, "response is not valid JSON, retrying unescaped");
            serde_json::from_slice(&unescape(body)).map_err(|_| ClientError::Parse { action })
        }
    }
}

/// Fail with the service's error envelope unless the status is 200
pub fn check_status(action: Action, status: u16, body: &[u8]) -> Result<()> {
    if status == 200 {
        return Ok(());
    }

    let envelope: ErrorEnvelope = parse_json(action, body)?;
    let error = envelope.response.error;
    tracing::debug!(%action, status, code = error.code, "server returned error envelope");

    Err(ClientError::Server {
        code: error.code,
        message: error.message,
        action,
        status,
    })
}

/// Take the value at `path` below `response.result`; an empty path yields the whole result
pub fn project<T: DeserializeOwned>(action: Action, mut document: Value, path: &[&str]) -> Result<T> {
    let pointer = std::iter::once("response")
        .chain(std::iter::once("result"))
        .chain(path.iter().copied())
        .fold(String::new(), |mut acc, key| {
            acc.push('/');
            acc.push_str(key);
            acc
        });

    let value = document
        .pointer_mut(&pointer)
        .map(Value::take)
        .ok_or(ClientError::Parse { action })?;

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(%action, error = %e, "result did not match expected shape");
        ClientError::Parse { action }
    })
}

/// Decode a successful JSON response and project `path` out of its result
pub fn decode_result<T: DeserializeOwned>(
    action: Action,
    status: u16,
    body: &[u8],
    path: &[&str],
) -> Result<T> {
    check_status(action, status, body)?;
    let document: Value = parse_json(action, body)?;
    project(action, document, path)
}

/// Successful EXPORT: the body is returned verbatim, whatever its format
pub fn decode_raw(action: Action, status: u16, body: Vec<u8>) -> Result<Vec<u8>> {
    check_status(action, status, &body)?;
    Ok(body)
}

/// Successful mutation: nothing to decode
pub fn decode_unit(action: Action, status: u16, body: &[u8]) -> Result<()> {
    check_status(action, status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(br#"{\"a\":1}"#), br#"{"a":1}"#.to_vec());
        assert_eq!(unescape(br"a\\b"), br"a\b".to_vec());
        assert_eq!(unescape(br"trailing\"), b"trailing".to_vec());
    }

    #[test]
    fn test_server_error_envelope() {
        let body = br#"{"response":{"error":{"code":8061,"message":"Invalid ticket"}}}"#;
        let err = check_status(Action::GetInfo, 400, body).unwrap_err();

        match err {
            ClientError::Server { code, message, action, status } => {
                assert_eq!(code, 8061);
                assert_eq!(message, "Invalid ticket");
                assert_eq!(action, Action::GetInfo);
                assert_eq!(status, 400);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_server_error_with_string_code_and_escaping() {
        let body = br#"{\"response\":{\"error\":{\"code\":\"7103\",\"message\":\"No such view\"}}}"#;
        let err = check_status(Action::Delete, 500, body).unwrap_err();
        assert_eq!(err.code(), Some(7103));
        assert_eq!(err.http_status(), Some(500));
    }

    #[test]
    fn test_unparseable_error_body() {
        let err = check_status(Action::Update, 502, b"<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ClientError::Parse { action: Action::Update }));
    }

    #[test]
    fn test_double_escaped_success_body() {
        let body = br#"{\"response\":{\"result\":{\"viewurl\":\"https://example.com/v\"}}}"#;
        let url: String = decode_result(Action::GetViewUrl, 200, body, &["viewurl"]).unwrap();
        assert_eq!(url, "https://example.com/v");
    }

    #[test]
    fn test_project_whole_result() {
        let document = json!({"response": {"result": {"users": ["a@b.com"]}}});
        let result: Value = project(Action::GetUsers, document, &[]).unwrap();
        assert_eq!(result, json!({"users": ["a@b.com"]}));
    }

    #[test]
    fn test_project_missing_key_is_parse_error() {
        let document = json!({"response": {"result": {}}});
        let err = project::<String>(Action::GetCopyDbKey, document, &["copydbkey"]).unwrap_err();
        assert!(matches!(err, ClientError::Parse { action: Action::GetCopyDbKey }));
    }

    #[test]
    fn test_export_body_untouched() {
        let body = b"Region,Sales\nEast,\"1,200\"\n".to_vec();
        let raw = decode_raw(Action::Export, 200, body.clone()).unwrap();
        assert_eq!(raw, body);
    }

    #[test]
    fn test_mutation_ignores_body() {
        assert!(decode_unit(Action::AddColumn, 200, b"not json at all").is_ok());
    }
}
