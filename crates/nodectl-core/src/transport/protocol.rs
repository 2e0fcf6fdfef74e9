//! JSON-RPC 2.0 envelope types and decoding helpers.
//!
//! Only the envelope lives here; result payloads stay as raw
//! `serde_json::Value` until the client facade deserializes them into typed
//! models.

use crate::error::{ClientError, RpcError};

/// Single request envelope. Borrows the method name, since single calls
/// always have it as a `&'static str` at the call site.
#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: Vec<serde_json::Value>,
}

/// Owned variant for batch requests, where method names are built per item.
#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequestOwned {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: String,
    pub(super) params: Vec<serde_json::Value>,
}

#[derive(serde::Deserialize)]
pub(super) struct JsonRpcResponse {
    pub(super) result: Option<serde_json::Value>,
    pub(super) error: Option<serde_json::Value>,
}

/// Batch response item. The `id` is kept raw because batch reassembly needs
/// it, and servers are allowed to echo it back as either a number or a
/// numeric string.
#[derive(serde::Deserialize)]
pub(super) struct JsonRpcResponseOwned {
    pub(super) id: serde_json::Value,
    pub(super) result: Option<serde_json::Value>,
    pub(super) error: Option<serde_json::Value>,
}

/// Turn a JSON-RPC error object into a structured error.
///
/// A well-formed `{"code": <int>, "message": <string>}` becomes
/// `ServerError`, preserving Core's code for the facade's per-method policy
/// checks. Anything else is `InvalidResponse` carrying the raw JSON.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> ClientError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    if let Ok(parsed) = serde_json::from_value::<JsonRpcError>(err.clone()) {
        ClientError::Rpc(RpcError::ServerError {
            code: parsed.code,
            message: parsed.message,
        })
    } else {
        ClientError::Rpc(RpcError::InvalidResponse(format!(
            "non-standard JSON-RPC error: {err}"
        )))
    }
}

/// Read a batch item's echoed request ID, accepting the numeric-string form
/// some proxies produce.
pub(super) fn parse_batch_id(id: &serde_json::Value) -> Result<u64, ClientError> {
    if let Some(n) = id.as_u64() {
        return Ok(n);
    }

    if let Some(s) = id.as_str() {
        return s.parse::<u64>().map_err(|e| {
            RpcError::InvalidResponse(format!("invalid batch response id string: {e}")).into()
        });
    }

    Err(RpcError::InvalidResponse(format!("invalid batch response id: {id}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_id_accepts_number_and_numeric_string() {
        assert_eq!(
            parse_batch_id(&serde_json::json!(42)).expect("number id"),
            42
        );
        assert_eq!(
            parse_batch_id(&serde_json::json!("123")).expect("string id"),
            123
        );
    }

    #[test]
    fn batch_id_rejects_non_numeric_shapes() {
        assert!(parse_batch_id(&serde_json::json!(true)).is_err());
        assert!(parse_batch_id(&serde_json::json!("not-a-number")).is_err());
        assert!(parse_batch_id(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn error_object_keeps_code_and_message() {
        let err = parse_jsonrpc_error(serde_json::json!({
            "code": -5,
            "message": "Block not found",
        }));
        match err {
            ClientError::Rpc(RpcError::ServerError { code, message }) => {
                assert_eq!(code, -5);
                assert_eq!(message, "Block not found");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_error_object_carries_raw_json() {
        let err = parse_jsonrpc_error(serde_json::json!("boom"));
        match err {
            ClientError::Rpc(RpcError::InvalidResponse(msg)) => {
                assert!(msg.contains("boom"));
            }
            other => panic!("expected invalid response, got {other:?}"),
        }
    }
}
