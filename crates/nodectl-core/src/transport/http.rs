use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use futures::future::try_join_all;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header;
use tracing::{debug, trace};

use crate::error::{ClientError, RpcError};

use super::connection::{endpoint_url, resolve_auth, ConnectionConfig};
use super::protocol::{
    parse_batch_id, parse_jsonrpc_error, JsonRpcRequest, JsonRpcRequestOwned, JsonRpcResponse,
    JsonRpcResponseOwned,
};
use super::Transport;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// JSON-RPC 2.0 transport over HTTP(S), backed by `reqwest`.
///
/// Supports both single and batched calls. Batches are split into
/// `batch_chunk_size` chunks issued concurrently, and responses are
/// re-ordered by request ID since servers may answer out of order.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    auth: Option<(String, String)>,
    limiter: Option<DirectRateLimiter>,
    batch_chunk_size: usize,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Build a transport from connection configuration. Fails on an invalid
    /// URL scheme, partial credentials, or an unreadable cookie file.
    pub fn new(config: &ConnectionConfig) -> Result<Self, ClientError> {
        if config.batch_chunk_size == 0 {
            return Err(ClientError::Config(
                "rpc batch chunk size must be at least 1".to_owned(),
            ));
        }
        let auth = resolve_auth(
            config.user.as_deref(),
            config.pass.as_deref(),
            config.cookie_file.as_deref(),
        )?;
        let url = endpoint_url(&config.url, config.wallet.as_deref())?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .expect("reqwest client builder uses valid static config");

        let limiter = match config.requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    ClientError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            url,
            auth,
            limiter,
            batch_chunk_size: config.batch_chunk_size,
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    /// Atomically reserve `count` consecutive request IDs for batch calls.
    fn reserve_request_ids(&self, count: u64) -> u64 {
        self.next_id.fetch_add(count, Ordering::Relaxed)
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    async fn rpc_batch(
        &self,
        calls: &[(String, Vec<serde_json::Value>)],
    ) -> Result<Vec<serde_json::Value>, ClientError> {
        self.wait_for_rate_limit().await;
        let start_id = self.reserve_request_ids(calls.len() as u64);
        debug!(
            rpc.batch_start_id = start_id,
            rpc.batch_size = calls.len(),
            "rpc batch call"
        );
        let requests: Vec<JsonRpcRequestOwned> = calls
            .iter()
            .enumerate()
            .map(|(offset, (method, params))| JsonRpcRequestOwned {
                jsonrpc: "2.0",
                id: start_id + offset as u64,
                method: method.clone(),
                params: params.clone(),
            })
            .collect();

        let mut builder = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&requests);
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await.map_err(RpcError::Transport)?;
        let status = response.status();

        let body = response.text().await.map_err(RpcError::Transport)?;
        debug!(
            rpc.batch_start_id = start_id,
            rpc.batch_size = calls.len(),
            %status,
            body_len = body.len(),
            "rpc batch response"
        );
        trace!(
            rpc.batch_start_id = start_id,
            rpc.batch_size = calls.len(),
            body = %body,
            "rpc batch response body"
        );

        decode_batch_body(&body, start_id, calls.len())
    }
}

/// Decode a batch response body and re-order the items by request ID.
///
/// Servers may answer a batch in any order, so items are keyed by ID and
/// read back in the `start_id..start_id + count` sequence. An absent ID is
/// a `MissingBatchItem` error, never a silently shortened result; a
/// per-item error object fails the whole batch.
fn decode_batch_body(
    body: &str,
    start_id: u64,
    count: usize,
) -> Result<Vec<serde_json::Value>, ClientError> {
    let decoded: Vec<JsonRpcResponseOwned> = serde_json::from_str(body).map_err(|e| {
        RpcError::InvalidResponse(format!("decode JSON-RPC batch response: {e}; body={body}"))
    })?;

    let mut by_id: HashMap<u64, JsonRpcResponseOwned> = HashMap::with_capacity(decoded.len());
    for item in decoded {
        let id = parse_batch_id(&item.id)?;
        by_id.insert(id, item);
    }

    let mut ordered = Vec::with_capacity(count);
    for id in start_id..(start_id + count as u64) {
        let item = by_id.remove(&id).ok_or(RpcError::MissingBatchItem { id })?;

        if let Some(err) = item.error {
            return Err(parse_jsonrpc_error(err));
        }
        ordered.push(item.result.unwrap_or(serde_json::Value::Null));
    }

    Ok(ordered)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        self.wait_for_rate_limit().await;
        let id = self.reserve_request_ids(1);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let mut builder = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&req);
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await.map_err(RpcError::Transport)?;
        let status = response.status();

        let body = response.text().await.map_err(RpcError::Transport)?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        let decoded: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
            RpcError::InvalidResponse(format!("decode JSON-RPC response: {e}; body={body}"))
        })?;

        if let Some(err) = decoded.error {
            return Err(parse_jsonrpc_error(err));
        }

        Ok(decoded.result.unwrap_or(serde_json::Value::Null))
    }

    async fn call_batch(
        &self,
        calls: &[(String, Vec<serde_json::Value>)],
    ) -> Result<Vec<serde_json::Value>, ClientError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        // Keep each payload small enough for node/proxy limits while still
        // issuing chunks concurrently to avoid serial round-trip latency.
        let chunk_futures: Vec<_> = calls
            .chunks(self.batch_chunk_size)
            .map(|chunk| self.rpc_batch(chunk))
            .collect();
        let chunked = try_join_all(chunk_futures).await?;
        Ok(chunked.into_iter().flatten().collect())
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> ConnectionConfig {
        ConnectionConfig {
            url: url.to_owned(),
            ..ConnectionConfig::default()
        }
    }

    #[test]
    fn rejects_zero_batch_chunk_size() {
        let mut cfg = config("http://127.0.0.1:8332");
        cfg.batch_chunk_size = 0;
        let err = HttpTransport::new(&cfg).expect_err("must reject zero chunk size");
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn rejects_zero_rate_limit() {
        let mut cfg = config("http://127.0.0.1:8332");
        cfg.requests_per_second = Some(0);
        let err = HttpTransport::new(&cfg).expect_err("must reject zero rps");
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn wallet_scopes_endpoint_path() {
        let mut cfg = config("http://127.0.0.1:18443");
        cfg.wallet = Some("hot".to_owned());
        let transport = HttpTransport::new(&cfg).expect("transport must build");
        assert_eq!(transport.url, "http://127.0.0.1:18443/wallet/hot");
    }

    #[test]
    fn request_ids_are_consecutive() {
        let transport =
            HttpTransport::new(&config("http://127.0.0.1:8332")).expect("transport must build");
        let first = transport.reserve_request_ids(3);
        let next = transport.reserve_request_ids(1);
        assert_eq!(next, first + 3);
    }

    #[test]
    fn batch_body_reassembles_out_of_order_items() {
        let body = r#"[
            {"id": 12, "result": "c"},
            {"id": 10, "result": "a"},
            {"id": 11, "result": "b"}
        ]"#;
        let ordered = decode_batch_body(body, 10, 3).expect("batch must reassemble");
        assert_eq!(
            ordered,
            vec![
                serde_json::json!("a"),
                serde_json::json!("b"),
                serde_json::json!("c")
            ]
        );
    }

    #[test]
    fn batch_body_missing_id_is_a_typed_error() {
        let body = r#"[{"id": 10, "result": "a"}, {"id": 12, "result": "c"}]"#;
        let err = decode_batch_body(body, 10, 3).expect_err("gap must fail the batch");
        assert!(matches!(
            err,
            ClientError::Rpc(RpcError::MissingBatchItem { id: 11 })
        ));
    }

    #[test]
    fn batch_body_item_error_fails_the_batch() {
        let body = r#"[
            {"id": 10, "result": "a"},
            {"id": 11, "error": {"code": -5, "message": "Block not found"}}
        ]"#;
        let err = decode_batch_body(body, 10, 2).expect_err("item error must surface");
        assert!(matches!(
            err,
            ClientError::Rpc(RpcError::ServerError { code: -5, .. })
        ));
    }

    #[test]
    fn batch_body_null_result_passes_through() {
        let body = r#"[{"id": 10, "result": null}]"#;
        let ordered = decode_batch_body(body, 10, 1).expect("null result is valid");
        assert_eq!(ordered, vec![serde_json::Value::Null]);
    }

    #[test]
    fn batch_body_rejects_non_array_payload() {
        let err = decode_batch_body(r#"{"id": 10, "result": "a"}"#, 10, 1)
            .expect_err("object body must be rejected");
        assert!(matches!(err, ClientError::Rpc(RpcError::InvalidResponse(_))));
    }
}
