//! JSON-RPC transport abstraction.
//!
//! Defines the [`Transport`] trait — the seam between the typed [`Client`]
//! facade and the wire — and provides the HTTP(S) implementation
//! ([`HttpTransport`]) plus a scripted test mock (`mock::MockTransport`).
//!
//! [`Client`]: crate::client::Client

mod connection;
mod http;
#[cfg(test)]
pub(crate) mod mock;
mod protocol;

pub use connection::ConnectionConfig;
pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::ClientError;

/// Raw JSON-RPC call interface.
///
/// Implementations are expected to handle authentication, connection
/// management, and JSON-RPC envelope decoding internally; typed result
/// deserialization lives in the client facade.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Invoke a single RPC method with positional parameters.
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError>;

    /// Invoke many RPC methods, returning results in call order.
    /// Implementations may batch these into one or more wire requests.
    async fn call_batch(
        &self,
        calls: &[(String, Vec<serde_json::Value>)],
    ) -> Result<Vec<serde_json::Value>, ClientError> {
        let mut results = Vec::with_capacity(calls.len());
        for (method, params) in calls {
            results.push(self.call(method, params.clone()).await?);
        }
        Ok(results)
    }
}
