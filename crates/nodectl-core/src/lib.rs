//! Typed async client for Bitcoin Core's JSON-RPC interface.
//!
//! [`Client`] exposes one strongly-typed method per supported RPC (block
//! queries, mempool introspection, wallet operations, peer management, chain
//! verification) on top of a pluggable [`Transport`]. The bundled
//! [`HttpTransport`] speaks JSON-RPC 2.0 over HTTP(S) with basic or cookie
//! authentication and optional request batching.

pub mod cache;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use client::Client;
pub use error::{ClientError, RpcError};
pub use transport::{ConnectionConfig, HttpTransport, Transport};
pub use types::ChainInfo;
