//! Scripted transport for tests.
//!
//! Responses are queued per method via the builder and popped in FIFO order;
//! every call is recorded so tests can assert on parameter shapes and call
//! counts without a running node.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ClientError, RpcError};

use super::Transport;

enum Scripted {
    Result(serde_json::Value),
    ServerError { code: i64, message: String },
}

pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, Vec<serde_json::Value>)>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            responses: HashMap::new(),
        }
    }

    /// All calls made so far, in order, as `(method, params)`.
    pub fn calls(&self) -> Vec<(String, Vec<serde_json::Value>)> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

pub struct MockTransportBuilder {
    responses: HashMap<String, VecDeque<Scripted>>,
}

impl MockTransportBuilder {
    /// Queue a successful result for `method`.
    pub fn with_result(mut self, method: &str, result: serde_json::Value) -> Self {
        self.responses
            .entry(method.to_owned())
            .or_default()
            .push_back(Scripted::Result(result));
        self
    }

    /// Queue a JSON-RPC server error for `method`.
    pub fn with_server_error(mut self, method: &str, code: i64, message: &str) -> Self {
        self.responses
            .entry(method.to_owned())
            .or_default()
            .push_back(Scripted::ServerError {
                code,
                message: message.to_owned(),
            });
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            responses: Mutex::new(self.responses),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .push((method.to_owned(), params));

        let scripted = self
            .responses
            .lock()
            .expect("mock response table poisoned")
            .get_mut(method)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(Scripted::Result(value)) => Ok(value),
            Some(Scripted::ServerError { code, message }) => {
                Err(ClientError::Rpc(RpcError::ServerError { code, message }))
            }
            None => Err(ClientError::Rpc(RpcError::InvalidResponse(format!(
                "mock has no scripted response for `{method}`"
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_pop_in_fifo_order() {
        let mock = MockTransport::builder()
            .with_result("getblockcount", serde_json::json!(100))
            .with_result("getblockcount", serde_json::json!(101))
            .build();

        let first = mock.call("getblockcount", vec![]).await.unwrap();
        let second = mock.call("getblockcount", vec![]).await.unwrap();
        assert_eq!(first, serde_json::json!(100));
        assert_eq!(second, serde_json::json!(101));
        assert_eq!(mock.call_count("getblockcount"), 2);
    }

    #[tokio::test]
    async fn unscripted_method_is_an_error() {
        let mock = MockTransport::builder().build();
        let err = mock.call("uptime", vec![]).await.unwrap_err();
        assert!(err.to_string().contains("no scripted response"));
    }
}
