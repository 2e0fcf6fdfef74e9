use bitcoin::{BlockHash, Txid};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("transaction not found: {0}")]
    TxNotFound(Txid),

    #[error("block not found: {0}")]
    BlockNotFound(BlockHash),

    #[error("invalid RPC result: {0}")]
    InvalidResponse(String),

    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures at the JSON-RPC wire level, below method-specific typing.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC server error {code}: {message}")]
    ServerError { code: i64, message: String },

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    #[error("batch response missing item for request id {id}")]
    MissingBatchItem { id: u64 },
}
