//! Typed facade over the JSON-RPC transport.
//!
//! One method per supported RPC. Each method shapes its arguments into the
//! positional parameter form Core expects, invokes the transport, and
//! deserializes the result into the matching model from [`crate::types`].
//!
//! Error policy: expected "not found" outcomes are normalized — to `None`
//! for keyed lookups (`getmempoolentry`, `gettxout`) and to the typed
//! `TxNotFound`/`BlockNotFound` errors for `getrawtransaction`/`getblock`/
//! `getblockheader`. Every other failure propagates unchanged with the
//! server's code and message intact. Each method's doc comment states which
//! side of that line it is on.

use std::sync::Arc;
use std::time::Duration;

use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Amount, BlockHash, Txid};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::cache::ChainInfoCache;
use crate::error::{ClientError, RpcError};
use crate::transport::{ConnectionConfig, HttpTransport, Transport};
use crate::types::{
    AddNodeCommand, AddressType, Balances, BanCommand, BanEntry, BlockHeaderInfo, BlockInfo,
    ChainInfo, ChainTip, FeeEstimate, MempoolAcceptResult, MempoolEntry, MempoolInfo, NetTotals,
    NetworkInfo, PeerInfo, RawTransactionInfo, TxOutInfo, UnspentOutput, WalletInfo,
    WalletTxRecord,
};

/// Default TTL for the cached `getblockchaininfo` snapshot.
pub const DEFAULT_CHAIN_INFO_TTL: Duration = Duration::from_secs(10);

/// Bitcoin Core's RPC_INVALID_ADDRESS_OR_KEY, the code it returns for
/// lookups of unknown transactions and blocks.
const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;

/// Typed Bitcoin Core RPC client.
///
/// Holds the transport behind an `Arc`, so the client is cheap to clone and
/// share across tasks.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    chain_info_cache: Arc<ChainInfoCache>,
}

impl Client {
    /// Wrap an existing transport with the default chain-info cache TTL.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_cache_ttl(transport, DEFAULT_CHAIN_INFO_TTL)
    }

    /// Wrap an existing transport with an explicit chain-info cache TTL.
    /// A zero TTL disables the cache.
    pub fn with_cache_ttl(transport: Arc<dyn Transport>, ttl: Duration) -> Self {
        Self {
            transport,
            chain_info_cache: Arc::new(ChainInfoCache::new(ttl)),
        }
    }

    /// Build an HTTP-backed client from connection configuration.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport)))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, ClientError> {
        let raw = self.transport.call(method, params).await?;
        from_result(method, raw)
    }

    /// Invoke a method whose result is `null`, discarding it.
    async fn call_void(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<(), ClientError> {
        self.transport.call(method, params).await?;
        Ok(())
    }

    // ==========================================================================
    // Block Queries
    // ==========================================================================

    /// Height of the most-work fully-validated chain.
    pub async fn get_block_count(&self) -> Result<u64, ClientError> {
        self.call("getblockcount", Vec::new()).await
    }

    /// Hash of the chain tip block.
    pub async fn get_best_block_hash(&self) -> Result<BlockHash, ClientError> {
        self.call("getbestblockhash", Vec::new()).await
    }

    /// Hash of the block at `height` on the active chain.
    /// An out-of-range height surfaces as [`ClientError::Rpc`] with code -8.
    pub async fn get_block_hash(&self, height: u64) -> Result<BlockHash, ClientError> {
        self.call("getblockhash", vec![json!(height)]).await
    }

    /// Verbose header for the given block.
    /// An unknown hash is the typed [`ClientError::BlockNotFound`].
    pub async fn get_block_header(
        &self,
        hash: &BlockHash,
    ) -> Result<BlockHeaderInfo, ClientError> {
        self.call("getblockheader", vec![json!(hash.to_string()), json!(true)])
            .await
            .map_err(|err| normalize_block_lookup_error(hash, err))
    }

    /// Verbose headers for many blocks, batched into chunked wire requests.
    /// Results are returned in input order.
    pub async fn get_block_headers(
        &self,
        hashes: &[BlockHash],
    ) -> Result<Vec<BlockHeaderInfo>, ClientError> {
        if hashes.is_empty() {
            return Ok(Vec::new());
        }

        let calls: Vec<(String, Vec<serde_json::Value>)> = hashes
            .iter()
            .map(|hash| {
                (
                    "getblockheader".to_owned(),
                    vec![json!(hash.to_string()), json!(true)],
                )
            })
            .collect();

        let raw_results = self.transport.call_batch(&calls).await?;
        raw_results
            .into_iter()
            .map(|raw| from_result("getblockheader", raw))
            .collect()
    }

    /// Block at verbosity 1: header fields plus the list of txids.
    /// An unknown hash is the typed [`ClientError::BlockNotFound`].
    pub async fn get_block(&self, hash: &BlockHash) -> Result<BlockInfo, ClientError> {
        self.call("getblock", vec![json!(hash.to_string()), json!(1)])
            .await
            .map_err(|err| normalize_block_lookup_error(hash, err))
    }

    /// Chain state snapshot, served from the TTL cache when fresh.
    pub async fn get_blockchain_info(&self) -> Result<ChainInfo, ClientError> {
        if let Some(cached) = self.chain_info_cache.get().await {
            return Ok(cached);
        }

        let info: ChainInfo = self.call("getblockchaininfo", Vec::new()).await?;
        self.chain_info_cache.store(info.clone()).await;
        Ok(info)
    }

    /// Proof-of-work difficulty at the chain tip.
    pub async fn get_difficulty(&self) -> Result<f64, ClientError> {
        self.call("getdifficulty", Vec::new()).await
    }

    /// All known chain tips: the active chain plus orphaned branches.
    pub async fn get_chain_tips(&self) -> Result<Vec<ChainTip>, ClientError> {
        self.call("getchaintips", Vec::new()).await
    }

    // ==========================================================================
    // Chain Verification
    // ==========================================================================

    /// Verify the most recent blocks of the chain database.
    ///
    /// `check_level` is 0-4 (node default 3); `num_blocks` is how many
    /// recent blocks to check (node default 6, 0 means all). When only
    /// `num_blocks` is given, the node-default check level is passed
    /// explicitly since the parameters are positional.
    pub async fn verify_chain(
        &self,
        check_level: Option<u32>,
        num_blocks: Option<u32>,
    ) -> Result<bool, ClientError> {
        let mut params = Vec::new();
        match (check_level, num_blocks) {
            (None, None) => {}
            (Some(level), None) => params.push(json!(level)),
            (level, Some(blocks)) => {
                params.push(json!(level.unwrap_or(3)));
                params.push(json!(blocks));
            }
        }
        self.call("verifychain", params).await
    }

    // ==========================================================================
    // Mempool Introspection
    // ==========================================================================

    /// Aggregate mempool state.
    pub async fn get_mempool_info(&self) -> Result<MempoolInfo, ClientError> {
        self.call("getmempoolinfo", Vec::new()).await
    }

    /// All txids currently in the mempool.
    pub async fn get_raw_mempool(&self) -> Result<Vec<Txid>, ClientError> {
        self.call("getrawmempool", Vec::new()).await
    }

    /// Mempool entry for `txid`, or `None` if the transaction is not in the
    /// pool (Core's "not in mempool" error is swallowed and logged).
    pub async fn get_mempool_entry(
        &self,
        txid: &Txid,
    ) -> Result<Option<MempoolEntry>, ClientError> {
        match self
            .call("getmempoolentry", vec![json!(txid.to_string())])
            .await
        {
            Ok(entry) => Ok(Some(entry)),
            Err(ClientError::Rpc(RpcError::ServerError { code, message }))
                if is_not_found_server_error(code, &message) =>
            {
                debug!(%txid, "transaction not in mempool");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Decoded transaction by txid (verbose `getrawtransaction`).
    /// A missing transaction is the typed [`ClientError::TxNotFound`].
    pub async fn get_raw_transaction(
        &self,
        txid: &Txid,
    ) -> Result<RawTransactionInfo, ClientError> {
        self.call("getrawtransaction", vec![json!(txid.to_string()), json!(1)])
            .await
            .map_err(|err| normalize_tx_lookup_error(txid, err))
    }

    /// Unspent output at `txid:vout`, or `None` if it is spent or unknown
    /// (Core returns JSON null for those).
    pub async fn get_tx_out(
        &self,
        txid: &Txid,
        vout: u32,
        include_mempool: bool,
    ) -> Result<Option<TxOutInfo>, ClientError> {
        self.call(
            "gettxout",
            vec![json!(txid.to_string()), json!(vout), json!(include_mempool)],
        )
        .await
    }

    /// Broadcast a serialized transaction, returning its txid.
    /// Rejections (missing inputs, fee limits, policy) propagate unchanged.
    pub async fn send_raw_transaction(&self, hex: &str) -> Result<Txid, ClientError> {
        self.call("sendrawtransaction", vec![json!(hex)]).await
    }

    /// Dry-run mempool acceptance for serialized transactions.
    pub async fn test_mempool_accept(
        &self,
        raw_txs: &[String],
    ) -> Result<Vec<MempoolAcceptResult>, ClientError> {
        self.call("testmempoolaccept", vec![json!(raw_txs)]).await
    }

    // ==========================================================================
    // Wallet Operations
    // ==========================================================================
    //
    // These route to the wallet the transport was scoped to (see
    // `ConnectionConfig::wallet`); on a node with a single loaded wallet no
    // scoping is needed.

    /// State of the loaded wallet.
    pub async fn get_wallet_info(&self) -> Result<WalletInfo, ClientError> {
        self.call("getwalletinfo", Vec::new()).await
    }

    /// Trusted/pending/immature balance breakdown.
    pub async fn get_balances(&self) -> Result<Balances, ClientError> {
        self.call("getbalances", Vec::new()).await
    }

    /// Total trusted wallet balance.
    pub async fn get_balance(&self) -> Result<Amount, ClientError> {
        let raw = self.transport.call("getbalance", Vec::new()).await?;
        let btc = raw.as_f64().ok_or_else(|| {
            ClientError::InvalidResponse(format!("invalid getbalance result: {raw}"))
        })?;
        Amount::from_btc(btc)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid getbalance amount: {e}")))
    }

    /// Derive a fresh receive address. The node checks the address against
    /// its own network, so the result is returned network-unchecked.
    pub async fn get_new_address(
        &self,
        label: Option<&str>,
        address_type: Option<AddressType>,
    ) -> Result<Address<NetworkUnchecked>, ClientError> {
        let mut params = Vec::new();
        match (label, address_type) {
            (None, None) => {}
            (Some(label), None) => params.push(json!(label)),
            (label, Some(kind)) => {
                // Positional params: an absent label still needs its slot.
                params.push(json!(label.unwrap_or("")));
                params.push(json!(kind.as_str()));
            }
        }
        self.call("getnewaddress", params).await
    }

    /// Spendable outputs with at least `min_conf` confirmations
    /// (node default 1).
    pub async fn list_unspent(
        &self,
        min_conf: Option<u32>,
    ) -> Result<Vec<UnspentOutput>, ClientError> {
        let params = match min_conf {
            None => Vec::new(),
            Some(conf) => vec![json!(conf)],
        };
        self.call("listunspent", params).await
    }

    /// Most recent wallet transactions, newest last (node default 10).
    pub async fn list_transactions(
        &self,
        count: Option<usize>,
    ) -> Result<Vec<WalletTxRecord>, ClientError> {
        let params = match count {
            None => Vec::new(),
            Some(count) => vec![json!("*"), json!(count)],
        };
        self.call("listtransactions", params).await
    }

    /// Send `amount` to `address`, returning the wallet transaction's txid.
    /// Failures (insufficient funds, fee problems) propagate unchanged.
    pub async fn send_to_address(
        &self,
        address: &Address,
        amount: Amount,
        comment: Option<&str>,
    ) -> Result<Txid, ClientError> {
        let mut params = vec![json!(address.to_string()), json!(amount.to_btc())];
        if let Some(comment) = comment {
            params.push(json!(comment));
        }
        self.call("sendtoaddress", params).await
    }

    // ==========================================================================
    // Peer Management
    // ==========================================================================

    /// Number of connected peers.
    pub async fn get_connection_count(&self) -> Result<u64, ClientError> {
        self.call("getconnectioncount", Vec::new()).await
    }

    /// Node networking state.
    pub async fn get_network_info(&self) -> Result<NetworkInfo, ClientError> {
        self.call("getnetworkinfo", Vec::new()).await
    }

    /// Per-peer connection details.
    pub async fn get_peer_info(&self) -> Result<Vec<PeerInfo>, ClientError> {
        self.call("getpeerinfo", Vec::new()).await
    }

    /// Cumulative traffic counters.
    pub async fn get_net_totals(&self) -> Result<NetTotals, ClientError> {
        self.call("getnettotals", Vec::new()).await
    }

    /// Add, remove, or try-once a manual peer connection.
    pub async fn add_node(
        &self,
        addr: &str,
        command: AddNodeCommand,
    ) -> Result<(), ClientError> {
        self.call_void("addnode", vec![json!(addr), json!(command.as_str())])
            .await
    }

    /// Disconnect the peer at `addr`. Unknown peers surface as
    /// [`ClientError::Rpc`] with code -29.
    pub async fn disconnect_node(&self, addr: &str) -> Result<(), ClientError> {
        self.call_void("disconnectnode", vec![json!(addr)]).await
    }

    /// Ban or unban an IP or subnet. `ban_time` is in seconds and only
    /// meaningful for [`BanCommand::Add`]; omitted, the node default applies.
    pub async fn set_ban(
        &self,
        subnet: &str,
        command: BanCommand,
        ban_time: Option<u64>,
    ) -> Result<(), ClientError> {
        let mut params = vec![json!(subnet), json!(command.as_str())];
        if let Some(ban_time) = ban_time {
            params.push(json!(ban_time));
        }
        self.call_void("setban", params).await
    }

    /// All currently banned subnets.
    pub async fn list_banned(&self) -> Result<Vec<BanEntry>, ClientError> {
        self.call("listbanned", Vec::new()).await
    }

    /// Lift all bans.
    pub async fn clear_banned(&self) -> Result<(), ClientError> {
        self.call_void("clearbanned", Vec::new()).await
    }

    // ==========================================================================
    // Misc
    // ==========================================================================

    /// Smart fee estimate targeting confirmation within `conf_target`
    /// blocks. The node reports "no estimate available" through
    /// [`FeeEstimate::errors`] rather than an RPC error.
    pub async fn estimate_smart_fee(&self, conf_target: u16) -> Result<FeeEstimate, ClientError> {
        self.call("estimatesmartfee", vec![json!(conf_target)]).await
    }

    /// Seconds the node has been running.
    pub async fn uptime(&self) -> Result<u64, ClientError> {
        self.call("uptime", Vec::new()).await
    }
}

fn from_result<T: DeserializeOwned>(
    method: &str,
    raw: serde_json::Value,
) -> Result<T, ClientError> {
    serde_json::from_value(raw)
        .map_err(|e| ClientError::InvalidResponse(format!("invalid {method} result: {e}")))
}

// ==============================================================================
// RPC Error Normalization
// ==============================================================================

/// Convert Core's "missing tx" responses into the typed `TxNotFound`,
/// preserving other RPC/transport failures as-is.
fn normalize_tx_lookup_error(txid: &Txid, err: ClientError) -> ClientError {
    match err {
        ClientError::Rpc(RpcError::ServerError { code, message })
            if is_not_found_server_error(code, &message) =>
        {
            ClientError::TxNotFound(*txid)
        }
        other => other,
    }
}

/// Convert Core's "Block not found" responses into the typed
/// `BlockNotFound`, preserving other failures as-is.
fn normalize_block_lookup_error(hash: &BlockHash, err: ClientError) -> ClientError {
    match err {
        ClientError::Rpc(RpcError::ServerError { code, message })
            if is_not_found_server_error(code, &message) =>
        {
            ClientError::BlockNotFound(*hash)
        }
        other => other,
    }
}

fn is_not_found_server_error(code: i64, message: &str) -> bool {
    if code != RPC_INVALID_ADDRESS_OR_KEY {
        return false;
    }

    let msg = message.to_ascii_lowercase();
    msg.contains("not found")
        || msg.contains("not in mempool")
        || msg.contains("no such mempool or blockchain transaction")
}
