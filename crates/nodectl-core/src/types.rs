//! Typed models for Bitcoin Core RPC results.
//!
//! Field names follow Rust conventions with explicit `#[serde(rename)]`
//! attributes mapping to Core's wire names. BTC-denominated JSON numbers
//! deserialize through `bitcoin::amount::serde::as_btc`, so every money
//! field is a `bitcoin::Amount` (or `SignedAmount`), never a raw float.
//! Fields Core only emits in some versions or configurations are `Option`
//! with `#[serde(default)]`.

use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Amount, BlockHash, ScriptBuf, SignedAmount, TxMerkleNode, Txid, Wtxid};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

// ==============================================================================
// Chain
// ==============================================================================

/// Result of `getblockchaininfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    #[serde(rename = "bestblockhash")]
    pub best_block_hash: BlockHash,
    pub difficulty: f64,
    #[serde(rename = "mediantime", default)]
    pub median_time: Option<u64>,
    #[serde(rename = "verificationprogress", default)]
    pub verification_progress: Option<f64>,
    #[serde(rename = "initialblockdownload", default)]
    pub initial_block_download: Option<bool>,
    pub pruned: bool,
}

/// Result of `getblockheader` in verbose form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockHeaderInfo {
    pub hash: BlockHash,
    /// `-1` for headers on a branch that is no longer active.
    pub confirmations: i64,
    pub height: u64,
    pub version: i32,
    #[serde(rename = "merkleroot")]
    pub merkle_root: TxMerkleNode,
    pub time: u64,
    #[serde(rename = "mediantime")]
    pub median_time: u64,
    pub nonce: u32,
    pub bits: String,
    pub difficulty: f64,
    #[serde(rename = "nTx")]
    pub n_tx: u64,
    #[serde(rename = "previousblockhash", default)]
    pub previous_block_hash: Option<BlockHash>,
    #[serde(rename = "nextblockhash", default)]
    pub next_block_hash: Option<BlockHash>,
}

/// Result of `getblock` at verbosity 1 (header plus txid list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub hash: BlockHash,
    pub confirmations: i64,
    pub height: u64,
    pub version: i32,
    #[serde(rename = "merkleroot")]
    pub merkle_root: TxMerkleNode,
    pub time: u64,
    #[serde(rename = "mediantime")]
    pub median_time: u64,
    pub nonce: u32,
    pub bits: String,
    pub difficulty: f64,
    pub size: u64,
    #[serde(rename = "strippedsize", default)]
    pub stripped_size: Option<u64>,
    pub weight: u64,
    pub tx: Vec<Txid>,
    #[serde(rename = "nTx")]
    pub n_tx: u64,
    #[serde(rename = "previousblockhash", default)]
    pub previous_block_hash: Option<BlockHash>,
    #[serde(rename = "nextblockhash", default)]
    pub next_block_hash: Option<BlockHash>,
}

/// One entry in the `getchaintips` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTip {
    pub height: u64,
    pub hash: BlockHash,
    #[serde(rename = "branchlen")]
    pub branch_length: u64,
    pub status: ChainTipStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainTipStatus {
    Active,
    ValidFork,
    ValidHeaders,
    HeadersOnly,
    Invalid,
    Unknown,
}

// ==============================================================================
// Mempool
// ==============================================================================

/// Result of `getmempoolinfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolInfo {
    #[serde(default)]
    pub loaded: Option<bool>,
    /// Number of transactions currently in the pool.
    pub size: u64,
    pub bytes: u64,
    pub usage: u64,
    #[serde(rename = "maxmempool")]
    pub max_mempool: u64,
    /// Minimum fee rate (per kvB) for acceptance into the pool.
    #[serde(rename = "mempoolminfee", with = "bitcoin::amount::serde::as_btc")]
    pub mempool_min_fee: Amount,
    #[serde(rename = "minrelaytxfee", with = "bitcoin::amount::serde::as_btc")]
    pub min_relay_tx_fee: Amount,
    #[serde(rename = "unbroadcastcount", default)]
    pub unbroadcast_count: Option<u64>,
}

/// Result of `getmempoolentry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolEntry {
    pub vsize: u64,
    #[serde(default)]
    pub weight: Option<u64>,
    pub time: u64,
    pub height: u64,
    #[serde(rename = "descendantcount")]
    pub descendant_count: u64,
    #[serde(rename = "descendantsize")]
    pub descendant_size: u64,
    #[serde(rename = "ancestorcount")]
    pub ancestor_count: u64,
    #[serde(rename = "ancestorsize")]
    pub ancestor_size: u64,
    pub wtxid: Wtxid,
    pub fees: MempoolFees,
    /// Parent txids this entry spends from, mempool-local only.
    pub depends: Vec<Txid>,
    #[serde(rename = "spentby")]
    pub spent_by: Vec<Txid>,
    #[serde(rename = "bip125-replaceable")]
    pub bip125_replaceable: bool,
    #[serde(default)]
    pub unbroadcast: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolFees {
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub base: Amount,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub modified: Amount,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub ancestor: Amount,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub descendant: Amount,
}

/// One entry in the `testmempoolaccept` result array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolAcceptResult {
    pub txid: Txid,
    #[serde(default)]
    pub wtxid: Option<Wtxid>,
    pub allowed: bool,
    #[serde(rename = "reject-reason", default)]
    pub reject_reason: Option<String>,
    #[serde(default)]
    pub vsize: Option<u64>,
    #[serde(default)]
    pub fees: Option<MempoolAcceptFees>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolAcceptFees {
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub base: Amount,
}

// ==============================================================================
// Transactions
// ==============================================================================

/// Result of `getrawtransaction` in verbose form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransactionInfo {
    pub txid: Txid,
    /// Witness txid; equals `txid` for non-segwit transactions.
    pub hash: Wtxid,
    pub version: u32,
    pub size: u64,
    pub vsize: u64,
    pub weight: u64,
    pub locktime: u32,
    pub vin: Vec<TxInInfo>,
    pub vout: Vec<TxOutEntry>,
    #[serde(default)]
    pub hex: Option<String>,
    #[serde(rename = "blockhash", default)]
    pub block_hash: Option<BlockHash>,
    /// Absent for mempool transactions.
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub time: Option<u64>,
    #[serde(rename = "blocktime", default)]
    pub block_time: Option<u64>,
}

impl RawTransactionInfo {
    /// A coinbase transaction has exactly one input carrying a `coinbase`
    /// field instead of a prevout reference.
    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].coinbase.is_some()
    }
}

/// One input of a decoded transaction. Coinbase inputs carry `coinbase`
/// and no `txid`/`vout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInInfo {
    #[serde(default)]
    pub coinbase: Option<String>,
    #[serde(default)]
    pub txid: Option<Txid>,
    #[serde(default)]
    pub vout: Option<u32>,
    pub sequence: u32,
    #[serde(rename = "txinwitness", default)]
    pub witness: Vec<String>,
}

/// One output of a decoded transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutEntry {
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub value: Amount,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKeyInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptPubKeyInfo {
    pub asm: String,
    pub hex: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub address: Option<Address<NetworkUnchecked>>,
    #[serde(default)]
    pub desc: Option<String>,
}

impl ScriptPubKeyInfo {
    /// Decode the hex script into a [`ScriptBuf`].
    pub fn script(&self) -> Result<ScriptBuf, ClientError> {
        ScriptBuf::from_hex(&self.hex)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid scriptPubKey hex: {e}")))
    }
}

/// Result of `gettxout` for an unspent output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutInfo {
    #[serde(rename = "bestblock")]
    pub best_block: BlockHash,
    pub confirmations: u64,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub value: Amount,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKeyInfo,
    pub coinbase: bool,
}

// ==============================================================================
// Wallet
// ==============================================================================

/// Result of `getwalletinfo`. Balance fields are deprecated upstream in
/// favor of `getbalances` and may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    #[serde(rename = "walletname")]
    pub wallet_name: String,
    #[serde(rename = "walletversion")]
    pub wallet_version: u64,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub balance: Option<Amount>,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub unconfirmed_balance: Option<Amount>,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub immature_balance: Option<Amount>,
    #[serde(rename = "txcount")]
    pub tx_count: u64,
    #[serde(rename = "keypoolsize")]
    pub keypool_size: u64,
    #[serde(rename = "paytxfee", with = "bitcoin::amount::serde::as_btc")]
    pub pay_tx_fee: Amount,
    #[serde(default)]
    pub private_keys_enabled: Option<bool>,
    #[serde(default)]
    pub avoid_reuse: Option<bool>,
    #[serde(default)]
    pub descriptors: Option<bool>,
}

/// Result of `getbalances`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balances {
    pub mine: BalancesMine,
    #[serde(default)]
    pub watchonly: Option<BalancesMine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancesMine {
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub trusted: Amount,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub untrusted_pending: Amount,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub immature: Amount,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub used: Option<Amount>,
}

/// One entry in the `listunspent` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: Txid,
    pub vout: u32,
    #[serde(default)]
    pub address: Option<Address<NetworkUnchecked>>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: String,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub amount: Amount,
    pub confirmations: u64,
    pub spendable: bool,
    pub solvable: bool,
    #[serde(default)]
    pub safe: Option<bool>,
    #[serde(default)]
    pub desc: Option<String>,
}

/// One entry in the `listtransactions` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTxRecord {
    #[serde(default)]
    pub address: Option<Address<NetworkUnchecked>>,
    pub category: TxCategory,
    /// Negative for sends, positive for receives.
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub amount: SignedAmount,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub vout: Option<u32>,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub fee: Option<SignedAmount>,
    /// Negative for conflicted transactions.
    pub confirmations: i64,
    pub txid: Txid,
    pub time: u64,
    #[serde(rename = "timereceived", default)]
    pub time_received: Option<u64>,
    #[serde(rename = "bip125-replaceable", default)]
    pub bip125_replaceable: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxCategory {
    Send,
    Receive,
    Generate,
    Immature,
    Orphan,
}

// ==============================================================================
// Network & Peers
// ==============================================================================

/// Result of `getnetworkinfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub version: u64,
    pub subversion: String,
    #[serde(rename = "protocolversion")]
    pub protocol_version: u64,
    #[serde(rename = "localservices")]
    pub local_services: String,
    #[serde(rename = "localrelay", default)]
    pub local_relay: Option<bool>,
    #[serde(rename = "timeoffset")]
    pub time_offset: i64,
    pub connections: u64,
    #[serde(default)]
    pub connections_in: Option<u64>,
    #[serde(default)]
    pub connections_out: Option<u64>,
    #[serde(rename = "networkactive")]
    pub network_active: bool,
    #[serde(rename = "relayfee", with = "bitcoin::amount::serde::as_btc")]
    pub relay_fee: Amount,
    /// String before Core v25, array of strings after.
    #[serde(default)]
    pub warnings: Option<serde_json::Value>,
}

/// One entry in the `getpeerinfo` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: u64,
    pub addr: String,
    #[serde(default)]
    pub network: Option<String>,
    pub services: String,
    #[serde(rename = "relaytxes", default)]
    pub relay_txes: Option<bool>,
    #[serde(rename = "lastsend")]
    pub last_send: u64,
    #[serde(rename = "lastrecv")]
    pub last_recv: u64,
    #[serde(rename = "bytessent")]
    pub bytes_sent: u64,
    #[serde(rename = "bytesrecv")]
    pub bytes_recv: u64,
    #[serde(rename = "conntime")]
    pub connection_time: u64,
    #[serde(rename = "pingtime", default)]
    pub ping_time: Option<f64>,
    pub version: u64,
    pub subver: String,
    pub inbound: bool,
    #[serde(rename = "startingheight", default)]
    pub starting_height: Option<i64>,
    #[serde(default)]
    pub synced_headers: Option<i64>,
    #[serde(default)]
    pub synced_blocks: Option<i64>,
}

/// Result of `getnettotals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetTotals {
    #[serde(rename = "totalbytesrecv")]
    pub total_bytes_recv: u64,
    #[serde(rename = "totalbytessent")]
    pub total_bytes_sent: u64,
    #[serde(rename = "timemillis")]
    pub time_millis: u64,
}

/// One entry in the `listbanned` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanEntry {
    pub address: String,
    #[serde(default)]
    pub ban_created: Option<u64>,
    #[serde(default)]
    pub banned_until: Option<u64>,
    #[serde(default)]
    pub ban_duration: Option<u64>,
    #[serde(default)]
    pub time_remaining: Option<u64>,
}

// ==============================================================================
// Fees
// ==============================================================================

/// Result of `estimatesmartfee`. `fee_rate` is absent when the node has not
/// seen enough transactions to produce an estimate; `errors` says why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeEstimate {
    #[serde(rename = "feerate", default, with = "bitcoin::amount::serde::as_btc::opt")]
    pub fee_rate: Option<Amount>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    pub blocks: i64,
}

// ==============================================================================
// Request Arguments
// ==============================================================================

/// Command argument to `addnode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddNodeCommand {
    Add,
    Remove,
    OneTry,
}

impl AddNodeCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::OneTry => "onetry",
        }
    }
}

/// Command argument to `setban`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanCommand {
    Add,
    Remove,
}

impl BanCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

/// Address type argument to `getnewaddress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Legacy,
    P2shSegwit,
    Bech32,
    Bech32m,
}

impl AddressType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::P2shSegwit => "p2sh-segwit",
            Self::Bech32 => "bech32",
            Self::Bech32m => "bech32m",
        }
    }
}
