use std::path::PathBuf;

use bitcoin::{BlockHash, Txid};
use clap::{Parser, Subcommand, ValueEnum};

use nodectl_core::types::{AddNodeCommand, AddressType, BanCommand};

/// Nodectl — inspect and manage a Bitcoin Core node over JSON-RPC.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Bitcoin Core RPC URL.
    #[arg(long, default_value = "http://127.0.0.1:8332", env = "NODECTL_RPC_URL")]
    pub rpc_url: String,

    /// RPC username (set together with --rpc-pass).
    #[arg(long, env = "NODECTL_RPC_USER")]
    pub rpc_user: Option<String>,

    /// RPC password.
    #[arg(long, env = "NODECTL_RPC_PASS")]
    pub rpc_pass: Option<String>,

    /// Path to bitcoind's .cookie file, used when no user/pass is given.
    #[arg(long, env = "NODECTL_RPC_COOKIE")]
    pub rpc_cookie: Option<PathBuf>,

    /// Wallet name for wallet commands on multi-wallet nodes.
    #[arg(long, env = "NODECTL_WALLET")]
    pub wallet: Option<String>,

    /// Limit outbound RPC requests per second.
    #[arg(long)]
    pub requests_per_second: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Chain state snapshot (getblockchaininfo).
    ChainInfo,
    /// Height of the chain tip.
    BlockCount,
    /// Hash of the chain tip block.
    BestBlockHash,
    /// Block details by hash.
    Block { hash: BlockHash },
    /// Verbose block header by hash.
    BlockHeader { hash: BlockHash },
    /// Hash of the block at a given height.
    BlockAt { height: u64 },
    /// All known chain tips, including orphaned branches.
    ChainTips,
    /// Verify recent blocks of the chain database.
    VerifyChain {
        /// Thoroughness, 0-4 (node default 3).
        #[arg(long)]
        check_level: Option<u32>,
        /// Number of recent blocks to check (node default 6, 0 = all).
        #[arg(long)]
        blocks: Option<u32>,
    },
    /// Aggregate mempool state.
    MempoolInfo,
    /// All txids currently in the mempool.
    RawMempool,
    /// Mempool entry for a transaction, if present.
    MempoolEntry { txid: Txid },
    /// Decoded transaction by txid.
    Tx { txid: Txid },
    /// Unspent output at txid:vout, if any.
    TxOut {
        txid: Txid,
        vout: u32,
        /// Exclude the mempool from the lookup.
        #[arg(long)]
        no_mempool: bool,
    },
    /// Broadcast a hex-serialized transaction.
    Broadcast { hex: String },
    /// State of the loaded wallet.
    WalletInfo,
    /// Trusted/pending/immature balance breakdown.
    Balances,
    /// Derive a fresh receive address.
    NewAddress {
        #[arg(long)]
        label: Option<String>,
        #[arg(long, value_enum)]
        address_type: Option<AddressTypeArg>,
    },
    /// Spendable wallet outputs.
    Unspent {
        /// Minimum confirmations (node default 1).
        #[arg(long)]
        min_conf: Option<u32>,
    },
    /// Recent wallet transactions.
    Transactions {
        #[arg(long, default_value = "10")]
        count: usize,
    },
    /// Send an amount to an address.
    Send {
        address: String,
        amount_btc: f64,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Per-peer connection details.
    Peers,
    /// Node networking state.
    NetworkInfo,
    /// Cumulative traffic counters.
    NetTotals,
    /// Number of connected peers.
    ConnectionCount,
    /// Add, remove, or try-once a manual peer connection.
    AddNode {
        addr: String,
        #[arg(value_enum)]
        command: AddNodeArg,
    },
    /// Disconnect the peer at the given address.
    DisconnectNode { addr: String },
    /// Ban or unban an IP or subnet.
    SetBan {
        subnet: String,
        #[arg(value_enum)]
        command: BanArg,
        /// Ban duration in seconds (node default 24h).
        #[arg(long)]
        ban_time: Option<u64>,
    },
    /// All currently banned subnets.
    ListBanned,
    /// Lift all bans.
    ClearBanned,
    /// Smart fee estimate for a confirmation target.
    EstimateFee { conf_target: u16 },
    /// Seconds the node has been running.
    Uptime,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AddNodeArg {
    Add,
    Remove,
    Onetry,
}

impl From<AddNodeArg> for AddNodeCommand {
    fn from(arg: AddNodeArg) -> Self {
        match arg {
            AddNodeArg::Add => Self::Add,
            AddNodeArg::Remove => Self::Remove,
            AddNodeArg::Onetry => Self::OneTry,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BanArg {
    Add,
    Remove,
}

impl From<BanArg> for BanCommand {
    fn from(arg: BanArg) -> Self {
        match arg {
            BanArg::Add => Self::Add,
            BanArg::Remove => Self::Remove,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AddressTypeArg {
    Legacy,
    P2shSegwit,
    Bech32,
    Bech32m,
}

impl From<AddressTypeArg> for AddressType {
    fn from(arg: AddressTypeArg) -> Self {
        match arg {
            AddressTypeArg::Legacy => Self::Legacy,
            AddressTypeArg::P2shSegwit => Self::P2shSegwit,
            AddressTypeArg::Bech32 => Self::Bech32,
            AddressTypeArg::Bech32m => Self::Bech32m,
        }
    }
}
