//! Shared test helpers for `nodectl-core` unit tests.
//!
//! Deterministic identifier builders and canned RPC result fixtures, shared
//! across module tests so dummy data has a single source of truth.

use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, Txid};

use crate::types::ChainInfo;

// ==============================================================================
// Identifier Helpers
// ==============================================================================

/// Deterministic `Txid` from a single distinguishing byte.
pub fn txid_from_byte(b: u8) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Txid::from_byte_array(bytes)
}

/// Deterministic `BlockHash` from a single distinguishing byte.
pub fn block_hash_from_byte(b: u8) -> BlockHash {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    BlockHash::from_byte_array(bytes)
}

// ==============================================================================
// Result Fixtures
// ==============================================================================

/// A parsed `ChainInfo` at the given height, for cache tests.
pub fn chain_info_fixture(blocks: u64) -> ChainInfo {
    serde_json::from_value(chain_info_json(blocks)).expect("fixture must deserialize")
}

/// A `getblockchaininfo` result body at the given height.
pub fn chain_info_json(blocks: u64) -> serde_json::Value {
    serde_json::json!({
        "chain": "regtest",
        "blocks": blocks,
        "headers": blocks,
        "bestblockhash": block_hash_from_byte(0xAA).to_string(),
        "difficulty": 4.656542373906925e-10,
        "mediantime": 1700000000u64,
        "verificationprogress": 1.0,
        "initialblockdownload": false,
        "pruned": false,
    })
}

/// A `getblockheader` verbose result body at the given height.
pub fn block_header_json(hash: BlockHash, height: u64) -> serde_json::Value {
    serde_json::json!({
        "hash": hash.to_string(),
        "confirmations": 10,
        "height": height,
        "version": 0x20000000,
        "merkleroot": txid_from_byte(0x11).to_string(),
        "time": 1700000000u64,
        "mediantime": 1699999000u64,
        "nonce": 42,
        "bits": "207fffff",
        "difficulty": 4.656542373906925e-10,
        "nTx": 1,
        "previousblockhash": block_hash_from_byte(0x01).to_string(),
    })
}

/// A `getrawtransaction` verbose result body for a one-in one-out spend.
pub fn raw_transaction_json(txid: Txid) -> serde_json::Value {
    serde_json::json!({
        "txid": txid.to_string(),
        "hash": txid.to_string(),
        "version": 2,
        "size": 222,
        "vsize": 141,
        "weight": 561,
        "locktime": 0,
        "vin": [{
            "txid": txid_from_byte(0x22).to_string(),
            "vout": 0,
            "sequence": 4294967293u32,
            "txinwitness": ["aa", "bb"],
        }],
        "vout": [{
            "value": 0.015,
            "n": 0,
            "scriptPubKey": {
                "asm": "0 0102030405060708090a0b0c0d0e0f1011121314",
                "hex": "00140102030405060708090a0b0c0d0e0f1011121314",
                "type": "witness_v0_keyhash",
            },
        }],
        "blockhash": block_hash_from_byte(0x33).to_string(),
        "confirmations": 6,
        "time": 1700000000u64,
        "blocktime": 1700000000u64,
    })
}

/// A `getmempoolentry` result body.
pub fn mempool_entry_json() -> serde_json::Value {
    serde_json::json!({
        "vsize": 141,
        "weight": 561,
        "time": 1700000100u64,
        "height": 100,
        "descendantcount": 1,
        "descendantsize": 141,
        "ancestorcount": 1,
        "ancestorsize": 141,
        "wtxid": txid_from_byte(0x44).to_string(),
        "fees": {
            "base": 0.00000141,
            "modified": 0.00000141,
            "ancestor": 0.00000141,
            "descendant": 0.00000141,
        },
        "depends": [],
        "spentby": [],
        "bip125-replaceable": true,
        "unbroadcast": false,
    })
}
