mod cli;

use bitcoin::{Address, Amount, Network};
use clap::Parser;
use eyre::{eyre, WrapErr};

use nodectl_core::{Client, ConnectionConfig};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_level(true)
        .init();

    let config = ConnectionConfig {
        url: args.rpc_url.clone(),
        user: args.rpc_user.clone(),
        pass: args.rpc_pass.clone(),
        cookie_file: args.rpc_cookie.clone(),
        wallet: args.wallet.clone(),
        requests_per_second: args.requests_per_second,
        ..ConnectionConfig::default()
    };
    let client = Client::connect(&config).wrap_err("build RPC client")?;

    // Verify the connection with one cheap call before dispatching, so
    // connectivity problems produce one actionable message instead of a
    // method-specific failure.
    let chain_info = client.get_blockchain_info().await.map_err(|err| {
        let message = format_rpc_connect_error(&args.rpc_url, &err.to_string());
        eyre!(message).wrap_err("while attempting to connect to Bitcoin Core RPC")
    })?;

    tracing::info!(
        chain = %chain_info.chain,
        blocks = chain_info.blocks,
        "connected to Bitcoin Core"
    );
    if chain_info.pruned {
        tracing::warn!("node is pruned — queries for old blocks and transactions may fail");
    }

    run(&client, &chain_info.chain, args.command).await
}

async fn run(client: &Client, chain: &str, command: cli::Command) -> eyre::Result<()> {
    use cli::Command;

    match command {
        Command::ChainInfo => print_json(&client.get_blockchain_info().await?),
        Command::BlockCount => {
            println!("{}", client.get_block_count().await?);
            Ok(())
        }
        Command::BestBlockHash => {
            println!("{}", client.get_best_block_hash().await?);
            Ok(())
        }
        Command::Block { hash } => print_json(&client.get_block(&hash).await?),
        Command::BlockHeader { hash } => print_json(&client.get_block_header(&hash).await?),
        Command::BlockAt { height } => {
            println!("{}", client.get_block_hash(height).await?);
            Ok(())
        }
        Command::ChainTips => print_json(&client.get_chain_tips().await?),
        Command::VerifyChain {
            check_level,
            blocks,
        } => {
            let ok = client.verify_chain(check_level, blocks).await?;
            println!("{ok}");
            if !ok {
                return Err(eyre!("chain database verification failed"));
            }
            Ok(())
        }
        Command::MempoolInfo => print_json(&client.get_mempool_info().await?),
        Command::RawMempool => print_json(&client.get_raw_mempool().await?),
        Command::MempoolEntry { txid } => print_json(&client.get_mempool_entry(&txid).await?),
        Command::Tx { txid } => print_json(&client.get_raw_transaction(&txid).await?),
        Command::TxOut {
            txid,
            vout,
            no_mempool,
        } => print_json(&client.get_tx_out(&txid, vout, !no_mempool).await?),
        Command::Broadcast { hex } => {
            println!("{}", client.send_raw_transaction(&hex).await?);
            Ok(())
        }
        Command::WalletInfo => print_json(&client.get_wallet_info().await?),
        Command::Balances => print_json(&client.get_balances().await?),
        Command::NewAddress {
            label,
            address_type,
        } => {
            let address = client
                .get_new_address(label.as_deref(), address_type.map(Into::into))
                .await?;
            println!("{}", address.assume_checked());
            Ok(())
        }
        Command::Unspent { min_conf } => print_json(&client.list_unspent(min_conf).await?),
        Command::Transactions { count } => {
            print_json(&client.list_transactions(Some(count)).await?)
        }
        Command::Send {
            address,
            amount_btc,
            comment,
        } => {
            let network = map_chain_to_network(chain)?;
            let address: Address = address
                .parse::<Address<_>>()
                .wrap_err("parse destination address")?
                .require_network(network)
                .wrap_err_with(|| format!("address is not valid for the node's network ({network})"))?;
            let amount = Amount::from_btc(amount_btc).wrap_err("parse amount")?;
            let txid = client
                .send_to_address(&address, amount, comment.as_deref())
                .await?;
            println!("{txid}");
            Ok(())
        }
        Command::Peers => print_json(&client.get_peer_info().await?),
        Command::NetworkInfo => print_json(&client.get_network_info().await?),
        Command::NetTotals => print_json(&client.get_net_totals().await?),
        Command::ConnectionCount => {
            println!("{}", client.get_connection_count().await?);
            Ok(())
        }
        Command::AddNode { addr, command } => {
            client.add_node(&addr, command.into()).await?;
            println!("ok");
            Ok(())
        }
        Command::DisconnectNode { addr } => {
            client.disconnect_node(&addr).await?;
            println!("ok");
            Ok(())
        }
        Command::SetBan {
            subnet,
            command,
            ban_time,
        } => {
            client.set_ban(&subnet, command.into(), ban_time).await?;
            println!("ok");
            Ok(())
        }
        Command::ListBanned => print_json(&client.list_banned().await?),
        Command::ClearBanned => {
            client.clear_banned().await?;
            println!("ok");
            Ok(())
        }
        Command::EstimateFee { conf_target } => {
            print_json(&client.estimate_smart_fee(conf_target).await?)
        }
        Command::Uptime => {
            println!("{}", client.uptime().await?);
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> eyre::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).wrap_err("serialize result")?
    );
    Ok(())
}

fn format_rpc_connect_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not connect to RPC endpoint `{rpc_url}`"),
        format!("RPC error: {source_error}"),
    ];

    if source_error.contains("Could not resolve host") || source_error.contains("dns error") {
        lines.push(
            "hint: hostname resolution failed; verify the endpoint hostname and your DNS/network"
                .into(),
        );
    } else if source_error.contains("tls")
        || source_error.contains("certificate")
        || source_error.contains("SSL")
    {
        lines.push(
            "hint: TLS handshake failed; verify certificate trust and that the endpoint uses HTTPS"
                .into(),
        );
    } else if source_error.contains("401") || source_error.contains("403") {
        lines.push(
            "hint: authentication failed; verify --rpc-user/--rpc-pass or the cookie file".into(),
        );
    } else if source_error.contains("404") {
        lines.push(
            "hint: endpoint path is invalid; verify the RPC URL and any wallet path".into(),
        );
    } else if source_error.contains("error sending request for url") {
        lines.push("hint: request could not be sent; verify URL format, network access, and endpoint reachability".into());
    }

    lines.join("\n")
}

fn map_chain_to_network(chain: &str) -> eyre::Result<Network> {
    match chain {
        "main" => Ok(Network::Bitcoin),
        "test" => Ok(Network::Testnet),
        "signet" => Ok(Network::Signet),
        "regtest" => Ok(Network::Regtest),
        _ => Err(eyre!(
            "unrecognized chain name `{chain}` from getblockchaininfo"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_error_hints_at_auth_failures() {
        let msg = format_rpc_connect_error("http://127.0.0.1:8332", "HTTP status 401 Unauthorized");
        assert!(msg.contains("authentication failed"));
    }

    #[test]
    fn connect_error_hints_at_dns_failures() {
        let msg = format_rpc_connect_error("http://node.invalid:8332", "dns error: not found");
        assert!(msg.contains("hostname resolution failed"));
    }

    #[test]
    fn chain_names_map_to_networks() {
        assert_eq!(map_chain_to_network("main").unwrap(), Network::Bitcoin);
        assert_eq!(map_chain_to_network("regtest").unwrap(), Network::Regtest);
        assert!(map_chain_to_network("mystery").is_err());
    }
}
