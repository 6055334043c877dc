//! sol-wallet
//!
//! Command-line front end: generate keys, check balances, send SOL and look
//! up submitted transactions.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wallet_core::{generate_wallet, Cluster, EncodedPrivateKey, RpcConfig, WalletClient};

/// sol-wallet - minimal Solana wallet
#[derive(Parser)]
#[command(name = "sol-wallet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON-RPC endpoint, overrides --cluster
    #[arg(long, global = true, env = "SOL_RPC_URL")]
    rpc_url: Option<String>,

    /// Public cluster (mainnet, devnet, testnet, localnet)
    #[arg(long, global = true, default_value = "devnet")]
    cluster: Cluster,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "SOL_RPC_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new keypair
    Generate,

    /// Show the balance of an address
    Balance {
        /// Base58 address
        address: String,
    },

    /// Send SOL
    Send {
        /// Base58 encoded 64-byte private key of the sender
        #[arg(long, env = "SOL_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
        /// Recipient address
        to: String,
        /// Amount in SOL
        amount: f64,
    },

    /// Look up a submitted transaction
    Status {
        /// Transaction signature
        signature: String,
    },
}

impl Cli {
    fn rpc_config(&self) -> RpcConfig {
        let config = match &self.rpc_url {
            Some(url) => RpcConfig::new(url.clone()),
            None => RpcConfig::for_cluster(self.cluster),
        };
        config.with_timeout(Duration::from_secs(self.timeout_secs))
    }

    /// Sending to a public cluster whose balances carry real value.
    fn moves_real_funds(&self) -> bool {
        self.rpc_url.is_none() && !self.cluster.is_testnet()
    }

    fn connect(&self) -> Result<WalletClient> {
        let config = self.rpc_config();
        debug!(url = %config.url, timeout = ?config.timeout, "rpc endpoint");
        WalletClient::connect(config).context("failed to configure RPC client")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "sol_wallet=debug,wallet_core=debug,sol_rpc=debug,info"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &cli.command {
        Commands::Generate => cmd_generate(),
        Commands::Balance { address } => cmd_balance(&cli, address).await,
        Commands::Send {
            private_key,
            to,
            amount,
        } => cmd_send(&cli, private_key, to, *amount).await,
        Commands::Status { signature } => cmd_status(&cli, signature).await,
    }
}

fn cmd_generate() -> Result<()> {
    let wallet = generate_wallet();

    println!("{}", "New keypair".cyan().bold());
    println!("   {} {}", "Address:".yellow(), wallet.address);
    println!("   {} {}", "Private key:".yellow(), wallet.private_key.expose());
    println!(
        "\n{}",
        "Store the private key somewhere safe. It is not saved anywhere and cannot be recovered."
            .red()
    );
    Ok(())
}

async fn cmd_balance(cli: &Cli, address: &str) -> Result<()> {
    let client = cli.connect()?;
    let balance = client
        .get_balance(address)
        .await
        .with_context(|| format!("failed to fetch balance of {address}"))?;

    println!("{} {}", "Balance:".green().bold(), balance);
    println!("   {} {}", "Lamports:".yellow(), balance.lamports());
    Ok(())
}

async fn cmd_send(cli: &Cli, private_key: &str, to: &str, amount: f64) -> Result<()> {
    let client = cli.connect()?;
    let key = EncodedPrivateKey::new(private_key);

    if cli.moves_real_funds() {
        println!(
            "{} {}",
            "Warning:".red().bold(),
            format!("sending real SOL on {}", cli.cluster).yellow()
        );
    }
    println!("{} {} SOL to {}", "Sending".cyan().bold(), amount, to);

    match client.send_transfer(&key, to, amount).await {
        Ok(receipt) => {
            println!("\n{}", "Transfer submitted".green().bold());
            println!("   {} {}", "Signature:".yellow(), receipt.signature);
            println!("   {} {}", "Lamports:".yellow(), receipt.lamports);
            Ok(())
        }
        Err(failure) => {
            if let Some(signature) = &failure.pending_signature {
                println!(
                    "\n{} {}",
                    "Outcome unknown, check before resending:".yellow().bold(),
                    signature
                );
            } else if failure.is_retry_safe() {
                println!("\n{}", "Nothing was submitted; safe to retry.".yellow());
            }
            bail!("transfer failed ({:?}): {}", failure.kind(), failure)
        }
    }
}

async fn cmd_status(cli: &Cli, signature: &str) -> Result<()> {
    let client = cli.connect()?;
    let status = client
        .transaction_status(signature)
        .await
        .context("failed to fetch transaction status")?;

    let Some(status) = status else {
        println!("{}", "Not found".yellow());
        return Ok(());
    };

    let outcome = if status.is_success() {
        "succeeded".green()
    } else {
        "failed".red()
    };
    println!("{} {}", "Transaction".bold(), outcome);
    println!("   {} {}", "Slot:".yellow(), status.slot);
    if let Some(level) = status.confirmation_status {
        println!("   {} {:?}", "Commitment:".yellow(), level);
    }
    if let Some(confirmations) = status.confirmations {
        println!("   {} {}", "Confirmations:".yellow(), confirmations);
    }
    if let Some(err) = &status.err {
        println!("   {} {}", "Error:".red(), err);
    }
    Ok(())
}
