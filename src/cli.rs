use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use solana_sdk::commitment_config::CommitmentConfig;

use crate::{rewards::Strategy, stake::Authority};

/// Estimate staking rewards earned by the stake accounts of given wallets.
#[derive(Parser)]
#[command(about, version)]
pub struct Cli {
    /// Do not print timestamp with each line of log.
    #[arg(short = 'T', long)]
    pub log_without_timestamps: bool,

    /// More logging: `-v` for debug, `-vv` for trace. `RUST_LOG` overrides.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// URL for Solana's JSON RPC or moniker (or their first letter): mainnet-beta, testnet, devnet, localhost.
    #[arg(short = 'u', long, value_name = "URL", env = "SOLANA_RPC_URL", default_value = "mainnet-beta", value_parser = parse_solana_rpc_url)]
    pub url: String,

    /// Solana RPC timeout.
    #[arg(short = 't', long, value_name = "SECONDS", default_value = "30", value_parser = parse_duration)]
    pub solana_timeout: Duration,

    /// Commitment level of RPC requests: processed, confirmed, finalized.
    #[arg(short = 'c', long, value_name = "LEVEL", default_value = "confirmed", value_parser = parse_commitment)]
    pub commitment: CommitmentConfig,

    /// How the reward of each stake account is calculated.
    #[arg(short = 's', long, value_enum, default_value_t = Strategy::Constant)]
    pub strategy: Strategy,

    /// Stake account authority to match wallets against.
    #[arg(short = 'a', long, value_enum, default_value_t = Authority::Staker)]
    pub authority: Authority,

    /// Solana CLI command used to look up activation epochs. Full path may be specified here.
    #[arg(long, value_name = "COMMAND", default_value = "solana")]
    pub solana_cli: String,

    /// Additional argument for the Solana CLI, placed before the subcommand. May be repeated.
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    pub solana_cli_arg: Vec<String>,

    /// Wallet addresses owning the stake accounts.
    #[arg(value_name = "WALLET", required = true)]
    pub wallets: Vec<String>,
}

/// Exit code for a failed argument parse. Help and version requests exit 0,
/// usage errors such as missing wallets exit 1.
pub fn usage_exit_code(error: &clap::Error) -> i32 {
    i32::from(error.use_stderr())
}

fn parse_solana_rpc_url(url_or_moniker: &str) -> Result<String> {
    Ok(match url_or_moniker {
        "m" | "mainnet-beta" => "https://api.mainnet-beta.solana.com",
        "t" | "testnet" => "https://api.testnet.solana.com",
        "d" | "devnet" => "https://api.devnet.solana.com",
        "l" | "localhost" => "http://localhost:8899",
        url => url,
    }
    .to_string())
}

fn parse_duration(duration: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(
        duration
            .parse::<f64>()
            .with_context(|| format!("Unable to parse duration \"{}\"", duration))?,
    )
    .with_context(|| format!("Invalid duration \"{}\"", duration))
}

fn parse_commitment(level: &str) -> Result<CommitmentConfig> {
    match level {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        level => Err(anyhow!(
            "Unknown commitment level \"{}\", expected processed, confirmed or finalized",
            level
        )),
    }
}
