#![deny(unsafe_code)]
#![warn(unused_results)]
#![warn(private_interfaces)]
#![warn(private_bounds)]
#![warn(clippy::empty_line_after_outer_attr)]
#![warn(clippy::manual_filter_map)]
#![warn(clippy::if_not_else)]
#![warn(clippy::mut_mut)]
#![warn(clippy::non_ascii_literal)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::use_self)]
#![warn(clippy::used_underscore_binding)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::map_flatten)]
#![warn(clippy::wildcard_dependencies)]
#![warn(clippy::wildcard_enum_match_arm)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::manual_find_map)]
#![warn(clippy::filter_map_next)]
#![warn(clippy::checked_conversions)]
#![warn(clippy::type_repetition_in_bounds)]

use std::process::exit;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tokio::select;
use tracing::{debug, error};
use tracing_core::LevelFilter;

mod activation;
mod cli;
mod estimator;
mod rewards;
mod signals;
mod solana;
mod stake;
#[cfg(test)]
mod testing;
mod trace;

use crate::activation::SolanaCli;
use crate::cli::{usage_exit_code, Cli};
use crate::estimator::{net_rewards_line, RewardEstimator};
use crate::signals::wait_for_termination;
use crate::solana::SolanaRpc;
use crate::trace::{default_level, init_tracing, TracingReloadFn};

fn main() {
    let args = Cli::try_parse().unwrap_or_else(|error| {
        let return_code = usage_exit_code(&error);
        let _ = error.print();
        exit(return_code)
    });

    let level = default_level(args.verbose);
    let tracing_reload_fn = match init_tracing(args.log_without_timestamps, level)
        .context("Unable to initialize logging/tracing")
    {
        Ok(tracing_reload_fn) => tracing_reload_fn,
        Err(error) => panic!("{:?}", error),
    };

    let return_code = match start_async(args, tracing_reload_fn, level) {
        Ok(()) => 0,

        Err(error) => {
            error!("Fatal error: {:?}", error);
            2
        }
    };

    exit(return_code)
}

fn start_async(args: Cli, tracing_reload_fn: TracingReloadFn, level: LevelFilter) -> Result<()> {
    // Every query waits for the previous one, a single thread is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .thread_name("amain")
        .build()
        .context("Unable to initialize Tokio runtime")?;

    runtime.block_on(async {
        select! {
            r = wait_for_termination(tracing_reload_fn, level) => {
                r.and_then(|()| Err(anyhow!("Interrupted")))
            }
            r = async_main(args) => r,
        }
    })
}

async fn async_main(args: Cli) -> Result<()> {
    #![allow(clippy::print_stdout)]

    debug!(
        "Estimating rewards of {} wallet(s) with {} strategy",
        args.wallets.len(),
        args.strategy
    );

    let solana = SolanaRpc::new(args.url.clone(), args.solana_timeout, args.commitment);
    let solana_cli = SolanaCli::new(args.solana_cli, args.solana_cli_arg, args.url);

    let net_rewards = RewardEstimator::new(&solana, &solana_cli, args.strategy)
        .estimate(&args.wallets, args.authority)
        .await?;
    drop(solana);

    println!("{}", net_rewards_line(net_rewards));
    Ok(())
}
