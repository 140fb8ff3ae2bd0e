use std::{
    io,
    process::{ExitStatus, Stdio},
};

use async_trait::async_trait;
use serde_derive::Deserialize;
use solana_sdk::{clock::Epoch, pubkey::Pubkey};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Unable to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} exited with {status}")]
    Exit { command: String, status: ExitStatus },

    #[error("{command} reported: {message}")]
    Diagnostics { command: String, message: String },

    #[error("Unable to parse stake account summary: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolves the epoch in which a stake account became active.
#[async_trait]
pub trait ActivationLookup {
    /// `Ok(None)` when the account has never been delegated.
    async fn activation_epoch(&self, account: &Pubkey) -> Result<Option<Epoch>, LookupError>;
}

// Subset of `solana stake-account --output json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StakeAccountSummary {
    activation_epoch: Option<Epoch>,
}

/// Asks the `solana` command line tool.
pub struct SolanaCli {
    command: String,
    command_args: Vec<String>,
    url: String,
}

impl SolanaCli {
    /// `command_args` go before the `stake-account` subcommand.
    pub const fn new(command: String, command_args: Vec<String>, url: String) -> Self {
        Self {
            command,
            command_args,
            url,
        }
    }

    fn args(&self, account: &Pubkey) -> Vec<String> {
        let mut args = self.command_args.clone();
        args.extend([
            "stake-account".to_string(),
            account.to_string(),
            "--url".to_string(),
            self.url.clone(),
            "--output".to_string(),
            "json".to_string(),
        ]);
        args
    }
}

#[async_trait]
impl ActivationLookup for SolanaCli {
    async fn activation_epoch(&self, account: &Pubkey) -> Result<Option<Epoch>, LookupError> {
        let args = self.args(account);
        debug!("Running {} with arguments {:?}", self.command, args);

        let output = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| LookupError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(LookupError::Exit {
                command: self.command.clone(),
                status: output.status,
            });
        }

        // Any stderr output fails the lookup, even whitespace.
        if !output.stderr.is_empty() {
            return Err(LookupError::Diagnostics {
                command: self.command.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        trace!(
            "Stake account {} summary: {}",
            account,
            String::from_utf8_lossy(&output.stdout)
        );
        parse_activation_epoch(&output.stdout)
    }
}

fn parse_activation_epoch(stdout: &[u8]) -> Result<Option<Epoch>, LookupError> {
    let summary: StakeAccountSummary = serde_json::from_slice(stdout)?;
    Ok(summary.activation_epoch)
}
