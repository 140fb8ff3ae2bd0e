use std::time::Duration;

use anyhow::{Context, Result};
use solana_account_decoder::{UiAccountEncoding, UiDataSliceConfig};
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
    rpc_response::RpcInflationReward,
};
use solana_sdk::{
    clock::{Epoch, Slot, UnixTimestamp},
    commitment_config::CommitmentConfig,
    epoch_info::EpochInfo,
    pubkey::Pubkey,
};
use tracing::{debug, trace};

pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    pub fn new(url: String, timeout: Duration, commitment: CommitmentConfig) -> Self {
        debug!(
            "Using Solana RPC {} with {:?} commitment and {:?} timeout",
            url, commitment.commitment, timeout
        );

        Self {
            client: RpcClient::new_with_timeout_and_commitment(url, timeout, commitment),
        }
    }

    /// Addresses of `program` accounts holding `bytes` at `offset`. Account
    /// data itself is not transferred.
    pub async fn find_program_accounts(
        &self,
        program: &Pubkey,
        offset: usize,
        bytes: &[u8],
    ) -> Result<Vec<Pubkey>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                offset, bytes,
            ))]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                data_slice: Some(UiDataSliceConfig {
                    offset: 0,
                    length: 0,
                }),
                commitment: Some(self.client.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let accounts = self
            .client
            .get_program_accounts_with_config(program, config)
            .await
            .with_context(|| format!("Unable to search accounts of program {}", program))?;
        trace!(
            "{} accounts of program {} matched at offset {}",
            accounts.len(),
            program,
            offset
        );

        Ok(accounts.into_iter().map(|(address, _)| address).collect())
    }

    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.client
            .get_balance(address)
            .await
            .with_context(|| format!("Unable to get balance of {}", address))
    }

    pub async fn get_inflation_reward(
        &self,
        address: &Pubkey,
        epoch: Epoch,
    ) -> Result<Option<RpcInflationReward>> {
        let mut rewards = self
            .client
            .get_inflation_reward(&[*address], Some(epoch))
            .await
            .with_context(|| {
                format!(
                    "Unable to get inflation reward of {} for epoch {}",
                    address, epoch
                )
            })?;

        Ok(rewards.pop().flatten())
    }

    pub async fn get_epoch_info(&self) -> Result<EpochInfo> {
        self.client
            .get_epoch_info()
            .await
            .context("Unable to get epoch info")
    }

    pub async fn get_block_time(&self, slot: Slot) -> Result<UnixTimestamp> {
        self.client
            .get_block_time(slot)
            .await
            .with_context(|| format!("Unable to get block time of slot {}", slot))
    }
}
