use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use solana_client::rpc_response::RpcInflationReward;
use solana_sdk::{
    clock::{Epoch, Slot, UnixTimestamp},
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    stake,
};
use tracing::{debug, info, warn};

use crate::solana::SolanaRpc;

// Stake account layout (bincode `StakeStateV2`): 4 bytes of enum tag, then
// `Meta { rent_exempt_reserve: u64, authorized: { staker, withdrawer }, .. }`.
const STAKER_OFFSET: usize = 4 + 8;
const WITHDRAWER_OFFSET: usize = STAKER_OFFSET + 32;

/// Which stake account authority the wallet is matched against.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Authority {
    Staker,
    Withdrawer,
}

impl Authority {
    pub const fn offset(self) -> usize {
        match self {
            Self::Staker => STAKER_OFFSET,
            Self::Withdrawer => WITHDRAWER_OFFSET,
        }
    }
}

impl Display for Authority {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staker => write!(f, "staker"),
            Self::Withdrawer => write!(f, "withdrawer"),
        }
    }
}

/// Inflation reward credited to one stake account at the end of one epoch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EpochReward {
    pub epoch: Epoch,
    pub amount: u64,
    pub post_balance: u64,
    pub effective_slot: Slot,
    pub commission: Option<u8>,
}

impl From<RpcInflationReward> for EpochReward {
    fn from(reward: RpcInflationReward) -> Self {
        Self {
            epoch: reward.epoch,
            amount: reward.amount,
            post_balance: reward.post_balance,
            effective_slot: reward.effective_slot,
            commission: reward.commission,
        }
    }
}

pub fn conv_sol(lamports: i128) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Chain reads the reward estimation needs.
#[async_trait]
pub trait StakeRead {
    async fn find_stake_accounts(&self, wallet: &str, authority: Authority)
        -> Result<Vec<Pubkey>>;

    async fn get_balance(&self, account: &Pubkey) -> Result<u64>;

    async fn get_epoch_reward(&self, account: &Pubkey, epoch: Epoch)
        -> Result<Option<EpochReward>>;

    async fn get_current_epoch(&self) -> Result<Epoch>;

    async fn get_block_time(&self, slot: Slot) -> Result<UnixTimestamp>;
}

#[async_trait]
impl StakeRead for SolanaRpc {
    async fn find_stake_accounts(
        &self,
        wallet: &str,
        authority: Authority,
    ) -> Result<Vec<Pubkey>> {
        let wallet = Pubkey::from_str(wallet)
            .with_context(|| format!("Invalid wallet address: {}", wallet))?;

        self.find_program_accounts(&stake::program::id(), authority.offset(), wallet.as_ref())
            .await
            .with_context(|| format!("Unable to find stake accounts of {}", wallet))
    }

    async fn get_balance(&self, account: &Pubkey) -> Result<u64> {
        Self::get_balance(self, account).await
    }

    async fn get_epoch_reward(
        &self,
        account: &Pubkey,
        epoch: Epoch,
    ) -> Result<Option<EpochReward>> {
        Ok(self
            .get_inflation_reward(account, epoch)
            .await?
            .map(EpochReward::from))
    }

    async fn get_current_epoch(&self) -> Result<Epoch> {
        Ok(self.get_epoch_info().await?.epoch)
    }

    async fn get_block_time(&self, slot: Slot) -> Result<UnixTimestamp> {
        Self::get_block_time(self, slot).await
    }
}

/// Stake accounts of all `wallets`, in discovery order. A wallet that can not
/// be queried is logged and skipped.
pub async fn discover_stake_accounts<C>(
    chain: &C,
    wallets: &[String],
    authority: Authority,
) -> Vec<Pubkey>
where
    C: StakeRead + Sync,
{
    let mut stake_accounts = Vec::new();

    for wallet in wallets {
        match chain.find_stake_accounts(wallet, authority).await {
            Ok(accounts) => {
                info!(
                    "Found {} stake account(s) with {} {}",
                    accounts.len(),
                    authority,
                    wallet
                );
                for account in &accounts {
                    debug!("Stake account {} of {}", account, wallet);
                }
                stake_accounts.extend(accounts);
            }

            Err(error) => {
                warn!("Skipping wallet {}: {:?}", wallet, error);
            }
        }
    }

    stake_accounts
}
