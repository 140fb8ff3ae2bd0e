use anyhow::Result;
use solana_sdk::{clock::Epoch, pubkey::Pubkey};
use tracing::{info, warn};

use crate::{
    activation::ActivationLookup,
    rewards::Strategy,
    stake::{discover_stake_accounts, Authority, StakeRead},
};

pub struct RewardEstimator<'a, C, L> {
    chain: &'a C,
    activation: &'a L,
    strategy: Strategy,
}

impl<'a, C, L> RewardEstimator<'a, C, L>
where
    C: StakeRead + Sync,
    L: ActivationLookup + Sync,
{
    pub const fn new(chain: &'a C, activation: &'a L, strategy: Strategy) -> Self {
        Self {
            chain,
            activation,
            strategy,
        }
    }

    /// Net rewards in SOL of all stake accounts where one of `wallets` is the
    /// `authority`.
    pub async fn estimate(&self, wallets: &[String], authority: Authority) -> Result<f64> {
        let stake_accounts = discover_stake_accounts(self.chain, wallets, authority).await;
        info!(
            "{} stake account(s) found for {} wallet(s)",
            stake_accounts.len(),
            wallets.len()
        );

        self.net_rewards(&stake_accounts).await
    }

    pub async fn net_rewards(&self, stake_accounts: &[Pubkey]) -> Result<f64> {
        let mut net_rewards = 0.0;

        for account in stake_accounts {
            let Some(activation_epoch) = self.activation_epoch(account).await else {
                info!(
                    "Skipping stake account {}, probably never delegated",
                    account
                );
                continue;
            };

            let reward = self
                .strategy
                .account_reward(self.chain, account, activation_epoch)
                .await?;
            info!(
                "Stake account {} (active since epoch {}): {} SOL",
                account, activation_epoch, reward
            );
            net_rewards += reward;
        }

        Ok(net_rewards)
    }

    // A failed lookup can not be told apart from an undelegated account.
    async fn activation_epoch(&self, account: &Pubkey) -> Option<Epoch> {
        match self.activation.activation_epoch(account).await {
            Ok(epoch) => epoch,

            Err(error) => {
                warn!(
                    "Unable to get activation epoch of stake account {}: {}",
                    account, error
                );
                None
            }
        }
    }
}

/// Final line printed to stdout.
pub fn net_rewards_line(net_rewards: f64) -> String {
    format!("Net rewards: {} SOL", net_rewards)
}
