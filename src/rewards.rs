use std::fmt::{self, Display, Formatter};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use solana_sdk::{
    clock::{Epoch, Slot, SECONDS_PER_DAY},
    pubkey::Pubkey,
};
use tracing::{debug, info};

use crate::stake::{conv_sol, StakeRead};

/// How the reward of a single stake account is computed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Strategy {
    /// Current balance minus the delegation implied by the first reward.
    Constant,
    /// Walk every epoch since activation and log each reward. Always reports 0.
    Iterative,
    /// Walk every epoch since activation and sum the rewards.
    IterativeSum,
}

impl Strategy {
    pub async fn account_reward<C>(
        self,
        chain: &C,
        account: &Pubkey,
        activation_epoch: Epoch,
    ) -> Result<f64>
    where
        C: StakeRead + Sync,
    {
        match self {
            Self::Constant => constant_reward(chain, account, activation_epoch).await,
            Self::Iterative => iterative_reward(chain, account, activation_epoch, false).await,
            Self::IterativeSum => iterative_reward(chain, account, activation_epoch, true).await,
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Iterative => write!(f, "iterative"),
            Self::IterativeSum => write!(f, "iterative-sum"),
        }
    }
}

/// Reward in SOL, assuming the delegated amount did not change since
/// activation except for rewards. Withdrawals make the result negative.
pub async fn constant_reward<C>(chain: &C, account: &Pubkey, activation_epoch: Epoch) -> Result<f64>
where
    C: StakeRead + Sync,
{
    let current_balance = chain.get_balance(account).await?;
    debug!("Stake account {} balance: {}", account, current_balance);

    // First epoch a reward could have been credited in.
    let first_reward_epoch = activation_epoch.saturating_add(1);
    let reward = match chain.get_epoch_reward(account, first_reward_epoch).await? {
        Some(reward) if reward.amount != 0 => reward,
        Some(_) | None => {
            info!(
                "No reward for stake account {} at epoch {}",
                account, first_reward_epoch
            );
            return Ok(0.0);
        }
    };
    if reward.post_balance == 0 {
        info!(
            "No post balance for stake account {} at epoch {}, unable to calculate reward",
            account, first_reward_epoch
        );
        return Ok(0.0);
    }

    let initial_balance = i128::from(reward.post_balance) - i128::from(reward.amount);
    let staked_rewards = i128::from(current_balance) - initial_balance;
    debug!(
        "Stake account {}: initial delegation {}, earned {} lamports",
        account, initial_balance, staked_rewards
    );

    Ok(conv_sol(staked_rewards))
}

/// Queries every epoch up to the current one and logs each reward with the
/// time passed since the previous one.
///
/// Without `accumulate` the walk starts at `activation_epoch + 2` and the
/// result is always 0. With `accumulate` it starts at the first reward epoch,
/// `activation_epoch + 1`, and sums every reward, so it matches
/// [`constant_reward`] as long as nothing was withdrawn.
pub async fn iterative_reward<C>(
    chain: &C,
    account: &Pubkey,
    activation_epoch: Epoch,
    accumulate: bool,
) -> Result<f64>
where
    C: StakeRead + Sync,
{
    let current_epoch = chain.get_current_epoch().await?;
    let first_epoch = if accumulate {
        activation_epoch.saturating_add(1)
    } else {
        activation_epoch.saturating_add(2)
    };
    info!(
        "Walking epochs {}..{} of stake account {}",
        first_epoch, current_epoch, account
    );

    let mut total_reward = 0.0;
    let mut prev_reward_time: Option<DateTime<Utc>> = None;

    for epoch in first_epoch..current_epoch {
        let reward = match chain.get_epoch_reward(account, epoch).await? {
            Some(reward) if reward.amount != 0 => reward,
            Some(_) | None => {
                debug!("No reward for stake account {} at epoch {}", account, epoch);
                continue;
            }
        };

        let reward_sol = conv_sol(reward.amount.into());
        let reward_time = block_time(chain, reward.effective_slot)
            .await
            .with_context(|| format!("Reward of {} at epoch {}", account, epoch))?;

        match prev_reward_time {
            Some(prev) => info!(
                "Epoch {}: {} SOL at {}, {:.2} days after previous reward",
                reward.epoch,
                reward_sol,
                reward_time.format("%Y-%m-%d %H:%M:%S"),
                days_between(prev, reward_time),
            ),
            None => info!(
                "Epoch {}: {} SOL at {}",
                reward.epoch,
                reward_sol,
                reward_time.format("%Y-%m-%d %H:%M:%S"),
            ),
        }
        if let Some(commission) = reward.commission {
            debug!("Epoch {}: validator commission {}%", epoch, commission);
        }
        prev_reward_time = Some(reward_time);

        if accumulate {
            total_reward += reward_sol;
        }
    }

    Ok(total_reward)
}

async fn block_time<C>(chain: &C, slot: Slot) -> Result<DateTime<Utc>>
where
    C: StakeRead + Sync,
{
    let timestamp = chain.get_block_time(slot).await?;
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| anyhow!("Invalid block time of slot {}: {}", slot, timestamp))
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / SECONDS_PER_DAY as f64
}
