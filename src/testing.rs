//! In-memory stand-ins for the Solana RPC and the `solana` command line tool.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use solana_sdk::{
    clock::{Epoch, Slot, UnixTimestamp},
    pubkey::Pubkey,
};

use crate::{
    activation::{ActivationLookup, LookupError},
    stake::{Authority, EpochReward, StakeRead},
};

#[derive(Default)]
pub struct FakeChain {
    wallets: HashMap<String, Vec<Pubkey>>,
    failing_wallets: HashSet<String>,
    balances: HashMap<Pubkey, u64>,
    rewards: HashMap<(Pubkey, Epoch), EpochReward>,
    block_times: HashMap<Slot, UnixTimestamp>,
    current_epoch: Epoch,
    reward_queries: Mutex<Vec<(Pubkey, Epoch)>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_wallet(&mut self, wallet: &str, accounts: &[Pubkey]) {
        let _ = self.wallets.insert(wallet.to_string(), accounts.to_vec());
    }

    pub fn fail_wallet(&mut self, wallet: &str) {
        let _ = self.failing_wallets.insert(wallet.to_string());
    }

    pub fn set_balance(&mut self, account: &Pubkey, lamports: u64) {
        let _ = self.balances.insert(*account, lamports);
    }

    pub fn add_reward(
        &mut self,
        account: &Pubkey,
        epoch: Epoch,
        amount: u64,
        post_balance: u64,
        effective_slot: Slot,
    ) {
        let _ = self.rewards.insert(
            (*account, epoch),
            EpochReward {
                epoch,
                amount,
                post_balance,
                effective_slot,
                commission: Some(5),
            },
        );
    }

    pub fn set_block_time(&mut self, slot: Slot, timestamp: UnixTimestamp) {
        let _ = self.block_times.insert(slot, timestamp);
    }

    pub fn set_current_epoch(&mut self, epoch: Epoch) {
        self.current_epoch = epoch;
    }

    pub fn reward_queries(&self) -> Vec<(Pubkey, Epoch)> {
        self.reward_queries
            .lock()
            .expect("reward queries lock poisoned")
            .clone()
    }
}

#[async_trait]
impl StakeRead for FakeChain {
    async fn find_stake_accounts(
        &self,
        wallet: &str,
        _authority: Authority,
    ) -> Result<Vec<Pubkey>> {
        if self.failing_wallets.contains(wallet) {
            return Err(anyhow!("Invalid wallet address: {}", wallet));
        }
        Ok(self.wallets.get(wallet).cloned().unwrap_or_default())
    }

    async fn get_balance(&self, account: &Pubkey) -> Result<u64> {
        self.balances
            .get(account)
            .copied()
            .ok_or_else(|| anyhow!("Unable to get balance of {}", account))
    }

    async fn get_epoch_reward(
        &self,
        account: &Pubkey,
        epoch: Epoch,
    ) -> Result<Option<EpochReward>> {
        self.reward_queries
            .lock()
            .expect("reward queries lock poisoned")
            .push((*account, epoch));
        Ok(self.rewards.get(&(*account, epoch)).copied())
    }

    async fn get_current_epoch(&self) -> Result<Epoch> {
        Ok(self.current_epoch)
    }

    async fn get_block_time(&self, slot: Slot) -> Result<UnixTimestamp> {
        self.block_times
            .get(&slot)
            .copied()
            .ok_or_else(|| anyhow!("Unable to get block time of slot {}", slot))
    }
}

/// Canned activation epochs. Unknown accounts are never delegated.
#[derive(Default)]
pub struct FakeActivation {
    epochs: HashMap<Pubkey, Epoch>,
    failing: HashSet<Pubkey>,
    lookups: Mutex<Vec<Pubkey>>,
}

impl FakeActivation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_epoch(&mut self, account: &Pubkey, epoch: Epoch) {
        let _ = self.epochs.insert(*account, epoch);
    }

    pub fn fail(&mut self, account: &Pubkey) {
        let _ = self.failing.insert(*account);
    }

    pub fn lookups(&self) -> Vec<Pubkey> {
        self.lookups.lock().expect("lookups lock poisoned").clone()
    }
}

#[async_trait]
impl ActivationLookup for FakeActivation {
    async fn activation_epoch(&self, account: &Pubkey) -> Result<Option<Epoch>, LookupError> {
        self.lookups
            .lock()
            .expect("lookups lock poisoned")
            .push(*account);

        if self.failing.contains(account) {
            return Err(LookupError::Diagnostics {
                command: "solana".to_string(),
                message: format!("Error: {} is not a stake account", account),
            });
        }
        Ok(self.epochs.get(account).copied())
    }
}
