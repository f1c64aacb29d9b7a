use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AccountSource, Credentials};
use crate::config::AccountConfig;

/// Hands out the accounts listed in the config, in order.
pub struct ConfiguredAccounts {
    pending: Mutex<VecDeque<Credentials>>,
}

impl ConfiguredAccounts {
    pub fn new(accounts: &[AccountConfig]) -> Self {
        let pending = accounts
            .iter()
            .map(|a| Credentials::new(a.username.clone(), a.password.clone()))
            .collect();
        Self {
            pending: Mutex::new(pending),
        }
    }
}

#[async_trait]
impl AccountSource for ConfiguredAccounts {
    async fn next_account(&self) -> Option<Credentials> {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.pop_front()
    }
}
