//! Free-quota and credit accounting

use serde::{Deserialize, Serialize};

/// Chats every session gets before credits are spent
pub const FREE_CHAT_LIMIT: u32 = 5;

/// Tracks used chats against the free quota and the credit balance.
///
/// All arithmetic saturates, so no sequence of calls can underflow the
/// balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLedger {
    free_quota: u32,
    chats_used: u32,
    balance: u32,
}

// One credit per free chat: the paywall shows after twice the quota
impl Default for CreditLedger {
    fn default() -> Self {
        Self::new(FREE_CHAT_LIMIT)
    }
}

impl CreditLedger {
    pub fn new(starting_balance: u32) -> Self {
        Self {
            free_quota: FREE_CHAT_LIMIT,
            chats_used: 0,
            balance: starting_balance,
        }
    }

    pub fn free_quota(&self) -> u32 {
        self.free_quota
    }

    pub fn chats_used(&self) -> u32 {
        self.chats_used
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    /// Free chats left before the balance is charged
    pub fn free_remaining(&self) -> u32 {
        self.free_quota.saturating_sub(self.chats_used)
    }

    pub fn can_chat(&self) -> bool {
        self.chats_used < self.free_quota || self.balance > 0
    }

    pub fn is_exhausted(&self) -> bool {
        !self.can_chat()
    }

    /// Count one completed chat turn, charging a credit once past the quota
    pub fn record_chat(&mut self) {
        self.chats_used = self.chats_used.saturating_add(1);
        if self.chats_used > self.free_quota {
            self.balance = self.balance.saturating_sub(1);
        }
    }

    pub fn add_credit(&mut self, n: u32) {
        self.balance = self.balance.saturating_add(n);
    }
}
