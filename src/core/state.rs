use crate::core::account::AccountId;
use crate::core::amount::Amount;
use crate::core::config::BankConfig;
use crate::core::reserve::Reserve;
use crate::core::vault::VaultStore;
use serde::{Deserialize, Serialize};

/// Everything a bank persists: its configuration, the reserve and the
/// account-to-vault mapping.
///
/// Amounts serialize as decimal strings; timestamps as RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub config: BankConfig,
    pub reserve: Reserve,
    pub vaults: VaultStore,
}

impl LedgerState {
    /// A fresh ledger: empty reserve owned by `owner`, no vaults.
    pub fn new(owner: AccountId, config: BankConfig) -> Self {
        Self {
            config,
            reserve: Reserve::new(owner),
            vaults: VaultStore::new(),
        }
    }

    /// Total value held by the ledger: reserve plus all collateral.
    ///
    /// Outstanding debt is not part of it; that value already left
    /// through borrow payouts.
    pub fn holdings(&self) -> Amount {
        self.reserve
            .balance()
            .saturating_add(self.vaults.total_collateral())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
