use crate::core::account::AccountId;
use crate::core::amount::{amount_serde, Amount};
use crate::core::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle position of a vault.
///
/// ```text
/// Empty --deposit--> Collateralized --borrow--> Borrowed
///   ^                   |       ^                 |  |
///   +-----withdraw------+       +-----repay-------+  |
///   +-----------------------liquidate----------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultState {
    Empty,
    Collateralized,
    Borrowed,
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultState::Empty => write!(f, "Empty"),
            VaultState::Collateralized => write!(f, "Collateralized"),
            VaultState::Borrowed => write!(f, "Borrowed"),
        }
    }
}

/// Collateral held for, and debt owed by, a single account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    #[serde(with = "amount_serde")]
    collateral_amount: Amount,
    #[serde(with = "amount_serde")]
    debt_amount: Amount,
    /// Start of the current accrual period. Present only while debt is owed.
    borrow_timestamp: Option<DateTime<Utc>>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collateral_amount(&self) -> Amount {
        self.collateral_amount
    }

    pub fn debt_amount(&self) -> Amount {
        self.debt_amount
    }

    pub fn borrow_timestamp(&self) -> Option<DateTime<Utc>> {
        self.borrow_timestamp
    }

    pub fn state(&self) -> VaultState {
        if self.debt_amount > 0 {
            VaultState::Borrowed
        } else if self.collateral_amount > 0 {
            VaultState::Collateralized
        } else {
            VaultState::Empty
        }
    }

    pub(crate) fn add_collateral(&mut self, amount: Amount) -> Result<()> {
        self.collateral_amount = self
            .collateral_amount
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Replace the debt and restart accrual from `at`.
    pub(crate) fn set_debt(&mut self, debt: Amount, at: DateTime<Utc>) {
        self.debt_amount = debt;
        self.borrow_timestamp = (debt > 0).then_some(at);
    }

    pub(crate) fn clear_debt(&mut self) {
        self.debt_amount = 0;
        self.borrow_timestamp = None;
    }
}

/// Account-keyed collection of vaults. Vaults never reference each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultStore {
    vaults: HashMap<AccountId, Vault>,
}

impl VaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: &AccountId) -> Option<&Vault> {
        self.vaults.get(account)
    }

    /// The account's vault, created empty on first use.
    pub(crate) fn entry(&mut self, account: &AccountId) -> &mut Vault {
        self.vaults.entry(account.clone()).or_default()
    }

    pub(crate) fn insert(&mut self, account: AccountId, vault: Vault) {
        self.vaults.insert(account, vault);
    }

    pub(crate) fn remove(&mut self, account: &AccountId) -> Option<Vault> {
        self.vaults.remove(account)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Vault)> {
        self.vaults.iter()
    }

    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }

    /// Sum of collateral held across all vaults.
    pub fn total_collateral(&self) -> Amount {
        self.vaults
            .values()
            .fold(0, |acc: Amount, v| acc.saturating_add(v.collateral_amount))
    }

    /// Sum of recorded (not yet accrued) debt across all vaults.
    pub fn total_debt(&self) -> Amount {
        self.vaults
            .values()
            .fold(0, |acc: Amount, v| acc.saturating_add(v.debt_amount))
    }
}
