use crate::core::account::AccountId;
use crate::core::amount::{amount_serde, Amount};
use crate::core::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// The single liquidity pool lent out to borrowers.
///
/// Only the owner may move value in or out directly. Borrow, repay and
/// liquidation flows adjust the balance through the crate-internal
/// [`lend`](Self::lend) and [`receive`](Self::receive).
///
/// Every method validates before it mutates: on error the balance is
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    owner: AccountId,
    #[serde(with = "amount_serde")]
    balance: Amount,
}

impl Reserve {
    /// An empty reserve controlled by `owner`.
    pub fn new(owner: AccountId) -> Self {
        Self { owner, balance: 0 }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Authorization guard for owner-only operations.
    pub fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if caller != &self.owner {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Owner adds liquidity.
    pub fn deposit(&mut self, caller: &AccountId, amount: Amount) -> Result<()> {
        self.ensure_owner(caller)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        self.receive(amount)
    }

    /// Owner removes liquidity. The caller is responsible for paying it out.
    pub fn withdraw(&mut self, caller: &AccountId, amount: Amount) -> Result<()> {
        self.ensure_owner(caller)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientReserve {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Fails if the reserve cannot fund a loan of `amount`.
    pub fn ensure_liquidity(&self, amount: Amount) -> Result<()> {
        if amount > self.balance {
            return Err(LedgerError::InsufficientLiquidity {
                requested: amount,
                available: self.balance,
            });
        }
        Ok(())
    }

    pub(crate) fn lend(&mut self, amount: Amount) -> Result<()> {
        self.ensure_liquidity(amount)?;
        self.balance -= amount;
        Ok(())
    }

    pub(crate) fn receive(&mut self, amount: Amount) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(())
    }
}
