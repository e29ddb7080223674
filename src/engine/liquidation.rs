use crate::core::account::AccountId;
use crate::core::amount::{amount_serde, Amount};
use crate::core::error::{LedgerError, Result};
use crate::engine::collateral::CollateralizationGuard;
use serde::{Deserialize, Serialize};

/// How a liquidated vault's collateral is split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    /// Owner of the liquidated vault.
    pub account: AccountId,
    /// Accrued debt cleared by the liquidation.
    #[serde(with = "amount_serde")]
    pub debt_settled: Amount,
    /// Penalty owed on top of the debt.
    #[serde(with = "amount_serde")]
    pub penalty: Amount,
    /// Collateral moved into the reserve: debt plus penalty, capped at the collateral held.
    #[serde(with = "amount_serde")]
    pub seized: Amount,
    /// Collateral returned to the account.
    #[serde(with = "amount_serde")]
    pub remainder: Amount,
}

impl LiquidationOutcome {
    /// Part of the debt plus penalty the collateral could not cover.
    pub fn shortfall(&self) -> Amount {
        self.debt_settled
            .saturating_add(self.penalty)
            .saturating_sub(self.seized)
    }
}

/// Forced closure of under-collateralized vaults.
///
/// A vault is eligible once its accrued debt fails the collateralization
/// guard. The reserve keeps the debt plus a penalty out of the collateral;
/// the rest goes back to the vault owner.
pub struct LiquidationEngine;

impl LiquidationEngine {
    pub fn is_liquidatable(collateral: Amount, accrued_debt: Amount, ratio_percent: u32) -> Result<bool> {
        if accrued_debt == 0 {
            return Ok(false);
        }
        Ok(!CollateralizationGuard::is_satisfied(collateral, accrued_debt, ratio_percent)?)
    }

    /// Compute the split for an eligible vault.
    pub fn plan(
        account: &AccountId,
        collateral: Amount,
        accrued_debt: Amount,
        ratio_percent: u32,
        penalty_percent: u32,
    ) -> Result<LiquidationOutcome> {
        if accrued_debt == 0 {
            return Err(LedgerError::NoOutstandingDebt {
                account: account.clone(),
            });
        }
        if !Self::is_liquidatable(collateral, accrued_debt, ratio_percent)? {
            return Err(LedgerError::PositionHealthy {
                account: account.clone(),
            });
        }

        let penalty = accrued_debt
            .checked_mul(Amount::from(penalty_percent))
            .ok_or(LedgerError::ArithmeticOverflow)?
            / 100;
        let claim = accrued_debt
            .checked_add(penalty)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let seized = claim.min(collateral);

        Ok(LiquidationOutcome {
            account: account.clone(),
            debt_settled: accrued_debt,
            penalty,
            seized,
            remainder: collateral - seized,
        })
    }
}
