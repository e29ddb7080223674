//! The lending ledger facade.
//!
//! [`Bank`] owns the configuration, the reserve and the vault store. Each
//! mutating call takes the caller's identity explicitly and runs in three
//! phases: every precondition is checked, then all balances are written to
//! their final values, and only then is value paid out through the
//! [`ValueTransfer`] agent. Because every mutating method takes `&mut self`,
//! nothing can call back into the same bank while a call is in flight.

use crate::core::account::AccountId;
use crate::core::amount::Amount;
use crate::core::clock::{Clock, ManualClock};
use crate::core::config::BankConfig;
use crate::core::error::{LedgerError, Result};
use crate::core::reserve::Reserve;
use crate::core::state::LedgerState;
use crate::core::transfer::{Transfer, TransferKind, TransferLog, ValueTransfer};
use crate::core::vault::{Vault, VaultState};
use crate::engine::collateral::CollateralizationGuard;
use crate::engine::fee::FeeCalculator;
use crate::engine::interest::InterestAccrualEngine;
use crate::engine::liquidation::{LiquidationEngine, LiquidationOutcome};
use crate::engine::report::ReserveReport;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

/// A bank driven by a manual clock and recording its payouts in memory.
pub type SimulatedBank = Bank<ManualClock, TransferLog>;

/// Pre-call copy of everything a payout may have to undo.
struct Rollback {
    reserve: Reserve,
    vault: Option<(AccountId, Option<Vault>)>,
}

impl Rollback {
    fn reserve_only(state: &LedgerState) -> Self {
        Self {
            reserve: state.reserve.clone(),
            vault: None,
        }
    }

    fn with_vault(state: &LedgerState, account: &AccountId) -> Self {
        Self {
            reserve: state.reserve.clone(),
            vault: Some((account.clone(), state.vaults.get(account).cloned())),
        }
    }

    fn apply(self, state: &mut LedgerState) {
        state.reserve = self.reserve;
        match self.vault {
            Some((account, Some(vault))) => state.vaults.insert(account, vault),
            Some((account, None)) => {
                state.vaults.remove(&account);
            }
            None => {}
        }
    }
}

/// Collateralized lending ledger.
///
/// # Examples
///
/// ```
/// use lending_ledger::prelude::*;
///
/// let owner = AccountId::new("owner");
/// let alice = AccountId::new("alice");
/// let mut bank = Bank::new(
///     owner.clone(),
///     BankConfig::new(12, 1, 150, 25),
///     ManualClock::at_unix(0),
///     TransferLog::new(),
/// );
///
/// bank.reserve_deposit(&owner, ether(100)).unwrap();
/// bank.vault_deposit(&alice, ether(100)).unwrap();
/// bank.vault_borrow(&alice, ether(50)).unwrap();
///
/// assert_eq!(bank.vault_debt_amount(&alice), ether(50) + ether(1) / 2);
/// assert_eq!(bank.reserve_balance(), ether(50));
/// ```
#[derive(Debug)]
pub struct Bank<C, T> {
    state: LedgerState,
    clock: C,
    transfer: T,
}

impl<C: Clock, T: ValueTransfer> Bank<C, T> {
    /// A bank with an empty reserve owned by `owner`.
    pub fn new(owner: AccountId, config: BankConfig, clock: C, transfer: T) -> Self {
        info!(
            "bank created: owner {}, rate {}%, fee {}%, ratio {}%, penalty {}%",
            owner,
            config.interest_rate_percent,
            config.origination_fee_percent,
            config.collateralization_ratio_percent,
            config.liquidation_penalty_percent
        );
        Self::restore(LedgerState::new(owner, config), clock, transfer)
    }

    /// Resume from persisted state.
    pub fn restore(state: LedgerState, clock: C, transfer: T) -> Self {
        Self {
            state,
            clock,
            transfer,
        }
    }

    /// Copy of the persistent state.
    pub fn snapshot(&self) -> LedgerState {
        self.state.clone()
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn transfer_agent(&self) -> &T {
        &self.transfer
    }

    // --- Configuration ---

    pub fn config(&self) -> &BankConfig {
        &self.state.config
    }

    pub fn owner(&self) -> &AccountId {
        self.state.reserve.owner()
    }

    pub fn interest_rate(&self) -> u32 {
        self.state.config.interest_rate_percent
    }

    pub fn origination_fee(&self) -> u32 {
        self.state.config.origination_fee_percent
    }

    pub fn collateralization_ratio(&self) -> u32 {
        self.state.config.collateralization_ratio_percent
    }

    pub fn liquidation_penalty(&self) -> u32 {
        self.state.config.liquidation_penalty_percent
    }

    // --- Reads ---

    pub fn reserve_balance(&self) -> Amount {
        self.state.reserve.balance()
    }

    pub fn vault(&self, account: &AccountId) -> Option<&Vault> {
        self.state.vaults.get(account)
    }

    pub fn vault_collateral_amount(&self, caller: &AccountId) -> Amount {
        self.vault(caller).map(Vault::collateral_amount).unwrap_or(0)
    }

    /// Recorded debt, excluding interest accrued since the last borrow.
    pub fn vault_debt_amount(&self, caller: &AccountId) -> Amount {
        self.vault(caller).map(Vault::debt_amount).unwrap_or(0)
    }

    /// Amount that would settle the caller's debt right now.
    pub fn vault_repay_amount(&self, caller: &AccountId) -> Result<Amount> {
        match self.vault(caller) {
            Some(vault) => {
                InterestAccrualEngine::accrued_debt(vault, self.interest_rate(), self.clock.now())
            }
            None => Ok(0),
        }
    }

    pub fn vault_state(&self, caller: &AccountId) -> VaultState {
        self.vault(caller)
            .map(Vault::state)
            .unwrap_or(VaultState::Empty)
    }

    /// Aggregate view of the reserve and all vaults at the current time.
    pub fn report(&self) -> ReserveReport {
        ReserveReport::from_state(&self.state, self.clock.now())
    }

    // --- Reserve ---

    pub fn reserve_deposit(&mut self, caller: &AccountId, amount: Amount) -> Result<()> {
        self.state
            .reserve
            .deposit(caller, amount)
            .inspect_err(|e| warn!("reserve deposit by {} rejected: {}", caller, e))?;
        info!(
            "reserve deposit {} by {}; balance {}",
            amount,
            caller,
            self.reserve_balance()
        );
        Ok(())
    }

    pub fn reserve_withdraw(&mut self, caller: &AccountId, amount: Amount) -> Result<()> {
        let rollback = Rollback::reserve_only(&self.state);
        self.state
            .reserve
            .withdraw(caller, amount)
            .inspect_err(|e| warn!("reserve withdrawal by {} rejected: {}", caller, e))?;
        info!(
            "reserve withdrawal {} by {}; balance {}",
            amount,
            caller,
            self.reserve_balance()
        );
        self.pay_out(caller, amount, TransferKind::ReserveWithdrawal, rollback)
    }

    // --- Vaults ---

    /// Add collateral, creating the caller's vault on first use.
    pub fn vault_deposit(&mut self, caller: &AccountId, amount: Amount) -> Result<()> {
        ensure_positive(amount)
            .and_then(|_| {
                self.vault_collateral_amount(caller)
                    .checked_add(amount)
                    .ok_or(LedgerError::ArithmeticOverflow)
            })
            .inspect_err(|e| warn!("vault deposit of {} by {} rejected: {}", amount, caller, e))?;

        let vault = self.state.vaults.entry(caller);
        vault.add_collateral(amount)?;
        info!(
            "vault deposit {} by {}; collateral {}",
            amount,
            caller,
            vault.collateral_amount()
        );
        Ok(())
    }

    /// Release all collateral and close the vault. Only debt-free vaults qualify.
    pub fn vault_withdraw(&mut self, caller: &AccountId) -> Result<Amount> {
        let released = self
            .withdrawable(caller)
            .inspect_err(|e| warn!("vault withdrawal by {} rejected: {}", caller, e))?;

        let rollback = Rollback::with_vault(&self.state, caller);
        self.state.vaults.remove(caller);
        info!("vault of {} closed; releasing {}", caller, released);
        self.pay_out(caller, released, TransferKind::CollateralRelease, rollback)?;
        Ok(released)
    }

    /// Borrow `amount` out of the reserve against the caller's collateral.
    ///
    /// Interest accrued on existing debt is folded into the debt first, so a
    /// second borrow never drops it. The fee is added on top of `amount`,
    /// and the guard is evaluated on the resulting total.
    pub fn vault_borrow(&mut self, caller: &AccountId, amount: Amount) -> Result<()> {
        let now = self.clock.now();
        let new_debt = self
            .borrow_terms(caller, amount, now)
            .inspect_err(|e| warn!("borrow of {} by {} rejected: {}", amount, caller, e))?;

        let rollback = Rollback::with_vault(&self.state, caller);
        self.state.reserve.lend(amount)?;
        self.state.vaults.entry(caller).set_debt(new_debt, now);
        info!(
            "borrow {} by {}; debt {}, reserve {}",
            amount,
            caller,
            new_debt,
            self.reserve_balance()
        );
        self.pay_out(caller, amount, TransferKind::Borrow, rollback)
    }

    /// Settle the caller's debt in full. The whole attached `amount` goes to the reserve.
    pub fn vault_repay(&mut self, caller: &AccountId, amount: Amount) -> Result<()> {
        let required = self
            .repay_terms(caller, amount)
            .inspect_err(|e| warn!("repayment of {} by {} rejected: {}", amount, caller, e))?;

        self.state.reserve.receive(amount)?;
        self.state.vaults.entry(caller).clear_debt();
        info!(
            "repayment {} by {} (required {}); reserve {}",
            amount,
            caller,
            required,
            self.reserve_balance()
        );
        Ok(())
    }

    /// Collateral released by a full withdrawal.
    fn withdrawable(&self, caller: &AccountId) -> Result<Amount> {
        let vault = self.vault(caller).ok_or_else(|| LedgerError::NoVault {
            account: caller.clone(),
        })?;
        if vault.debt_amount() > 0 {
            return Err(LedgerError::OutstandingDebt {
                debt: vault.debt_amount(),
            });
        }
        Ok(vault.collateral_amount())
    }

    /// Total debt the caller would carry after borrowing `amount` at `now`.
    fn borrow_terms(&self, caller: &AccountId, amount: Amount, now: DateTime<Utc>) -> Result<Amount> {
        ensure_positive(amount)?;
        let config = &self.state.config;

        let (collateral, current_debt) = match self.vault(caller) {
            Some(vault) => {
                let accrued =
                    InterestAccrualEngine::accrued_debt(vault, config.interest_rate_percent, now)?;
                if accrued > vault.debt_amount() {
                    debug!(
                        "settling {} accrued interest for {}",
                        accrued - vault.debt_amount(),
                        caller
                    );
                }
                (vault.collateral_amount(), accrued)
            }
            None => (0, 0),
        };

        let increment = FeeCalculator::debt_increment(amount, config.origination_fee_percent)?;
        let new_debt = current_debt
            .checked_add(increment)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        CollateralizationGuard::check(collateral, new_debt, config.collateralization_ratio_percent)?;
        self.state.reserve.ensure_liquidity(amount)?;
        Ok(new_debt)
    }

    /// Amount the caller must repay, provided `amount` covers it.
    fn repay_terms(&self, caller: &AccountId, amount: Amount) -> Result<Amount> {
        ensure_positive(amount)?;
        let vault = self
            .vault(caller)
            .filter(|v| v.debt_amount() > 0)
            .ok_or_else(|| LedgerError::NoOutstandingDebt {
                account: caller.clone(),
            })?;
        let required =
            InterestAccrualEngine::accrued_debt(vault, self.interest_rate(), self.clock.now())?;
        if amount < required {
            return Err(LedgerError::PartialRepaymentNotAllowed {
                offered: amount,
                required,
            });
        }
        self.reserve_balance()
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(required)
    }

    // --- Liquidation ---

    /// What liquidating `account` would do right now, without doing it.
    pub fn liquidation_preview(&self, account: &AccountId) -> Result<LiquidationOutcome> {
        let vault = self.vault(account).ok_or_else(|| LedgerError::NoVault {
            account: account.clone(),
        })?;
        let config = &self.state.config;
        let accrued =
            InterestAccrualEngine::accrued_debt(vault, config.interest_rate_percent, self.clock.now())?;
        LiquidationEngine::plan(
            account,
            vault.collateral_amount(),
            accrued,
            config.collateralization_ratio_percent,
            config.liquidation_penalty_percent,
        )
    }

    /// Close an under-collateralized vault. Any caller may trigger it.
    ///
    /// The reserve takes the accrued debt plus the penalty out of the
    /// collateral; whatever is left is paid back to the vault owner.
    pub fn liquidate(&mut self, caller: &AccountId, account: &AccountId) -> Result<LiquidationOutcome> {
        let outcome = self
            .liquidation_preview(account)
            .inspect_err(|e| warn!("liquidation of {} by {} rejected: {}", account, caller, e))?;

        let rollback = Rollback::with_vault(&self.state, account);
        self.state.reserve.receive(outcome.seized)?;
        self.state.vaults.remove(account);
        warn!(
            "vault of {} liquidated by {}: debt {}, penalty {}, seized {}, returned {}",
            account,
            caller,
            outcome.debt_settled,
            outcome.penalty,
            outcome.seized,
            outcome.remainder
        );
        self.pay_out(account, outcome.remainder, TransferKind::LiquidationRemainder, rollback)?;
        Ok(outcome)
    }

    /// Hand a payout to the transfer agent once state is final. A refused
    /// payout restores the pre-call state.
    fn pay_out(
        &mut self,
        recipient: &AccountId,
        amount: Amount,
        kind: TransferKind,
        rollback: Rollback,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let transfer = Transfer::new(recipient.clone(), amount, kind, self.clock.now());
        if let Err(rejected) = self.transfer.send(&transfer) {
            rollback.apply(&mut self.state);
            warn!(
                "{} transfer of {} to {} refused, call rolled back: {}",
                kind, amount, recipient, rejected
            );
            return Err(LedgerError::TransferFailed {
                recipient: recipient.clone(),
                amount,
                reason: rejected.to_string(),
            });
        }
        debug!("{} transfer {} of {} to {}", kind, transfer.id(), amount, recipient);
        Ok(())
    }
}

fn ensure_positive(amount: Amount) -> Result<()> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}
