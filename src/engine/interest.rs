use crate::core::amount::Amount;
use crate::core::error::{LedgerError, Result};
use crate::core::vault::Vault;
use chrono::{DateTime, Utc};

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const DAYS_PER_YEAR: Amount = 365;

/// Daily-compounding interest on vault debt.
///
/// Interest is applied once per whole elapsed day. Each step computes
/// `floor(floor(amount * rate / 100) / 365)` and adds it to the running
/// amount, so truncation happens at every step rather than once at the end.
/// A closed-form `(1 + r/365)^n` gives a different (larger) answer.
pub struct InterestAccrualEngine;

impl InterestAccrualEngine {
    /// Whole days between `since` and `now`. Partial days and clock skew
    /// (`now` before `since`) count as zero.
    pub fn elapsed_days(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        let seconds = (now - since).num_seconds();
        if seconds <= 0 {
            return 0;
        }
        (seconds / SECONDS_PER_DAY) as u64
    }

    /// Interest for a single day on `amount` at a yearly `rate_percent`.
    pub fn daily_interest(amount: Amount, rate_percent: u32) -> Result<Amount> {
        let scaled = amount
            .checked_mul(Amount::from(rate_percent))
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(scaled / 100 / DAYS_PER_YEAR)
    }

    /// Apply `days` compounding steps to `principal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lending_ledger::engine::interest::InterestAccrualEngine;
    ///
    /// // 36_500 at 12%: day one adds 12, day two adds floor(36_512 * 12 / 100 / 365) = 12.
    /// assert_eq!(InterestAccrualEngine::compound(36_500, 12, 2).unwrap(), 36_524);
    /// ```
    pub fn compound(principal: Amount, rate_percent: u32, days: u64) -> Result<Amount> {
        let mut amount = principal;
        for _ in 0..days {
            let interest = Self::daily_interest(amount, rate_percent)?;
            if interest == 0 {
                // Fixed point: every later step adds nothing either.
                break;
            }
            amount = amount
                .checked_add(interest)
                .ok_or(LedgerError::ArithmeticOverflow)?;
        }
        Ok(amount)
    }

    /// Debt owed by `vault` at `now`, including interest not yet recorded.
    pub fn accrued_debt(vault: &Vault, rate_percent: u32, now: DateTime<Utc>) -> Result<Amount> {
        match vault.borrow_timestamp() {
            Some(since) if vault.debt_amount() > 0 => {
                let days = Self::elapsed_days(since, now);
                Self::compound(vault.debt_amount(), rate_percent, days)
            }
            _ => Ok(vault.debt_amount()),
        }
    }
}
