use crate::core::amount::Amount;
use crate::core::error::{LedgerError, Result};

/// One-time origination fee charged on every borrow.
pub struct FeeCalculator;

impl FeeCalculator {
    /// `floor(amount * fee_percent / 100)`.
    pub fn origination_fee(amount: Amount, fee_percent: u32) -> Result<Amount> {
        let scaled = amount
            .checked_mul(Amount::from(fee_percent))
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(scaled / 100)
    }

    /// Debt added by borrowing `amount`: principal plus fee.
    pub fn debt_increment(amount: Amount, fee_percent: u32) -> Result<Amount> {
        amount
            .checked_add(Self::origination_fee(amount, fee_percent)?)
            .ok_or(LedgerError::ArithmeticOverflow)
    }
}
