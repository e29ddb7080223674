use crate::core::amount::{to_ether, Amount};
use crate::core::error::{LedgerError, Result};
use rust_decimal::Decimal;

/// Minimum collateralization predicate.
///
/// A position is acceptable while `collateral * 100 >= debt * ratio`. The
/// guard always receives the total debt the vault would carry, never an
/// increment.
pub struct CollateralizationGuard;

impl CollateralizationGuard {
    pub fn is_satisfied(collateral: Amount, debt: Amount, ratio_percent: u32) -> Result<bool> {
        if debt == 0 {
            return Ok(true);
        }
        let covered = collateral.checked_mul(100);
        let required = debt.checked_mul(Amount::from(ratio_percent));
        match (covered, required) {
            (Some(c), Some(r)) => Ok(c >= r),
            (None, Some(_)) => Ok(true),
            (Some(_), None) => Ok(false),
            (None, None) => Err(LedgerError::ArithmeticOverflow),
        }
    }

    /// Reject the position with [`LedgerError::InsufficientCollateral`] unless it satisfies the ratio.
    pub fn check(collateral: Amount, debt: Amount, ratio_percent: u32) -> Result<()> {
        if !Self::is_satisfied(collateral, debt, ratio_percent)? {
            log::debug!(
                "guard rejected: collateral {} vs debt {} at {}%",
                collateral,
                debt,
                ratio_percent
            );
            return Err(LedgerError::InsufficientCollateral {
                collateral,
                debt,
                ratio_percent,
            });
        }
        Ok(())
    }

    /// Largest total debt `collateral` can carry at `ratio_percent`.
    pub fn max_debt(collateral: Amount, ratio_percent: u32) -> Amount {
        if ratio_percent == 0 {
            return Amount::MAX;
        }
        match collateral.checked_mul(100) {
            Some(scaled) => scaled / Amount::from(ratio_percent),
            None => (collateral / Amount::from(ratio_percent)).saturating_mul(100),
        }
    }

    /// Current collateral-to-debt ratio in percent, rounded to two places.
    ///
    /// `None` when there is no debt or the amounts exceed `Decimal` range.
    pub fn ratio_percent(collateral: Amount, debt: Amount) -> Option<Decimal> {
        if debt == 0 {
            return None;
        }
        let collateral = to_ether(collateral)?;
        let debt = to_ether(debt)?;
        collateral
            .checked_mul(Decimal::ONE_HUNDRED)?
            .checked_div(debt)
            .map(|r| r.round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amount::ether;
    use rust_decimal_macros::dec;

    #[test]
    fn test_guard_boundary() {
        // 150 collateral carries exactly 100 debt at 150%.
        assert!(CollateralizationGuard::is_satisfied(ether(150), ether(100), 150).unwrap());
        assert!(!CollateralizationGuard::is_satisfied(ether(150), ether(100) + 1, 150).unwrap());
    }

    #[test]
    fn test_no_debt_always_passes() {
        assert!(CollateralizationGuard::is_satisfied(0, 0, 150).unwrap());
    }

    #[test]
    fn test_check_reports_position() {
        let err = CollateralizationGuard::check(ether(100), ether(70), 150).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientCollateral {
                collateral: ether(100),
                debt: ether(70),
                ratio_percent: 150,
            }
        );
    }

    #[test]
    fn test_overflowing_sides() {
        assert!(CollateralizationGuard::is_satisfied(Amount::MAX, 1, 150).unwrap());
        assert!(!CollateralizationGuard::is_satisfied(1, Amount::MAX, 150).unwrap());
        assert!(CollateralizationGuard::is_satisfied(Amount::MAX, Amount::MAX, 150).is_err());
    }

    #[test]
    fn test_max_debt() {
        assert_eq!(CollateralizationGuard::max_debt(ether(150), 150), ether(100));
        assert_eq!(CollateralizationGuard::max_debt(ether(1), 0), Amount::MAX);
    }

    #[test]
    fn test_ratio_percent() {
        assert_eq!(
            CollateralizationGuard::ratio_percent(ether(100), ether(50)),
            Some(dec!(200))
        );
        assert_eq!(
            CollateralizationGuard::ratio_percent(ether(100), 50 * ether(1) + ether(1) / 2),
            Some(dec!(198.02))
        );
        assert_eq!(CollateralizationGuard::ratio_percent(ether(100), 0), None);
    }
}
