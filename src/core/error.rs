use crate::core::account::AccountId;
use crate::core::amount::Amount;
use thiserror::Error;

/// Reasons a ledger call is rejected.
///
/// Every variant is raised before any state is touched, so a rejected call
/// leaves the bank exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A reserve operation was attempted by someone other than the owner.
    #[error("Ownable: caller is not the owner.")]
    Unauthorized { caller: AccountId },

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient reserve: requested {requested}, available {available}")]
    InsufficientReserve { requested: Amount, available: Amount },

    #[error("insufficient liquidity: requested {requested}, reserve holds {available}")]
    InsufficientLiquidity { requested: Amount, available: Amount },

    /// The collateralization guard rejected the prospective debt.
    #[error("insufficient collateral: {collateral} does not cover debt {debt} at {ratio_percent}%")]
    InsufficientCollateral {
        collateral: Amount,
        debt: Amount,
        ratio_percent: u32,
    },

    #[error("vault has outstanding debt of {debt}; repay before withdrawing")]
    OutstandingDebt { debt: Amount },

    #[error("partial repayment not allowed: offered {offered}, required {required}")]
    PartialRepaymentNotAllowed { offered: Amount, required: Amount },

    #[error("no vault exists for {account}")]
    NoVault { account: AccountId },

    #[error("vault of {account} has no outstanding debt")]
    NoOutstandingDebt { account: AccountId },

    /// Liquidation was requested for a vault that still satisfies the ratio.
    #[error("vault of {account} is sufficiently collateralized")]
    PositionHealthy { account: AccountId },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// The outbound transfer was refused; all effects of the call were rolled back.
    #[error("transfer of {amount} to {recipient} failed: {reason}")]
    TransferFailed {
        recipient: AccountId,
        amount: Amount,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
