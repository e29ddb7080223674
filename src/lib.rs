//! # lending-ledger
//!
//! Collateralized lending ledger: one owner-controlled liquidity reserve and
//! per-account vaults of collateral and debt.
//!
//! Accounts deposit collateral, borrow from the reserve against it (paying a
//! one-time origination fee), and repay principal plus interest compounded
//! once per whole day with truncation at every step. Borrowing is gated by a
//! minimum collateralization ratio; vaults that drift below it through
//! accrued interest can be liquidated.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: accounts, amounts, configuration, clock,
//!   transfers, the reserve and the vault store
//! - **engine** — Pure calculations: interest accrual, origination fees,
//!   the collateralization guard, liquidation planning, reporting
//! - **bank** — The [`Bank`](bank::Bank) facade that validates, commits and
//!   pays out, in that order
//! - **simulation** — Replayable JSON scripts and random script generation

pub mod bank;
pub mod core;
pub mod engine;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::bank::{Bank, SimulatedBank};
    pub use crate::core::account::AccountId;
    pub use crate::core::amount::{ether, Amount, ETHER};
    pub use crate::core::clock::{Clock, ManualClock, SystemClock};
    pub use crate::core::config::BankConfig;
    pub use crate::core::error::LedgerError;
    pub use crate::core::transfer::{TransferLog, ValueTransfer};
    pub use crate::core::vault::VaultState;
    pub use crate::engine::liquidation::LiquidationOutcome;
}
