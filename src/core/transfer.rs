use crate::core::account::AccountId;
use crate::core::amount::{amount_serde, Amount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Why value is leaving the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    /// Owner pulling liquidity out of the reserve.
    ReserveWithdrawal,
    /// Borrowed principal paid out of the reserve.
    Borrow,
    /// Collateral released by a full vault withdrawal.
    CollateralRelease,
    /// Collateral left over after a liquidation, returned to the vault owner.
    LiquidationRemainder,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferKind::ReserveWithdrawal => write!(f, "reserve-withdrawal"),
            TransferKind::Borrow => write!(f, "borrow"),
            TransferKind::CollateralRelease => write!(f, "collateral-release"),
            TransferKind::LiquidationRemainder => write!(f, "liquidation-remainder"),
        }
    }
}

/// An outbound movement of value decided by the ledger.
///
/// The ledger only decides amounts and recipients. Moving the value is the
/// job of whatever [`ValueTransfer`] the bank was built with, and it is asked
/// to do so only after every balance touched by the call is final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    id: Uuid,
    recipient: AccountId,
    #[serde(with = "amount_serde")]
    amount: Amount,
    kind: TransferKind,
    created_at: DateTime<Utc>,
}

impl Transfer {
    pub fn new(recipient: AccountId, amount: Amount, kind: TransferKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            amount,
            kind,
            created_at,
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn recipient(&self) -> &AccountId {
        &self.recipient
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Refusal reported by a transfer agent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransferRejected(pub String);

/// Moves value out of the ledger.
///
/// Inbound value needs no counterpart here: the caller attaches exactly the
/// `amount` it passes to a deposit or repay call.
pub trait ValueTransfer {
    fn send(&mut self, transfer: &Transfer) -> Result<(), TransferRejected>;
}

/// In-memory transfer agent that records every payout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferLog {
    transfers: Vec<Transfer>,
}

impl TransferLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Total value paid out across all recipients.
    pub fn total_sent(&self) -> Amount {
        self.transfers.iter().map(|t| t.amount()).sum()
    }

    /// Total value paid out to one account.
    pub fn sent_to(&self, account: &AccountId) -> Amount {
        self.transfers
            .iter()
            .filter(|t| t.recipient() == account)
            .map(|t| t.amount())
            .sum()
    }
}

impl ValueTransfer for TransferLog {
    fn send(&mut self, transfer: &Transfer) -> Result<(), TransferRejected> {
        self.transfers.push(transfer.clone());
        Ok(())
    }
}

/// Transfer agent that refuses every payout, e.g. for a frozen settlement rail.
#[derive(Debug, Clone)]
pub struct RejectingTransfer {
    reason: String,
}

impl RejectingTransfer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ValueTransfer for RejectingTransfer {
    fn send(&mut self, _transfer: &Transfer) -> Result<(), TransferRejected> {
        Err(TransferRejected(self.reason.clone()))
    }
}
