//! Replayable operation scripts.
//!
//! A [`Script`] is a JSON document describing a bank configuration and a
//! sequence of calls made by named accounts, with optional time advances
//! between them. Replaying it against a [`SimulatedBank`] yields one
//! [`StepOutcome`] per call and the final ledger state. Rejected calls are
//! recorded, not fatal: the replay continues with the next step.

use crate::bank::{Bank, SimulatedBank};
use crate::core::account::AccountId;
use crate::core::amount::{amount_serde, format_amount, Amount};
use crate::core::clock::ManualClock;
use crate::core::config::BankConfig;
use crate::core::error::LedgerError;
use crate::core::state::LedgerState;
use crate::core::transfer::{Transfer, TransferLog};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid script JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("start time {0} is outside the representable range")]
    StartOutOfRange(i64),
    #[error("step {index}: {reason}")]
    InvalidStep { index: usize, reason: String },
}

/// A single ledger call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    ReserveDeposit {
        #[serde(with = "amount_serde")]
        amount: Amount,
    },
    ReserveWithdraw {
        #[serde(with = "amount_serde")]
        amount: Amount,
    },
    VaultDeposit {
        #[serde(with = "amount_serde")]
        amount: Amount,
    },
    VaultWithdraw,
    VaultBorrow {
        #[serde(with = "amount_serde")]
        amount: Amount,
    },
    VaultRepay {
        #[serde(with = "amount_serde")]
        amount: Amount,
    },
    /// Repay exactly the current repay amount.
    RepayInFull,
    Liquidate {
        account: AccountId,
    },
    /// Read-only: record the caller's position.
    Query,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ReserveDeposit { amount } => write!(f, "reserve_deposit {}", format_amount(*amount)),
            Operation::ReserveWithdraw { amount } => write!(f, "reserve_withdraw {}", format_amount(*amount)),
            Operation::VaultDeposit { amount } => write!(f, "vault_deposit {}", format_amount(*amount)),
            Operation::VaultWithdraw => write!(f, "vault_withdraw"),
            Operation::VaultBorrow { amount } => write!(f, "vault_borrow {}", format_amount(*amount)),
            Operation::VaultRepay { amount } => write!(f, "vault_repay {}", format_amount(*amount)),
            Operation::RepayInFull => write!(f, "repay_in_full"),
            Operation::Liquidate { account } => write!(f, "liquidate {}", account),
            Operation::Query => write!(f, "query"),
        }
    }
}

/// One call, optionally preceded by a time advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Seconds to move the clock forward before the call.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub advance_seconds: i64,
    pub caller: AccountId,
    #[serde(flatten)]
    pub operation: Operation,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl Step {
    pub fn new(caller: impl Into<AccountId>, operation: Operation) -> Self {
        Self {
            advance_seconds: 0,
            caller: caller.into(),
            operation,
        }
    }

    pub fn after_seconds(mut self, seconds: i64) -> Self {
        self.advance_seconds = seconds;
        self
    }

    /// The time advance as a duration; `index` locates the step in errors.
    fn delay(&self, index: usize) -> Result<Duration, ScriptError> {
        if self.advance_seconds < 0 {
            return Err(ScriptError::InvalidStep {
                index,
                reason: format!("time cannot move backwards ({}s)", self.advance_seconds),
            });
        }
        Duration::try_seconds(self.advance_seconds).ok_or_else(|| ScriptError::InvalidStep {
            index,
            reason: format!("advance of {}s is out of range", self.advance_seconds),
        })
    }
}

fn default_owner() -> AccountId {
    AccountId::new("owner")
}

/// A bank configuration plus the calls to replay against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: BankConfig,
    #[serde(default = "default_owner")]
    pub owner: AccountId,
    /// Unix time the clock starts at.
    #[serde(default)]
    pub start: i64,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn new(owner: AccountId, config: BankConfig) -> Self {
        Self {
            config,
            owner,
            start: 0,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn from_json(input: &str) -> Result<Self, ScriptError> {
        let script: Script = serde_json::from_str(input)?;
        script.validate()?;
        Ok(script)
    }

    /// Every advance is non-negative and the clock stays on the calendar.
    pub fn validate(&self) -> Result<(), ScriptError> {
        self.end().map(|_| ())
    }

    /// Instant the clock reaches after the last step.
    pub fn end(&self) -> Result<DateTime<Utc>, ScriptError> {
        let mut now = DateTime::<Utc>::from_timestamp(self.start, 0)
            .ok_or(ScriptError::StartOutOfRange(self.start))?;
        for (index, step) in self.steps.iter().enumerate() {
            now = now
                .checked_add_signed(step.delay(index)?)
                .ok_or_else(|| ScriptError::InvalidStep {
                    index,
                    reason: format!("advancing {}s passes the end of the calendar", step.advance_seconds),
                })?;
        }
        Ok(now)
    }
}

/// Result of one replayed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub caller: AccountId,
    pub operation: String,
    pub ok: bool,
    pub error: Option<String>,
    #[serde(with = "amount_serde")]
    pub reserve_balance: Amount,
    #[serde(with = "amount_serde")]
    pub collateral: Amount,
    #[serde(with = "amount_serde")]
    pub debt: Amount,
    /// Accrued repay amount after the step; `None` if it overflowed.
    pub repay_amount: Option<String>,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    pub outcomes: Vec<StepOutcome>,
    pub final_state: LedgerState,
    pub transfers: Vec<Transfer>,
    /// Value attached by callers to successful calls.
    #[serde(with = "amount_serde")]
    pub inbound: Amount,
    /// Value paid out by the bank.
    #[serde(with = "amount_serde")]
    pub outbound: Amount,
}

impl Replay {
    /// Value held by the ledger equals value that came in minus value that left.
    pub fn is_conserved(&self) -> bool {
        self.inbound.checked_sub(self.outbound) == Some(self.final_state.holdings())
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.ok)
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Replay ===")?;
        for o in &self.outcomes {
            let status = match &o.error {
                None => "ok".to_string(),
                Some(reason) => format!("REJECTED: {}", reason),
            };
            writeln!(f, "[{:>3}] {:<10} {:<40} {}", o.index, o.caller.as_str(), o.operation, status)?;
        }
        writeln!(f, "\nInbound:   {}", format_amount(self.inbound))?;
        writeln!(f, "Outbound:  {}", format_amount(self.outbound))?;
        writeln!(f, "Holdings:  {}", format_amount(self.final_state.holdings()))?;
        writeln!(f, "Conserved: {}", self.is_conserved())?;
        Ok(())
    }
}

/// Run one operation, returning the inbound value it attached on success.
fn apply(bank: &mut SimulatedBank, caller: &AccountId, operation: &Operation) -> Result<Amount, LedgerError> {
    match operation {
        Operation::ReserveDeposit { amount } => bank.reserve_deposit(caller, *amount).map(|_| *amount),
        Operation::ReserveWithdraw { amount } => bank.reserve_withdraw(caller, *amount).map(|_| 0),
        Operation::VaultDeposit { amount } => bank.vault_deposit(caller, *amount).map(|_| *amount),
        Operation::VaultWithdraw => bank.vault_withdraw(caller).map(|_| 0),
        Operation::VaultBorrow { amount } => bank.vault_borrow(caller, *amount).map(|_| 0),
        Operation::VaultRepay { amount } => bank.vault_repay(caller, *amount).map(|_| *amount),
        Operation::RepayInFull => {
            let owed = bank.vault_repay_amount(caller)?;
            bank.vault_repay(caller, owed).map(|_| owed)
        }
        Operation::Liquidate { account } => bank.liquidate(caller, account).map(|_| 0),
        Operation::Query => Ok(0),
    }
}

/// Replay `script` against a fresh simulated bank.
pub fn replay(script: &Script) -> Result<Replay, ScriptError> {
    script.validate()?;
    let clock = ManualClock::at_unix(script.start);
    let mut bank: SimulatedBank = Bank::new(
        script.owner.clone(),
        script.config,
        clock.clone(),
        TransferLog::new(),
    );

    let mut inbound: Amount = 0;
    let mut outcomes = Vec::with_capacity(script.steps.len());

    for (index, step) in script.steps.iter().enumerate() {
        if step.advance_seconds > 0 {
            clock.advance(step.delay(index)?);
        }
        let result = apply(&mut bank, &step.caller, &step.operation);
        if let Ok(attached) = &result {
            inbound = inbound.saturating_add(*attached);
        }

        outcomes.push(StepOutcome {
            index,
            caller: step.caller.clone(),
            operation: step.operation.to_string(),
            ok: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
            reserve_balance: bank.reserve_balance(),
            collateral: bank.vault_collateral_amount(&step.caller),
            debt: bank.vault_debt_amount(&step.caller),
            repay_amount: bank.vault_repay_amount(&step.caller).ok().map(|a| a.to_string()),
        });
    }

    let transfers = bank.transfer_agent().transfers().to_vec();
    Ok(Replay {
        outcomes,
        outbound: bank.transfer_agent().total_sent(),
        final_state: bank.snapshot(),
        transfers,
        inbound,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::amount::ether;

    #[test]
    fn test_parse_script() {
        let script = Script::from_json(
            r#"{
                "steps": [
                    { "caller": "owner", "op": "reserve_deposit", "amount": "100000000000000000000" },
                    { "caller": "alice", "op": "vault_deposit", "amount": "100000000000000000000" },
                    { "caller": "alice", "op": "vault_borrow", "amount": "50000000000000000000" },
                    { "caller": "alice", "op": "repay_in_full", "advance_seconds": 172810 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(script.owner, AccountId::new("owner"));
        assert_eq!(script.config, BankConfig::default());
        assert_eq!(script.steps.len(), 4);
        assert_eq!(script.steps[3].advance_seconds, 172_810);
        assert_eq!(
            script.steps[2].operation,
            Operation::VaultBorrow { amount: ether(50) }
        );
    }

    #[test]
    fn test_negative_advance_rejected() {
        let result = Script::from_json(
            r#"{ "steps": [ { "caller": "a", "op": "query", "advance_seconds": -5 } ] }"#,
        );
        assert!(matches!(result, Err(ScriptError::InvalidStep { index: 0, .. })));
    }

    #[test]
    fn test_out_of_range_advance_rejected() {
        let result = Script::from_json(
            r#"{ "steps": [ { "caller": "a", "op": "query", "advance_seconds": 9000000000000000000 } ] }"#,
        );
        assert!(matches!(result, Err(ScriptError::InvalidStep { index: 0, .. })));
    }

    #[test]
    fn test_cumulative_advance_bounded_by_calendar() {
        // Each advance is roughly 253,000 years: the first fits, the second does not.
        let mut script = Script::new(AccountId::new("owner"), BankConfig::default());
        script.push(Step::new("alice", Operation::Query).after_seconds(8_000_000_000_000));
        script.push(Step::new("alice", Operation::Query).after_seconds(8_000_000_000_000));

        assert!(matches!(
            script.validate(),
            Err(ScriptError::InvalidStep { index: 1, .. })
        ));
        assert!(matches!(
            replay(&script),
            Err(ScriptError::InvalidStep { index: 1, .. })
        ));
    }

    #[test]
    fn test_start_out_of_range_rejected() {
        let mut script = Script::new(AccountId::new("owner"), BankConfig::default());
        script.start = i64::MAX;
        assert!(matches!(script.validate(), Err(ScriptError::StartOutOfRange(_))));
    }

    #[test]
    fn test_script_end() {
        let mut script = Script::new(AccountId::new("owner"), BankConfig::default());
        script.start = 1_700_000_000;
        script.push(Step::new("alice", Operation::Query).after_seconds(86_400));
        script.push(Step::new("alice", Operation::Query).after_seconds(10));
        assert_eq!(script.end().unwrap().timestamp(), 1_700_086_410);
    }

    #[test]
    fn test_replay_borrow_and_repay() {
        let mut script = Script::new(AccountId::new("owner"), BankConfig::default());
        script.push(Step::new("owner", Operation::ReserveDeposit { amount: ether(100) }));
        script.push(Step::new("alice", Operation::VaultDeposit { amount: ether(100) }));
        script.push(Step::new("alice", Operation::VaultBorrow { amount: ether(50) }));
        script.push(Step::new("alice", Operation::RepayInFull).after_seconds(2 * 86_400 + 10));
        script.push(Step::new("alice", Operation::VaultWithdraw));

        let replay = replay(&script).unwrap();
        assert_eq!(replay.failures().count(), 0);
        assert_eq!(replay.outcomes[2].debt, 50 * ether(1) + ether(1) / 2);
        assert_eq!(replay.outcomes[3].debt, 0);
        assert_eq!(replay.final_state.reserve.balance(), ether(50) + 50_533_210_937_887_033_214);
        assert!(replay.is_conserved());
    }

    #[test]
    fn test_rejections_are_recorded() {
        let mut script = Script::new(AccountId::new("owner"), BankConfig::default());
        script.push(Step::new("mallory", Operation::ReserveDeposit { amount: ether(1) }));
        script.push(Step::new("alice", Operation::VaultWithdraw));

        let replay = replay(&script).unwrap();
        let failures: Vec<_> = replay.failures().collect();
        assert_eq!(failures.len(), 2);
        assert_eq!(
            failures[0].error.as_deref(),
            Some("Ownable: caller is not the owner.")
        );
        assert!(replay.is_conserved());
    }

    #[test]
    fn test_step_json_shape() {
        let step = Step::new("alice", Operation::VaultBorrow { amount: 5 });
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["op"], "vault_borrow");
        assert_eq!(json["amount"], "5");
        assert!(json.get("advance_seconds").is_none());
    }
}
