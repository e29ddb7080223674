use crate::core::account::AccountId;
use crate::core::amount::{amount_serde, format_amount, Amount};
use crate::core::state::LedgerState;
use crate::engine::collateral::CollateralizationGuard;
use crate::engine::interest::InterestAccrualEngine;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-vault line of a [`ReserveReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultPosition {
    pub account: AccountId,
    #[serde(with = "amount_serde")]
    pub collateral: Amount,
    /// Debt including interest accrued up to the report time.
    #[serde(with = "amount_serde")]
    pub accrued_debt: Amount,
    /// Collateral-to-debt ratio in percent; `None` without debt.
    pub ratio_percent: Option<Decimal>,
    /// True once the position fails the configured ratio.
    pub liquidatable: bool,
}

/// Snapshot analysis of how much of the pool is lent out and which
/// vaults are at risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveReport {
    pub generated_at: DateTime<Utc>,
    #[serde(with = "amount_serde")]
    pub reserve_balance: Amount,
    #[serde(with = "amount_serde")]
    pub total_collateral: Amount,
    /// Sum of accrued debt across vaults.
    #[serde(with = "amount_serde")]
    pub total_debt: Amount,
    /// Vaults sorted by account.
    pub positions: Vec<VaultPosition>,
}

impl ReserveReport {
    /// Analyse `state` as of `now`.
    ///
    /// Vaults whose accrued debt cannot be computed (overflow) are reported
    /// with their recorded debt.
    pub fn from_state(state: &LedgerState, now: DateTime<Utc>) -> Self {
        let rate = state.config.interest_rate_percent;
        let ratio = state.config.collateralization_ratio_percent;

        let mut positions: Vec<VaultPosition> = state
            .vaults
            .iter()
            .map(|(account, vault)| {
                let accrued_debt = InterestAccrualEngine::accrued_debt(vault, rate, now)
                    .unwrap_or(vault.debt_amount());
                let collateral = vault.collateral_amount();
                VaultPosition {
                    account: account.clone(),
                    collateral,
                    accrued_debt,
                    ratio_percent: CollateralizationGuard::ratio_percent(collateral, accrued_debt),
                    liquidatable: accrued_debt > 0
                        && !CollateralizationGuard::is_satisfied(collateral, accrued_debt, ratio)
                            .unwrap_or(false),
                }
            })
            .collect();
        positions.sort_by(|a, b| a.account.cmp(&b.account));

        let total_debt = positions
            .iter()
            .fold(0, |acc: Amount, p| acc.saturating_add(p.accrued_debt));

        ReserveReport {
            generated_at: now,
            reserve_balance: state.reserve.balance(),
            total_collateral: state.vaults.total_collateral(),
            total_debt,
            positions,
        }
    }

    /// Share of lendable value currently out on loan: `debt / (debt + reserve)`.
    pub fn utilization(&self) -> f64 {
        let pool = self.total_debt.saturating_add(self.reserve_balance);
        if pool == 0 {
            return 0.0;
        }
        self.total_debt as f64 / pool as f64
    }

    /// Vaults that may be liquidated right now.
    pub fn at_risk(&self) -> impl Iterator<Item = &VaultPosition> {
        self.positions.iter().filter(|p| p.liquidatable)
    }
}

impl std::fmt::Display for ReserveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Reserve Report ({}) ===", self.generated_at.to_rfc3339())?;
        writeln!(f, "Reserve Balance:  {}", format_amount(self.reserve_balance))?;
        writeln!(f, "Total Collateral: {}", format_amount(self.total_collateral))?;
        writeln!(f, "Total Debt:       {}", format_amount(self.total_debt))?;
        writeln!(f, "Utilization:      {:.1}%", self.utilization() * 100.0)?;

        writeln!(f, "\nVaults:")?;
        for p in &self.positions {
            let ratio = p
                .ratio_percent
                .map(|r| format!("{}%", r))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "  {:<12} collateral {:>24}  debt {:>24}  ratio {:>8}{}",
                p.account.as_str(),
                format_amount(p.collateral),
                format_amount(p.accrued_debt),
                ratio,
                if p.liquidatable { "  [LIQUIDATABLE]" } else { "" }
            )?;
        }
        Ok(())
    }
}
