use serde::{Deserialize, Serialize};

/// Lending parameters fixed when a bank is constructed.
///
/// Every field is a whole percentage: `12` means 12%.
///
/// # Examples
///
/// ```
/// use lending_ledger::core::config::BankConfig;
///
/// let config = BankConfig::new(12, 1, 150, 25);
/// assert_eq!(config.collateralization_ratio_percent, 150);
///
/// let parsed = BankConfig::from_json(r#"{
///     "interest_rate_percent": 12,
///     "origination_fee_percent": 1,
///     "collateralization_ratio_percent": 150,
///     "liquidation_penalty_percent": 25
/// }"#).unwrap();
/// assert_eq!(parsed, config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    /// Yearly interest rate, compounded daily as `rate / 365`.
    pub interest_rate_percent: u32,
    /// One-time surcharge added to every borrowed principal.
    pub origination_fee_percent: u32,
    /// Minimum collateral-to-debt ratio a vault must keep to borrow.
    pub collateralization_ratio_percent: u32,
    /// Cut of the seized debt retained by the reserve on liquidation.
    pub liquidation_penalty_percent: u32,
}

impl BankConfig {
    pub fn new(
        interest_rate_percent: u32,
        origination_fee_percent: u32,
        collateralization_ratio_percent: u32,
        liquidation_penalty_percent: u32,
    ) -> Self {
        Self {
            interest_rate_percent,
            origination_fee_percent,
            collateralization_ratio_percent,
            liquidation_penalty_percent,
        }
    }

    /// Load a configuration from its JSON representation.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

impl Default for BankConfig {
    fn default() -> Self {
        Self::new(12, 1, 150, 25)
    }
}
