use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a caller of the ledger.
///
/// Every mutating operation is implicitly scoped to the calling account:
/// a vault can only be touched by the account it is keyed under, and the
/// reserve only by the account that constructed the bank.
///
/// # Examples
///
/// ```
/// use lending_ledger::core::account::AccountId;
///
/// let alice = AccountId::new("alice");
/// let bob = AccountId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this account.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
