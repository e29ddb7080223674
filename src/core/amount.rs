use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A quantity of value in indivisible base units.
///
/// All ledger arithmetic is integer arithmetic on base units; fractional
/// results are floored at every step. Eighteen decimal places put realistic
/// balances beyond `u64`, hence the 128-bit width.
pub type Amount = u128;

/// Number of decimal places between a base unit and one whole token.
pub const ETHER_DECIMALS: u32 = 18;

/// One whole token expressed in base units.
pub const ETHER: Amount = 1_000_000_000_000_000_000;

/// `n` whole tokens in base units.
///
/// # Examples
///
/// ```
/// use lending_ledger::core::amount::{ether, ETHER};
///
/// assert_eq!(ether(100), 100 * ETHER);
/// ```
pub const fn ether(n: u128) -> Amount {
    n * ETHER
}

/// Express a base-unit amount in whole tokens.
///
/// Returns `None` when the amount does not fit a `Decimal` mantissa.
pub fn to_ether(amount: Amount) -> Option<Decimal> {
    let units = i128::try_from(amount).ok()?;
    Decimal::try_from_i128_with_scale(units, ETHER_DECIMALS)
        .ok()
        .map(|d| d.normalize())
}

/// Parse a decimal token quantity (e.g. `"50.5"`) into base units.
///
/// Digits beyond the eighteenth decimal place are truncated. Negative or
/// oversized inputs yield `None`.
pub fn parse_ether(input: &str) -> Option<Amount> {
    let value: Decimal = input.trim().parse().ok()?;
    let scale = Decimal::from(ETHER as u64);
    value.checked_mul(scale)?.trunc().to_u128()
}

/// Human-readable rendering: whole tokens when representable, raw units otherwise.
pub fn format_amount(amount: Amount) -> String {
    match to_ether(amount) {
        Some(d) => format!("{} ETH", d),
        None => format!("{} wei", amount),
    }
}

/// Serde adapter that carries amounts as decimal strings.
/// Plain JSON integers are accepted on input when they fit a `u64`.
pub mod amount_serde {
    use super::Amount;
    use serde::de::{self, Visitor};

    pub fn serialize<S: serde::Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Amount;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a non-negative integer amount as a string or number")
            }
            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse::<Amount>()
                    .map_err(|_| E::custom(format!("invalid amount: {v}")))
            }
            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }
        }
        deserializer.deserialize_any(V)
    }
}
