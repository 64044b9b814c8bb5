//! Type-safe price representation using decimal arithmetic.
//!
//! The shop backend stores prices as floats and sends them as JSON numbers.
//! They are decoded straight into [`Decimal`] so that totals and line sums
//! never accumulate float error on this side.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., roubles, not kopecks).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the shop's currency.
    #[must_use]
    pub const fn shop(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::RUB)
    }

    /// A zero amount in the shop's currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::shop(Decimal::ZERO)
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} {}",
            self.amount.round_dp(2),
            self.currency_code.symbol()
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    RUB,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Symbol printed after the amount.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::RUB => "₽",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// Parse a currency code reported by the backend (e.g. `"RUB"`).
    ///
    /// Unknown codes fall back to the shop currency.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Self::USD,
            "EUR" => Self::EUR,
            _ => Self::RUB,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_display_two_decimals() {
        let price = Price::shop(Decimal::from(1500));
        assert_eq!(price.to_string(), "1500.00 ₽");
    }

    #[test]
    fn test_display_rounds() {
        let price = Price::shop(Decimal::from_str("19.999").unwrap_or_default());
        assert_eq!(price.to_string(), "20.00 ₽");
    }

    #[test]
    fn test_zero_default() {
        assert_eq!(Price::default(), Price::zero());
        assert_eq!(Price::zero().to_string(), "0.00 ₽");
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(CurrencyCode::from_code("usd"), CurrencyCode::USD);
        assert_eq!(CurrencyCode::from_code("RUB"), CurrencyCode::RUB);
        assert_eq!(CurrencyCode::from_code("???"), CurrencyCode::RUB);
    }
}
