//! Currency rounding and the zero tests used by every valuation rule.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Smallest value change treated as "an effect" (1e-7).
pub const VALUE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 7);

/// Returns true when `amount` is strictly larger than [`VALUE_EPSILON`] in
/// absolute value.
pub fn exceeds_epsilon(amount: Decimal) -> bool {
    amount.abs() > VALUE_EPSILON
}

/// A company currency: ISO code + number of decimal places used for amounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    decimal_places: u32,
}

impl Currency {
    pub fn new(code: impl Into<String>, decimal_places: u32) -> Self {
        Self {
            code: code.into(),
            decimal_places,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Round to the currency precision, half away from zero.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Whether `amount` rounds to zero in this currency.
    pub fn is_zero(&self, amount: Decimal) -> bool {
        self.round(amount).is_zero()
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new("USD", 2)
    }
}
