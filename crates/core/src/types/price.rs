//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are plain USD amounts stored as `NUMERIC` in the database and
//! handled as [`rust_decimal::Decimal`] everywhere in the application.
//! Floats never touch money.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit price in USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, yielding a line total.
    #[must_use]
    pub fn times(&self, quantity: i32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }

    /// Format for display with two decimal places, e.g. `$19.99`.
    #[must_use]
    pub fn display(&self) -> String {
        format_usd(self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Format a decimal amount as a USD string with two decimal places.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

// SQLx support (with postgres feature): stored as NUMERIC
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(Price::new(Decimal::new(1000, 2)).display(), "$10.00");
        assert_eq!(Price::new(Decimal::new(550, 2)).display(), "$5.50");
        assert_eq!(Price::new(Decimal::new(0, 2)).display(), "$0.00");
        // Scale-0 decimals still render cents
        assert_eq!(Price::new(Decimal::from(10)).display(), "$10.00");
    }

    #[test]
    fn test_times_quantity() {
        let price = Price::new(Decimal::new(1000, 2));
        assert_eq!(price.times(2), Decimal::new(2000, 2));
        assert_eq!(price.times(0), Decimal::ZERO);
    }

    #[test]
    fn test_serde_transparent() {
        let price = Price::new(Decimal::new(1999, 2));
        let json = serde_json::to_string(&price).unwrap();
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
