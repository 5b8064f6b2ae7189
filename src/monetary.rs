use std::cmp::Ordering;
use std::fmt;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::AmountError;

/// Currency tag: a symbol plus the number of decimal places one whole unit
/// carries. Amounts are stored as integer counts of the smallest unit, so
/// two amounts are only comparable under the same currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency {
    symbol: &'static str,
    decimals: u32,
}

impl Currency {
    pub const fn new(symbol: &'static str, decimals: u32) -> Self {
        Self { symbol, decimals }
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Native token, denominated in its smallest on-chain unit.
pub const TOKEN: Currency = Currency::new("TOKEN", 8);

/// US dollars in micro-dollar base units.
pub const USD_MICRO: Currency = Currency::new("USDMicro", 6);

/// Fixed-point monetary value: an integer count of base units tagged with a
/// currency. Never backed by floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Amount {
    base_units: i128,
    currency: Currency,
}

impl Amount {
    /// Builds an amount from a count of the currency's smallest units.
    pub fn from_base_units(base_units: i128, currency: Currency) -> Self {
        Self {
            base_units,
            currency,
        }
    }

    /// Builds an amount from a decimal quantity of whole units. Exact: a
    /// decimal with more fractional digits than the currency carries is
    /// rejected rather than truncated.
    pub fn from_decimal(value: Decimal, currency: Currency) -> Result<Self, AmountError> {
        let scaled = value
            .checked_mul(Self::unit_scale(currency)?)
            .ok_or(AmountError::Unrepresentable)?;
        if scaled.fract() != Decimal::ZERO {
            return Err(AmountError::PrecisionLoss {
                currency: currency.symbol(),
            });
        }
        let base_units = scaled.to_i128().ok_or(AmountError::Unrepresentable)?;
        Ok(Self {
            base_units,
            currency,
        })
    }

    /// Like `from_decimal` but rounds to the currency exponent (banker's
    /// rounding). For provider-reported values that arrive with arbitrary
    /// fractional digits.
    pub fn from_decimal_rounded(value: Decimal, currency: Currency) -> Result<Self, AmountError> {
        let rounded =
            value.round_dp_with_strategy(currency.decimals(), RoundingStrategy::MidpointNearestEven);
        Self::from_decimal(rounded, currency)
    }

    pub fn base_units(&self) -> i128 {
        self.base_units
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Converts back to a decimal count of whole units.
    pub fn as_decimal(&self) -> Result<Decimal, AmountError> {
        let magnitude = Decimal::from_i128(self.base_units).ok_or(AmountError::Unrepresentable)?;
        magnitude
            .checked_div(Self::unit_scale(self.currency)?)
            .ok_or(AmountError::Unrepresentable)
    }

    /// Ordering within a single currency; mixing currencies is a contract
    /// violation surfaced as `IncompatibleUnit`.
    pub fn checked_cmp(&self, other: &Amount) -> Result<Ordering, AmountError> {
        self.require_same_currency(other)?;
        Ok(self.base_units.cmp(&other.base_units))
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount, AmountError> {
        self.require_same_currency(other)?;
        let base_units = self
            .base_units
            .checked_add(other.base_units)
            .ok_or(AmountError::Unrepresentable)?;
        Ok(Self {
            base_units,
            currency: self.currency,
        })
    }

    fn require_same_currency(&self, other: &Amount) -> Result<(), AmountError> {
        if self.currency != other.currency {
            return Err(AmountError::IncompatibleUnit {
                left: self.currency.symbol(),
                right: other.currency.symbol(),
            });
        }
        Ok(())
    }

    fn unit_scale(currency: Currency) -> Result<Decimal, AmountError> {
        10i128
            .checked_pow(currency.decimals())
            .and_then(Decimal::from_i128)
            .ok_or(AmountError::Unrepresentable)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.base_units, self.currency.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn from_base_units_round_trips_through_decimal() {
        let amount = Amount::from_base_units(150_000_000, TOKEN);
        assert_eq!(amount.as_decimal().unwrap(), dec!(1.5));
    }

    #[test]
    fn from_decimal_is_exact() {
        let amount = Amount::from_decimal(dec!(2.25), USD_MICRO).unwrap();
        assert_eq!(amount.base_units(), 2_250_000);
    }

    #[test]
    fn from_decimal_rejects_excess_precision() {
        let err = Amount::from_decimal(dec!(1.2345678), USD_MICRO).unwrap_err();
        assert!(matches!(err, AmountError::PrecisionLoss { .. }));
    }

    #[test]
    fn from_decimal_rounded_uses_bankers_rounding() {
        let amount = Amount::from_decimal_rounded(dec!(1.2345675), USD_MICRO).unwrap();
        assert_eq!(amount.base_units(), 1_234_568);

        let amount = Amount::from_decimal_rounded(dec!(1.2345665), USD_MICRO).unwrap();
        assert_eq!(amount.base_units(), 1_234_566);
    }

    #[test]
    fn comparison_within_currency() {
        let small = Amount::from_base_units(10, TOKEN);
        let large = Amount::from_base_units(20, TOKEN);
        assert_eq!(small.checked_cmp(&large).unwrap(), Ordering::Less);
        assert_eq!(large.checked_cmp(&small).unwrap(), Ordering::Greater);
        assert_eq!(small.checked_cmp(&small).unwrap(), Ordering::Equal);
    }

    #[test]
    fn mixed_currency_comparison_fails() {
        let token = Amount::from_base_units(10, TOKEN);
        let usd = Amount::from_base_units(10, USD_MICRO);
        let err = token.checked_cmp(&usd).unwrap_err();
        assert!(matches!(err, AmountError::IncompatibleUnit { .. }));
        assert_ne!(token, usd);
    }

    #[test]
    fn checked_add_same_currency() {
        let a = Amount::from_base_units(100, TOKEN);
        let b = Amount::from_base_units(250, TOKEN);
        assert_eq!(a.checked_add(&b).unwrap().base_units(), 350);
        assert!(a.checked_add(&Amount::from_base_units(1, USD_MICRO)).is_err());
    }

    #[test]
    fn negative_amounts_are_representable() {
        let amount = Amount::from_decimal(dec!(-0.5), TOKEN).unwrap();
        assert_eq!(amount.base_units(), -50_000_000);
    }
}
