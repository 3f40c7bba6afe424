//! Money type in integer minor currency units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are counted in the smallest currency unit (e.g., cents) and only
//! converted to a `rust_decimal::Decimal` at the display boundary.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A signed monetary amount in minor currency units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    #[default]
    Usd,
    /// Indonesian Rupiah
    Idr,
    /// Euro
    Eur,
    /// Singapore Dollar
    Sgd,
    /// Japanese Yen
    Jpy,
}

/// Errors raised when converting a display decimal into minor units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyConversionError {
    /// The value has more fractional digits than the currency allows.
    #[error("{value} has more than {scale} decimal places allowed for {currency}")]
    TooPrecise {
        /// The rejected value.
        value: Decimal,
        /// The currency's minor-unit scale.
        scale: u32,
        /// The target currency.
        currency: Currency,
    },

    /// The value does not fit in 64-bit minor units.
    #[error("{0} is out of range for minor-unit money")]
    OutOfRange(Decimal),
}

impl Money {
    /// Zero minor units.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a count of minor units.
    #[must_use]
    pub const fn from_minor(units: i64) -> Self {
        Self(units)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction. Returns `None` on overflow.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Converts to a display decimal using the currency's minor-unit scale.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tally_shared::types::{Currency, Money};
    ///
    /// assert_eq!(Money::from_minor(3000).to_decimal(Currency::Usd), dec!(30.00));
    /// assert_eq!(Money::from_minor(3000).to_decimal(Currency::Jpy), dec!(3000));
    /// ```
    #[must_use]
    pub fn to_decimal(self, currency: Currency) -> Decimal {
        Decimal::new(self.0, currency.minor_unit_scale())
    }

    /// Converts a display decimal into minor units.
    ///
    /// Values with more fractional digits than the currency allows are rejected,
    /// never rounded.
    pub fn from_decimal(value: Decimal, currency: Currency) -> Result<Self, MoneyConversionError> {
        let scale = currency.minor_unit_scale();
        if value.normalize().scale() > scale {
            return Err(MoneyConversionError::TooPrecise {
                value,
                scale,
                currency,
            });
        }

        let factor = Decimal::from(10_i64.pow(scale));
        value
            .checked_mul(factor)
            .and_then(|units| units.to_i64())
            .map(Self)
            .ok_or(MoneyConversionError::OutOfRange(value))
    }
}

impl Currency {
    /// Number of decimal places in one major unit (ISO 4217 minor unit).
    #[must_use]
    pub const fn minor_unit_scale(self) -> u32 {
        match self {
            Self::Usd | Self::Idr | Self::Eur | Self::Sgd => 2,
            Self::Jpy => 0,
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Idr => write!(f, "IDR"),
            Self::Eur => write!(f, "EUR"),
            Self::Sgd => write!(f, "SGD"),
            Self::Jpy => write!(f, "JPY"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "IDR" => Ok(Self::Idr),
            "EUR" => Ok(Self::Eur),
            "SGD" => Ok(Self::Sgd),
            "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
