//! Money types with precise decimal arithmetic
//!
//! Every amount the association charges or receives flows through [`Money`],
//! which wraps `rust_decimal` so sums of fees, registrations and payments never
//! accumulate binary floating-point drift. The association bills in a single
//! currency, so amounts carry no currency tag.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use thiserror::Error;

/// Number of decimal places used when an amount must be rounded to cents
pub const CENT_PLACES: u32 = 2;

/// Largest amount a `NUMERIC(12, 2)` column holds
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid percentage: {0} (expected 0 to 100, at most two decimals)")]
    InvalidPercentage(Decimal),

    #[error("Division by zero")]
    DivisionByZero,
}

/// A monetary amount
///
/// Amounts keep whatever precision they were created with; rounding only
/// happens when explicitly requested through [`Money::round_to_cents`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    amount: Decimal,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Creates Money from an integer amount in cents
    pub fn from_minor(cents: i64) -> Self {
        Self {
            amount: Decimal::new(cents, CENT_PLACES),
        }
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self { amount: dec!(0) }
    }

    /// Creates an amount that can be charged and stored as is
    ///
    /// # Errors
    ///
    /// Rejects negatives, fractions of a cent and anything above
    /// [`MAX_AMOUNT`].
    pub fn chargeable(amount: Decimal) -> Result<Self, MoneyError> {
        if amount < Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!("{} must not be negative", amount)));
        }
        if amount.normalize().scale() > CENT_PLACES {
            return Err(MoneyError::InvalidAmount(format!(
                "{} has more than {} decimal places",
                amount, CENT_PLACES
            )));
        }
        if amount > MAX_AMOUNT {
            return Err(MoneyError::InvalidAmount(format!(
                "{} exceeds the maximum of {}",
                amount, MAX_AMOUNT
            )));
        }
        Ok(Self::new(amount))
    }

    /// Creates a strictly positive chargeable amount
    pub fn positive(amount: Decimal) -> Result<Self, MoneyError> {
        if amount <= Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!(
                "{} must be greater than zero",
                amount
            )));
        }
        Self::chargeable(amount)
    }

    /// Adds two amounts, `None` on overflow
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.amount.checked_add(other.amount).map(Self::new)
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Rounds to cents, midpoint away from zero
    pub fn round_to_cents(&self) -> Self {
        Self {
            amount: self
                .amount
                .round_dp_with_strategy(CENT_PLACES, RoundingStrategy::MidpointAwayFromZero),
        }
    }

    /// Multiplies by a scalar (e.g., a quantity)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor)
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self::new(self.amount / divisor))
    }

    /// Divides into `parts` equal shares, only if the share is a whole number of cents
    pub fn exact_share(&self, parts: u32) -> Option<Self> {
        if parts == 0 {
            return None;
        }
        let share = self.divide(Decimal::from(parts)).ok()?;
        (share.round_to_cents() == share).then_some(share)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.amount)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.amount + other.amount)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.amount += other.amount;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.amount - other.amount)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.amount -= other.amount;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// A percentage between 0 and 100 (e.g., a family discount)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage {
    value: Decimal,
}

impl Percentage {
    /// Creates a percentage from a value between 0 and 100, to the hundredth
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value > dec!(100) || value.normalize().scale() > CENT_PLACES {
            return Err(MoneyError::InvalidPercentage(value));
        }
        Ok(Self { value })
    }

    /// The zero percentage
    pub fn zero() -> Self {
        Self { value: dec!(0) }
    }

    /// Returns the percentage value (e.g., 10 for 10%)
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a fraction (e.g., 0.10 for 10%)
    pub fn as_fraction(&self) -> Decimal {
        self.value / dec!(100)
    }

    /// Returns true if the percentage is zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns the amount left after deducting this percentage
    pub fn deduct_from(&self, money: Money) -> Money {
        money.multiply(Decimal::ONE - self.as_fraction())
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(percentage: Percentage) -> Decimal {
        percentage.value
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.value.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00));
        let b = Money::new(dec!(50.00));

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
        assert!((b - a).is_negative());
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(Money::positive(dec!(0)).is_err());
        assert!(Money::positive(dec!(-1)).is_err());
        assert!(Money::positive(dec!(0.01)).is_ok());
    }

    #[test]
    fn test_chargeable_bounds() {
        assert!(Money::chargeable(dec!(0)).is_ok());
        assert!(Money::chargeable(dec!(10.50)).is_ok());
        assert!(Money::chargeable(dec!(10.500)).is_ok());
        assert!(Money::chargeable(MAX_AMOUNT).is_ok());

        assert!(Money::chargeable(dec!(-0.01)).is_err());
        assert!(Money::chargeable(dec!(10.005)).is_err());
        assert!(Money::chargeable(MAX_AMOUNT + dec!(0.01)).is_err());
        assert!(Money::positive(Decimal::MAX).is_err());
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_add(Money::new(dec!(1))), None);
        assert_eq!(
            Money::new(dec!(1.50)).checked_add(Money::new(dec!(2.25))),
            Some(Money::new(dec!(3.75)))
        );
    }

    #[test]
    fn test_round_to_cents_midpoint() {
        assert_eq!(Money::new(dec!(10.005)).round_to_cents().amount(), dec!(10.01));
        assert_eq!(Money::new(dec!(10.004)).round_to_cents().amount(), dec!(10.00));
    }

    #[test]
    fn test_exact_share() {
        assert_eq!(Money::new(dec!(90)).exact_share(3), Some(Money::new(dec!(30))));
        assert_eq!(Money::new(dec!(100)).exact_share(3), None);
        assert_eq!(Money::new(dec!(100)).exact_share(0), None);
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(Percentage::new(dec!(-1)).is_err());
        assert!(Percentage::new(dec!(101)).is_err());
        assert!(Percentage::new(dec!(12.345)).is_err());
        assert!(Percentage::new(dec!(12.50)).is_ok());
        assert_eq!(Percentage::new(dec!(10)).unwrap().as_fraction(), dec!(0.10));
    }

    #[test]
    fn test_percentage_deduction() {
        let discount = Percentage::new(dec!(10)).unwrap();
        assert_eq!(discount.deduct_from(Money::new(dec!(150))).amount(), dec!(135.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_sum_is_order_independent(
            cents in proptest::collection::vec(-1_000_000i64..1_000_000i64, 0..20)
        ) {
            let forward: Money = cents.iter().map(|c| Money::from_minor(*c)).sum();
            let backward: Money = cents.iter().rev().map(|c| Money::from_minor(*c)).sum();
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn money_arithmetic_is_associative(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
            c in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a);
            let mb = Money::from_minor(b);
            let mc = Money::from_minor(c);

            prop_assert_eq!((ma + mb) + mc, ma + (mb + mc));
        }
    }
}
