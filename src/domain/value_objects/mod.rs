//! Value Objects for the back-office

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trimmed, non-empty display name shared by categories, brands and products.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityName(String);

impl EntityName {
    pub const MAX_LEN: usize = 120;

    pub fn new(value: impl AsRef<str>) -> Result<Self, NameError> {
        let value = value.as_ref().trim();
        if value.is_empty() { return Err(NameError::Empty); }
        if value.chars().count() > Self::MAX_LEN { return Err(NameError::TooLong); }
        Ok(Self(value.to_string()))
    }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum NameError { Empty, TooLong }
impl std::error::Error for NameError {}
impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "Name is required"), Self::TooLong => write!(f, "Name is too long") }
    }
}

/// Money amounts are kept to two decimal places.
pub const CURRENCY_SCALE: u32 = 2;

pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Catalog unit amount: non-negative, two decimals, below [`UnitAmount::LIMIT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAmount(Decimal);

impl UnitAmount {
    /// Exclusive upper bound; `products.amount` is `NUMERIC(12, 2)`.
    pub const LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO { return Err(AmountError::Negative); }
        let value = round_currency(value);
        if value >= Self::LIMIT { return Err(AmountError::TooLarge); }
        Ok(Self(value))
    }
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        let value = Decimal::from_str(raw.trim()).map_err(|_| AmountError::NotANumber)?;
        Self::new(value)
    }
    pub fn value(&self) -> Decimal { self.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum AmountError { NotANumber, Negative, TooLarge }
impl std::error::Error for AmountError {}
impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "Amount must be a number"),
            Self::Negative => write!(f, "Amount cannot be negative"),
            Self::TooLarge => write!(f, "Amount must be less than 10000000000"),
        }
    }
}

/// Line quantity, between one and [`Quantity::MAX`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(i32);

impl Quantity {
    pub const MAX: i32 = 100_000;

    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 { return Err(QuantityError::BelowOne); }
        match i32::try_from(value) {
            Ok(v) if v <= Self::MAX => Ok(Self(v)),
            _ => Err(QuantityError::TooLarge),
        }
    }
    pub fn value(&self) -> i32 { self.0 }
    pub fn as_decimal(&self) -> Decimal { Decimal::from(self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum QuantityError { BelowOne, TooLarge }
impl std::error::Error for QuantityError {}
impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::BelowOne => write!(f, "Quantity must be at least 1"), Self::TooLarge => write!(f, "Quantity must be at most {}", Quantity::MAX) }
    }
}

/// Order discount in percent, inclusive range 0..=100, two decimals as stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountPercentage(Decimal);

impl DiscountPercentage {
    pub fn new(value: Decimal) -> Result<Self, DiscountError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED { return Err(DiscountError::OutOfRange); }
        Ok(Self(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)))
    }
    pub fn zero() -> Self { Self(Decimal::ZERO) }
    pub fn value(&self) -> Decimal { self.0 }

    /// Discount taken off `gross`, rounded to the currency scale.
    pub fn apply_to(&self, gross: Decimal) -> Decimal {
        round_currency(gross * self.0 / Decimal::ONE_HUNDRED)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum DiscountError { OutOfRange }
impl std::error::Error for DiscountError {}
impl fmt::Display for DiscountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Discount percentage must be between 0 and 100") }
}
