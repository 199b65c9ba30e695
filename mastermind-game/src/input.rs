//! Validated numeric input: the only way quantities and bets reach the engines.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::constants::{BET_MAX_DIGITS, QUANTITY_MAX_DIGITS};
use crate::error::GameError;
use crate::money::Cents;

/// A positive number of shares or units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// # Errors
    ///
    /// Returns `GameError::InvalidQuantity` for zero.
    pub fn new(value: u32) -> Result<Self, GameError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(GameError::InvalidQuantity)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for Quantity {
    type Error = GameError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.get()
    }
}

impl FromStr for Quantity {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = parse_digits(s, QUANTITY_MAX_DIGITS).ok_or(GameError::InvalidQuantity)?;
        Self::new(value)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A positive bet in whole dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BetAmount(NonZeroU32);

impl BetAmount {
    /// # Errors
    ///
    /// Returns `GameError::InvalidAmount` for zero.
    pub fn from_dollars(dollars: u32) -> Result<Self, GameError> {
        NonZeroU32::new(dollars)
            .map(Self)
            .ok_or(GameError::InvalidAmount)
    }

    #[must_use]
    pub const fn dollars(self) -> u32 {
        self.0.get()
    }

    #[must_use]
    pub const fn cents(self) -> Cents {
        Cents::from_dollars(self.0.get() as i64)
    }
}

impl TryFrom<u32> for BetAmount {
    type Error = GameError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_dollars(value)
    }
}

impl From<BetAmount> for u32 {
    fn from(value: BetAmount) -> Self {
        value.dollars()
    }
}

impl FromStr for BetAmount {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = parse_digits(s, BET_MAX_DIGITS).ok_or(GameError::InvalidAmount)?;
        Self::from_dollars(value)
    }
}

impl fmt::Display for BetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cents())
    }
}

/// Parse a plain run of ASCII digits no longer than `max_digits`.
fn parse_digits(raw: &str, max_digits: usize) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.len() > max_digits
        || !trimmed.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    trimmed.parse().ok()
}
