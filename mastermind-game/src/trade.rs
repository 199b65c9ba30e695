//! Trade primitives shared by the stock and contraband markets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GameError, GameResult};
use crate::input::Quantity;
use crate::money::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Settled trade details returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub item: String,
    pub direction: TradeDirection,
    pub quantity: u32,
    pub unit_price: Cents,
    pub total: Cents,
}

impl TradeReceipt {
    #[must_use]
    pub fn new(
        item: impl Into<String>,
        direction: TradeDirection,
        quantity: Quantity,
        unit_price: Cents,
    ) -> Self {
        Self {
            item: item.into(),
            direction,
            quantity: quantity.get(),
            unit_price,
            total: unit_price.times(quantity.get()),
        }
    }

    /// Signed effect on the balance: negative for buys, positive for sells.
    #[must_use]
    pub fn balance_delta(&self) -> Cents {
        match self.direction {
            TradeDirection::Buy => -self.total,
            TradeDirection::Sell => self.total,
        }
    }
}

pub(crate) const fn ensure_affordable(balance: Cents, cost: Cents) -> GameResult<()> {
    if balance.as_cents() < cost.as_cents() {
        return Err(GameError::InsufficientFunds {
            required: cost,
            available: balance,
        });
    }
    Ok(())
}

/// Returns the holding after the purchase.
pub(crate) fn ensure_capacity(item: &str, held: u32, requested: Quantity, cap: u32) -> GameResult<u32> {
    held.checked_add(requested.get())
        .filter(|total| *total <= cap)
        .ok_or_else(|| GameError::InventoryCapExceeded {
            item: item.to_string(),
            cap,
            held,
            requested: requested.get(),
        })
}

pub(crate) fn ensure_holdings(item: &str, owned: u32, requested: Quantity) -> GameResult<()> {
    if owned < requested.get() {
        return Err(GameError::InsufficientHoldings {
            item: item.to_string(),
            requested: requested.get(),
            owned,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(value: u32) -> Quantity {
        Quantity::new(value).unwrap()
    }

    #[test]
    fn receipt_totals_and_signs() {
        let receipt = TradeReceipt::new("AURAX", TradeDirection::Buy, qty(3), Cents::new(1_250));
        assert_eq!(receipt.total, Cents::new(3_750));
        assert_eq!(receipt.balance_delta(), Cents::new(-3_750));

        let receipt = TradeReceipt::new("AURAX", TradeDirection::Sell, qty(2), Cents::new(100));
        assert_eq!(receipt.balance_delta(), Cents::new(200));
    }

    #[test]
    fn guards_report_numbers() {
        assert!(ensure_affordable(Cents::new(500), Cents::new(500)).is_ok());
        assert_eq!(
            ensure_affordable(Cents::new(499), Cents::new(500)),
            Err(GameError::InsufficientFunds {
                required: Cents::new(500),
                available: Cents::new(499),
            })
        );
        assert_eq!(ensure_capacity("X", 28, qty(2), 30), Ok(30));
        assert!(matches!(
            ensure_capacity("X", 29, qty(2), 30),
            Err(GameError::InventoryCapExceeded { held: 29, .. })
        ));
        assert!(matches!(
            ensure_capacity("X", u32::MAX, qty(1), u32::MAX),
            Err(GameError::InventoryCapExceeded { held: u32::MAX, .. })
        ));
        assert!(ensure_holdings("X", 2, qty(2)).is_ok());
        assert!(matches!(
            ensure_holdings("X", 1, qty(2)),
            Err(GameError::InsufficientHoldings { owned: 1, .. })
        ));
    }
}
