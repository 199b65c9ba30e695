//! Host-tunable game rules.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Cents;

/// Rules a host may adjust before starting a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_balance: Cents,
    /// Balance that wins the game when reached at a day change.
    pub money_goal: Cents,
    /// Reaching this day without the goal loses the game.
    pub day_limit: u32,
    /// Maximum shares held per symbol.
    pub stock_cap: u32,
    /// Maximum units held per contraband item.
    pub contraband_cap: u32,
    pub daily_buy_limit: u32,
    pub daily_sell_limit: u32,
    pub dice_daily_limit: u32,
    pub price_refresh_interval_ms: u64,
    pub journal_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_balance: Cents::from_dollars(1_000),
            money_goal: Cents::from_dollars(500_000),
            day_limit: 100,
            stock_cap: 30,
            contraband_cap: 30,
            daily_buy_limit: 3,
            daily_sell_limit: 3,
            dice_daily_limit: 5,
            price_refresh_interval_ms: 15_000,
            journal_capacity: 32,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: Cents },
    #[error("starting balance {start} already meets the money goal {goal}")]
    GoalAlreadyMet { start: Cents, goal: Cents },
    #[error("day_limit must leave at least one day change (got {day_limit})")]
    NoDaysToPlay { day_limit: u32 },
}

impl GameConfig {
    /// Validate that every rule leaves a playable game.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a cap or limit is zero, a money amount is not
    /// positive, the game would be won before it starts, or the day limit
    /// leaves no day to play.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::ensure_positive("starting_balance", self.starting_balance)?;
        Self::ensure_positive("money_goal", self.money_goal)?;
        if self.starting_balance >= self.money_goal {
            return Err(ConfigError::GoalAlreadyMet {
                start: self.starting_balance,
                goal: self.money_goal,
            });
        }
        let counts = [
            ("day_limit", u64::from(self.day_limit)),
            ("stock_cap", u64::from(self.stock_cap)),
            ("contraband_cap", u64::from(self.contraband_cap)),
            ("daily_buy_limit", u64::from(self.daily_buy_limit)),
            ("daily_sell_limit", u64::from(self.daily_sell_limit)),
            ("dice_daily_limit", u64::from(self.dice_daily_limit)),
            ("price_refresh_interval_ms", self.price_refresh_interval_ms),
            (
                "journal_capacity",
                u64::try_from(self.journal_capacity).unwrap_or(u64::MAX),
            ),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        if self.day_limit < 2 {
            return Err(ConfigError::NoDaysToPlay {
                day_limit: self.day_limit,
            });
        }
        Ok(())
    }

    const fn ensure_positive(field: &'static str, value: Cents) -> Result<(), ConfigError> {
        if value.is_positive() {
            Ok(())
        } else {
            Err(ConfigError::NotPositive { field, value })
        }
    }
}
