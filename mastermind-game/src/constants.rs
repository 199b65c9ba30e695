//! Centralized balance and tuning constants for Money Mastermind.
//!
//! Host-tunable rules (goal, day limit, caps) live in [`crate::GameConfig`];
//! everything here is fixed game math that only changes through a code
//! review.

use crate::money::Cents;

// Stock market --------------------------------------------------------------
pub(crate) const STOCK_INITIAL_PRICE_MIN_DOLLARS: f64 = 100.0;
pub(crate) const STOCK_INITIAL_PRICE_MAX_DOLLARS: f64 = 500.0;
pub(crate) const STOCK_DIVIDEND_RATIO: f64 = 0.08;
pub(crate) const STOCK_VOLATILITY_MIN: f64 = 0.12;
pub(crate) const STOCK_VOLATILITY_MAX: f64 = 0.35;
pub(crate) const STOCK_PRICE_FLOOR: Cents = Cents::from_dollars(1);
pub(crate) const REGION_MOVE_FEE: Cents = Cents::from_dollars(50);

// Contraband ----------------------------------------------------------------
pub(crate) const CONTRABAND_VOLATILITY_MIN: f64 = 0.15;
pub(crate) const CONTRABAND_VOLATILITY_MAX: f64 = 0.60;
pub(crate) const CONTRABAND_FLUCTUATION_MIN: f64 = 0.7;
pub(crate) const CONTRABAND_FLUCTUATION_MAX: f64 = 2.5;
pub(crate) const CONTRABAND_PRICE_FLOOR: Cents = Cents::from_dollars(10);
pub(crate) const GOOD_DEAL_PRICE_FLOOR: Cents = Cents::from_dollars(5);
pub(crate) const GOOD_DEAL_RATIO_MIN: f64 = 0.4;
pub(crate) const GOOD_DEAL_RATIO_MAX: f64 = 0.7;

// Travel events ---------------------------------------------------------------
pub(crate) const TRAVEL_EVENT_CHANCE: f64 = 0.20;
pub(crate) const AMBUSH_LOSS_DOLLARS: (i64, i64) = (100, 500);
pub(crate) const AMBUSH_CONFISCATE_CHANCE: f64 = 0.5;
pub(crate) const AMBUSH_CONFISCATE_MAX: u32 = 5;
pub(crate) const EXPENSES_DOLLARS: (i64, i64) = (50, 300);

// Gambling --------------------------------------------------------------------
pub(crate) const DICE_STAKE: Cents = Cents::from_dollars(100);
pub(crate) const DICE_FACES: u8 = 6;
pub(crate) const DICE_WINNING_FACE: u8 = 6;
pub(crate) const DICE_MULTIPLIER: u32 = 5;

// Journal ---------------------------------------------------------------------
pub(crate) const MESSAGE_FADE_IN_MS: u64 = 500;
pub(crate) const MESSAGE_HOLD_MS: u64 = 2_000;
pub(crate) const MESSAGE_FADE_OUT_MS: u64 = 1_500;
pub(crate) const MESSAGE_LIFETIME_MS: u64 =
    MESSAGE_FADE_IN_MS + MESSAGE_HOLD_MS + MESSAGE_FADE_OUT_MS;

// Input -----------------------------------------------------------------------
pub(crate) const QUANTITY_MAX_DIGITS: usize = 5;
pub(crate) const BET_MAX_DIGITS: usize = 6;

pub(crate) const MAIN_MENU_LABEL: &str = "Main Menu";
