//! User-facing failures for every game action.
use thiserror::Error;

use crate::money::Cents;
use crate::screen::Screen;

/// Why an action was declined. A declined action never changes the economy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Enter a valid quantity.")]
    InvalidQuantity,
    #[error("Invalid bet amount!")]
    InvalidAmount,
    #[error("Not enough money! Need {required}, have {available}.")]
    InsufficientFunds { required: Cents, available: Cents },
    #[error("Not enough {item} to sell! Wanted {requested}, holding {owned}.")]
    InsufficientHoldings {
        item: String,
        requested: u32,
        owned: u32,
    },
    #[error("Cannot hold more than {cap} units of {item} (holding {held}, buying {requested}).")]
    InventoryCapExceeded {
        item: String,
        cap: u32,
        held: u32,
        requested: u32,
    },
    /// `activity` is `"buy"`, `"sell"`, or `"dice"`.
    #[error("Daily {activity} limit ({limit}) reached.")]
    DailyLimitReached { activity: &'static str, limit: u32 },
    #[error("Minimum bet is {minimum}.")]
    BelowMinimumBet { minimum: Cents },
    #[error("Maximum bet is {maximum}.")]
    AboveMaximumBet { maximum: Cents },
    #[error("You're already in {name}!")]
    AlreadyAtLocation { name: String },
    #[error("You cannot trade {item} in {location}.")]
    ItemUnavailableAtLocation { item: String, location: String },
    #[error("Invalid location: {name}.")]
    InvalidLocation { name: String },
    #[error("The game is over. Start a new game to keep playing.")]
    GameOver,
    #[error("{action} is not available on the {screen} screen.")]
    ActionNotAllowed {
        screen: Screen,
        action: &'static str,
    },
}

/// Result alias for game actions.
pub type GameResult<T> = Result<T, GameError>;
