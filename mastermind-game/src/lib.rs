//! Money Mastermind Game Engine
//!
//! Platform-agnostic economy and screen logic for Money Mastermind: stock
//! trading, contraband dealing, and gambling against a day limit. Hosts feed
//! validated actions and a clock; rendering and input plumbing live elsewhere.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod contraband;
pub mod day;
pub mod error;
pub mod input;
pub mod journal;
pub mod money;
pub mod result;
pub mod screen;
pub mod session;
pub mod state;
pub mod stocks;
pub mod trade;
pub mod wager;
pub mod wallet;

// Re-export commonly used types
pub use catalog::{
    Contraband, GAMBLING_VENUES, GamblingVenue, MAFIA_LOCATIONS, MafiaLocation, STOCK_REGIONS,
    StockRegion, UnknownContraband,
};
pub use config::{ConfigError, GameConfig};
pub use contraband::{ContrabandMarket, DailyTrades, TravelEvent, TravelReport};
pub use day::{DayOutcome, DayReport, advance_day};
pub use error::{GameError, GameResult};
pub use input::{BetAmount, Quantity};
pub use journal::{Journal, JournalEntry, MessageKind};
pub use money::Cents;
pub use result::{Ending, ResultSummary, result_summary};
pub use screen::{Action, Screen};
pub use session::{ActionOutcome, GameSession};
pub use state::{GameState, Selection};
pub use stocks::{Holding, StockMarket, StockQuote};
pub use trade::{TradeDirection, TradeReceipt};
pub use wager::{WagerDesk, WagerGame, WagerOutcome};
pub use wallet::{WalletRow, WalletView, net_worth, wallet_view};
