use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{GAMBLING_VENUES, GamblingVenue, MafiaLocation, STOCK_REGIONS, StockRegion};
use crate::config::GameConfig;
use crate::constants::MAIN_MENU_LABEL;
use crate::contraband::{self, ContrabandMarket};
use crate::error::{GameError, GameResult};
use crate::input::Quantity;
use crate::journal::Journal;
use crate::money::Cents;
use crate::result::Ending;
use crate::screen::Screen;
use crate::stocks::{self, StockMarket};
use crate::wager::WagerDesk;

/// Auxiliary selection carried by the buy/sell screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub stock: Option<String>,
    pub pending_quantity: Option<Quantity>,
}

/// Everything a running game owns. Engines mutate it only after all of an
/// action's checks pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    pub balance: Cents,
    pub day: u32,
    pub screen: Screen,
    #[serde(default)]
    pub selection: Selection,
    pub stocks: StockMarket,
    pub contraband: ContrabandMarket,
    pub wagers: WagerDesk,
    pub journal: Journal,
    #[serde(default)]
    pub ending: Option<Ending>,
}

impl GameState {
    /// Fresh game on day 1 at the main menu with newly drawn prices.
    #[must_use]
    pub fn new(config: GameConfig, rng: &mut impl Rng) -> Self {
        let journal = Journal::new(config.journal_capacity);
        Self {
            balance: config.starting_balance,
            day: 1,
            screen: Screen::MainMenu,
            selection: Selection::default(),
            stocks: stocks::initialize_market(rng),
            contraband: contraband::initialize_market(rng),
            wagers: WagerDesk::default(),
            journal,
            ending: None,
            config,
        }
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.ending.is_some()
    }

    pub(crate) const fn ensure_active(&self) -> GameResult<()> {
        if self.ending.is_some() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    pub(crate) fn debit(&mut self, amount: Cents) {
        self.balance -= amount;
    }

    pub(crate) fn credit(&mut self, amount: Cents) {
        self.balance += amount;
    }

    #[must_use]
    pub fn current_region(&self) -> &'static StockRegion {
        STOCK_REGIONS
            .get(self.stocks.region_index)
            .unwrap_or(&STOCK_REGIONS[0])
    }

    #[must_use]
    pub fn current_territory(&self) -> &'static MafiaLocation {
        self.contraband.location()
    }

    #[must_use]
    pub fn current_venue(&self) -> &'static GamblingVenue {
        GAMBLING_VENUES
            .get(self.wagers.venue_index)
            .unwrap_or(&GAMBLING_VENUES[0])
    }

    /// Name of the place the active screen is showing.
    #[must_use]
    pub fn location_name(&self) -> &'static str {
        match self.screen {
            Screen::StockMarket | Screen::BuySellStock | Screen::MoveRegion | Screen::Wallet => {
                self.current_region().name
            }
            Screen::MafiaWars => self.current_territory().name,
            Screen::Lottery => self.current_venue().name,
            Screen::MainMenu | Screen::WinScreen | Screen::LoseScreen => MAIN_MENU_LABEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn new_game_starts_at_menu_with_defaults() {
        let mut rng = SmallRng::seed_from_u64(7);
        let state = GameState::new(GameConfig::default(), &mut rng);
        assert_eq!(state.day, 1);
        assert_eq!(state.balance, Cents::from_dollars(1_000));
        assert_eq!(state.screen, Screen::MainMenu);
        assert_eq!(state.location_name(), "Main Menu");
        assert_eq!(state.current_territory().name, "Denver");
        assert_eq!(state.current_venue().name, "Boardwalk");
        assert!(state.stocks.portfolio.is_empty());
        assert!(!state.is_finished());
        assert_eq!(state.ensure_active(), Ok(()));
    }

    #[test]
    fn location_follows_screen() {
        let mut rng = SmallRng::seed_from_u64(8);
        let mut state = GameState::new(GameConfig::default(), &mut rng);
        state.screen = Screen::Wallet;
        assert_eq!(state.location_name(), "Global Exchange");
        state.screen = Screen::MafiaWars;
        assert_eq!(state.location_name(), "Denver");
        state.screen = Screen::Lottery;
        assert_eq!(state.location_name(), "Boardwalk");
    }

    #[test]
    fn finished_games_refuse_actions() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut state = GameState::new(GameConfig::default(), &mut rng);
        state.ending = Some(Ending::OutOfTime);
        assert_eq!(state.ensure_active(), Err(GameError::GameOver));
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut rng = SmallRng::seed_from_u64(10);
        let state = GameState::new(GameConfig::default(), &mut rng);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn volatility_keeps_every_digit_through_json() {
        let mut rng = SmallRng::seed_from_u64(10);
        let mut state = GameState::new(GameConfig::default(), &mut rng);
        let quote = state.stocks.quotes.get_mut("BRIGHT").unwrap();
        quote.volatility = 0.247_725_821_735_636_23;
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.stocks.quotes["BRIGHT"].volatility.to_bits(),
            state.stocks.quotes["BRIGHT"].volatility.to_bits()
        );
    }
}
