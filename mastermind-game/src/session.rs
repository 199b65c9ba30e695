use log::warn;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Contraband;
use crate::config::{ConfigError, GameConfig};
use crate::contraband::{self, TravelReport};
use crate::day::{self, DayOutcome};
use crate::error::{GameError, GameResult};
use crate::input::{BetAmount, Quantity};
use crate::money::Cents;
use crate::screen::{Action, Screen, enter_screen};
use crate::state::GameState;
use crate::stocks;
use crate::trade::{TradeDirection, TradeReceipt};
use crate::wager::{self, WagerOutcome};

/// What a successfully dispatched action did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    ScreenChanged { screen: Screen },
    NewGame,
    DayAdvanced { outcome: DayOutcome },
    QuantitySet { quantity: Option<Quantity> },
    Traded { receipt: TradeReceipt },
    RegionChanged { fee: Cents },
    Traveled { report: TravelReport },
    VenueChanged { entry_cost: Cents },
    Wagered { outcome: WagerOutcome },
}

/// One player's game: the state plus the random source that drives it.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    rng: ChaCha20Rng,
}

impl GameSession {
    /// Start a game seeded from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration is not playable.
    pub fn new_game(config: GameConfig) -> Result<Self, ConfigError> {
        Self::from_rng(config, ChaCha20Rng::from_entropy())
    }

    /// Start a reproducible game.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration is not playable.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::from_rng(config, ChaCha20Rng::seed_from_u64(seed))
    }

    fn from_rng(config: GameConfig, mut rng: ChaCha20Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = GameState::new(config, &mut rng);
        Ok(Self { state, rng })
    }

    /// Re-initialize every engine with the same rules and return to the menu.
    pub fn reset(&mut self) {
        let clock = self.state.journal.clock_ms();
        self.state = GameState::new(self.state.config.clone(), &mut self.rng);
        self.state.journal.set_clock(clock);
        self.state.contraband.last_refresh_ms = clock;
        let config = &self.state.config;
        let goal = format!(
            "Reach {} within {} days!",
            config.money_goal, config.day_limit
        );
        self.state.journal.info("Game reset. Welcome back!");
        self.state.journal.info(goal);
    }

    /// Feed the host clock. Returns whether contraband prices were refreshed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.state.journal.set_clock(now_ms);
        contraband::refresh_if_due(&mut self.state, &mut self.rng, now_ms)
    }

    pub fn advance_day(&mut self) -> DayOutcome {
        day::advance_day(&mut self.state, &mut self.rng)
    }

    /// # Errors
    ///
    /// See [`stocks::buy`].
    pub fn buy_stock(&mut self, symbol: &str, quantity: Quantity) -> GameResult<TradeReceipt> {
        let result = stocks::buy(&mut self.state, symbol, quantity);
        self.settle("buy stock", result)
    }

    /// # Errors
    ///
    /// See [`stocks::sell`].
    pub fn sell_stock(&mut self, symbol: &str, quantity: Quantity) -> GameResult<TradeReceipt> {
        let result = stocks::sell(&mut self.state, symbol, quantity);
        self.settle("sell stock", result)
    }

    /// # Errors
    ///
    /// See [`stocks::change_region`].
    pub fn change_region(&mut self, region_index: usize) -> GameResult<Cents> {
        let result = stocks::change_region(&mut self.state, region_index);
        self.settle("change region", result)
    }

    /// # Errors
    ///
    /// See [`contraband::travel`].
    pub fn travel_mafia(&mut self, destination: &str) -> GameResult<TravelReport> {
        let result = contraband::travel(&mut self.state, destination, &mut self.rng);
        self.settle("travel", result)
    }

    /// # Errors
    ///
    /// See [`contraband::trade`].
    pub fn trade_contraband(
        &mut self,
        item: Contraband,
        direction: TradeDirection,
        quantity: Quantity,
    ) -> GameResult<TradeReceipt> {
        let result = contraband::trade(&mut self.state, item, direction, quantity);
        self.settle("trade contraband", result)
    }

    /// # Errors
    ///
    /// See [`wager::change_venue`].
    pub fn change_venue(&mut self, venue_index: usize) -> GameResult<Cents> {
        let result = wager::change_venue(&mut self.state, venue_index);
        self.settle("change venue", result)
    }

    /// Bet at the current venue.
    ///
    /// # Errors
    ///
    /// See [`wager::place_wager`].
    pub fn place_wager(&mut self, amount: BetAmount) -> GameResult<WagerOutcome> {
        let result = wager::place_wager(&mut self.state, amount, &mut self.rng);
        self.settle("place wager", result)
    }

    /// # Errors
    ///
    /// See [`wager::roll_dice`].
    pub fn roll_dice(&mut self) -> GameResult<WagerOutcome> {
        let result = wager::roll_dice(&mut self.state, &mut self.rng);
        self.settle("roll dice", result)
    }

    /// Run an input-layer action against the active screen.
    ///
    /// # Errors
    ///
    /// `ActionNotAllowed` when the screen does not offer the action, otherwise
    /// whatever the underlying engine reports.
    pub fn dispatch(&mut self, action: Action) -> GameResult<ActionOutcome> {
        let label = action.label();
        let result = self.apply(action);
        self.settle(label, result)
    }

    fn apply(&mut self, action: Action) -> GameResult<ActionOutcome> {
        let screen = self.state.screen;
        if !screen.allows(&action) {
            return Err(GameError::ActionNotAllowed {
                screen,
                action: action.label(),
            });
        }
        let outcome = match action {
            Action::OpenStockMarket | Action::BackToStockMarket => {
                self.state.selection.pending_quantity = None;
                self.show(Screen::StockMarket)
            }
            Action::OpenMafiaWars => self.show(Screen::MafiaWars),
            Action::OpenLottery => self.show(Screen::Lottery),
            Action::OpenMoveRegion => self.show(Screen::MoveRegion),
            Action::OpenWallet => self.show(Screen::Wallet),
            Action::BackToMainMenu => {
                self.state.selection = Default::default();
                self.show(Screen::MainMenu)
            }
            Action::NewGame | Action::PlayAgain => {
                self.reset();
                ActionOutcome::NewGame
            }
            Action::AdvanceDay => ActionOutcome::DayAdvanced {
                outcome: self.advance_day(),
            },
            Action::SelectStock(symbol) => {
                let region = self.state.current_region();
                if !region.lists(&symbol) || self.state.stocks.quote(&symbol).is_none() {
                    return Err(GameError::ItemUnavailableAtLocation {
                        item: symbol,
                        location: region.name.to_string(),
                    });
                }
                self.state.selection.stock = Some(symbol);
                self.state.selection.pending_quantity = None;
                self.show(Screen::BuySellStock)
            }
            Action::SetQuantity(quantity) => self.set_pending(Some(quantity)),
            Action::FillMaxBuy => {
                let max = stocks::max_buy_quantity(&self.state, self.selected_stock()?);
                self.set_pending(Quantity::new(max).ok())
            }
            Action::FillMaxSell => {
                let max = stocks::max_sell_quantity(&self.state, self.selected_stock()?);
                self.set_pending(Quantity::new(max).ok())
            }
            Action::BuyStock => self.trade_selected(TradeDirection::Buy)?,
            Action::SellStock => self.trade_selected(TradeDirection::Sell)?,
            Action::ChangeRegion(index) => {
                let fee = stocks::change_region(&mut self.state, index)?;
                enter_screen(&mut self.state, Screen::StockMarket);
                ActionOutcome::RegionChanged { fee }
            }
            Action::Travel(destination) => ActionOutcome::Traveled {
                report: contraband::travel(&mut self.state, &destination, &mut self.rng)?,
            },
            Action::TradeContraband {
                item,
                direction,
                quantity,
            } => ActionOutcome::Traded {
                receipt: contraband::trade(&mut self.state, item, direction, quantity)?,
            },
            Action::ChangeVenue(index) => ActionOutcome::VenueChanged {
                entry_cost: wager::change_venue(&mut self.state, index)?,
            },
            Action::PlaceWager(amount) => ActionOutcome::Wagered {
                outcome: wager::place_wager(&mut self.state, amount, &mut self.rng)?,
            },
            Action::RollDice => ActionOutcome::Wagered {
                outcome: wager::roll_dice(&mut self.state, &mut self.rng)?,
            },
        };
        Ok(outcome)
    }

    fn show(&mut self, screen: Screen) -> ActionOutcome {
        enter_screen(&mut self.state, screen);
        ActionOutcome::ScreenChanged { screen }
    }

    fn set_pending(&mut self, quantity: Option<Quantity>) -> ActionOutcome {
        self.state.selection.pending_quantity = quantity;
        ActionOutcome::QuantitySet { quantity }
    }

    /// Trade the selected symbol using the pending quantity, which is
    /// consumed whether or not the trade goes through.
    fn trade_selected(&mut self, direction: TradeDirection) -> GameResult<ActionOutcome> {
        let symbol = self.selected_stock()?.to_string();
        let quantity = self
            .state
            .selection
            .pending_quantity
            .take()
            .ok_or(GameError::InvalidQuantity)?;
        let receipt = match direction {
            TradeDirection::Buy => stocks::buy(&mut self.state, &symbol, quantity)?,
            TradeDirection::Sell => stocks::sell(&mut self.state, &symbol, quantity)?,
        };
        Ok(ActionOutcome::Traded { receipt })
    }

    fn selected_stock(&self) -> GameResult<&str> {
        self.state
            .selection
            .stock
            .as_deref()
            .ok_or(GameError::ActionNotAllowed {
                screen: self.state.screen,
                action: "trade without a selected stock",
            })
    }

    /// Declined actions leave an error entry in the journal and a warning in
    /// the log.
    fn settle<T>(&mut self, action: &str, result: GameResult<T>) -> GameResult<T> {
        if let Err(err) = &result {
            warn!("{action} rejected: {err}");
            self.state.journal.error(err.to_string());
        }
        result
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for hosts and tests that stage a scenario directly.
    pub const fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state)
    }

    #[must_use]
    pub const fn balance(&self) -> Cents {
        self.state.balance
    }

    #[must_use]
    pub const fn day(&self) -> u32 {
        self.state.day
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.state.screen
    }

    /// Replace the random source with a deterministic one.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}
