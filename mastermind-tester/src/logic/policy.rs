use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use mastermind_game::stocks::{max_buy_quantity, max_sell_quantity};
use mastermind_game::{
    Action, BetAmount, Cents, Contraband, GAMBLING_VENUES, GameState, MAFIA_LOCATIONS, Quantity,
    Screen, TradeDirection,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use thiserror::Error;

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Next action for today, or `None` once the policy is done with the day.
    fn next_action(&mut self, state: &GameState) -> Option<Action>;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameplayStrategy {
    Idle,
    Dividend,
    Trader,
    Smuggler,
    Gambler,
    Balanced,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown strategy `{0}` (try --list-strategies)")]
pub struct UnknownStrategy(pub String);

impl GameplayStrategy {
    pub const ALL: [Self; 6] = [
        Self::Idle,
        Self::Dividend,
        Self::Trader,
        Self::Smuggler,
        Self::Gambler,
        Self::Balanced,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dividend => "dividend",
            Self::Trader => "trader",
            Self::Smuggler => "smuggler",
            Self::Gambler => "gambler",
            Self::Balanced => "balanced",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Dividend => "Dividend Collector",
            Self::Trader => "Dip Trader",
            Self::Smuggler => "Smuggler",
            Self::Gambler => "Gambler",
            Self::Balanced => "Balanced",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Idle => "Opens the stock market and only advances days",
            Self::Dividend => "Buys the best dividend yield in the region and holds",
            Self::Trader => "Buys the day's biggest dip, sells on gains or stop-loss",
            Self::Smuggler => "Hops territories, sells inventory, buys underpriced contraband",
            Self::Gambler => "Rolls dice daily and bets a quarter of the bankroll",
            Self::Balanced => "Rotates dividend, smuggler, and gambler days",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Idle => Box::new(IdlePolicy),
            Self::Dividend => Box::new(DividendPolicy::default()),
            Self::Trader => Box::new(TraderPolicy::default()),
            Self::Smuggler => Box::new(SmugglerPolicy::new(seed)),
            Self::Gambler => Box::new(GamblerPolicy::default()),
            Self::Balanced => Box::new(BalancedPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameplayStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStrategy(wanted.to_string()))
    }
}

/// Expand CLI strategy keys; `all` selects every strategy.
///
/// # Errors
///
/// Returns `UnknownStrategy` for the first key that names no strategy.
pub fn parse_strategies(keys: &[String]) -> Result<Vec<GameplayStrategy>, UnknownStrategy> {
    let mut strategies = Vec::new();
    for key in keys {
        if key.eq_ignore_ascii_case("all") {
            strategies.extend(GameplayStrategy::ALL);
        } else {
            strategies.push(key.parse()?);
        }
    }
    strategies.sort_unstable();
    strategies.dedup();
    Ok(strategies)
}

/// One navigation step from `from` toward `to`, `None` when already there or
/// when the target needs more than navigation (picking a stock).
#[must_use]
pub fn route(from: Screen, to: Screen) -> Option<Action> {
    if from == to {
        return None;
    }
    match from {
        Screen::BuySellStock | Screen::MoveRegion | Screen::Wallet => {
            Some(Action::BackToStockMarket)
        }
        Screen::StockMarket => match to {
            Screen::MoveRegion => Some(Action::OpenMoveRegion),
            Screen::Wallet => Some(Action::OpenWallet),
            Screen::BuySellStock => None,
            _ => Some(Action::BackToMainMenu),
        },
        Screen::MafiaWars | Screen::Lottery => Some(Action::BackToMainMenu),
        Screen::MainMenu => match to {
            Screen::StockMarket | Screen::BuySellStock | Screen::MoveRegion | Screen::Wallet => {
                Some(Action::OpenStockMarket)
            }
            Screen::MafiaWars => Some(Action::OpenMafiaWars),
            Screen::Lottery => Some(Action::OpenLottery),
            Screen::MainMenu | Screen::WinScreen | Screen::LoseScreen => None,
        },
        Screen::WinScreen | Screen::LoseScreen => None,
    }
}

/// Tracks the day a policy last planned for.
#[derive(Debug, Default)]
struct DayMarker(Option<u32>);

impl DayMarker {
    /// True the first time a new day is observed.
    fn is_new_day(&mut self, state: &GameState) -> bool {
        if self.0 == Some(state.day) {
            return false;
        }
        self.0 = Some(state.day);
        true
    }
}

/// Works through stock orders by selecting each symbol and trading the max.
#[derive(Debug, Default)]
struct StockDesk {
    orders: VecDeque<(String, TradeDirection)>,
}

impl StockDesk {
    fn next_action(&mut self, state: &GameState) -> Option<Action> {
        let Some((symbol, direction)) = self.orders.front().cloned() else {
            return (state.screen == Screen::BuySellStock).then_some(Action::BackToStockMarket);
        };
        match state.screen {
            Screen::BuySellStock if state.selection.stock.as_deref() == Some(symbol.as_str()) => {
                if state.selection.pending_quantity.is_none() {
                    let max = match direction {
                        TradeDirection::Buy => max_buy_quantity(state, &symbol),
                        TradeDirection::Sell => max_sell_quantity(state, &symbol),
                    };
                    if max == 0 {
                        self.orders.pop_front();
                        return Some(Action::BackToStockMarket);
                    }
                    return Some(match direction {
                        TradeDirection::Buy => Action::FillMaxBuy,
                        TradeDirection::Sell => Action::FillMaxSell,
                    });
                }
                self.orders.pop_front();
                Some(match direction {
                    TradeDirection::Buy => Action::BuyStock,
                    TradeDirection::Sell => Action::SellStock,
                })
            }
            Screen::StockMarket => Some(Action::SelectStock(symbol)),
            screen => route(screen, Screen::StockMarket),
        }
    }
}

struct IdlePolicy;

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn next_action(&mut self, state: &GameState) -> Option<Action> {
        route(state.screen, Screen::StockMarket)
    }
}

#[derive(Default)]
struct DividendPolicy {
    marker: DayMarker,
    desk: StockDesk,
}

fn best_yield(state: &GameState) -> Option<&'static str> {
    state
        .current_region()
        .symbols
        .iter()
        .copied()
        .filter_map(|symbol| {
            let quote = state.stocks.quote(symbol)?;
            let ratio = quote.dividend_per_share.as_dollars_f64() / quote.price.as_dollars_f64();
            Some((symbol, ratio))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(symbol, _)| symbol)
}

impl PlayerPolicy for DividendPolicy {
    fn name(&self) -> &'static str {
        "Dividend Collector"
    }

    fn next_action(&mut self, state: &GameState) -> Option<Action> {
        if self.marker.is_new_day(state) {
            self.desk.orders.clear();
            if let Some(symbol) = best_yield(state) {
                self.desk
                    .orders
                    .push_back((symbol.to_string(), TradeDirection::Buy));
            }
        }
        self.desk.next_action(state)
    }
}

#[derive(Default)]
struct TraderPolicy {
    marker: DayMarker,
    desk: StockDesk,
}

const TAKE_PROFIT: f64 = 1.08;
const STOP_LOSS: f64 = 0.85;

impl TraderPolicy {
    fn plan(&mut self, state: &GameState) {
        self.desk.orders.clear();
        let region = state.current_region();
        for (symbol, holding) in &state.stocks.portfolio {
            let Some(quote) = state.stocks.quote(symbol) else {
                continue;
            };
            if !region.lists(symbol) {
                continue;
            }
            let basis = holding.average_cost().as_dollars_f64();
            let price = quote.price.as_dollars_f64();
            if price >= basis * TAKE_PROFIT || price <= basis * STOP_LOSS {
                self.desk
                    .orders
                    .push_back((symbol.clone(), TradeDirection::Sell));
            }
        }
        let dip = region
            .symbols
            .iter()
            .filter_map(|symbol| Some((*symbol, state.stocks.quote(symbol)?.change_pct())))
            .filter(|(_, change)| *change < 0.0)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((symbol, _)) = dip {
            self.desk
                .orders
                .push_back((symbol.to_string(), TradeDirection::Buy));
        }
    }
}

impl PlayerPolicy for TraderPolicy {
    fn name(&self) -> &'static str {
        "Dip Trader"
    }

    fn next_action(&mut self, state: &GameState) -> Option<Action> {
        if self.marker.is_new_day(state) {
            self.plan(state);
        }
        self.desk.next_action(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SmuggleStage {
    Travel,
    Sell,
    Buy,
    Done,
}

/// Cash kept back so a trip is always affordable.
const SMUGGLER_RESERVE: Cents = Cents::from_dollars(600);
const GOOD_PRICE_RATIO: f64 = 0.85;

struct SmugglerPolicy {
    rng: ChaCha20Rng,
    marker: DayMarker,
    stage: SmuggleStage,
    sold_today: Vec<Contraband>,
}

impl SmugglerPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            marker: DayMarker::default(),
            stage: SmuggleStage::Done,
            sold_today: Vec::new(),
        }
    }

    fn price_ratio(item: Contraband, price: Cents) -> f64 {
        let (low, high) = item.base_price_range();
        price.as_dollars_f64() / ((low + high) / 2.0)
    }

    fn travel(&mut self, state: &GameState) -> Option<Action> {
        if state.day % 2 != 0 || state.balance < SMUGGLER_RESERVE.times(2) {
            return None;
        }
        let current = state.current_territory().name;
        let options: Vec<&str> = MAFIA_LOCATIONS
            .iter()
            .map(|location| location.name)
            .filter(|name| *name != current)
            .collect();
        options
            .choose(&mut self.rng)
            .map(|name| Action::Travel((*name).to_string()))
    }

    fn sell(&mut self, state: &GameState) -> Option<Action> {
        if state.contraband.daily.sells >= state.config.daily_sell_limit {
            return None;
        }
        let territory = state.current_territory();
        let item = territory.contraband.iter().copied().find(|item| {
            state.contraband.owned(*item) > 0
                && !self.sold_today.contains(item)
                && state
                    .contraband
                    .price(*item)
                    .is_some_and(|price| Self::price_ratio(*item, price) >= 1.0)
        })?;
        self.sold_today.push(item);
        let quantity = Quantity::new(state.contraband.owned(item)).ok()?;
        Some(Action::TradeContraband {
            item,
            direction: TradeDirection::Sell,
            quantity,
        })
    }

    fn buy(state: &GameState) -> Option<Action> {
        if state.contraband.daily.buys >= state.config.daily_buy_limit {
            return None;
        }
        let (item, price) = state
            .contraband
            .prices
            .iter()
            .map(|(item, price)| (*item, *price))
            .filter(|(item, price)| Self::price_ratio(*item, *price) < GOOD_PRICE_RATIO)
            .min_by(|a, b| {
                Self::price_ratio(a.0, a.1).total_cmp(&Self::price_ratio(b.0, b.1))
            })?;
        let budget = state.balance - SMUGGLER_RESERVE;
        let room = state
            .config
            .contraband_cap
            .saturating_sub(state.contraband.owned(item));
        let quantity = Quantity::new(budget.units_affordable(price).min(room)).ok()?;
        Some(Action::TradeContraband {
            item,
            direction: TradeDirection::Buy,
            quantity,
        })
    }
}

impl PlayerPolicy for SmugglerPolicy {
    fn name(&self) -> &'static str {
        "Smuggler"
    }

    fn next_action(&mut self, state: &GameState) -> Option<Action> {
        if self.marker.is_new_day(state) {
            self.stage = SmuggleStage::Travel;
            self.sold_today.clear();
        }
        if self.stage == SmuggleStage::Done {
            return None;
        }
        if state.screen != Screen::MafiaWars {
            return route(state.screen, Screen::MafiaWars);
        }
        loop {
            let action = match self.stage {
                SmuggleStage::Travel => {
                    self.stage = SmuggleStage::Sell;
                    self.travel(state)
                }
                SmuggleStage::Sell => {
                    let action = self.sell(state);
                    if action.is_none() {
                        self.stage = SmuggleStage::Buy;
                    }
                    action
                }
                SmuggleStage::Buy => {
                    self.stage = SmuggleStage::Done;
                    Self::buy(state)
                }
                SmuggleStage::Done => return None,
            };
            if action.is_some() {
                return action;
            }
        }
    }
}

/// Bankroll kept back from the tables.
const GAMBLER_RESERVE: Cents = Cents::from_dollars(200);

#[derive(Default)]
struct GamblerPolicy {
    marker: DayMarker,
    venue_checked: bool,
    wagered: bool,
}

impl GamblerPolicy {
    /// Most generous venue whose entry cost is a small share of the balance.
    fn better_venue(state: &GameState) -> Option<usize> {
        let best = GAMBLING_VENUES
            .iter()
            .enumerate()
            .filter(|(_, venue)| venue.entry_cost.times(4) <= state.balance)
            .max_by(|a, b| {
                let ev_a = a.1.odds * f64::from(a.1.multiplier);
                let ev_b = b.1.odds * f64::from(b.1.multiplier);
                ev_a.total_cmp(&ev_b)
            })
            .map(|(index, _)| index)?;
        (best != state.wagers.venue_index).then_some(best)
    }

    fn stake(state: &GameState) -> Option<BetAmount> {
        let venue = state.current_venue();
        let quarter = (state.balance - GAMBLER_RESERVE).per_unit(4);
        let stake = quarter.min(venue.max_bet);
        if stake < venue.min_bet {
            return None;
        }
        let dollars = u32::try_from(stake.as_cents() / 100).ok()?;
        BetAmount::from_dollars(dollars).ok()
    }
}

impl PlayerPolicy for GamblerPolicy {
    fn name(&self) -> &'static str {
        "Gambler"
    }

    fn next_action(&mut self, state: &GameState) -> Option<Action> {
        if self.marker.is_new_day(state) {
            self.venue_checked = false;
            self.wagered = false;
        }
        if self.wagered {
            return None;
        }
        if state.screen != Screen::Lottery {
            return route(state.screen, Screen::Lottery);
        }
        if !self.venue_checked {
            self.venue_checked = true;
            if let Some(index) = Self::better_venue(state) {
                return Some(Action::ChangeVenue(index));
            }
        }
        let dice_left = state.wagers.dice_plays_today < state.config.dice_daily_limit;
        if dice_left && state.balance >= GAMBLER_RESERVE + Cents::from_dollars(100) {
            return Some(Action::RollDice);
        }
        self.wagered = true;
        Self::stake(state).map(Action::PlaceWager)
    }
}

/// Rotates sub-policies by day so one run touches every activity.
struct BalancedPolicy {
    rotation: [Box<dyn PlayerPolicy>; 3],
}

impl BalancedPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rotation: [
                Box::new(DividendPolicy::default()),
                Box::new(SmugglerPolicy::new(seed)),
                Box::new(GamblerPolicy::default()),
            ],
        }
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn next_action(&mut self, state: &GameState) -> Option<Action> {
        let slot = usize::try_from(state.day % 3).unwrap_or(0);
        self.rotation[slot].next_action(state)
    }
}
