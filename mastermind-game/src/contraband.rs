//! Contraband market: territory-dependent pricing, capped inventory, daily
//! trade quotas, and the random events that follow travel.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{
    Contraband, MAFIA_LOCATIONS, MafiaLocation, STARTING_MAFIA_LOCATION, mafia_location_index,
    travel_cost_bounds,
};
use crate::constants::{
    AMBUSH_CONFISCATE_CHANCE, AMBUSH_CONFISCATE_MAX, AMBUSH_LOSS_DOLLARS,
    CONTRABAND_FLUCTUATION_MAX, CONTRABAND_FLUCTUATION_MIN, CONTRABAND_PRICE_FLOOR,
    CONTRABAND_VOLATILITY_MAX, CONTRABAND_VOLATILITY_MIN, EXPENSES_DOLLARS,
    GOOD_DEAL_PRICE_FLOOR, GOOD_DEAL_RATIO_MAX, GOOD_DEAL_RATIO_MIN, TRAVEL_EVENT_CHANCE,
};
use crate::error::{GameError, GameResult};
use crate::input::Quantity;
use crate::money::{Cents, i64_to_f64};
use crate::screen::Screen;
use crate::state::GameState;
use crate::trade::{TradeDirection, TradeReceipt, ensure_affordable, ensure_capacity, ensure_holdings};

/// Buys and sells made since the last day change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTrades {
    pub buys: u32,
    pub sells: u32,
}

impl DailyTrades {
    #[must_use]
    pub const fn count(&self, direction: TradeDirection) -> u32 {
        match direction {
            TradeDirection::Buy => self.buys,
            TradeDirection::Sell => self.sells,
        }
    }

    const fn record(&mut self, direction: TradeDirection) {
        match direction {
            TradeDirection::Buy => self.buys += 1,
            TradeDirection::Sell => self.sells += 1,
        }
    }

    pub const fn reset(&mut self) {
        self.buys = 0;
        self.sells = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContrabandMarket {
    pub location_index: usize,
    /// Prices for the items sold in the current territory only.
    pub prices: BTreeMap<Contraband, Cents>,
    /// Owned units of every item, including ones not sold here.
    pub inventory: BTreeMap<Contraband, u32>,
    #[serde(default)]
    pub daily: DailyTrades,
    /// Host clock of the last price regeneration.
    #[serde(default)]
    pub last_refresh_ms: u64,
}

impl ContrabandMarket {
    #[must_use]
    pub fn location(&self) -> &'static MafiaLocation {
        MAFIA_LOCATIONS
            .get(self.location_index)
            .unwrap_or(&MAFIA_LOCATIONS[0])
    }

    #[must_use]
    pub fn owned(&self, item: Contraband) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn price(&self, item: Contraband) -> Option<Cents> {
        self.prices.get(&item).copied()
    }
}

/// What happened on the road after a successful trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TravelEvent {
    Ambush {
        loss: Cents,
        seized: Option<(Contraband, u32)>,
    },
    GoodDeal {
        item: Contraband,
        old_price: Cents,
        new_price: Cents,
    },
    Expenses {
        amount: Cents,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelReport {
    pub destination: String,
    pub cost: Cents,
    pub event: Option<TravelEvent>,
}

/// Start in the default territory with an empty inventory of every item.
#[must_use]
pub fn initialize_market(rng: &mut impl Rng) -> ContrabandMarket {
    let location_index = mafia_location_index(STARTING_MAFIA_LOCATION).unwrap_or(0);
    let location = &MAFIA_LOCATIONS[location_index.min(MAFIA_LOCATIONS.len() - 1)];
    ContrabandMarket {
        location_index,
        prices: generate_prices(location, rng),
        inventory: Contraband::ALL.iter().map(|item| (*item, 0)).collect(),
        daily: DailyTrades::default(),
        last_refresh_ms: 0,
    }
}

/// Volatility band for a territory: pricier trips mean wilder prices.
#[must_use]
pub fn location_volatility(location: &MafiaLocation) -> f64 {
    let (min, max) = travel_cost_bounds();
    let span = (max - min).as_cents();
    let normalized = if span == 0 {
        0.0
    } else {
        i64_to_f64((location.travel_cost - min).as_cents()) / i64_to_f64(span)
    };
    CONTRABAND_VOLATILITY_MIN + normalized * (CONTRABAND_VOLATILITY_MAX - CONTRABAND_VOLATILITY_MIN)
}

fn fluctuation_factor(volatility: f64) -> f64 {
    let t = (volatility - CONTRABAND_VOLATILITY_MIN)
        / (CONTRABAND_VOLATILITY_MAX - CONTRABAND_VOLATILITY_MIN);
    CONTRABAND_FLUCTUATION_MIN + t * (CONTRABAND_FLUCTUATION_MAX - CONTRABAND_FLUCTUATION_MIN)
}

/// Fresh prices, to the cent, for the items sold at `location`.
#[must_use]
pub fn generate_prices(location: &MafiaLocation, rng: &mut impl Rng) -> BTreeMap<Contraband, Cents> {
    let volatility = location_volatility(location);
    let spread = volatility * fluctuation_factor(volatility);
    location
        .contraband
        .iter()
        .map(|item| {
            let (low, high) = item.base_price_range();
            let base = rng.gen_range(low..=high);
            let change = base * rng.gen_range(-spread..=spread);
            let price = Cents::from_dollars_f64(base + change);
            (*item, price.max(CONTRABAND_PRICE_FLOOR))
        })
        .collect()
}

/// Regenerate the current territory's prices and restart the refresh timer.
pub fn refresh_prices(state: &mut GameState, rng: &mut impl Rng) {
    let location = state.contraband.location();
    state.contraband.prices = generate_prices(location, rng);
    state.contraband.last_refresh_ms = state.journal.clock_ms();
    state
        .journal
        .info(format!("Contraband prices updated in {}.", location.name));
}

/// Polled timer: refresh prices while the mafia screen is open and the
/// interval has elapsed. Returns whether a refresh happened.
pub fn refresh_if_due(state: &mut GameState, rng: &mut impl Rng, now_ms: u64) -> bool {
    if state.is_finished() || state.screen != Screen::MafiaWars {
        return false;
    }
    let elapsed = now_ms.saturating_sub(state.contraband.last_refresh_ms);
    if elapsed < state.config.price_refresh_interval_ms {
        return false;
    }
    refresh_prices(state, rng);
    state.contraband.last_refresh_ms = now_ms;
    debug!("contraband prices refreshed after {elapsed}ms");
    true
}

/// Buy or sell contraband in the current territory.
///
/// # Errors
///
/// Checks run in order: game over, daily quota for the direction, item sold
/// here, then funds and cap for buys or holdings for sells.
pub fn trade(
    state: &mut GameState,
    item: Contraband,
    direction: TradeDirection,
    quantity: Quantity,
) -> GameResult<TradeReceipt> {
    state.ensure_active()?;
    let limit = match direction {
        TradeDirection::Buy => state.config.daily_buy_limit,
        TradeDirection::Sell => state.config.daily_sell_limit,
    };
    if state.contraband.daily.count(direction) >= limit {
        return Err(GameError::DailyLimitReached {
            activity: direction.key(),
            limit,
        });
    }
    let location = state.contraband.location();
    let price = state
        .contraband
        .price(item)
        .filter(|_| location.trades(item))
        .ok_or_else(|| GameError::ItemUnavailableAtLocation {
            item: item.name().to_string(),
            location: location.name.to_string(),
        })?;
    let receipt = TradeReceipt::new(item.name(), direction, quantity, price);
    let owned = state.contraband.owned(item);
    match direction {
        TradeDirection::Buy => {
            ensure_affordable(state.balance, receipt.total)?;
            let held = ensure_capacity(item.name(), owned, quantity, state.config.contraband_cap)?;
            state.debit(receipt.total);
            state.contraband.inventory.insert(item, held);
            state.journal.success(format!(
                "Bought {quantity} {item} for {}.",
                receipt.total
            ));
        }
        TradeDirection::Sell => {
            ensure_holdings(item.name(), owned, quantity)?;
            state.credit(receipt.total);
            state
                .contraband
                .inventory
                .insert(item, owned - quantity.get());
            state
                .journal
                .success(format!("Sold {quantity} {item} for {}.", receipt.total));
        }
    }
    state.contraband.daily.record(direction);
    debug!(
        "{direction} {quantity} {item} at {price} in {} ({} today)",
        location.name,
        state.contraband.daily.count(direction)
    );
    Ok(receipt)
}

/// # Errors
///
/// See [`trade`].
pub fn buy_item(state: &mut GameState, item: Contraband, quantity: Quantity) -> GameResult<TradeReceipt> {
    trade(state, item, TradeDirection::Buy, quantity)
}

/// # Errors
///
/// See [`trade`].
pub fn sell_item(state: &mut GameState, item: Contraband, quantity: Quantity) -> GameResult<TradeReceipt> {
    trade(state, item, TradeDirection::Sell, quantity)
}

/// Pay for a trip, move, regenerate prices, then roll for a road event.
/// Daily quotas are not reset and the day does not change.
///
/// # Errors
///
/// Fails when the game is over, the destination is unknown or current, or
/// the fare is unaffordable.
pub fn travel(state: &mut GameState, destination: &str, rng: &mut impl Rng) -> GameResult<TravelReport> {
    state.ensure_active()?;
    let index = mafia_location_index(destination).ok_or_else(|| GameError::InvalidLocation {
        name: destination.to_string(),
    })?;
    let location = &MAFIA_LOCATIONS[index];
    if index == state.contraband.location_index {
        return Err(GameError::AlreadyAtLocation {
            name: location.name.to_string(),
        });
    }
    ensure_affordable(state.balance, location.travel_cost)?;

    state.debit(location.travel_cost);
    state.contraband.location_index = index;
    state
        .journal
        .info(format!("Traveled to {} for {}.", location.name, location.travel_cost));
    refresh_prices(state, rng);
    let event = roll_random_event(state, rng);
    debug!("traveled to {} (event: {event:?})", location.name);
    Ok(TravelReport {
        destination: location.name.to_string(),
        cost: location.travel_cost,
        event,
    })
}

/// One in five trips triggers an ambush, a good deal, or expenses.
pub fn roll_random_event(state: &mut GameState, rng: &mut impl Rng) -> Option<TravelEvent> {
    if !rng.gen_bool(TRAVEL_EVENT_CHANCE) {
        return None;
    }
    let event = match rng.gen_range(0..3) {
        0 => ambush(state, rng),
        1 => good_deal(state, rng)?,
        _ => {
            let amount = Cents::from_dollars(rng.gen_range(EXPENSES_DOLLARS.0..EXPENSES_DOLLARS.1));
            state.debit(amount);
            state
                .journal
                .warning(format!("Unexpected expenses cost you {amount}."));
            TravelEvent::Expenses { amount }
        }
    };
    Some(event)
}

fn ambush(state: &mut GameState, rng: &mut impl Rng) -> TravelEvent {
    let loss = Cents::from_dollars(rng.gen_range(AMBUSH_LOSS_DOLLARS.0..AMBUSH_LOSS_DOLLARS.1));
    state.debit(loss);
    state
        .journal
        .critical(format!("Ambushed by a rival gang! You lost {loss}."));

    let mut seized = None;
    if rng.gen_bool(AMBUSH_CONFISCATE_CHANCE) {
        let candidates: Vec<Contraband> = state
            .contraband
            .location()
            .contraband
            .iter()
            .copied()
            .filter(|item| state.contraband.owned(*item) > 0)
            .collect();
        if let Some(item) = candidates.choose(rng).copied() {
            let owned = state.contraband.owned(item);
            let amount = rng.gen_range(1..=owned.min(AMBUSH_CONFISCATE_MAX));
            state.contraband.inventory.insert(item, owned - amount);
            state
                .journal
                .critical(format!("They seized {amount} {item}."));
            seized = Some((item, amount));
        }
    }
    TravelEvent::Ambush { loss, seized }
}

fn good_deal(state: &mut GameState, rng: &mut impl Rng) -> Option<TravelEvent> {
    let item = state.contraband.location().contraband.choose(rng).copied()?;
    let old_price = state.contraband.price(item)?;
    let ratio = rng.gen_range(GOOD_DEAL_RATIO_MIN..GOOD_DEAL_RATIO_MAX);
    let new_price = old_price.scale(ratio).max(GOOD_DEAL_PRICE_FLOOR);
    state.contraband.prices.insert(item, new_price);
    state
        .journal
        .success(format!("Good deal! {item} is down to {new_price}."));
    Some(TravelEvent::GoodDeal {
        item,
        old_price,
        new_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn qty(value: u32) -> Quantity {
        Quantity::new(value).unwrap()
    }

    fn rich_state() -> GameState {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut state = GameState::new(GameConfig::default(), &mut rng);
        state.balance = Cents::from_dollars(1_000_000);
        state.contraband.prices.insert(Contraband::BlissDust, Cents::from_dollars(100));
        state
    }

    #[test]
    fn buy_at_u32_ceiling_is_a_cap_error() {
        let mut state = rich_state();
        state.config.contraband_cap = u32::MAX;
        state.contraband.inventory.insert(Contraband::BlissDust, u32::MAX);
        let result = trade(&mut state, Contraband::BlissDust, TradeDirection::Buy, qty(1));
        assert!(matches!(
            result,
            Err(GameError::InventoryCapExceeded { held: u32::MAX, .. })
        ));
        assert_eq!(state.contraband.owned(Contraband::BlissDust), u32::MAX);
        assert_eq!(state.balance, Cents::from_dollars(1_000_000));
        assert_eq!(state.contraband.daily.buys, 0);
    }

    #[test]
    fn volatility_scales_with_travel_cost() {
        let cheapest = MAFIA_LOCATIONS.iter().find(|l| l.name == "Denver").unwrap();
        let priciest = MAFIA_LOCATIONS.iter().find(|l| l.name == "New York").unwrap();
        assert!((location_volatility(cheapest) - CONTRABAND_VOLATILITY_MIN).abs() < 1e-9);
        assert!((location_volatility(priciest) - CONTRABAND_VOLATILITY_MAX).abs() < 1e-9);
        assert!((fluctuation_factor(CONTRABAND_VOLATILITY_MAX) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn generated_prices_cover_location_and_respect_floor() {
        let mut rng = SmallRng::seed_from_u64(12);
        let mut with_cents = 0;
        for location in &MAFIA_LOCATIONS {
            for _ in 0..50 {
                let prices = generate_prices(location, &mut rng);
                assert_eq!(prices.len(), location.contraband.len());
                for (item, price) in &prices {
                    assert!(location.trades(*item));
                    assert!(*price >= CONTRABAND_PRICE_FLOOR);
                    if price.as_cents() % 100 != 0 {
                        with_cents += 1;
                    }
                }
            }
        }
        assert!(with_cents > 0, "prices never carried cents");
    }

    #[test]
    fn inventory_starts_with_every_item() {
        let mut rng = SmallRng::seed_from_u64(13);
        let market = initialize_market(&mut rng);
        assert_eq!(market.location().name, "Denver");
        assert_eq!(market.inventory.len(), Contraband::ALL.len());
        assert!(market.inventory.values().all(|owned| *owned == 0));
    }

    #[test]
    fn fourth_buy_of_the_day_is_refused() {
        let mut state = rich_state();
        for _ in 0..3 {
            buy_item(&mut state, Contraband::BlissDust, qty(1)).unwrap();
        }
        assert_eq!(
            buy_item(&mut state, Contraband::BlissDust, qty(1)),
            Err(GameError::DailyLimitReached {
                activity: "buy",
                limit: 3,
            })
        );
        assert_eq!(state.contraband.daily.buys, 3);
        sell_item(&mut state, Contraband::BlissDust, qty(1)).unwrap();
        assert_eq!(state.contraband.daily.sells, 1);
    }

    #[test]
    fn buy_and_sell_move_money_and_units() {
        let mut state = rich_state();
        let start = state.balance;
        buy_item(&mut state, Contraband::BlissDust, qty(4)).unwrap();
        assert_eq!(state.balance, start - Cents::from_dollars(400));
        assert_eq!(state.contraband.owned(Contraband::BlissDust), 4);
        sell_item(&mut state, Contraband::BlissDust, qty(4)).unwrap();
        assert_eq!(state.balance, start);
        assert_eq!(state.contraband.owned(Contraband::BlissDust), 0);
    }

    #[test]
    fn cap_holdings_and_location_are_enforced() {
        let mut state = rich_state();
        state.contraband.inventory.insert(Contraband::BlissDust, 28);
        let before = state.clone();
        assert!(matches!(
            buy_item(&mut state, Contraband::BlissDust, qty(3)),
            Err(GameError::InventoryCapExceeded { cap: 30, .. })
        ));
        assert_eq!(state, before);
        assert!(matches!(
            sell_item(&mut state, Contraband::StarlightShard, qty(1)),
            Err(GameError::InsufficientHoldings { owned: 0, .. })
        ));
        assert_eq!(
            buy_item(&mut state, Contraband::OceanEcho, qty(1)),
            Err(GameError::ItemUnavailableAtLocation {
                item: "Ocean Echo".into(),
                location: "Denver".into(),
            })
        );
        state.balance = Cents::from_dollars(50);
        assert!(matches!(
            buy_item(&mut state, Contraband::BlissDust, qty(1)),
            Err(GameError::InsufficientFunds { .. })
        ));
        assert_eq!(state.contraband.daily, DailyTrades::default());
    }

    #[test]
    fn travel_debits_moves_and_keeps_quotas() {
        let mut state = rich_state();
        let mut rng = SmallRng::seed_from_u64(14);
        buy_item(&mut state, Contraband::BlissDust, qty(1)).unwrap();
        let before = state.balance;
        let report = travel(&mut state, "chicago", &mut rng).unwrap();
        assert_eq!(report.destination, "Chicago");
        assert_eq!(report.cost, Cents::from_dollars(300));
        assert_eq!(state.current_territory().name, "Chicago");
        assert_eq!(state.contraband.daily.buys, 1);
        assert_eq!(state.day, 1);
        assert!(state.contraband.prices.keys().all(|item| state.current_territory().trades(*item)));
        if report.event.is_none() {
            assert_eq!(state.balance, before - Cents::from_dollars(300));
        }
    }

    #[test]
    fn travel_rejections() {
        let mut state = rich_state();
        let mut rng = SmallRng::seed_from_u64(15);
        assert_eq!(
            travel(&mut state, "Denver", &mut rng),
            Err(GameError::AlreadyAtLocation {
                name: "Denver".into()
            })
        );
        assert!(matches!(
            travel(&mut state, "Atlantis", &mut rng),
            Err(GameError::InvalidLocation { .. })
        ));
        state.balance = Cents::from_dollars(499);
        assert_eq!(
            travel(&mut state, "New York", &mut rng),
            Err(GameError::InsufficientFunds {
                required: Cents::from_dollars(500),
                available: Cents::from_dollars(499),
            })
        );
        assert_eq!(state.current_territory().name, "Denver");
    }

    #[test]
    fn random_events_stay_local() {
        let mut rng = SmallRng::seed_from_u64(16);
        let mut saw_event = 0;
        for _ in 0..400 {
            let mut state = rich_state();
            state.contraband.inventory.insert(Contraband::BlissDust, 10);
            let balance = state.balance;
            let prices = state.contraband.prices.clone();
            match roll_random_event(&mut state, &mut rng) {
                None => {
                    assert_eq!(state.balance, balance);
                    assert_eq!(state.contraband.prices, prices);
                }
                Some(TravelEvent::Ambush { loss, seized }) => {
                    saw_event += 1;
                    assert!(loss >= Cents::from_dollars(100) && loss < Cents::from_dollars(500));
                    assert_eq!(state.balance, balance - loss);
                    if let Some((item, amount)) = seized {
                        assert_eq!(item, Contraband::BlissDust);
                        assert!((1..=5).contains(&amount));
                        assert_eq!(state.contraband.owned(item), 10 - amount);
                    }
                }
                Some(TravelEvent::GoodDeal {
                    item,
                    old_price,
                    new_price,
                }) => {
                    saw_event += 1;
                    assert_eq!(state.balance, balance);
                    assert!(new_price < old_price || new_price == GOOD_DEAL_PRICE_FLOOR);
                    let changed = prices
                        .iter()
                        .filter(|(key, value)| state.contraband.prices[*key] != **value)
                        .count();
                    assert!(changed <= 1);
                    assert_eq!(state.contraband.prices[&item], new_price);
                }
                Some(TravelEvent::Expenses { amount }) => {
                    saw_event += 1;
                    assert!(amount >= Cents::from_dollars(50) && amount < Cents::from_dollars(300));
                    assert_eq!(state.balance, balance - amount);
                }
            }
        }
        assert!(saw_event > 0);
    }

    #[test]
    fn refresh_timer_only_runs_on_mafia_screen() {
        let mut state = rich_state();
        let mut rng = SmallRng::seed_from_u64(17);
        assert!(!refresh_if_due(&mut state, &mut rng, 60_000));
        state.screen = Screen::MafiaWars;
        state.journal.set_clock(60_000);
        assert!(refresh_if_due(&mut state, &mut rng, 60_000));
        assert_eq!(state.contraband.last_refresh_ms, 60_000);
        assert!(!refresh_if_due(&mut state, &mut rng, 70_000));
        assert!(refresh_if_due(&mut state, &mut rng, 75_000));
        assert_eq!(state.contraband.last_refresh_ms, 75_000);
        assert!(state.journal.mentions("Contraband prices updated in Denver."));
    }
}
