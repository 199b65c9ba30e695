//! Stock market engine: random-walk quotes, dividends, and a cost-basis
//! portfolio scoped to the current exchange region.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{STOCK_REGIONS, all_symbols};
use crate::constants::{
    REGION_MOVE_FEE, STOCK_DIVIDEND_RATIO, STOCK_INITIAL_PRICE_MAX_DOLLARS,
    STOCK_INITIAL_PRICE_MIN_DOLLARS, STOCK_PRICE_FLOOR, STOCK_VOLATILITY_MAX,
    STOCK_VOLATILITY_MIN,
};
use crate::error::{GameError, GameResult};
use crate::input::Quantity;
use crate::money::{Cents, i64_to_f64};
use crate::state::GameState;
use crate::trade::{TradeDirection, TradeReceipt, ensure_affordable, ensure_capacity, ensure_holdings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub price: Cents,
    pub previous_price: Cents,
    /// Fraction of the price a single day can move in either direction.
    pub volatility: f64,
    pub dividend_per_share: Cents,
}

impl StockQuote {
    #[must_use]
    pub fn change(&self) -> Cents {
        self.price - self.previous_price
    }

    /// Day-over-day change in percent; zero when there is no prior price.
    #[must_use]
    pub fn change_pct(&self) -> f64 {
        if !self.previous_price.is_positive() {
            return 0.0;
        }
        i64_to_f64(self.change().as_cents()) / i64_to_f64(self.previous_price.as_cents()) * 100.0
    }
}

/// Shares held in one symbol. The average cost is derived from the total
/// amount paid so repeated buys never compound rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: u32,
    pub cost_basis: Cents,
}

impl Holding {
    #[must_use]
    pub fn average_cost(&self) -> Cents {
        self.cost_basis.per_unit(self.quantity)
    }

    /// Basis left after selling `sold` shares, prorated by quantity.
    fn basis_after_sale(&self, sold: u32) -> Cents {
        if sold >= self.quantity {
            return Cents::ZERO;
        }
        let remaining = i128::from(self.quantity - sold);
        let prorated = i128::from(self.cost_basis.as_cents()) * remaining
            / i128::from(self.quantity);
        Cents::new(i64::try_from(prorated).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMarket {
    pub quotes: BTreeMap<String, StockQuote>,
    pub portfolio: BTreeMap<String, Holding>,
    pub region_index: usize,
}

impl StockMarket {
    #[must_use]
    pub fn quote(&self, symbol: &str) -> Option<&StockQuote> {
        self.quotes.get(symbol)
    }

    #[must_use]
    pub fn held(&self, symbol: &str) -> u32 {
        self.portfolio.get(symbol).map_or(0, |holding| holding.quantity)
    }

    #[must_use]
    pub fn region_name(&self) -> &'static str {
        STOCK_REGIONS
            .get(self.region_index)
            .map_or(STOCK_REGIONS[0].name, |region| region.name)
    }
}

/// Quote every catalog symbol with a fresh price, dividend, and volatility.
#[must_use]
pub fn initialize_market(rng: &mut impl Rng) -> StockMarket {
    let quotes = all_symbols()
        .map(|symbol| {
            let dollars =
                rng.gen_range(STOCK_INITIAL_PRICE_MIN_DOLLARS..=STOCK_INITIAL_PRICE_MAX_DOLLARS);
            let price = Cents::from_dollars_f64(dollars);
            let quote = StockQuote {
                price,
                previous_price: price,
                volatility: rng.gen_range(STOCK_VOLATILITY_MIN..=STOCK_VOLATILITY_MAX),
                dividend_per_share: price.scale(STOCK_DIVIDEND_RATIO),
            };
            (symbol.to_string(), quote)
        })
        .collect();
    StockMarket {
        quotes,
        portfolio: BTreeMap::new(),
        region_index: 0,
    }
}

/// Move every quote by an independent volatility-scaled step.
pub fn advance_prices(market: &mut StockMarket, rng: &mut impl Rng) {
    for quote in market.quotes.values_mut() {
        quote.previous_price = quote.price;
        let step = quote.volatility * rng.gen_range(-1.0..=1.0);
        let moved = quote.price + quote.price.scale(step);
        quote.price = moved.max(STOCK_PRICE_FLOOR);
    }
}

/// Dividends owed for one day on the current portfolio.
#[must_use]
pub fn accrue_dividends(market: &StockMarket) -> Cents {
    market
        .portfolio
        .iter()
        .filter_map(|(symbol, holding)| {
            market
                .quotes
                .get(symbol)
                .map(|quote| quote.dividend_per_share.times(holding.quantity))
        })
        .sum()
}

fn tradable_quote<'a>(state: &'a GameState, symbol: &str) -> GameResult<&'a StockQuote> {
    let region = state.current_region();
    state
        .stocks
        .quotes
        .get(symbol)
        .filter(|_| region.lists(symbol))
        .ok_or_else(|| GameError::ItemUnavailableAtLocation {
            item: symbol.to_string(),
            location: region.name.to_string(),
        })
}

/// Buy shares at the current price.
///
/// # Errors
///
/// Fails when the game is over, the symbol is not listed in the current
/// region, the balance cannot cover the cost, or the holding would exceed the
/// per-symbol cap.
pub fn buy(state: &mut GameState, symbol: &str, quantity: Quantity) -> GameResult<TradeReceipt> {
    state.ensure_active()?;
    let price = tradable_quote(state, symbol)?.price;
    let receipt = TradeReceipt::new(symbol, TradeDirection::Buy, quantity, price);
    ensure_affordable(state.balance, receipt.total)?;
    let held = ensure_capacity(
        symbol,
        state.stocks.held(symbol),
        quantity,
        state.config.stock_cap,
    )?;

    state.debit(receipt.total);
    let holding = state
        .stocks
        .portfolio
        .entry(symbol.to_string())
        .or_insert(Holding {
            quantity: 0,
            cost_basis: Cents::ZERO,
        });
    holding.quantity = held;
    holding.cost_basis += receipt.total;
    debug!(
        "bought {} {} at {} (holding {})",
        quantity, symbol, price, holding.quantity
    );
    state.journal.success(format!(
        "Bought {quantity} shares of {symbol} for {}.",
        receipt.total
    ));
    Ok(receipt)
}

/// Sell shares at the current price; an emptied holding is removed.
///
/// # Errors
///
/// Fails when the game is over, the symbol is not listed in the current
/// region, or fewer shares are held than requested.
pub fn sell(state: &mut GameState, symbol: &str, quantity: Quantity) -> GameResult<TradeReceipt> {
    state.ensure_active()?;
    let price = tradable_quote(state, symbol)?.price;
    ensure_holdings(symbol, state.stocks.held(symbol), quantity)?;
    let receipt = TradeReceipt::new(symbol, TradeDirection::Sell, quantity, price);

    state.credit(receipt.total);
    let remaining = match state.stocks.portfolio.get_mut(symbol) {
        Some(holding) => {
            holding.cost_basis = holding.basis_after_sale(quantity.get());
            holding.quantity -= quantity.get();
            holding.quantity
        }
        None => 0,
    };
    if remaining == 0 {
        state.stocks.portfolio.remove(symbol);
    }
    debug!("sold {quantity} {symbol} at {price} (holding {remaining})");
    state.journal.success(format!(
        "Sold {quantity} shares of {symbol} for {}.",
        receipt.total
    ));
    Ok(receipt)
}

/// Relocate to another exchange region for a flat fee. The day does not change.
///
/// # Errors
///
/// Fails when the game is over, the index is out of range, the region is
/// already current, or the fee is unaffordable.
pub fn change_region(state: &mut GameState, region_index: usize) -> GameResult<Cents> {
    state.ensure_active()?;
    let region = STOCK_REGIONS
        .get(region_index)
        .ok_or_else(|| GameError::InvalidLocation {
            name: format!("region #{region_index}"),
        })?;
    if region_index == state.stocks.region_index {
        return Err(GameError::AlreadyAtLocation {
            name: region.name.to_string(),
        });
    }
    ensure_affordable(state.balance, REGION_MOVE_FEE)?;

    state.debit(REGION_MOVE_FEE);
    state.stocks.region_index = region_index;
    debug!("moved to region {}", region.name);
    state.journal.info(format!(
        "Moved to {} for {REGION_MOVE_FEE}.",
        region.name
    ));
    Ok(REGION_MOVE_FEE)
}

/// Largest buy that is affordable and stays within the cap.
#[must_use]
pub fn max_buy_quantity(state: &GameState, symbol: &str) -> u32 {
    let Ok(quote) = tradable_quote(state, symbol) else {
        return 0;
    };
    let room = state
        .config
        .stock_cap
        .saturating_sub(state.stocks.held(symbol));
    state.balance.units_affordable(quote.price).min(room)
}

#[must_use]
pub fn max_sell_quantity(state: &GameState, symbol: &str) -> u32 {
    state.stocks.held(symbol)
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

    fn state_with_price(symbol: &str, dollars: i64) -> GameState {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut state = GameState::new(GameConfig::default(), &mut rng);
        let quote = state.stocks.quotes.get_mut(symbol).unwrap();
        quote.price = Cents::from_dollars(dollars);
        quote.previous_price = quote.price;
        state
    }

    fn set_price(state: &mut GameState, symbol: &str, dollars: i64) {
        state.stocks.quotes.get_mut(symbol).unwrap().price = Cents::from_dollars(dollars);
    }

    #[test]
    fn buy_at_u32_ceiling_is_a_cap_error() {
        let mut state = state_with_price("AURAX", 100);
        state.config.stock_cap = u32::MAX;
        state.stocks.portfolio.insert(
            "AURAX".to_string(),
            Holding {
                quantity: u32::MAX,
                cost_basis: Cents::from_dollars(1),
            },
        );
        let before = state.clone();
        assert!(matches!(
            buy(&mut state, "AURAX", qty(1)),
            Err(GameError::InventoryCapExceeded { held: u32::MAX, .. })
        ));
        assert_eq!(state.balance, before.balance);
        assert_eq!(state.stocks, before.stocks);
    }

    #[test]
    fn initial_quotes_fall_in_range() {
        let mut rng = SmallRng::seed_from_u64(1);
        let market = initialize_market(&mut rng);
        assert_eq!(market.quotes.len(), 30);
        for quote in market.quotes.values() {
            assert!(quote.price >= Cents::from_dollars(100));
            assert!(quote.price <= Cents::from_dollars(500));
            assert!((STOCK_VOLATILITY_MIN..=STOCK_VOLATILITY_MAX).contains(&quote.volatility));
            assert_eq!(quote.dividend_per_share, quote.price.scale(0.08));
            assert_eq!(quote.change(), Cents::ZERO);
        }
    }

    #[test]
    fn prices_stay_at_or_above_floor() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut market = initialize_market(&mut rng);
        for quote in market.quotes.values_mut() {
            quote.price = Cents::new(101);
            quote.volatility = 0.35;
        }
        for _ in 0..200 {
            advance_prices(&mut market, &mut rng);
            assert!(market.quotes.values().all(|q| q.price >= STOCK_PRICE_FLOOR));
        }
    }

    #[test]
    fn advance_records_previous_price() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut market = initialize_market(&mut rng);
        let before: Vec<Cents> = market.quotes.values().map(|q| q.price).collect();
        advance_prices(&mut market, &mut rng);
        let previous: Vec<Cents> = market.quotes.values().map(|q| q.previous_price).collect();
        assert_eq!(before, previous);
    }

    #[test]
    fn buy_then_sell_at_higher_price() {
        let mut state = state_with_price("AURAX", 100);
        let receipt = buy(&mut state, "AURAX", qty(2)).unwrap();
        assert_eq!(receipt.total, Cents::from_dollars(200));
        assert_eq!(state.balance, Cents::from_dollars(800));
        let holding = state.stocks.portfolio["AURAX"];
        assert_eq!(holding.quantity, 2);
        assert_eq!(holding.average_cost(), Cents::from_dollars(100));

        set_price(&mut state, "AURAX", 120);
        sell(&mut state, "AURAX", qty(2)).unwrap();
        assert_eq!(state.balance, Cents::from_dollars(1_040));
        assert!(!state.stocks.portfolio.contains_key("AURAX"));
    }

    #[test]
    fn round_trip_at_constant_price_is_neutral() {
        let mut state = state_with_price("CYBRP", 137);
        let start = state.balance;
        buy(&mut state, "CYBRP", qty(5)).unwrap();
        sell(&mut state, "CYBRP", qty(5)).unwrap();
        assert_eq!(state.balance, start);
    }

    #[test]
    fn average_cost_is_weighted() {
        let mut state = state_with_price("ENRGY", 100);
        state.balance = Cents::from_dollars(10_000);
        buy(&mut state, "ENRGY", qty(2)).unwrap();
        set_price(&mut state, "ENRGY", 130);
        buy(&mut state, "ENRGY", qty(1)).unwrap();
        let holding = state.stocks.portfolio["ENRGY"];
        assert_eq!(holding.quantity, 3);
        assert_eq!(holding.average_cost(), Cents::from_dollars(110));

        sell(&mut state, "ENRGY", qty(1)).unwrap();
        let holding = state.stocks.portfolio["ENRGY"];
        assert_eq!(holding.quantity, 2);
        assert_eq!(holding.average_cost(), Cents::from_dollars(110));
    }

    #[test]
    fn failed_buys_leave_state_untouched() {
        let mut state = state_with_price("FINCO", 400);
        let before = state.clone();
        assert!(matches!(
            buy(&mut state, "FINCO", qty(3)),
            Err(GameError::InsufficientFunds { .. })
        ));
        assert_eq!(state, before);

        state.balance = Cents::from_dollars(1_000_000);
        state.stocks.portfolio.insert(
            "FINCO".into(),
            Holding {
                quantity: 29,
                cost_basis: Cents::from_dollars(29 * 400),
            },
        );
        let before = state.clone();
        assert!(matches!(
            buy(&mut state, "FINCO", qty(2)),
            Err(GameError::InventoryCapExceeded { cap: 30, held: 29, .. })
        ));
        assert_eq!(state, before);
        buy(&mut state, "FINCO", qty(1)).unwrap();
        assert_eq!(state.stocks.held("FINCO"), 30);
    }

    #[test]
    fn selling_more_than_held_fails() {
        let mut state = state_with_price("HYGEN", 100);
        buy(&mut state, "HYGEN", qty(1)).unwrap();
        assert_eq!(
            sell(&mut state, "HYGEN", qty(2)),
            Err(GameError::InsufficientHoldings {
                item: "HYGEN".into(),
                requested: 2,
                owned: 1,
            })
        );
    }

    #[test]
    fn trading_is_scoped_to_region() {
        let mut state = state_with_price("QUANT", 100);
        assert_eq!(
            buy(&mut state, "QUANT", qty(1)),
            Err(GameError::ItemUnavailableAtLocation {
                item: "QUANT".into(),
                location: "Global Exchange".into(),
            })
        );
        assert!(matches!(
            buy(&mut state, "NOPE", qty(1)),
            Err(GameError::ItemUnavailableAtLocation { .. })
        ));
        change_region(&mut state, 1).unwrap();
        assert!(buy(&mut state, "QUANT", qty(1)).is_ok());
    }

    #[test]
    fn region_move_charges_fee_without_advancing_day() {
        let mut state = state_with_price("AURAX", 100);
        assert_eq!(change_region(&mut state, 3), Ok(Cents::from_dollars(50)));
        assert_eq!(state.balance, Cents::from_dollars(950));
        assert_eq!(state.day, 1);
        assert_eq!(state.stocks.region_name(), "European Financial Core");
        assert!(matches!(
            change_region(&mut state, 3),
            Err(GameError::AlreadyAtLocation { .. })
        ));
        assert!(matches!(
            change_region(&mut state, 6),
            Err(GameError::InvalidLocation { .. })
        ));
        state.balance = Cents::from_dollars(49);
        assert!(matches!(
            change_region(&mut state, 0),
            Err(GameError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn dividends_sum_over_holdings() {
        let mut state = state_with_price("AURAX", 100);
        assert_eq!(accrue_dividends(&state.stocks), Cents::ZERO);
        buy(&mut state, "AURAX", qty(3)).unwrap();
        let per_share = state.stocks.quotes["AURAX"].dividend_per_share;
        assert_eq!(accrue_dividends(&state.stocks), per_share.times(3));
    }

    #[test]
    fn max_quantities_respect_funds_and_cap() {
        let mut state = state_with_price("AURAX", 300);
        assert_eq!(max_buy_quantity(&state, "AURAX"), 3);
        state.balance = Cents::from_dollars(1_000_000);
        assert_eq!(max_buy_quantity(&state, "AURAX"), 30);
        buy(&mut state, "AURAX", qty(10)).unwrap();
        assert_eq!(max_buy_quantity(&state, "AURAX"), 20);
        assert_eq!(max_sell_quantity(&state, "AURAX"), 10);
        assert_eq!(max_buy_quantity(&state, "QUANT"), 0);
    }
}
