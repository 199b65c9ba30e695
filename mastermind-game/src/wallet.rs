//! Read-only portfolio and net-worth projections.
use serde::{Deserialize, Serialize};

use crate::money::Cents;
use crate::state::GameState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRow {
    pub symbol: String,
    pub quantity: u32,
    pub average_cost: Cents,
    pub price: Cents,
    pub market_value: Cents,
    pub unrealized: Cents,
    pub daily_dividend: Cents,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletView {
    pub rows: Vec<WalletRow>,
    pub market_value: Cents,
    pub cost_basis: Cents,
    pub unrealized: Cents,
    pub daily_dividend: Cents,
}

#[must_use]
pub fn wallet_view(state: &GameState) -> WalletView {
    let mut view = WalletView::default();
    for (symbol, holding) in &state.stocks.portfolio {
        let Some(quote) = state.stocks.quote(symbol) else {
            continue;
        };
        let market_value = quote.price.times(holding.quantity);
        let row = WalletRow {
            symbol: symbol.clone(),
            quantity: holding.quantity,
            average_cost: holding.average_cost(),
            price: quote.price,
            market_value,
            unrealized: market_value - holding.cost_basis,
            daily_dividend: quote.dividend_per_share.times(holding.quantity),
        };
        view.market_value += row.market_value;
        view.cost_basis += holding.cost_basis;
        view.unrealized += row.unrealized;
        view.daily_dividend += row.daily_dividend;
        view.rows.push(row);
    }
    view
}

/// Owned contraband valued at the current territory's quotes. Items not
/// quoted here count as zero.
#[must_use]
pub fn contraband_value(state: &GameState) -> Cents {
    state
        .contraband
        .inventory
        .iter()
        .filter_map(|(item, owned)| {
            state
                .contraband
                .price(*item)
                .map(|price| price.times(*owned))
        })
        .sum()
}

#[must_use]
pub fn net_worth(state: &GameState) -> Cents {
    state.balance + wallet_view(state).market_value + contraband_value(state)
}
