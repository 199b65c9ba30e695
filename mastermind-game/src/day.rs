//! Day controller: the only place the calendar moves.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::contraband;
use crate::money::Cents;
use crate::result::Ending;
use crate::screen::enter_screen;
use crate::state::GameState;
use crate::stocks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    /// Day number after the advance.
    pub day: u32,
    pub dividends: Cents,
    pub ending: Option<Ending>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayOutcome {
    Advanced(DayReport),
    /// The game already ended; nothing changed.
    Halted,
}

/// Advance one day: reset quotas, pay dividends, move stock prices, reprice
/// contraband, then check the goal before the deadline.
pub fn advance_day(state: &mut GameState, rng: &mut impl Rng) -> DayOutcome {
    if state.is_finished() {
        return DayOutcome::Halted;
    }

    state.day = state.day.saturating_add(1);
    state.contraband.daily.reset();
    state.wagers.dice_plays_today = 0;

    let dividends = stocks::accrue_dividends(&state.stocks);
    if dividends.is_positive() {
        state.credit(dividends);
        state
            .journal
            .success(format!("Received {dividends} in dividends!"));
    }
    stocks::advance_prices(&mut state.stocks, rng);
    contraband::refresh_prices(state, rng);
    state.journal.info(format!("Advanced to Day {}.", state.day));
    debug!(
        "day {} begins: balance {}, dividends {}",
        state.day, state.balance, dividends
    );

    let ending = evaluate_ending(state);
    if let Some(ending) = ending {
        finish(state, ending);
    }
    DayOutcome::Advanced(DayReport {
        day: state.day,
        dividends,
        ending,
    })
}

/// Goal first: reaching it on the final day is still a win.
fn evaluate_ending(state: &GameState) -> Option<Ending> {
    if state.balance >= state.config.money_goal {
        Some(Ending::Victory)
    } else if state.day >= state.config.day_limit {
        Some(Ending::OutOfTime)
    } else {
        None
    }
}

fn finish(state: &mut GameState, ending: Ending) {
    state.ending = Some(ending);
    state.selection = Default::default();
    enter_screen(state, ending.screen());
    match ending {
        Ending::Victory => {
            info!("goal reached on day {} with {}", state.day, state.balance);
            state.journal.success(format!(
                "You reached {} on day {}. You win!",
                state.config.money_goal, state.day
            ));
        }
        Ending::OutOfTime => {
            info!("day limit reached with {}", state.balance);
            state.journal.critical(format!(
                "Day {} has come and gone with {} in the bank. Game over.",
                state.day, state.balance
            ));
        }
    }
}
