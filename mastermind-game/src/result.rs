use serde::{Deserialize, Serialize};

use crate::money::Cents;
use crate::screen::Screen;
use crate::state::GameState;
use crate::wallet::net_worth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    Victory,
    OutOfTime,
}

impl Ending {
    #[must_use]
    pub const fn screen(self) -> Screen {
        match self {
            Self::Victory => Screen::WinScreen,
            Self::OutOfTime => Screen::LoseScreen,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Victory => "victory",
            Self::OutOfTime => "out_of_time",
        }
    }
}

/// What a terminal screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub ending: Ending,
    pub final_balance: Cents,
    pub days_played: u32,
    pub money_goal: Cents,
    pub net_worth: Cents,
}

/// Summary of a finished game, `None` while it is still running.
#[must_use]
pub fn result_summary(state: &GameState) -> Option<ResultSummary> {
    let ending = state.ending?;
    Some(ResultSummary {
        ending,
        final_balance: state.balance,
        days_played: state.day,
        money_goal: state.config.money_goal,
        net_worth: net_worth(state),
    })
}
