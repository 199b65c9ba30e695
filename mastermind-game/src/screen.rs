//! Screens, the actions an input layer can produce, and which screen offers
//! which action.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::Contraband;
use crate::input::{BetAmount, Quantity};
use crate::state::GameState;
use crate::trade::TradeDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    #[default]
    MainMenu,
    StockMarket,
    BuySellStock,
    MoveRegion,
    Wallet,
    MafiaWars,
    Lottery,
    WinScreen,
    LoseScreen,
}

impl Screen {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MainMenu => "main menu",
            Self::StockMarket => "stock market",
            Self::BuySellStock => "buy/sell",
            Self::MoveRegion => "move region",
            Self::Wallet => "wallet",
            Self::MafiaWars => "mafia wars",
            Self::Lottery => "lottery",
            Self::WinScreen => "victory",
            Self::LoseScreen => "game over",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::WinScreen | Self::LoseScreen)
    }

    /// Whether this screen offers `action`.
    #[must_use]
    pub const fn allows(self, action: &Action) -> bool {
        use Action as A;
        match self {
            Self::MainMenu => matches!(
                action,
                A::OpenStockMarket | A::OpenMafiaWars | A::OpenLottery | A::NewGame
            ),
            Self::StockMarket => matches!(
                action,
                A::AdvanceDay
                    | A::OpenMoveRegion
                    | A::OpenWallet
                    | A::SelectStock(_)
                    | A::BackToMainMenu
            ),
            Self::BuySellStock => matches!(
                action,
                A::SetQuantity(_)
                    | A::FillMaxBuy
                    | A::FillMaxSell
                    | A::BuyStock
                    | A::SellStock
                    | A::BackToStockMarket
            ),
            Self::MoveRegion => matches!(action, A::ChangeRegion(_) | A::BackToStockMarket),
            Self::Wallet => matches!(action, A::BackToStockMarket),
            Self::MafiaWars => matches!(
                action,
                A::AdvanceDay | A::Travel(_) | A::TradeContraband { .. } | A::BackToMainMenu
            ),
            Self::Lottery => matches!(
                action,
                A::AdvanceDay
                    | A::ChangeVenue(_)
                    | A::PlaceWager(_)
                    | A::RollDice
                    | A::BackToMainMenu
            ),
            Self::WinScreen | Self::LoseScreen => matches!(action, A::PlayAgain),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A discrete player intent, already validated at the input boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "args", rename_all = "snake_case")]
pub enum Action {
    OpenStockMarket,
    OpenMafiaWars,
    OpenLottery,
    NewGame,
    AdvanceDay,
    OpenMoveRegion,
    OpenWallet,
    SelectStock(String),
    BackToMainMenu,
    SetQuantity(Quantity),
    FillMaxBuy,
    FillMaxSell,
    BuyStock,
    SellStock,
    BackToStockMarket,
    ChangeRegion(usize),
    Travel(String),
    TradeContraband {
        item: Contraband,
        direction: TradeDirection,
        quantity: Quantity,
    },
    ChangeVenue(usize),
    PlaceWager(BetAmount),
    RollDice,
    PlayAgain,
}

impl Action {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OpenStockMarket => "open stock market",
            Self::OpenMafiaWars => "open mafia wars",
            Self::OpenLottery => "open lottery",
            Self::NewGame => "new game",
            Self::AdvanceDay => "advance day",
            Self::OpenMoveRegion => "move region",
            Self::OpenWallet => "open wallet",
            Self::SelectStock(_) => "select stock",
            Self::BackToMainMenu => "back to main menu",
            Self::SetQuantity(_) => "set quantity",
            Self::FillMaxBuy => "max buy",
            Self::FillMaxSell => "max sell",
            Self::BuyStock => "buy stock",
            Self::SellStock => "sell stock",
            Self::BackToStockMarket => "back to stock market",
            Self::ChangeRegion(_) => "change region",
            Self::Travel(_) => "travel",
            Self::TradeContraband { .. } => "trade contraband",
            Self::ChangeVenue(_) => "change venue",
            Self::PlaceWager(_) => "place wager",
            Self::RollDice => "roll dice",
            Self::PlayAgain => "play again",
        }
    }
}

/// Switch screens and post the greeting for the new one. Opening the mafia
/// screen restarts the price refresh timer.
pub fn enter_screen(state: &mut GameState, screen: Screen) {
    state.screen = screen;
    let message = match screen {
        Screen::StockMarket => format!("Entering {}...", state.current_region().name),
        Screen::BuySellStock => match &state.selection.stock {
            Some(symbol) => format!("Trading {symbol}."),
            None => return,
        },
        Screen::MoveRegion => "Choosing new market region.".to_string(),
        Screen::Wallet => "Viewing your portfolio.".to_string(),
        Screen::MafiaWars => {
            state.contraband.last_refresh_ms = state.journal.clock_ms();
            "You've entered the Mafia underworld!".to_string()
        }
        Screen::Lottery => format!("Welcome to {}!", state.current_venue().name),
        Screen::MainMenu => "Returned to main menu.".to_string(),
        Screen::WinScreen | Screen::LoseScreen => return,
    };
    state.journal.info(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn terminal_screens_only_allow_play_again() {
        for screen in [Screen::WinScreen, Screen::LoseScreen] {
            assert!(screen.is_terminal());
            assert!(screen.allows(&Action::PlayAgain));
            assert!(!screen.allows(&Action::AdvanceDay));
            assert!(!screen.allows(&Action::NewGame));
        }
    }

    #[test]
    fn day_advances_from_activity_screens_only() {
        let allowed: Vec<Screen> = [
            Screen::MainMenu,
            Screen::StockMarket,
            Screen::BuySellStock,
            Screen::MoveRegion,
            Screen::Wallet,
            Screen::MafiaWars,
            Screen::Lottery,
        ]
        .into_iter()
        .filter(|screen| screen.allows(&Action::AdvanceDay))
        .collect();
        assert_eq!(
            allowed,
            [Screen::StockMarket, Screen::MafiaWars, Screen::Lottery]
        );
    }

    #[test]
    fn trading_actions_live_on_their_screens() {
        let trade = Action::TradeContraband {
            item: Contraband::BlissDust,
            direction: TradeDirection::Buy,
            quantity: Quantity::ONE,
        };
        assert!(Screen::MafiaWars.allows(&trade));
        assert!(!Screen::StockMarket.allows(&trade));
        assert!(Screen::BuySellStock.allows(&Action::BuyStock));
        assert!(!Screen::Wallet.allows(&Action::BuyStock));
        assert!(Screen::Lottery.allows(&Action::RollDice));
        assert!(Screen::MoveRegion.allows(&Action::ChangeRegion(2)));
    }

    #[test]
    fn entering_screens_posts_greetings() {
        let mut rng = SmallRng::seed_from_u64(51);
        let mut state = GameState::new(GameConfig::default(), &mut rng);
        enter_screen(&mut state, Screen::StockMarket);
        assert!(state.journal.mentions("Entering Global Exchange..."));
        state.journal.set_clock(9_000);
        enter_screen(&mut state, Screen::MafiaWars);
        assert_eq!(state.contraband.last_refresh_ms, 9_000);
        assert_eq!(
            state.journal.latest().map(|e| e.text.as_str()),
            Some("You've entered the Mafia underworld!")
        );
        enter_screen(&mut state, Screen::Lottery);
        assert!(state.journal.mentions("Welcome to Boardwalk!"));
    }

    #[test]
    fn screens_serialize_in_camel_case() {
        assert_eq!(
            serde_json::to_string(&Screen::BuySellStock).unwrap(),
            "\"buySellStock\""
        );
        let action: Action = serde_json::from_str(r#"{"action":"travel","args":"Miami"}"#).unwrap();
        assert_eq!(action, Action::Travel("Miami".into()));
    }
}
