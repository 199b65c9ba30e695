//! Gambling: the venue lottery and the fixed-stake dice game.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::GAMBLING_VENUES;
use crate::constants::{DICE_FACES, DICE_MULTIPLIER, DICE_STAKE, DICE_WINNING_FACE};
use crate::error::{GameError, GameResult};
use crate::input::BetAmount;
use crate::money::Cents;
use crate::state::GameState;
use crate::trade::ensure_affordable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerGame {
    Lottery,
    Dice,
}

/// Result of one settled wager. `payout` is the gross amount credited back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerOutcome {
    pub game: WagerGame,
    pub venue: String,
    pub won: bool,
    pub stake: Cents,
    pub payout: Cents,
    pub multiplier: u32,
    /// Face shown by the die, for dice games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<u8>,
}

impl WagerOutcome {
    #[must_use]
    pub fn net(&self) -> Cents {
        self.payout - self.stake
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerDesk {
    pub venue_index: usize,
    pub dice_plays_today: u32,
    #[serde(default)]
    pub last_outcome: Option<WagerOutcome>,
}

/// Bet at the current venue.
///
/// # Errors
///
/// Fails when the game is over, the amount is outside the venue's bounds, or
/// the balance cannot cover it.
pub fn place_wager(
    state: &mut GameState,
    amount: BetAmount,
    rng: &mut impl Rng,
) -> GameResult<WagerOutcome> {
    state.ensure_active()?;
    let venue = state.current_venue();
    let stake = amount.cents();
    if stake < venue.min_bet {
        return Err(GameError::BelowMinimumBet {
            minimum: venue.min_bet,
        });
    }
    if stake > venue.max_bet {
        return Err(GameError::AboveMaximumBet {
            maximum: venue.max_bet,
        });
    }
    ensure_affordable(state.balance, stake)?;

    state.debit(stake);
    let won = rng.gen_bool(venue.odds.clamp(0.0, 1.0));
    let payout = if won {
        stake.times(venue.multiplier)
    } else {
        Cents::ZERO
    };
    state.credit(payout);
    let outcome = WagerOutcome {
        game: WagerGame::Lottery,
        venue: venue.name.to_string(),
        won,
        stake,
        payout,
        multiplier: venue.multiplier,
        roll: None,
    };
    announce(state, &outcome);
    Ok(outcome)
}

/// Roll one die for the fixed stake; a six pays out.
///
/// # Errors
///
/// Fails when the game is over, today's plays are used up, or the stake is
/// unaffordable.
pub fn roll_dice(state: &mut GameState, rng: &mut impl Rng) -> GameResult<WagerOutcome> {
    state.ensure_active()?;
    let limit = state.config.dice_daily_limit;
    if state.wagers.dice_plays_today >= limit {
        return Err(GameError::DailyLimitReached {
            activity: "dice",
            limit,
        });
    }
    ensure_affordable(state.balance, DICE_STAKE)?;

    state.debit(DICE_STAKE);
    state.wagers.dice_plays_today += 1;
    let face = rng.gen_range(1..=DICE_FACES);
    let won = face == DICE_WINNING_FACE;
    let payout = if won {
        DICE_STAKE.times(DICE_MULTIPLIER)
    } else {
        Cents::ZERO
    };
    state.credit(payout);
    let outcome = WagerOutcome {
        game: WagerGame::Dice,
        venue: state.current_venue().name.to_string(),
        won,
        stake: DICE_STAKE,
        payout,
        multiplier: DICE_MULTIPLIER,
        roll: Some(face),
    };
    announce(state, &outcome);
    Ok(outcome)
}

fn announce(state: &mut GameState, outcome: &WagerOutcome) {
    debug!(
        "{:?} at {}: staked {}, paid {}",
        outcome.game, outcome.venue, outcome.stake, outcome.payout
    );
    if outcome.won {
        state.journal.success(format!("You won {}!", outcome.payout));
    } else {
        state
            .journal
            .warning(format!("You lost {}. Better luck next time!", outcome.stake));
    }
    state.wagers.last_outcome = Some(outcome.clone());
}

/// Move to another venue, paying its entry cost.
///
/// # Errors
///
/// Fails when the game is over, the index is out of range, the venue is
/// already current, or the entry cost is unaffordable.
pub fn change_venue(state: &mut GameState, venue_index: usize) -> GameResult<Cents> {
    state.ensure_active()?;
    let venue = GAMBLING_VENUES
        .get(venue_index)
        .ok_or_else(|| GameError::InvalidLocation {
            name: format!("venue #{venue_index}"),
        })?;
    if venue_index == state.wagers.venue_index {
        return Err(GameError::AlreadyAtLocation {
            name: venue.name.to_string(),
        });
    }
    ensure_affordable(state.balance, venue.entry_cost)?;

    state.debit(venue.entry_cost);
    state.wagers.venue_index = venue_index;
    debug!("moved to venue {}", venue.name);
    state.journal.info(format!("Welcome to {}!", venue.name));
    Ok(venue.entry_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn fresh() -> GameState {
        let mut rng = SmallRng::seed_from_u64(21);
        GameState::new(GameConfig::default(), &mut rng)
    }

    fn bet(dollars: u32) -> BetAmount {
        BetAmount::from_dollars(dollars).unwrap()
    }

    #[test]
    fn boardwalk_wager_has_exactly_two_outcomes() {
        let mut rng = SmallRng::seed_from_u64(22);
        let (mut wins, mut losses) = (0, 0);
        for _ in 0..200 {
            let mut state = fresh();
            let outcome = place_wager(&mut state, bet(50), &mut rng).unwrap();
            if outcome.won {
                wins += 1;
                assert_eq!(outcome.payout, Cents::from_dollars(150));
                assert_eq!(state.balance, Cents::from_dollars(1_100));
            } else {
                losses += 1;
                assert_eq!(outcome.payout, Cents::ZERO);
                assert_eq!(state.balance, Cents::from_dollars(950));
            }
            assert_eq!(state.wagers.last_outcome.as_ref(), Some(&outcome));
        }
        assert!(wins > 0 && losses > 0);
    }

    #[test]
    fn bet_bounds_and_funds_are_checked() {
        let mut rng = SmallRng::seed_from_u64(23);
        let mut state = fresh();
        assert_eq!(
            place_wager(&mut state, bet(49), &mut rng),
            Err(GameError::BelowMinimumBet {
                minimum: Cents::from_dollars(50)
            })
        );
        assert_eq!(
            place_wager(&mut state, bet(5_001), &mut rng),
            Err(GameError::AboveMaximumBet {
                maximum: Cents::from_dollars(5_000)
            })
        );
        assert!(matches!(
            place_wager(&mut state, bet(2_000), &mut rng),
            Err(GameError::InsufficientFunds { .. })
        ));
        assert_eq!(state.balance, Cents::from_dollars(1_000));
        assert!(state.wagers.last_outcome.is_none());
    }

    #[test]
    fn dice_pays_on_six_and_caps_daily_plays() {
        let mut rng = SmallRng::seed_from_u64(24);
        let mut state = fresh();
        state.balance = Cents::from_dollars(10_000);
        for _ in 0..5 {
            let before = state.balance;
            let outcome = roll_dice(&mut state, &mut rng).unwrap();
            let face = outcome.roll.unwrap();
            assert!((1..=6).contains(&face));
            assert_eq!(outcome.won, face == 6);
            let expected = if outcome.won {
                before + Cents::from_dollars(400)
            } else {
                before - Cents::from_dollars(100)
            };
            assert_eq!(state.balance, expected);
        }
        assert_eq!(
            roll_dice(&mut state, &mut rng),
            Err(GameError::DailyLimitReached {
                activity: "dice",
                limit: 5,
            })
        );
    }

    #[test]
    fn dice_needs_the_stake() {
        let mut rng = SmallRng::seed_from_u64(25);
        let mut state = fresh();
        state.balance = Cents::from_dollars(99);
        assert!(matches!(
            roll_dice(&mut state, &mut rng),
            Err(GameError::InsufficientFunds { .. })
        ));
        assert_eq!(state.wagers.dice_plays_today, 0);
    }

    #[test]
    fn venue_change_charges_entry() {
        let mut state = fresh();
        assert_eq!(change_venue(&mut state, 1), Ok(Cents::from_dollars(500)));
        assert_eq!(state.balance, Cents::from_dollars(500));
        assert_eq!(state.current_venue().name, "OldTown");
        assert!(matches!(
            change_venue(&mut state, 1),
            Err(GameError::AlreadyAtLocation { .. })
        ));
        assert!(matches!(
            change_venue(&mut state, 2),
            Err(GameError::InsufficientFunds { .. })
        ));
        assert!(matches!(
            change_venue(&mut state, 9),
            Err(GameError::InvalidLocation { .. })
        ));
        assert_eq!(change_venue(&mut state, 0), Ok(Cents::ZERO));
        assert_eq!(state.balance, Cents::from_dollars(500));
    }
}
