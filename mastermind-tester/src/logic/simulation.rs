use anyhow::{Result, ensure};
use log::debug;
use serde::Serialize;

use mastermind_game::{
    Action, ActionOutcome, Cents, Ending, GameConfig, GameError, GameSession, GameState, Screen,
    net_worth,
};

use crate::logic::policy::{GameplayStrategy, PlayerPolicy, route};

/// Policy actions allowed per day before the harness forces the day over.
const MAX_ACTIONS_PER_DAY: u32 = 60;

/// Configuration for a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub max_days: u32,
    pub game: GameConfig,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: GameplayStrategy, seed: u64) -> Self {
        let game = GameConfig::default();
        Self {
            seed,
            strategy,
            max_days: game.day_limit,
            game,
        }
    }

    #[must_use]
    pub fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days;
        self
    }

    #[must_use]
    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }
}

/// Outcome of one scripted game.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub ending: Option<Ending>,
    pub days_played: u32,
    pub final_balance: Cents,
    pub net_worth: Cents,
    pub actions: u32,
    pub rejections: u32,
    /// Invariant violation that stopped the run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RunRecord {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    #[must_use]
    pub fn won(&self) -> bool {
        self.ending == Some(Ending::Victory)
    }
}

/// Deterministic harness that lets a policy drive a seeded game.
pub struct SimulationSession {
    session: GameSession,
    max_days: u32,
    strategy: GameplayStrategy,
    seed: u64,
    actions: u32,
    rejections: u32,
}

impl SimulationSession {
    /// # Errors
    ///
    /// Fails when the game configuration does not validate.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let session = GameSession::with_seed(config.game, config.seed)?;
        Ok(Self {
            session,
            max_days: config.max_days,
            strategy: config.strategy,
            seed: config.seed,
            actions: 0,
            rejections: 0,
        })
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        self.session.state()
    }

    /// Play until the game ends or `max_days` is reached, checking invariants
    /// after every action.
    #[must_use]
    pub fn run(mut self, policy: &mut dyn PlayerPolicy) -> RunRecord {
        let failure = self.play(policy).err().map(|err| format!("{err:#}"));
        if let Some(reason) = &failure {
            debug!("{} seed {} failed: {reason}", policy.name(), self.seed);
        }
        let state = self.session.state();
        RunRecord {
            seed: self.seed,
            strategy: self.strategy,
            ending: state.ending,
            days_played: state.day,
            final_balance: state.balance,
            net_worth: net_worth(state),
            actions: self.actions,
            rejections: self.rejections,
            failure,
        }
    }

    fn play(&mut self, policy: &mut dyn PlayerPolicy) -> Result<()> {
        while !self.state().is_finished() && self.state().day < self.max_days {
            self.play_day(policy)?;
            self.end_day()?;
        }
        let state = self.state();
        if self.max_days >= state.config.day_limit {
            ensure!(
                state.ending.is_some(),
                "day {} reached without an ending",
                state.day
            );
        }
        Ok(())
    }

    fn play_day(&mut self, policy: &mut dyn PlayerPolicy) -> Result<()> {
        for _ in 0..MAX_ACTIONS_PER_DAY {
            let Some(action) = policy.next_action(self.state()) else {
                return Ok(());
            };
            ensure!(
                !matches!(action, Action::AdvanceDay),
                "{} tried to advance the day itself",
                policy.name()
            );
            self.step(action)?;
        }
        debug!(
            "{} hit the per-day action cap on day {}",
            policy.name(),
            self.state().day
        );
        Ok(())
    }

    /// Navigate to a screen that offers a day change and take it.
    fn end_day(&mut self) -> Result<()> {
        while !self.state().screen.allows(&Action::AdvanceDay) {
            let Some(action) = route(self.state().screen, Screen::StockMarket) else {
                break;
            };
            self.step(action)?;
        }
        let day = self.state().day;
        self.step(Action::AdvanceDay)?;
        ensure!(
            self.state().day == day + 1,
            "day change left the calendar at {} (was {day})",
            self.state().day
        );
        Ok(())
    }

    fn step(&mut self, action: Action) -> Result<()> {
        let before = self.state().clone();
        self.actions += 1;
        match self.session.dispatch(action) {
            Ok(outcome) => check_success(&before, self.state(), &outcome)?,
            Err(err) => {
                self.rejections += 1;
                check_rejection(&before, self.state(), &err)?;
            }
        }
        check_invariants(self.state())
    }
}

fn check_success(before: &GameState, after: &GameState, outcome: &ActionOutcome) -> Result<()> {
    let debt_free = !before.balance.is_negative();
    match outcome {
        ActionOutcome::Traded { .. } | ActionOutcome::Wagered { .. } => {
            if debt_free {
                ensure!(
                    !after.balance.is_negative(),
                    "{outcome:?} took {} into {}",
                    before.balance,
                    after.balance
                );
            }
        }
        ActionOutcome::RegionChanged { .. } | ActionOutcome::VenueChanged { .. } => {
            ensure!(after.day == before.day, "moving changed the day");
        }
        _ => {}
    }
    Ok(())
}

fn check_rejection(before: &GameState, after: &GameState, err: &GameError) -> Result<()> {
    ensure!(after.balance == before.balance, "rejected action ({err}) moved the balance");
    ensure!(after.day == before.day, "rejected action ({err}) moved the day");
    ensure!(
        after.stocks.portfolio == before.stocks.portfolio,
        "rejected action ({err}) touched the portfolio"
    );
    ensure!(
        after.contraband.inventory == before.contraband.inventory,
        "rejected action ({err}) touched the stash"
    );
    Ok(())
}

fn check_invariants(state: &GameState) -> Result<()> {
    let config = &state.config;
    ensure!(
        (1..=config.day_limit).contains(&state.day),
        "day {} outside 1..={}",
        state.day,
        config.day_limit
    );
    for (symbol, holding) in &state.stocks.portfolio {
        ensure!(
            holding.quantity > 0 && holding.quantity <= config.stock_cap,
            "{symbol} holding of {} breaks the cap",
            holding.quantity
        );
    }
    for (item, owned) in &state.contraband.inventory {
        ensure!(
            *owned <= config.contraband_cap,
            "{item:?} stash of {owned} breaks the cap"
        );
    }
    let daily = state.contraband.daily;
    ensure!(
        daily.buys <= config.daily_buy_limit && daily.sells <= config.daily_sell_limit,
        "daily trade counters {daily:?} exceed limits"
    );
    ensure!(
        state.wagers.dice_plays_today <= config.dice_daily_limit,
        "{} dice plays today",
        state.wagers.dice_plays_today
    );
    ensure!(
        state.journal.len() <= config.journal_capacity,
        "journal grew to {}",
        state.journal.len()
    );
    ensure!(
        state.ending.is_some() == state.screen.is_terminal(),
        "ending {:?} on screen {}",
        state.ending,
        state.screen
    );
    Ok(())
}
