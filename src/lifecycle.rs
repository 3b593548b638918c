use std::mem;

use log::{debug, info, warn};
use rand::Rng;

use crate::config::GameConfig;
use crate::error::{AppError, LedgerError, StartError};
use crate::ledger::{ScoreLedger, ScoreStore};
use crate::session::{GameSession, TickOutcome};
use crate::snake::Direction;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Paused,
    GameOver,
    Terminated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Move(Direction),
    TogglePause,
    StartRequested(String),
    ExitRequested,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOverChoice {
    Restart,
    Terminate,
}

enum State {
    Idle,
    Playing(GameSession),
    Over(GameSession),
    Terminated,
}

/// Drives sessions from start to game over and keeps the score ledger in sync.
pub struct Lifecycle<S: ScoreStore, R: Rng> {
    config: GameConfig,
    store: S,
    ledger: ScoreLedger,
    state: State,
    rng: R,
}

impl<S: ScoreStore, R: Rng> Lifecycle<S, R> {
    pub fn new(config: GameConfig, store: S, rng: R) -> Result<Self, LedgerError> {
        let ledger = store.load()?;
        info!("Loaded {} player score(s)", ledger.len());
        Ok(Lifecycle { config, store, ledger, state: State::Idle, rng })
    }

    pub fn phase(&self) -> Phase {
        match &self.state {
            State::Idle => Phase::NotStarted,
            State::Playing(session) if session.is_paused() => Phase::Paused,
            State::Playing(_) => Phase::Running,
            State::Over(_) => Phase::GameOver,
            State::Terminated => Phase::Terminated,
        }
    }

    /// The current session, including a finished one awaiting a restart decision.
    pub fn session(&self) -> Option<&GameSession> {
        match &self.state {
            State::Playing(session) | State::Over(session) => Some(session),
            _ => None,
        }
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn top_players(&self) -> Vec<(String, u32)> {
        self.ledger.top_n(self.config.top_players)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn handle_input(&mut self, input: Input) -> Result<(), AppError> {
        match input {
            Input::Move(direction) => self.steer(direction),
            Input::TogglePause => {
                self.toggle_pause();
            }
            Input::StartRequested(name) => self.start(&name)?,
            Input::ExitRequested => self.exit()?,
        }
        Ok(())
    }

    pub fn start(&mut self, name: &str) -> Result<(), StartError> {
        if !matches!(self.state, State::Idle) {
            return Err(StartError::AlreadyRunning);
        }
        if name.trim().is_empty() {
            warn!("Refusing to start without a player name");
            return Err(StartError::BlankName);
        }

        let session = GameSession::new(name, &self.config, &mut self.rng)?;
        info!("Game started for {}", name);
        self.state = State::Playing(session);
        Ok(())
    }

    pub fn steer(&mut self, direction: Direction) {
        if let State::Playing(session) = &mut self.state {
            session.set_direction(direction);
        }
    }

    /// Returns the new pause flag, or `None` when no game is running.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        match &mut self.state {
            State::Playing(session) => {
                let paused = session.toggle_pause();
                debug!("Paused: {}", paused);
                Some(paused)
            }
            _ => None,
        }
    }

    /// Feeds elapsed timer ticks to the running session. A terminal outcome
    /// records the score and persists the ledger before returning.
    pub fn on_timer(&mut self, elapsed_ticks: u32) -> Result<TickOutcome, LedgerError> {
        let session = match mem::replace(&mut self.state, State::Idle) {
            State::Playing(session) => session,
            other => {
                self.state = other;
                return Ok(TickOutcome::Idle);
            }
        };

        let (session, outcome) = session.advance(elapsed_ticks, &mut self.rng);

        if let TickOutcome::FoodEaten { food } = outcome {
            debug!("Food eaten, next at ({}, {})", food.x, food.y);
        }

        if outcome.is_terminal() {
            info!("Game over for {} ({:?}), score {}", session.player(), outcome, session.score());
            self.ledger.record_score(session.player(), session.score());
            self.state = State::Over(session);
            self.store.save(&self.ledger)?;
        } else {
            self.state = State::Playing(session);
        }

        Ok(outcome)
    }

    pub fn resolve_game_over(&mut self, choice: GameOverChoice) -> Result<(), AppError> {
        let player = match &self.state {
            State::Over(session) => session.player().to_string(),
            _ => return Ok(()),
        };

        match choice {
            GameOverChoice::Restart => {
                let session = GameSession::new(&player, &self.config, &mut self.rng)?;
                info!("Restarting game for {}", player);
                self.state = State::Playing(session);
            }
            GameOverChoice::Terminate => {
                self.store.save(&self.ledger)?;
                self.state = State::Terminated;
            }
        }
        Ok(())
    }

    /// Leaves the current game for the title screen, keeping its score.
    pub fn exit(&mut self) -> Result<(), LedgerError> {
        match mem::replace(&mut self.state, State::Idle) {
            State::Playing(session) => {
                info!("{} left the game with score {}", session.player(), session.score());
                self.ledger.record_score(session.player(), session.score());
                self.store.save(&self.ledger)
            }
            State::Terminated => {
                self.state = State::Terminated;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Final save before the process ends. An unfinished game still counts.
    pub fn shutdown(&mut self) -> Result<(), LedgerError> {
        if let State::Playing(session) = &self.state {
            self.ledger.record_score(session.player(), session.score());
        }
        self.state = State::Terminated;
        self.store.save(&self.ledger)
    }

    /// Fresh read of the persisted ledger, as the leaderboard screen shows it.
    pub fn stored_ledger(&self) -> Result<ScoreLedger, LedgerError> {
        self.store.load()
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> Option<&mut GameSession> {
        match &mut self.state {
            State::Playing(session) | State::Over(session) => Some(session),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }
}
