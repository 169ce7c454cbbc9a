//! Errors reported by scenarios and the session driver.

use thiserror::Error;

use bang_howdy_core::{ConfigError, GamePhase};

/// Failures of the scenario lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// The board or game configuration cannot support the scenario.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A round hook ran before the scenario saw its board.
    #[error("scenario has not been initialised with a board")]
    NotInitialized,
    /// A round was started while another was still being played.
    #[error("round {round} is already in progress")]
    RoundInProgress {
        /// Round being played.
        round: usize,
    },
    /// A round hook ran while no round was being played.
    #[error("no round is in progress")]
    RoundNotStarted,
    /// The end of a round was reported twice.
    #[error("round {round} has already ended")]
    RoundAlreadyEnded {
        /// Round that already ended.
        round: usize,
    },
    /// No scenario is registered under the name.
    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),
}

impl ScenarioError {
    /// Message suitable for display to players.
    ///
    /// Configuration problems are described; lifecycle misuse is an internal
    /// error and is reported generically.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ScenarioError::Config(error) => error.to_string(),
            ScenarioError::UnknownScenario(_) => self.to_string(),
            ScenarioError::NotInitialized
            | ScenarioError::RoundInProgress { .. }
            | ScenarioError::RoundNotStarted
            | ScenarioError::RoundAlreadyEnded { .. } => "internal error".to_owned(),
        }
    }

    /// Reports whether the error was caused by board or game configuration.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ScenarioError::Config(_) | ScenarioError::UnknownScenario(_)
        )
    }
}

/// Failures of the session driver.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The game configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The scenario refused the request.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// The request is not valid in the current phase.
    #[error("not allowed during {phase:?}")]
    WrongPhase {
        /// Phase the game was in.
        phase: GamePhase,
    },
    /// Every configured round has been played.
    #[error("the game is over")]
    GameOver,
}
