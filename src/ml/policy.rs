use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionMask};
use crate::error::GameError;
use crate::state::State;

use super::table::QTable;

pub const DEFAULT_EXPLORATION: f64 = 0.1;
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Credit-assignment algorithm of the learning seat.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    MonteCarlo,
    QLearning,
}

impl Algorithm {
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::MonteCarlo => "monte-carlo",
            Algorithm::QLearning => "q-learning",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monte-carlo" | "montecarlo" | "mc" => Ok(Algorithm::MonteCarlo),
            "q-learning" | "qlearning" | "q" => Ok(Algorithm::QLearning),
            other => Err(format!("unrecognized algorithm: {other}")),
        }
    }
}

/// Construction parameters shared by both learning agents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Probability of a uniformly random move (epsilon).
    pub exploration_rate: f64,
    /// Step size of every value update (alpha).
    pub learning_rate: f64,
    /// Start from a persisted table instead of zeros.
    pub resume: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            exploration_rate: DEFAULT_EXPLORATION,
            learning_rate: DEFAULT_LEARNING_RATE,
            resume: false,
        }
    }
}

impl AgentConfig {
    pub fn new(exploration_rate: f64, learning_rate: f64) -> Result<Self, GameError> {
        let config = Self {
            exploration_rate,
            learning_rate,
            resume: false,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn resuming(mut self) -> Self {
        self.resume = true;
        self
    }

    pub fn validate(&self) -> Result<(), GameError> {
        // NaN fails both range checks
        if !(0.0..=1.0).contains(&self.exploration_rate) {
            return Err(GameError::InvalidConfiguration(
                "exploration rate must be between 0 and 1",
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(GameError::InvalidConfiguration(
                "learning rate must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Epsilon-greedy action selection over a value table.
pub struct EpsilonGreedy<R: Rng> {
    epsilon: f64,
    rng: R,
}

impl<R: Rng> EpsilonGreedy<R> {
    pub fn new(epsilon: f64, rng: R) -> Self {
        Self { epsilon, rng }
    }

    /// Explores with probability epsilon; otherwise shuffles the available
    /// actions and keeps the last one whose value is at least the best seen,
    /// so ties break randomly.
    pub fn select(
        &mut self,
        table: &QTable,
        state: &State,
        mask: ActionMask,
    ) -> Result<Action, GameError> {
        let mut actions = mask.actions();
        if actions.is_empty() {
            return Err(GameError::EmptyActionSet);
        }
        if self.rng.gen_bool(self.epsilon) {
            return actions
                .choose(&mut self.rng)
                .copied()
                .ok_or(GameError::EmptyActionSet);
        }
        actions.shuffle(&mut self.rng);
        let mut best = actions[0];
        let mut best_value = f64::NEG_INFINITY;
        for action in actions {
            let value = table.value(state, action)?;
            if value >= best_value {
                best = action;
                best_value = value;
            }
        }
        Ok(best)
    }
}
