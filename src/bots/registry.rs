use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionMask};
use crate::bot::{Bot, Transition};
use crate::error::GameError;
use crate::state::State;

use super::random::RandomBot;
use super::threshold::ThresholdBot;

/// Fixed policy for a non-learning seat, parsed from a CLI-style spec.
///
/// Supported specs:
/// - random
/// - threshold:<chip value>
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpponentPolicy {
    Random,
    Threshold { chip_value: u32 },
}

impl fmt::Display for OpponentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpponentPolicy::Random => f.write_str("random"),
            OpponentPolicy::Threshold { chip_value } => write!(f, "threshold:{chip_value}"),
        }
    }
}

impl FromStr for OpponentPolicy {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let spec_lower = spec.trim().to_ascii_lowercase();
        let (head, value) = match spec_lower.split_once(':') {
            Some((head, value)) => (head, Some(value.trim())),
            None => (spec_lower.as_str(), None),
        };
        match (head, value) {
            ("random", None) => Ok(OpponentPolicy::Random),
            ("threshold", Some(value)) => value
                .parse::<u32>()
                .map(|chip_value| OpponentPolicy::Threshold { chip_value })
                .map_err(|_| format!("invalid chip value in opponent spec: {spec}")),
            _ => Err(format!("unrecognized opponent spec: {spec}")),
        }
    }
}

/// A seated fixed-policy opponent.
pub enum Opponent {
    Random(RandomBot<StdRng>),
    Threshold(ThresholdBot),
}

impl Opponent {
    /// `rng` is only consumed by random seats.
    pub fn create(policy: OpponentPolicy, rng: StdRng) -> Self {
        match policy {
            OpponentPolicy::Random => Opponent::Random(RandomBot::new(rng)),
            OpponentPolicy::Threshold { chip_value } => {
                Opponent::Threshold(ThresholdBot::new(chip_value))
            }
        }
    }
}

impl Bot for Opponent {
    fn select_action(&mut self, state: &State, mask: ActionMask) -> Result<Action, GameError> {
        match self {
            Opponent::Random(bot) => bot.select_action(state, mask),
            Opponent::Threshold(bot) => bot.select_action(state, mask),
        }
    }

    fn observe(
        &mut self,
        state: &State,
        action: Action,
        transition: Transition,
    ) -> Result<(), GameError> {
        match self {
            Opponent::Random(bot) => bot.observe(state, action, transition),
            Opponent::Threshold(bot) => bot.observe(state, action, transition),
        }
    }
}
