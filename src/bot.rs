use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionMask};
use crate::error::GameError;
use crate::state::State;

/// Whether a decision leaves the episode running or ends it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Transition {
    Continue,
    Terminal,
}

/// Interface for every seat policy, learning or fixed.
pub trait Bot {
    fn select_action(&mut self, state: &State, mask: ActionMask) -> Result<Action, GameError>;

    /// Called with the seat's own decision before its effect is applied.
    fn observe(
        &mut self,
        _state: &State,
        _action: Action,
        _transition: Transition,
    ) -> Result<(), GameError> {
        Ok(())
    }

    /// Called once for every seat after the last card has been taken.
    fn finish_episode(&mut self) -> Result<(), GameError> {
        Ok(())
    }

    /// Called for every seat instead of `finish_episode` when the episode
    /// stops on an error. Per-episode state must not leak into the next run.
    fn abort_episode(&mut self) {}
}
