use thiserror::Error;

use crate::action::{Action, PlayerId};
use crate::state::State;

/// Errors that can occur while running an episode or touching a learned table.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("player index {0} is out of range")]
    InvalidPlayer(PlayerId),
    #[error("not the specified player's turn")]
    NotPlayersTurn,
    #[error("action {0} is not available to the acting player")]
    IllegalAction(Action),
    #[error("no open card is waiting for a decision")]
    NoOpenCard,
    #[error("game is already over")]
    GameOver,
    #[error("attempted to draw from an empty deck")]
    DeckExhausted,
    #[error("no action is available to the acting player")]
    EmptyActionSet,
    #[error("state outside the enumerated domain: {0}")]
    InvalidState(Box<State>),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("table store failure: {0}")]
    Store(#[from] StoreError),
}

/// Failures crossing the persistence boundary of a learned table.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode table: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("could not decode table: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("table was trained with {found}, expected {expected}")]
    AlgorithmMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("no stored table to resume from")]
    Missing,
}
