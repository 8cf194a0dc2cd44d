use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::PlayerId;
use crate::card::{
    Card, DECK_SIZE, DEFAULT_PLAYERS, MAX_CARD_VALUE, MAX_PLAYERS, MIN_CARD_VALUE, MIN_PLAYERS,
    STARTING_CHIPS,
};
use crate::error::GameError;

/// Global constants for a training run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettings {
    pub num_players: usize,
    pub min_card: Card,
    pub max_card: Card,
    pub deck_size: usize,
    pub starting_chips: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            num_players: DEFAULT_PLAYERS,
            min_card: MIN_CARD_VALUE,
            max_card: MAX_CARD_VALUE,
            deck_size: DECK_SIZE,
            starting_chips: STARTING_CHIPS,
        }
    }
}

impl GameSettings {
    pub fn new(num_players: usize) -> Result<Self, GameError> {
        let settings = Self {
            num_players,
            ..Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(GameError::InvalidConfiguration(
                "players must be between 2 and 7",
            ));
        }
        if self.min_card == 0 || self.min_card > self.max_card {
            return Err(GameError::InvalidConfiguration(
                "card universe must be a non-empty range of positive values",
            ));
        }
        if self.deck_size == 0 || self.deck_size > self.universe_size() {
            return Err(GameError::InvalidConfiguration(
                "deck size must be between 1 and the size of the card universe",
            ));
        }
        if self.starting_chips == 0 {
            return Err(GameError::InvalidConfiguration(
                "players must start with at least one chip",
            ));
        }
        if self
            .starting_chips
            .checked_mul(self.num_players as u32)
            .is_none()
        {
            return Err(GameError::InvalidConfiguration(
                "total chips in play must fit in a u32",
            ));
        }
        Ok(())
    }

    pub fn universe_size(&self) -> usize {
        usize::from(self.max_card) - usize::from(self.min_card) + 1
    }

    /// Chips ever in circulation; no chips enter or leave during a game.
    /// Saturates on settings that `validate` rejects.
    pub fn total_chips(&self) -> u32 {
        self.starting_chips
            .saturating_mul(self.num_players as u32)
    }

    pub fn in_universe(&self, card: Card) -> bool {
        (self.min_card..=self.max_card).contains(&card)
    }
}

/// What the acting seat sees when asked to decide.
///
/// The hand is an ordered set, so its iteration order is the canonical
/// encoding used to key reward and value tables.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State {
    pub open_card: Card,
    pub open_chips: u32,
    pub player_chips: u32,
    pub hand: BTreeSet<Card>,
}

impl State {
    pub fn new(
        open_card: Card,
        open_chips: u32,
        player_chips: u32,
        hand: impl IntoIterator<Item = Card>,
    ) -> Self {
        Self {
            open_card,
            open_chips,
            player_chips,
            hand: hand.into_iter().collect(),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "open {} with {} chip(s), holding {} chip(s) and {:?}",
            self.open_card, self.open_chips, self.player_chips, self.hand
        )
    }
}

/// The card being offered and the chips piled on it. Belongs to no seat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub open_card: Option<Card>,
    pub chips: u32,
}

/// Position of the turn state machine.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingDraw(PlayerId),
    AwaitingDecision(PlayerId),
    Terminal,
}

/// Final (or running) public record of one seat.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub hand: BTreeSet<Card>,
    pub chips: u32,
    pub score: i64,
}
