use crate::state::GameSettings;

/// Face value of a card. Every value in the universe appears at most once.
pub type Card = u8;

pub const MIN_CARD_VALUE: Card = 3;
pub const MAX_CARD_VALUE: Card = 35;
pub const DECK_SIZE: usize = 24;
pub const STARTING_CHIPS: u32 = 11;
pub const DEFAULT_PLAYERS: usize = 3;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 7;

/// Every card of the configured universe in ascending order (unshuffled).
pub fn full_deck(settings: &GameSettings) -> Vec<Card> {
    (settings.min_card..=settings.max_card).collect()
}
