//! Scoring shared by the reward signal and the final tally.
//!
//! A run of consecutive cards only counts its lowest card; chips are worth
//! one point each in the player's favour. Lower final scores win.

use std::collections::BTreeSet;

use crate::card::Card;

/// Card points of a hand: the sum of the lowest card of every run.
///
/// Values are scanned from highest to lowest and a value is dropped when its
/// predecessor is held, so only the minimum of each run survives.
pub fn card_points(hand: &BTreeSet<Card>) -> u32 {
    hand.iter()
        .rev()
        .filter(|&&card| card == 0 || !hand.contains(&(card - 1)))
        .map(|&card| u32::from(card))
        .sum()
}

/// Card points of `hand` with `extra` added, without touching the caller's set.
pub fn card_points_with(hand: &BTreeSet<Card>, extra: Card) -> u32 {
    let mut extended = hand.clone();
    extended.insert(extra);
    card_points(&extended)
}

/// Final tally for one player: card points minus chips held.
pub fn final_score(hand: &BTreeSet<Card>, chips: u32) -> i64 {
    i64::from(card_points(hand)) - i64::from(chips)
}

/// Collapse a hand to the cards that still count after run removal.
pub fn collapse(hand: &BTreeSet<Card>) -> BTreeSet<Card> {
    hand.iter()
        .copied()
        .filter(|&card| card == 0 || !hand.contains(&(card - 1)))
        .collect()
}
