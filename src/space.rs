//! The discrete state and action domain the learning agents operate over.

use std::collections::BTreeSet;

use crate::action::Action;
use crate::card::Card;
use crate::error::GameError;
use crate::state::{GameSettings, State};

/// Feasible states and the fixed action pair for one set of game settings.
///
/// A state is feasible when its open card and every held card lie in the
/// card universe, the open card is not already held, the hand is smaller
/// than the deck, and the chips in play do not exceed the chips in
/// circulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateActionSpace {
    settings: GameSettings,
}

impl StateActionSpace {
    pub fn new(settings: GameSettings) -> Result<Self, GameError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn actions(&self) -> [Action; 2] {
        Action::ALL
    }

    pub fn contains(&self, state: &State) -> bool {
        let settings = &self.settings;
        settings.in_universe(state.open_card)
            && !state.hand.contains(&state.open_card)
            && state.hand.iter().all(|&card| settings.in_universe(card))
            && state.hand.len() < settings.deck_size
            && state
                .open_chips
                .checked_add(state.player_chips)
                .is_some_and(|chips| chips <= settings.total_chips())
    }

    pub fn validate(&self, state: &State) -> Result<(), GameError> {
        if self.contains(state) {
            Ok(())
        } else {
            Err(GameError::InvalidState(Box::new(state.clone())))
        }
    }

    /// Lazily enumerates every feasible state.
    ///
    /// Only practical for small universes; the default 33-card universe has
    /// on the order of 10^14 states.
    pub fn states(&self) -> impl Iterator<Item = State> + use<> {
        let settings = self.settings;
        let total = settings.total_chips();
        let max_hand = settings.deck_size - 1;
        (settings.min_card..=settings.max_card).flat_map(move |open_card| {
            let others: Vec<Card> = (settings.min_card..=settings.max_card)
                .filter(|&card| card != open_card)
                .collect();
            (0..=total).flat_map(move |open_chips| {
                let others = others.clone();
                (0..=total - open_chips).flat_map(move |player_chips| {
                    Subsets::new(others.clone())
                        .filter(move |hand| hand.len() <= max_hand)
                        .map(move |hand| State {
                            open_card,
                            open_chips,
                            player_chips,
                            hand,
                        })
                })
            })
        })
    }

    /// Number of feasible states, or `None` when it does not fit in a `u128`.
    pub fn state_count(&self) -> Option<u128> {
        let universe = self.settings.universe_size() as u128;
        let others = universe - 1;
        let max_hand = (self.settings.deck_size - 1) as u128;
        let mut hands: u128 = 0;
        let mut binomial: u128 = 1;
        for k in 0..=max_hand.min(others) {
            hands = hands.checked_add(binomial)?;
            binomial = binomial.checked_mul(others - k)? / (k + 1);
        }
        let total = u128::from(self.settings.total_chips());
        let chip_pairs = (total + 1) * (total + 2) / 2;
        universe.checked_mul(chip_pairs)?.checked_mul(hands)
    }
}

/// Every subset of a list of cards, starting from the empty set.
struct Subsets {
    items: Vec<Card>,
    picks: Vec<bool>,
    done: bool,
}

impl Subsets {
    fn new(items: Vec<Card>) -> Self {
        let picks = vec![false; items.len()];
        Self {
            items,
            picks,
            done: false,
        }
    }
}

impl Iterator for Subsets {
    type Item = BTreeSet<Card>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let subset = self
            .items
            .iter()
            .zip(&self.picks)
            .filter(|(_, picked)| **picked)
            .map(|(card, _)| *card)
            .collect();
        // binary increment; wrapping past all-true ends the sequence
        self.done = true;
        for pick in self.picks.iter_mut() {
            if *pick {
                *pick = false;
            } else {
                *pick = true;
                self.done = false;
                break;
            }
        }
        Some(subset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_settings() -> GameSettings {
        GameSettings {
            num_players: 3,
            min_card: 3,
            max_card: 6,
            deck_size: 4,
            starting_chips: 1,
        }
    }

    #[test]
    fn subsets_cover_the_power_set() {
        let all: Vec<_> = Subsets::new(vec![1, 2, 3]).collect();
        assert_eq!(all.len(), 8);
        let unique: BTreeSet<_> = all.into_iter().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn enumeration_matches_count_and_feasibility() {
        let space = StateActionSpace::new(small_settings()).expect("space");
        let states: Vec<State> = space.states().collect();
        // 4 open cards * 10 chip pairs * 8 hands
        assert_eq!(space.state_count(), Some(320));
        assert_eq!(states.len(), 320);
        assert!(states.iter().all(|state| space.contains(state)));
        assert!(states.iter().all(|state| !state.hand.contains(&state.open_card)));
    }

    #[test]
    fn hand_size_is_bounded_by_the_deck() {
        let settings = GameSettings {
            deck_size: 2,
            ..small_settings()
        };
        let space = StateActionSpace::new(settings).expect("space");
        assert!(space.states().all(|state| state.hand.len() <= 1));
        // 4 open cards * 10 chip pairs * (1 + 3) hands
        assert_eq!(space.state_count(), Some(160));
        assert_eq!(space.states().count(), 160);
    }

    #[test]
    fn overflowing_chip_total_is_refused() {
        let settings = GameSettings {
            starting_chips: u32::MAX / 2,
            ..small_settings()
        };
        assert!(matches!(
            StateActionSpace::new(settings),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_infeasible_states() {
        let space = StateActionSpace::new(small_settings()).expect("space");
        assert!(space.contains(&State::new(3, 1, 2, [4, 5])));
        assert!(!space.contains(&State::new(3, 0, 0, [3])));
        assert!(!space.contains(&State::new(7, 0, 0, [])));
        assert!(!space.contains(&State::new(3, 0, 0, [9])));
        assert!(!space.contains(&State::new(3, 2, 2, [])));
        assert!(matches!(
            space.validate(&State::new(3, 4, 0, [])),
            Err(GameError::InvalidState(_))
        ));
    }

    #[test]
    fn default_space_is_counted_without_enumeration() {
        let space = StateActionSpace::new(GameSettings::default()).expect("space");
        let count = space.state_count().expect("fits in u128");
        assert!(count > 1_000_000_000_000);
    }
}
