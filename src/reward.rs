use std::collections::HashMap;

use log::debug;

use crate::action::Action;
use crate::error::GameError;
use crate::score::{card_points, card_points_with};
use crate::space::StateActionSpace;
use crate::state::State;

/// Scalar reward for taking `action` in `state`.
///
/// Both arms measure the acting seat's score contribution after the action
/// with the sign flipped, so maximising reward minimises the final score.
pub fn reward_for(state: &State, action: Action) -> f64 {
    let chips = f64::from(state.player_chips);
    match action {
        Action::Take => {
            chips + f64::from(state.open_chips)
                - f64::from(card_points_with(&state.hand, state.open_card))
        }
        Action::Pass => chips - f64::from(card_points(&state.hand)) - 1.0,
    }
}

/// Reward table over the state-action domain.
///
/// Entries are materialised on first lookup and never change afterwards;
/// `precompute` fills the whole domain eagerly when it is small enough.
#[derive(Clone, Debug)]
pub struct RewardModel {
    space: StateActionSpace,
    entries: HashMap<(State, Action), f64>,
}

impl RewardModel {
    pub fn new(space: StateActionSpace) -> Self {
        Self {
            space,
            entries: HashMap::new(),
        }
    }

    /// Builds the table for every feasible state up front.
    pub fn precompute(space: StateActionSpace) -> Self {
        let mut entries = HashMap::new();
        for state in space.states() {
            for action in space.actions() {
                let reward = reward_for(&state, action);
                entries.insert((state.clone(), action), reward);
            }
        }
        debug!("precomputed {} reward entries", entries.len());
        Self { space, entries }
    }

    pub fn space(&self) -> &StateActionSpace {
        &self.space
    }

    pub fn reward(&mut self, state: &State, action: Action) -> Result<f64, GameError> {
        if let Some(reward) = self.entries.get(&(state.clone(), action)) {
            return Ok(*reward);
        }
        self.space.validate(state)?;
        let reward = reward_for(state, action);
        self.entries.insert((state.clone(), action), reward);
        Ok(reward)
    }

    /// Reward if already materialised, without inserting.
    pub fn cached(&self, state: &State, action: Action) -> Option<f64> {
        self.entries.get(&(state.clone(), action)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameSettings;

    fn space() -> StateActionSpace {
        StateActionSpace::new(GameSettings {
            num_players: 3,
            min_card: 3,
            max_card: 8,
            deck_size: 6,
            starting_chips: 1,
        })
        .expect("space")
    }

    #[test]
    fn take_reward_credits_chips_and_charges_the_card() {
        // hand {5,6} + 7 collapses to 5; 2 + 1 - 5
        let state = State::new(7, 1, 2, [5, 6]);
        assert_eq!(reward_for(&state, Action::Take), -2.0);
    }

    #[test]
    fn pass_reward_costs_one_chip() {
        let state = State::new(7, 1, 2, [5, 6]);
        assert_eq!(reward_for(&state, Action::Pass), 2.0 - 5.0 - 1.0);
    }

    #[test]
    fn precomputed_table_matches_the_formulas() {
        let model = RewardModel::precompute(space());
        let count = space().state_count().expect("count") as usize;
        assert_eq!(model.len(), count * 2);
        for state in space().states() {
            let take = i64::from(state.player_chips) + i64::from(state.open_chips)
                - i64::from(card_points_with(&state.hand, state.open_card));
            let pass = i64::from(state.player_chips) - i64::from(card_points(&state.hand)) - 1;
            assert_eq!(model.cached(&state, Action::Take), Some(take as f64));
            assert_eq!(model.cached(&state, Action::Pass), Some(pass as f64));
        }
    }

    #[test]
    fn lazy_lookup_materialises_once() {
        let mut model = RewardModel::new(space());
        assert!(model.is_empty());
        let state = State::new(4, 0, 1, [8]);
        let first = model.reward(&state, Action::Take).expect("reward");
        assert_eq!(model.len(), 1);
        let second = model.reward(&state, Action::Take).expect("reward");
        assert_eq!(first, second);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn infeasible_lookup_is_rejected() {
        let mut model = RewardModel::new(space());
        let state = State::new(4, 0, 1, [4]);
        assert!(matches!(
            model.reward(&state, Action::Pass),
            Err(GameError::InvalidState(_))
        ));
        assert!(model.is_empty());
    }
}
