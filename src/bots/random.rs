use rand::Rng;

use crate::action::{Action, ActionMask};
use crate::bot::Bot;
use crate::error::GameError;
use crate::state::State;

/// Fixed opponent policy: a fair coin between take and pass, forced take at zero chips.
pub struct RandomBot<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomBot<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Bot for RandomBot<R> {
    fn select_action(&mut self, _state: &State, mask: ActionMask) -> Result<Action, GameError> {
        if !mask.take {
            return Err(GameError::EmptyActionSet);
        }
        if mask.pass && self.rng.gen_bool(0.5) {
            Ok(Action::Pass)
        } else {
            Ok(Action::Take)
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn forced_take_without_chips() {
        let mut bot = RandomBot::new(StdRng::seed_from_u64(7));
        let state = State::new(10, 2, 0, []);
        for _ in 0..50 {
            let action = bot
                .select_action(&state, ActionMask::for_chips(0))
                .expect("action");
            assert_eq!(action, Action::Take);
        }
    }

    #[test]
    fn splits_roughly_evenly() {
        let mut bot = RandomBot::new(StdRng::seed_from_u64(11));
        let state = State::new(10, 0, 5, []);
        let passes = (0..4000)
            .filter(|_| {
                bot.select_action(&state, ActionMask::for_chips(5))
                    .expect("action")
                    == Action::Pass
            })
            .count();
        assert!((1800..=2200).contains(&passes), "passes = {passes}");
    }
}
