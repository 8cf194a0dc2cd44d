use crate::action::{Action, ActionMask};
use crate::bot::Bot;
use crate::error::GameError;
use crate::state::State;

/// Values every chip at a fixed number of points and takes the open card
/// only when its chips outweigh its face value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdBot {
    chip_value: u32,
}

impl ThresholdBot {
    pub fn new(chip_value: u32) -> Self {
        Self { chip_value }
    }

    pub fn chip_value(&self) -> u32 {
        self.chip_value
    }
}

impl Bot for ThresholdBot {
    fn select_action(&mut self, state: &State, mask: ActionMask) -> Result<Action, GameError> {
        if !mask.take {
            return Err(GameError::EmptyActionSet);
        }
        let cost = i64::from(state.open_card)
            - i64::from(state.open_chips) * i64::from(self.chip_value);
        if cost < 0 || !mask.pass {
            Ok(Action::Take)
        } else {
            Ok(Action::Pass)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(bot: &mut ThresholdBot, card: u8, open_chips: u32, chips: u32) -> Action {
        let state = State::new(card, open_chips, chips, []);
        bot.select_action(&state, ActionMask::for_chips(chips))
            .expect("action")
    }

    #[test]
    fn takes_when_chips_outweigh_the_card() {
        let mut bot = ThresholdBot::new(5);
        // 11 - 3 * 5 = -4
        assert_eq!(decide(&mut bot, 11, 3, 4), Action::Take);
    }

    #[test]
    fn passes_on_an_exact_balance() {
        let mut bot = ThresholdBot::new(5);
        // 10 - 2 * 5 = 0
        assert_eq!(decide(&mut bot, 10, 2, 4), Action::Pass);
        assert_eq!(decide(&mut bot, 30, 0, 4), Action::Pass);
    }

    #[test]
    fn forced_take_without_chips() {
        let mut bot = ThresholdBot::new(4);
        assert_eq!(decide(&mut bot, 35, 0, 0), Action::Take);
    }
}
