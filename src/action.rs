use std::fmt;

use serde::{Deserialize, Serialize};

/// Zero-based index of a player within the game.
pub type PlayerId = usize;

/// Decision available to the seat holding the open card.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Take the open card together with every chip on it, then draw again.
    Take,
    /// Put one chip on the open card and hand it to the next seat.
    Pass,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Take, Action::Pass];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Take => f.write_str("take"),
            Action::Pass => f.write_str("pass"),
        }
    }
}

/// Which actions the acting seat may choose, derived purely from its chip balance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionMask {
    pub take: bool,
    pub pass: bool,
}

impl ActionMask {
    /// Take is always allowed; passing costs a chip, so it needs one.
    pub fn for_chips(chips: u32) -> Self {
        Self {
            take: true,
            pass: chips > 0,
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Take => self.take,
            Action::Pass => self.pass,
        }
    }

    /// Available actions in `[Take, Pass]` order.
    pub fn actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|action| self.allows(*action))
            .collect()
    }
}
