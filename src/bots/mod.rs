pub mod random;
pub mod registry;
pub mod threshold;

pub use random::RandomBot;
pub use registry::{Opponent, OpponentPolicy};
pub use threshold::ThresholdBot;
