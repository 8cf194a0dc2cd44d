//! Card-elimination game engine with tabular learners for the take/pass decision.

pub mod action;
pub mod bot;
pub mod bots;
pub mod card;
pub mod episode;
pub mod error;
pub mod game;
pub mod ml;
pub mod reward;
pub mod score;
pub mod space;
pub mod state;
pub mod visualize;

pub use crate::action::{Action, ActionMask, PlayerId};
pub use crate::bot::{Bot, Transition};
pub use crate::bots::{Opponent, OpponentPolicy, RandomBot, ThresholdBot};
pub use crate::card::Card;
pub use crate::episode::{EpisodeOutcome, play_episode, run_episode};
pub use crate::error::{GameError, StoreError};
pub use crate::game::{Game, GameBuilder};
pub use crate::ml::{
    AgentConfig, Algorithm, BincodeFileStore, Learner, MemoryStore, MonteCarloAgent,
    QLearningAgent, TableSnapshot, TableStore, Trainer, TrainerConfig, TrainingReport,
};
pub use crate::reward::{RewardModel, reward_for};
pub use crate::score::{card_points, final_score};
pub use crate::space::StateActionSpace;
pub use crate::state::{GameSettings, PlayerSummary, Pool, State, TurnPhase};
pub use crate::visualize::{describe_action, describe_state, render_summary};
