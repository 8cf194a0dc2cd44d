pub mod monte_carlo;
pub mod policy;
pub mod q_learning;
pub mod store;
pub mod table;
pub mod training;

pub use monte_carlo::{EpisodeTrace, MonteCarloAgent};
pub use policy::{AgentConfig, Algorithm, DEFAULT_EXPLORATION, DEFAULT_LEARNING_RATE, EpsilonGreedy};
pub use q_learning::{QLearningAgent, UpdateKind};
pub use store::{BincodeFileStore, MemoryStore, TableStore};
pub use table::{QTable, TableEntry, TableSnapshot, VisitCounts};
pub use training::{Learner, Trainer, TrainerConfig, TrainingReport};
