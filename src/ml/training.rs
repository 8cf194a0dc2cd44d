use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionMask, PlayerId};
use crate::bot::{Bot, Transition};
use crate::bots::{Opponent, OpponentPolicy};
use crate::episode::{EpisodeOutcome, run_episode};
use crate::error::{GameError, StoreError};
use crate::game::GameBuilder;
use crate::space::StateActionSpace;
use crate::state::{GameSettings, State};

use super::monte_carlo::MonteCarloAgent;
use super::policy::{AgentConfig, Algorithm};
use super::q_learning::QLearningAgent;
use super::store::TableStore;
use super::table::{QTable, TableSnapshot, VisitCounts};

const DEFAULT_TRAINING_SEED: u64 = 0xA11C_E5EE_DF00_D000;

/// The learning seat's agent, whichever algorithm was selected.
pub enum Learner<R: Rng> {
    MonteCarlo(MonteCarloAgent<R>),
    QLearning(QLearningAgent<R>),
}

impl<R: Rng> Learner<R> {
    pub fn new(
        algorithm: Algorithm,
        space: StateActionSpace,
        config: AgentConfig,
        rng: R,
    ) -> Result<Self, GameError> {
        Ok(match algorithm {
            Algorithm::MonteCarlo => Learner::MonteCarlo(MonteCarloAgent::new(space, config, rng)?),
            Algorithm::QLearning => Learner::QLearning(QLearningAgent::new(space, config, rng)?),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Learner::MonteCarlo(_) => Algorithm::MonteCarlo,
            Learner::QLearning(_) => Algorithm::QLearning,
        }
    }

    pub fn table(&self) -> &QTable {
        match self {
            Learner::MonteCarlo(agent) => agent.table(),
            Learner::QLearning(agent) => agent.table(),
        }
    }

    pub fn visits(&self) -> &VisitCounts {
        match self {
            Learner::MonteCarlo(agent) => agent.visits(),
            Learner::QLearning(agent) => agent.visits(),
        }
    }

    pub fn snapshot(&self) -> TableSnapshot {
        match self {
            Learner::MonteCarlo(agent) => agent.snapshot(),
            Learner::QLearning(agent) => agent.snapshot(),
        }
    }

    pub fn restore(&mut self, snapshot: TableSnapshot) -> Result<(), GameError> {
        if snapshot.algorithm != self.algorithm() {
            return Err(StoreError::AlgorithmMismatch {
                expected: self.algorithm().label(),
                found: snapshot.algorithm.label(),
            }
            .into());
        }
        match self {
            Learner::MonteCarlo(agent) => agent.restore(snapshot),
            Learner::QLearning(agent) => agent.restore(snapshot),
        }
    }
}

impl<R: Rng> Bot for Learner<R> {
    fn select_action(&mut self, state: &State, mask: ActionMask) -> Result<Action, GameError> {
        match self {
            Learner::MonteCarlo(agent) => agent.select_action(state, mask),
            Learner::QLearning(agent) => agent.select_action(state, mask),
        }
    }

    fn observe(
        &mut self,
        state: &State,
        action: Action,
        transition: Transition,
    ) -> Result<(), GameError> {
        match self {
            Learner::MonteCarlo(agent) => agent.observe(state, action, transition),
            Learner::QLearning(agent) => agent.observe(state, action, transition),
        }
    }

    fn finish_episode(&mut self) -> Result<(), GameError> {
        match self {
            Learner::MonteCarlo(agent) => agent.finish_episode(),
            Learner::QLearning(agent) => agent.finish_episode(),
        }
    }

    fn abort_episode(&mut self) {
        match self {
            Learner::MonteCarlo(agent) => agent.abort_episode(),
            Learner::QLearning(agent) => agent.abort_episode(),
        }
    }
}

/// Everything needed to set up a training run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub names: Vec<String>,
    pub settings: GameSettings,
    pub algorithm: Algorithm,
    pub agent: AgentConfig,
    pub learner_seat: PlayerId,
    /// One policy per non-learning seat, in seat order.
    pub opponents: Vec<OpponentPolicy>,
    pub seed: u64,
}

impl TrainerConfig {
    pub fn new<I, S>(names: I, algorithm: Algorithm, agent: AgentConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let settings = GameSettings {
            num_players: names.len(),
            ..GameSettings::default()
        };
        let opponents = vec![OpponentPolicy::Random; names.len().saturating_sub(1)];
        Self {
            names,
            settings,
            algorithm,
            agent,
            learner_seat: 0,
            opponents,
            seed: DEFAULT_TRAINING_SEED,
        }
    }

    pub fn with_settings(mut self, settings: GameSettings) -> Self {
        self.settings = GameSettings {
            num_players: self.names.len(),
            ..settings
        };
        self
    }

    pub fn with_learner_seat(mut self, seat: PlayerId) -> Self {
        self.learner_seat = seat;
        self
    }

    pub fn with_opponents<I>(mut self, opponents: I) -> Self
    where
        I: IntoIterator<Item = OpponentPolicy>,
    {
        self.opponents = opponents.into_iter().collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Win tally over a block of episodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub names: Vec<String>,
    pub learner_seat: PlayerId,
    pub episodes: usize,
    pub wins: Vec<usize>,
    pub total_learner_score: i64,
}

impl TrainingReport {
    fn new(names: &[String], learner_seat: PlayerId) -> Self {
        Self {
            names: names.to_vec(),
            learner_seat,
            episodes: 0,
            wins: vec![0; names.len()],
            total_learner_score: 0,
        }
    }

    fn record(&mut self, outcome: &EpisodeOutcome) {
        self.episodes += 1;
        self.wins[outcome.winner] += 1;
        self.total_learner_score += outcome.players[self.learner_seat].score;
    }

    pub fn learner_wins(&self) -> usize {
        self.wins[self.learner_seat]
    }

    pub fn learner_win_rate(&self) -> f64 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.learner_wins() as f64 / self.episodes as f64
    }

    pub fn mean_learner_score(&self) -> f64 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.total_learner_score as f64 / self.episodes as f64
    }
}

/// Runs repeated episodes with one learner kept alive for the whole run.
///
/// Only per-episode state (trace, previous pair) is reset between episodes;
/// the value tables accumulate.
pub struct Trainer {
    config: TrainerConfig,
    learner: Learner<StdRng>,
    opponents: Vec<Opponent>,
    rng: StdRng,
    store: Option<Box<dyn TableStore>>,
    episodes: usize,
}

impl Trainer {
    pub fn new(
        config: TrainerConfig,
        mut store: Option<Box<dyn TableStore>>,
    ) -> Result<Self, GameError> {
        let space = StateActionSpace::new(config.settings)?;
        if config.learner_seat >= config.names.len() {
            return Err(GameError::InvalidPlayer(config.learner_seat));
        }
        if config.opponents.len() + 1 != config.names.len() {
            return Err(GameError::InvalidConfiguration(
                "need exactly one opponent policy per non-learning seat",
            ));
        }
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut learner = Learner::new(
            config.algorithm,
            space,
            config.agent,
            StdRng::seed_from_u64(rng.next_u64()),
        )?;
        if config.agent.resume {
            let store = store.as_mut().ok_or(GameError::InvalidConfiguration(
                "resuming requires a table store",
            ))?;
            let snapshot = store.load()?.ok_or(StoreError::Missing)?;
            info!("resuming {} from {} entries", config.algorithm, snapshot.len());
            learner.restore(snapshot)?;
        }
        // Every seat draws a seed so mixed line-ups stay reproducible.
        let opponents = config
            .opponents
            .iter()
            .map(|&policy| Opponent::create(policy, StdRng::seed_from_u64(rng.next_u64())))
            .collect();
        Ok(Self {
            config,
            learner,
            opponents,
            rng,
            store,
            episodes: 0,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn learner(&self) -> &Learner<StdRng> {
        &self.learner
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn run_episode(&mut self) -> Result<EpisodeOutcome, GameError> {
        let mut game = GameBuilder::new(self.config.names.iter().cloned())
            .with_settings(self.config.settings)
            .with_seed(self.rng.next_u64())
            .build()?;
        let learner_seat = self.config.learner_seat;
        let mut learner: Option<&mut dyn Bot> = Some(&mut self.learner);
        let mut opponents = self.opponents.iter_mut();
        let mut seats: Vec<&mut dyn Bot> = Vec::with_capacity(self.config.names.len());
        for seat in 0..self.config.names.len() {
            let bot: Option<&mut dyn Bot> = if seat == learner_seat {
                learner.take()
            } else {
                opponents
                    .next()
                    .map(|opponent: &mut Opponent| opponent as &mut dyn Bot)
            };
            seats.push(bot.ok_or(GameError::InvalidConfiguration(
                "missing bot for seat",
            ))?);
        }
        let outcome = run_episode(&mut game, &mut seats)?;
        self.episodes += 1;
        debug!(
            "episode {} won by {} with scores {:?}",
            self.episodes,
            outcome.winner_name(),
            outcome.scores()
        );
        Ok(outcome)
    }

    pub fn train(&mut self, episodes: usize) -> Result<TrainingReport, GameError> {
        let mut report = TrainingReport::new(&self.config.names, self.config.learner_seat);
        for _ in 0..episodes {
            let outcome = self.run_episode()?;
            report.record(&outcome);
        }
        info!(
            "{} episode(s) of {}: learner won {} ({:.1}%), mean score {:.2}, {} table entries",
            report.episodes,
            self.config.algorithm,
            report.learner_wins(),
            report.learner_win_rate() * 100.0,
            report.mean_learner_score(),
            self.learner.table().len()
        );
        Ok(report)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        self.learner.snapshot()
    }

    /// Writes the learner's tables through the configured store.
    pub fn save(&mut self) -> Result<(), GameError> {
        let snapshot = self.learner.snapshot();
        let store = self.store.as_mut().ok_or(GameError::InvalidConfiguration(
            "saving requires a table store",
        ))?;
        store.save(&snapshot)?;
        Ok(())
    }
}
