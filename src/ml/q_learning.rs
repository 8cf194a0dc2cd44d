use log::trace;
use rand::Rng;

use crate::action::{Action, ActionMask};
use crate::bot::{Bot, Transition};
use crate::error::GameError;
use crate::reward::RewardModel;
use crate::space::StateActionSpace;
use crate::state::State;

use super::policy::{AgentConfig, Algorithm, EpsilonGreedy};
use super::table::{QTable, TableSnapshot, VisitCounts};

/// Which update a call to [`QLearningAgent::reinforce`] performed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UpdateKind {
    /// First decision of the episode: nothing to update yet.
    NoPrevious,
    /// Previous pair moved toward `R + Q(current)`.
    Bootstrap,
    /// Previous pair moved toward `R` alone because the current decision ends the episode.
    Terminal,
}

/// One-step-lag Q-learning: each decision updates the one before it.
pub struct QLearningAgent<R: Rng> {
    config: AgentConfig,
    policy: EpsilonGreedy<R>,
    rewards: RewardModel,
    table: QTable,
    visits: VisitCounts,
    previous: Option<(State, Action)>,
}

impl<R: Rng> QLearningAgent<R> {
    pub fn new(space: StateActionSpace, config: AgentConfig, rng: R) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            policy: EpsilonGreedy::new(config.exploration_rate, rng),
            rewards: RewardModel::new(space),
            table: QTable::new(space),
            visits: VisitCounts::new(space),
            previous: None,
        })
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut QTable {
        &mut self.table
    }

    pub fn visits(&self) -> &VisitCounts {
        &self.visits
    }

    pub fn previous(&self) -> Option<&(State, Action)> {
        self.previous.as_ref()
    }

    pub fn select(&mut self, state: &State, mask: ActionMask) -> Result<Action, GameError> {
        self.policy.select(&self.table, state, mask)
    }

    /// Updates the previous pair using the current one, then remembers the current pair.
    pub fn reinforce(
        &mut self,
        state: &State,
        action: Action,
        transition: Transition,
    ) -> Result<UpdateKind, GameError> {
        let reward = self.rewards.reward(state, action)?;
        let Some((prev_state, prev_action)) = self.previous.take() else {
            self.previous = Some((state.clone(), action));
            return Ok(UpdateKind::NoPrevious);
        };
        let kind = match transition {
            Transition::Continue => UpdateKind::Bootstrap,
            Transition::Terminal => UpdateKind::Terminal,
        };
        let target = match kind {
            UpdateKind::Bootstrap => reward + self.table.value(state, action)?,
            _ => reward,
        };
        let updated =
            self.table
                .step_toward(&prev_state, prev_action, target, self.config.learning_rate)?;
        self.visits.increment(&prev_state, prev_action)?;
        trace!("q-learning {kind:?} update of {prev_state} / {prev_action} to {updated}");
        self.previous = Some((state.clone(), action));
        Ok(kind)
    }

    /// Settles the pair still held as previous toward its own reward and
    /// clears the pointer. Returns false when nothing was pending.
    pub fn settle(&mut self) -> Result<bool, GameError> {
        let Some((state, action)) = self.previous.take() else {
            return Ok(false);
        };
        let reward = self.rewards.reward(&state, action)?;
        self.table
            .step_toward(&state, action, reward, self.config.learning_rate)?;
        self.visits.increment(&state, action)?;
        Ok(true)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::capture(Algorithm::QLearning, &self.table, &self.visits)
    }

    pub fn restore(&mut self, snapshot: TableSnapshot) -> Result<(), GameError> {
        let (table, visits) = snapshot.into_tables(*self.rewards.space())?;
        self.table = table;
        self.visits = visits;
        Ok(())
    }
}

impl<R: Rng> Bot for QLearningAgent<R> {
    fn select_action(&mut self, state: &State, mask: ActionMask) -> Result<Action, GameError> {
        self.select(state, mask)
    }

    fn observe(
        &mut self,
        state: &State,
        action: Action,
        transition: Transition,
    ) -> Result<(), GameError> {
        self.reinforce(state, action, transition).map(|_| ())
    }

    fn finish_episode(&mut self) -> Result<(), GameError> {
        self.settle().map(|_| ())
    }

    fn abort_episode(&mut self) {
        self.previous = None;
    }
}
