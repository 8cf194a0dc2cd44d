use std::collections::HashSet;

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

/// Distinct state-action pairs visited during the current episode, in first-visit order.
#[derive(Clone, Debug, Default)]
pub struct EpisodeTrace {
    order: Vec<(State, Action)>,
    seen: HashSet<(State, Action)>,
}

impl EpisodeTrace {
    /// Returns false when the pair was already recorded this episode.
    pub fn record(&mut self, state: &State, action: Action) -> bool {
        let key = (state.clone(), action);
        if self.seen.contains(&key) {
            return false;
        }
        self.seen.insert(key.clone());
        self.order.push(key);
        true
    }

    pub fn pairs(&self) -> &[(State, Action)] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }
}

/// Episode-batched Monte Carlo control.
///
/// Every pair in the episode trace is moved toward the single reward of the
/// episode's final decision; there is no per-step return.
pub struct MonteCarloAgent<R: Rng> {
    config: AgentConfig,
    policy: EpsilonGreedy<R>,
    rewards: RewardModel,
    table: QTable,
    visits: VisitCounts,
    trace: EpisodeTrace,
    last: Option<(State, Action)>,
}

impl<R: Rng> MonteCarloAgent<R> {
    pub fn new(space: StateActionSpace, config: AgentConfig, rng: R) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            policy: EpsilonGreedy::new(config.exploration_rate, rng),
            rewards: RewardModel::new(space),
            table: QTable::new(space),
            visits: VisitCounts::new(space),
            trace: EpisodeTrace::default(),
            last: None,
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

    pub fn trace(&self) -> &EpisodeTrace {
        &self.trace
    }

    /// Picks an action and records the pair in the episode trace.
    pub fn select(&mut self, state: &State, mask: ActionMask) -> Result<Action, GameError> {
        let action = self.policy.select(&self.table, state, mask)?;
        self.trace.record(state, action);
        self.visits.increment(state, action)?;
        Ok(action)
    }

    /// Applies the terminal pair's reward to every traced pair, then clears the trace.
    pub fn reinforce(&mut self, state: &State, action: Action) -> Result<(), GameError> {
        let reward = self.rewards.reward(state, action)?;
        let alpha = self.config.learning_rate;
        for (visited, visited_action) in self.trace.pairs() {
            self.table
                .step_toward(visited, *visited_action, reward, alpha)?;
        }
        trace!(
            "monte carlo update of {} pair(s) toward {reward}",
            self.trace.len()
        );
        self.trace.clear();
        Ok(())
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::capture(Algorithm::MonteCarlo, &self.table, &self.visits)
    }

    pub fn restore(&mut self, snapshot: TableSnapshot) -> Result<(), GameError> {
        let (table, visits) = snapshot.into_tables(*self.rewards.space())?;
        self.table = table;
        self.visits = visits;
        Ok(())
    }
}

impl<R: Rng> Bot for MonteCarloAgent<R> {
    fn select_action(&mut self, state: &State, mask: ActionMask) -> Result<Action, GameError> {
        self.select(state, mask)
    }

    fn observe(
        &mut self,
        state: &State,
        action: Action,
        _transition: Transition,
    ) -> Result<(), GameError> {
        self.last = Some((state.clone(), action));
        Ok(())
    }

    fn finish_episode(&mut self) -> Result<(), GameError> {
        match self.last.take() {
            Some((state, action)) => self.reinforce(&state, action),
            None => {
                self.trace.clear();
                Ok(())
            }
        }
    }

    fn abort_episode(&mut self) {
        self.trace.clear();
        self.last = None;
    }
}
