use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::GameError;
use crate::space::StateActionSpace;
use crate::state::State;

use super::policy::Algorithm;

type Key = (State, Action);

/// Sparse action-value estimates; pairs never written read as zero.
#[derive(Clone, Debug)]
pub struct QTable {
    space: StateActionSpace,
    values: HashMap<Key, f64>,
}

impl QTable {
    pub fn new(space: StateActionSpace) -> Self {
        Self {
            space,
            values: HashMap::new(),
        }
    }

    pub fn value(&self, state: &State, action: Action) -> Result<f64, GameError> {
        self.space.validate(state)?;
        Ok(self
            .values
            .get(&(state.clone(), action))
            .copied()
            .unwrap_or(0.0))
    }

    pub fn set(&mut self, state: &State, action: Action, value: f64) -> Result<(), GameError> {
        self.space.validate(state)?;
        self.values.insert((state.clone(), action), value);
        Ok(())
    }

    /// Moves the estimate a step of size `alpha` toward `target`; returns the new value.
    pub fn step_toward(
        &mut self,
        state: &State,
        action: Action,
        target: f64,
        alpha: f64,
    ) -> Result<f64, GameError> {
        let current = self.value(state, action)?;
        let updated = current + alpha * (target - current);
        self.values.insert((state.clone(), action), updated);
        Ok(updated)
    }

    /// Whether the pair has ever been written.
    pub fn contains(&self, state: &State, action: Action) -> bool {
        self.values.contains_key(&(state.clone(), action))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&State, Action, f64)> {
        self.values
            .iter()
            .map(|((state, action), value)| (state, *action, *value))
    }
}

/// Per-pair visit counters. Diagnostic only: no update reads them.
#[derive(Clone, Debug)]
pub struct VisitCounts {
    space: StateActionSpace,
    counts: HashMap<Key, u64>,
}

impl VisitCounts {
    pub fn new(space: StateActionSpace) -> Self {
        Self {
            space,
            counts: HashMap::new(),
        }
    }

    pub fn increment(&mut self, state: &State, action: Action) -> Result<u64, GameError> {
        self.space.validate(state)?;
        let count = self.counts.entry((state.clone(), action)).or_default();
        *count += 1;
        Ok(*count)
    }

    pub fn get(&self, state: &State, action: Action) -> u64 {
        self.counts
            .get(&(state.clone(), action))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// One persisted row of a learned table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub state: State,
    pub action: Action,
    pub value: f64,
    pub visits: u64,
}

/// Full learned state of an agent, as it crosses the persistence boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub algorithm: Algorithm,
    pub entries: Vec<TableEntry>,
}

impl TableSnapshot {
    /// Merges both tables into one row per known pair, in canonical order.
    pub fn capture(algorithm: Algorithm, table: &QTable, visits: &VisitCounts) -> Self {
        let mut rows: BTreeMap<Key, (f64, u64)> = BTreeMap::new();
        for ((state, action), value) in &table.values {
            rows.entry((state.clone(), *action)).or_default().0 = *value;
        }
        for ((state, action), count) in &visits.counts {
            rows.entry((state.clone(), *action)).or_default().1 = *count;
        }
        let entries = rows
            .into_iter()
            .map(|((state, action), (value, visits))| TableEntry {
                state,
                action,
                value,
                visits,
            })
            .collect();
        Self { algorithm, entries }
    }

    /// Rebuilds both tables, rejecting any row outside `space`.
    pub fn into_tables(self, space: StateActionSpace) -> Result<(QTable, VisitCounts), GameError> {
        let mut table = QTable::new(space);
        let mut visits = VisitCounts::new(space);
        for entry in self.entries {
            space.validate(&entry.state)?;
            if entry.visits > 0 {
                visits
                    .counts
                    .insert((entry.state.clone(), entry.action), entry.visits);
            }
            table.values.insert((entry.state, entry.action), entry.value);
        }
        Ok((table, visits))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
