//! Per-conversation state.
//!
//! A `SessionState` tracks which entries of each category are still eligible
//! to be served, and which content intent was handled last so the restart
//! intent can phrase itself correctly.

use crate::catalog::Catalog;
use rand::{Rng, seq::IndexedRandom};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Where the conversation currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Beginning,
    /// A content intent was handled; holds its name.
    Content(String),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Beginning => write!(f, "beginning"),
            Stage::Content(intent) => write!(f, "{}", intent),
        }
    }
}

/// Whether a served entry stays eligible for later turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsumptionPolicy {
    /// Entries are sampled from the full pool every time; repeats are possible.
    #[default]
    AllowRepeats,
    /// A served entry is removed from its pool for the rest of the session.
    ConsumeServed,
}

impl FromStr for ConsumptionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "repeat" | "allow_repeats" => Ok(Self::AllowRepeats),
            "consume" | "consume_served" => Ok(Self::ConsumeServed),
            other => Err(format!(
                "'{}' is not a valid content policy (expected 'repeat' or 'consume')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    remaining: BTreeMap<String, Vec<String>>,
    stage: Stage,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds every catalog category that has no pool yet with its full entry list.
    ///
    /// Categories that already have a pool are left alone, so calling this on
    /// every turn is safe.
    pub fn ensure_initialized(&mut self, catalog: &Catalog) {
        for category in catalog.categories() {
            self.remaining
                .entry(category.id.clone())
                .or_insert_with(|| category.entries.clone());
        }
    }

    /// Picks one remaining entry of a category uniformly at random.
    ///
    /// Returns `None` when the category has no pool or its pool is empty.
    pub fn pick_next<R: Rng + ?Sized>(
        &mut self,
        category_id: &str,
        policy: ConsumptionPolicy,
        rng: &mut R,
    ) -> Option<String> {
        let pool = self.remaining.get_mut(category_id)?;
        let entry = pool.choose(rng)?.clone();
        if policy == ConsumptionPolicy::ConsumeServed {
            if let Some(pos) = pool.iter().position(|e| *e == entry) {
                pool.remove(pos);
            }
        }
        Some(entry)
    }

    /// True iff every tracked category pool is empty.
    pub fn all_exhausted(&self) -> bool {
        self.remaining.values().all(Vec::is_empty)
    }

    pub fn remaining(&self, category_id: &str) -> Option<&[String]> {
        self.remaining.get(category_id).map(Vec::as_slice)
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }
}
