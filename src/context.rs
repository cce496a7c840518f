//! The tracker context: everything built once at startup.
//!
//! Owns the store, the aggregator, the reward table, and the retained
//! document handles, and is passed by reference wherever the engine or
//! the presentation layer needs state. There is no other shared state
//! in the crate.

use crate::catalog::store::AchievementStore;
use crate::errors::{CatalogError, SaveError, ToggleError};
use crate::persistence::{self, CatalogDocuments, CatalogPaths};
use crate::rewards::RewardTable;
use crate::stats::{Overview, StatsAggregator};
use crate::toggle::{self, ToggleOutcome};

pub struct TrackerContext {
    pub store: AchievementStore,
    pub stats: StatsAggregator,
    pub rewards: RewardTable,
    docs: CatalogDocuments,
}

impl TrackerContext {
    /// Loads the catalog with the built-in reward vocabulary and seeds
    /// the aggregator with one walk over the store.
    pub fn load(paths: CatalogPaths) -> Result<Self, CatalogError> {
        Self::load_with(paths, RewardTable::base_game())
    }

    pub fn load_with(paths: CatalogPaths, rewards: RewardTable) -> Result<Self, CatalogError> {
        let (store, docs) = persistence::load(paths, &rewards)?;
        let stats = StatsAggregator::seed(&store);
        Ok(Self {
            store,
            stats,
            rewards,
            docs,
        })
    }

    pub fn toggle_completed(
        &mut self,
        index: usize,
        tier: Option<usize>,
        on: bool,
    ) -> Result<ToggleOutcome, ToggleError> {
        toggle::toggle_completed(&mut self.store, &mut self.stats, index, tier, on)
    }

    pub fn toggle_planned(
        &mut self,
        index: usize,
        tier: Option<usize>,
        on: bool,
    ) -> Result<ToggleOutcome, ToggleError> {
        toggle::toggle_planned(&mut self.store, &mut self.stats, index, tier, on)
    }

    /// Writes every dirty record back to the documents. Returns how many
    /// records were written; dirty marks are kept on failure so a retry
    /// writes the same set.
    pub fn save(&mut self) -> Result<usize, SaveError> {
        let dirty = self.store.dirty_indices();
        if dirty.is_empty() {
            return Ok(0);
        }
        self.docs.save(&self.store, &dirty)?;
        self.store.clear_dirty();
        Ok(dirty.len())
    }

    pub fn overview(&self) -> Overview {
        Overview::collect(&self.store, &self.stats, &self.rewards.keys())
    }
}
