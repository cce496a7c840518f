//! Running progress totals and the bonus-milestone ladder.
//!
//! The aggregator keeps a flat map from stat key to integer. `possible_*`
//! totals are seeded once from the loaded catalog and never change; the
//! completed and planned totals move only through [`StatsAggregator::apply_delta`],
//! which is the sole mutation entry point. Crossing a rung of the
//! milestone ladder with the overall completed-points total grants (or,
//! crossing back down, revokes) a one-time bonus reward.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::catalog::store::AchievementStore;
use crate::catalog::types::AchievementRecord;

/// Which running total a key tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Completed,
    Planned,
    Possible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Achievements,
    Points,
}

/// Overall, or narrowed to one achievement category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Overall,
    Category(String),
}

impl Scope {
    pub fn category(name: &str) -> Self {
        Scope::Category(name.to_string())
    }
}

/// A single stat cell: counts/points per scope, or a reward-currency
/// amount. Category and currency vocabularies are open string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatKey {
    Tally {
        counter: Counter,
        metric: Metric,
        scope: Scope,
    },
    Reward {
        counter: Counter,
        currency: String,
    },
}

impl StatKey {
    pub fn tally(counter: Counter, metric: Metric, scope: Scope) -> Self {
        StatKey::Tally {
            counter,
            metric,
            scope,
        }
    }

    pub fn reward(counter: Counter, currency: &str) -> Self {
        StatKey::Reward {
            counter,
            currency: currency.to_string(),
        }
    }

    /// The one key whose deltas are checked against the milestone ladder.
    fn completed_points_overall() -> Self {
        StatKey::Tally {
            counter: Counter::Completed,
            metric: Metric::Points,
            scope: Scope::Overall,
        }
    }
}

/// One rung of the bonus ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub threshold: i64,
    pub reward: String,
    pub reward_amount: i64,
}

/// Static form of a ladder rung, for the built-in table.
#[derive(Debug, Clone, Copy)]
pub struct MilestoneDef {
    pub threshold: i64,
    pub reward: &'static str,
    pub reward_amount: i64,
}

/// Built-in bonus schedule: cumulative completed points against one-time
/// rewards, ascending.
pub const MILESTONE_LADDER: &[MilestoneDef] = &[
    MilestoneDef {
        threshold: 100,
        reward: "silver",
        reward_amount: 500,
    },
    MilestoneDef {
        threshold: 300,
        reward: "classic_crate_coupon",
        reward_amount: 1,
    },
    MilestoneDef {
        threshold: 600,
        reward: "silver",
        reward_amount: 1000,
    },
    MilestoneDef {
        threshold: 1000,
        reward: "premium_crate_coupon",
        reward_amount: 1,
    },
    MilestoneDef {
        threshold: 1500,
        reward: "silver",
        reward_amount: 2000,
    },
    MilestoneDef {
        threshold: 2250,
        reward: "premium_crate_coupon",
        reward_amount: 1,
    },
    MilestoneDef {
        threshold: 3000,
        reward: "silver",
        reward_amount: 5000,
    },
];

impl From<&MilestoneDef> for Milestone {
    fn from(def: &MilestoneDef) -> Self {
        Milestone {
            threshold: def.threshold,
            reward: def.reward.to_string(),
            reward_amount: def.reward_amount,
        }
    }
}

fn default_ladder() -> Vec<Milestone> {
    MILESTONE_LADDER.iter().map(Milestone::from).collect()
}

/// Flat stat map plus the milestone ladder.
#[derive(Debug)]
pub struct StatsAggregator {
    totals: HashMap<StatKey, i64>,
    milestones: Vec<Milestone>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::with_milestones(default_ladder())
    }

    /// Ladder must be ascending by threshold; callers and tests may pass
    /// their own schedule (or an empty one).
    pub fn with_milestones(milestones: Vec<Milestone>) -> Self {
        Self {
            totals: HashMap::new(),
            milestones,
        }
    }

    /// Walks the store once, seeding possible totals for every level of
    /// every record and completed/planned totals from the loaded flags.
    /// Milestones already earned by the loaded completed points are
    /// granted during this walk.
    pub fn seed(store: &AchievementStore) -> Self {
        Self::seed_with(store, default_ladder())
    }

    pub fn seed_with(store: &AchievementStore, milestones: Vec<Milestone>) -> Self {
        let mut stats = Self::with_milestones(milestones);
        for record in store.records() {
            match record {
                AchievementRecord::Leveled(family) => {
                    for level in &family.levels {
                        stats.seed_entry(
                            &family.category,
                            level.points,
                            &level.reward,
                            level.reward_amount,
                            level.planned,
                            level.completed,
                        );
                    }
                }
                AchievementRecord::List(a) => {
                    stats.seed_entry(
                        &a.category,
                        a.points,
                        &a.reward,
                        a.reward_amount,
                        a.planned,
                        a.completed,
                    );
                }
            }
        }
        stats
    }

    fn seed_entry(
        &mut self,
        category: &str,
        points: u32,
        reward: &str,
        reward_amount: u64,
        planned: bool,
        completed: bool,
    ) {
        let mut counters = vec![Counter::Possible];
        if completed {
            counters.push(Counter::Completed);
        }
        if planned {
            counters.push(Counter::Planned);
        }
        for counter in counters {
            for scope in [Scope::Overall, Scope::category(category)] {
                self.apply_delta(StatKey::tally(counter, Metric::Achievements, scope.clone()), 1);
                self.apply_delta(
                    StatKey::tally(counter, Metric::Points, scope),
                    i64::from(points),
                );
            }
            self.apply_delta(StatKey::reward(counter, reward), reward_amount as i64);
        }
    }

    pub fn get(&self, key: &StatKey) -> i64 {
        self.totals.get(key).copied().unwrap_or(0)
    }

    /// Derived total: possible minus completed minus planned.
    pub fn remaining(&self, metric: Metric, scope: Scope) -> i64 {
        self.get(&StatKey::tally(Counter::Possible, metric, scope.clone()))
            - self.get(&StatKey::tally(Counter::Completed, metric, scope.clone()))
            - self.get(&StatKey::tally(Counter::Planned, metric, scope))
    }

    /// The sole mutation entry point. A delta to the overall completed
    /// points is checked against the milestone ladder; every other key
    /// is a plain add.
    pub fn apply_delta(&mut self, key: StatKey, delta: i64) {
        if delta == 0 {
            return;
        }
        let slot = self.totals.entry(key.clone()).or_insert(0);
        let prev = *slot;
        *slot += delta;
        let new = *slot;
        debug!(?key, delta, total = new, "stat delta");
        if key == StatKey::completed_points_overall() {
            self.check_milestones(prev, new);
        }
    }

    /// Deltas are one level's worth of points, so at most one rung can
    /// be crossed per call; the first match wins.
    fn check_milestones(&mut self, prev: i64, new: i64) {
        let crossed = self.milestones.iter().find_map(|m| {
            if prev < m.threshold && m.threshold <= new {
                Some((m.clone(), 1))
            } else if new < m.threshold && m.threshold <= prev {
                Some((m.clone(), -1))
            } else {
                None
            }
        });
        if let Some((milestone, sign)) = crossed {
            let amount = milestone.reward_amount * sign;
            info!(
                threshold = milestone.threshold,
                reward = milestone.reward.as_str(),
                amount,
                "milestone crossed"
            );
            *self
                .totals
                .entry(StatKey::reward(Counter::Completed, &milestone.reward))
                .or_insert(0) += amount;
        }
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of the overview: a scope's achievement and point totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewRow {
    pub label: String,
    pub completed_achievements: i64,
    pub planned_achievements: i64,
    pub possible_achievements: i64,
    pub completed_points: i64,
    pub planned_points: i64,
    pub possible_points: i64,
}

/// Reward-currency totals for one currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRow {
    pub currency: String,
    pub completed: i64,
    pub planned: i64,
    pub possible: i64,
}

/// Read-only snapshot of the aggregator for the presentation layer.
#[derive(Debug, Clone)]
pub struct Overview {
    pub overall: OverviewRow,
    pub categories: Vec<OverviewRow>,
    pub rewards: Vec<RewardRow>,
}

impl Overview {
    /// Categories appear in first-seen store order; currencies in the
    /// order the reward table lists them.
    pub fn collect(store: &AchievementStore, stats: &StatsAggregator, currencies: &[&str]) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for record in store.records() {
            if !categories.iter().any(|c| c == record.category()) {
                categories.push(record.category().to_string());
            }
        }
        let overall = Self::row("Overall", Scope::Overall, stats);
        let categories = categories
            .into_iter()
            .map(|c| {
                let scope = Scope::Category(c.clone());
                Self::row(&c, scope, stats)
            })
            .collect();
        let rewards = currencies
            .iter()
            .map(|currency| RewardRow {
                currency: currency.to_string(),
                completed: stats.get(&StatKey::reward(Counter::Completed, currency)),
                planned: stats.get(&StatKey::reward(Counter::Planned, currency)),
                possible: stats.get(&StatKey::reward(Counter::Possible, currency)),
            })
            .collect();
        Self {
            overall,
            categories,
            rewards,
        }
    }

    fn row(label: &str, scope: Scope, stats: &StatsAggregator) -> OverviewRow {
        let get = |counter, metric| {
            stats.get(&StatKey::tally(counter, metric, scope.clone()))
        };
        OverviewRow {
            label: label.to_string(),
            completed_achievements: get(Counter::Completed, Metric::Achievements),
            planned_achievements: get(Counter::Planned, Metric::Achievements),
            possible_achievements: get(Counter::Possible, Metric::Achievements),
            completed_points: get(Counter::Completed, Metric::Points),
            planned_points: get(Counter::Planned, Metric::Points),
            possible_points: get(Counter::Possible, Metric::Points),
        }
    }
}
