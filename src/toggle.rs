//! Cascade rules for completed/planned transitions.
//!
//! Operations take the desired flag value (checkbox semantics), so
//! re-asserting the current state is a no-op. All validation happens
//! before the first mutation and the cascade itself cannot fail, so a
//! call either applies fully or returns an error having changed
//! nothing. Stats move only through [`StatsAggregator::apply_delta`];
//! the record (or its family) is marked dirty for the next save.

use tracing::debug;

use crate::catalog::store::AchievementStore;
use crate::catalog::types::{AchievementRecord, LeveledFamily, ListAchievement};
use crate::errors::ToggleError;
use crate::stats::{Counter, Metric, Scope, StatKey, StatsAggregator};

/// How the caller should refile the record after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reclassify {
    None,
    ToCompleted,
    ToActive,
}

/// What a toggle did, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// False when the call was a no-op (flag already in the requested
    /// state); no stats moved and nothing was marked dirty.
    pub changed: bool,
    pub reclassify: Reclassify,
    /// Tier now displayed for the family; `None` for list records.
    pub active_tier: Option<usize>,
}

/// Sets or clears the completed flag on a record, cascading through the
/// family: completing a tier completes every lower tier, un-completing a
/// tier un-completes every higher tier. Completion clears planned flags
/// on the affected tiers.
pub fn toggle_completed(
    store: &mut AchievementStore,
    stats: &mut StatsAggregator,
    index: usize,
    tier: Option<usize>,
    on: bool,
) -> Result<ToggleOutcome, ToggleError> {
    let record = store
        .get_mut(index)
        .ok_or(ToggleError::BadIndex(index))?;
    let outcome = match record {
        AchievementRecord::Leveled(family) => {
            let tier = require_tier(family, tier)?;
            debug!(index, tier, on, title = family.title.as_str(), "toggle completed");
            family_completed(family, stats, tier, on)
        }
        AchievementRecord::List(a) => {
            reject_tier(a, tier)?;
            debug!(index, on, title = a.title.as_str(), "toggle completed");
            list_completed(a, stats, on)
        }
    };
    if outcome.changed {
        store.mark_dirty(index);
    }
    Ok(outcome)
}

/// Sets or clears the planned flag. Planning a tier plans every lower
/// tier that is not already completed; un-planning clears the tier and
/// every higher tier. Never reclassifies the record.
pub fn toggle_planned(
    store: &mut AchievementStore,
    stats: &mut StatsAggregator,
    index: usize,
    tier: Option<usize>,
    on: bool,
) -> Result<ToggleOutcome, ToggleError> {
    let record = store
        .get_mut(index)
        .ok_or(ToggleError::BadIndex(index))?;
    let outcome = match record {
        AchievementRecord::Leveled(family) => {
            let tier = require_tier(family, tier)?;
            debug!(index, tier, on, title = family.title.as_str(), "toggle planned");
            family_planned(family, stats, tier, on)
        }
        AchievementRecord::List(a) => {
            reject_tier(a, tier)?;
            debug!(index, on, title = a.title.as_str(), "toggle planned");
            list_planned(a, stats, on)
        }
    };
    if outcome.changed {
        store.mark_dirty(index);
    }
    Ok(outcome)
}

fn require_tier(family: &LeveledFamily, tier: Option<usize>) -> Result<usize, ToggleError> {
    let tier = tier.ok_or_else(|| ToggleError::TierRequired {
        title: family.title.clone(),
    })?;
    if tier >= family.levels.len() {
        return Err(ToggleError::BadTier {
            title: family.title.clone(),
            tier,
        });
    }
    Ok(tier)
}

fn reject_tier(a: &ListAchievement, tier: Option<usize>) -> Result<(), ToggleError> {
    match tier {
        Some(_) => Err(ToggleError::NotLeveled {
            title: a.title.clone(),
        }),
        None => Ok(()),
    }
}

/// One flag change is worth six deltas: achievement count and points in
/// the overall and category scopes, plus the reward currency amount.
fn emit(
    stats: &mut StatsAggregator,
    counter: Counter,
    category: &str,
    points: u32,
    reward: &str,
    reward_amount: u64,
    sign: i64,
) {
    for scope in [Scope::Overall, Scope::category(category)] {
        stats.apply_delta(
            StatKey::tally(counter, Metric::Achievements, scope.clone()),
            sign,
        );
        stats.apply_delta(
            StatKey::tally(counter, Metric::Points, scope),
            sign * i64::from(points),
        );
    }
    stats.apply_delta(StatKey::reward(counter, reward), sign * reward_amount as i64);
}

fn unchanged(family: &LeveledFamily) -> ToggleOutcome {
    ToggleOutcome {
        changed: false,
        reclassify: Reclassify::None,
        active_tier: Some(family.active_tier()),
    }
}

fn family_completed(
    family: &mut LeveledFamily,
    stats: &mut StatsAggregator,
    tier: usize,
    on: bool,
) -> ToggleOutcome {
    let category = family.category.clone();
    let last = family.levels.len() - 1;
    if on {
        if family.levels[tier].completed {
            return unchanged(family);
        }
        for i in 0..=tier {
            let level = &mut family.levels[i];
            if level.completed {
                continue;
            }
            // Planned stats come back out before the completed stats go
            // in, so the planned totals never go negative elsewhere.
            if level.planned {
                level.planned = false;
                emit(
                    stats,
                    Counter::Planned,
                    &category,
                    level.points,
                    &level.reward,
                    level.reward_amount,
                    -1,
                );
            }
            level.completed = true;
            emit(
                stats,
                Counter::Completed,
                &category,
                level.points,
                &level.reward,
                level.reward_amount,
                1,
            );
        }
        let reclassify = if tier == last {
            Reclassify::ToCompleted
        } else {
            Reclassify::None
        };
        let active = if tier == last { last } else { tier + 1 };
        ToggleOutcome {
            changed: true,
            reclassify,
            active_tier: Some(active),
        }
    } else {
        if !family.levels[tier].completed {
            return unchanged(family);
        }
        let was_fully_completed = family.overall_completed();
        for i in tier..=last {
            let level = &mut family.levels[i];
            if !level.completed {
                continue;
            }
            level.completed = false;
            emit(
                stats,
                Counter::Completed,
                &category,
                level.points,
                &level.reward,
                level.reward_amount,
                -1,
            );
        }
        let reclassify = if was_fully_completed {
            Reclassify::ToActive
        } else {
            Reclassify::None
        };
        ToggleOutcome {
            changed: true,
            reclassify,
            active_tier: Some(tier),
        }
    }
}

fn family_planned(
    family: &mut LeveledFamily,
    stats: &mut StatsAggregator,
    tier: usize,
    on: bool,
) -> ToggleOutcome {
    let category = family.category.clone();
    let mut changed = false;
    if on {
        if family.levels[tier].completed {
            // Planning a completed tier is a no-op, but re-clear the
            // flag in case a hand-edited file slipped one through.
            let level = &mut family.levels[tier];
            if level.planned {
                level.planned = false;
                emit(
                    stats,
                    Counter::Planned,
                    &category,
                    level.points,
                    &level.reward,
                    level.reward_amount,
                    -1,
                );
                changed = true;
            }
        } else {
            for i in 0..=tier {
                let level = &mut family.levels[i];
                if level.completed || level.planned {
                    continue;
                }
                level.planned = true;
                emit(
                    stats,
                    Counter::Planned,
                    &category,
                    level.points,
                    &level.reward,
                    level.reward_amount,
                    1,
                );
                changed = true;
            }
        }
    } else {
        for i in tier..family.levels.len() {
            let level = &mut family.levels[i];
            if !level.planned {
                continue;
            }
            level.planned = false;
            emit(
                stats,
                Counter::Planned,
                &category,
                level.points,
                &level.reward,
                level.reward_amount,
                -1,
            );
            changed = true;
        }
    }
    ToggleOutcome {
        changed,
        reclassify: Reclassify::None,
        active_tier: Some(family.active_tier()),
    }
}

fn list_completed(
    a: &mut ListAchievement,
    stats: &mut StatsAggregator,
    on: bool,
) -> ToggleOutcome {
    if on {
        if a.completed {
            return ToggleOutcome {
                changed: false,
                reclassify: Reclassify::None,
                active_tier: None,
            };
        }
        if a.planned {
            a.planned = false;
            emit(
                stats,
                Counter::Planned,
                &a.category,
                a.points,
                &a.reward,
                a.reward_amount,
                -1,
            );
        }
        a.completed = true;
        emit(
            stats,
            Counter::Completed,
            &a.category,
            a.points,
            &a.reward,
            a.reward_amount,
            1,
        );
        ToggleOutcome {
            changed: true,
            reclassify: Reclassify::ToCompleted,
            active_tier: None,
        }
    } else {
        if !a.completed {
            return ToggleOutcome {
                changed: false,
                reclassify: Reclassify::None,
                active_tier: None,
            };
        }
        a.completed = false;
        emit(
            stats,
            Counter::Completed,
            &a.category,
            a.points,
            &a.reward,
            a.reward_amount,
            -1,
        );
        ToggleOutcome {
            changed: true,
            reclassify: Reclassify::ToActive,
            active_tier: None,
        }
    }
}

fn list_planned(a: &mut ListAchievement, stats: &mut StatsAggregator, on: bool) -> ToggleOutcome {
    let mut changed = false;
    if on {
        if a.completed {
            if a.planned {
                a.planned = false;
                emit(
                    stats,
                    Counter::Planned,
                    &a.category,
                    a.points,
                    &a.reward,
                    a.reward_amount,
                    -1,
                );
                changed = true;
            }
        } else if !a.planned {
            a.planned = true;
            emit(
                stats,
                Counter::Planned,
                &a.category,
                a.points,
                &a.reward,
                a.reward_amount,
                1,
            );
            changed = true;
        }
    } else if a.planned {
        a.planned = false;
        emit(
            stats,
            Counter::Planned,
            &a.category,
            a.points,
            &a.reward,
            a.reward_amount,
            -1,
        );
        changed = true;
    }
    ToggleOutcome {
        changed,
        reclassify: Reclassify::None,
        active_tier: None,
    }
}
