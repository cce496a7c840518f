//! Achievement record types.
//!
//! The catalog holds two kinds of record: multi-tier families
//! ([`LeveledFamily`]) and flat checklist achievements
//! ([`ListAchievement`]), unified behind the [`AchievementRecord`] sum
//! type. Points and reward values are fixed at load; only the planned and
//! completed flags change at runtime.

/// Identifies a leveled family within the store.
///
/// Stored on every level so sibling lookup never depends on where the
/// family sits in the global record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FamilyId(pub usize);

/// Which display grouping a record currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Active,
    Completed,
}

/// One tier of a leveled achievement family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub family: FamilyId,
    /// Roman-numeral tier label, "I" upward.
    pub rom_num: String,
    pub planned: bool,
    pub completed: bool,
    /// Task count this tier requires; substituted into the family
    /// description template.
    pub num_tasks: u32,
    pub points: u32,
    /// Reward currency key, validated against the reward table at load.
    pub reward: String,
    pub reward_amount: u64,
    /// Stable index of this level in the global display list.
    pub position: usize,
}

/// A multi-tier achievement ("win N matches", tiers I..V).
///
/// Tier completion is monotone: a completed tier implies every lower
/// tier is completed. `overall_completed` is always derived from the
/// last tier, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeveledFamily {
    pub id: FamilyId,
    pub category: String,
    pub title: String,
    /// Description template containing a `{num_tasks}` placeholder.
    pub description: String,
    pub info: String,
    /// Tiers in ascending order; never empty after a successful load.
    pub levels: Vec<Level>,
}

impl LeveledFamily {
    /// True iff the last tier is completed.
    pub fn overall_completed(&self) -> bool {
        self.levels.last().is_some_and(|l| l.completed)
    }

    /// Index of the tier currently shown to the user: the lowest
    /// incomplete tier, or the last tier once the family is done.
    pub fn active_tier(&self) -> usize {
        self.levels
            .iter()
            .position(|l| !l.completed)
            .unwrap_or(self.levels.len() - 1)
    }

    /// Description of one tier, with the task count filled in.
    pub fn level_description(&self, tier: usize) -> String {
        let num_tasks = self.levels[tier].num_tasks;
        self.description
            .replace("{num_tasks}", &num_tasks.to_string())
    }

    pub fn grouping(&self) -> Grouping {
        if self.overall_completed() {
            Grouping::Completed
        } else {
            Grouping::Active
        }
    }
}

/// A flat achievement defined by a checklist of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAchievement {
    pub category: String,
    pub title: String,
    pub description: String,
    pub task_list: Vec<String>,
    pub planned: bool,
    pub completed: bool,
    pub points: u32,
    pub reward: String,
    pub reward_amount: u64,
    pub info: String,
    /// Stable index of this record in the global display list.
    pub position: usize,
}

impl ListAchievement {
    pub fn grouping(&self) -> Grouping {
        if self.completed {
            Grouping::Completed
        } else {
            Grouping::Active
        }
    }
}

/// One entry in the global achievement list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AchievementRecord {
    Leveled(LeveledFamily),
    List(ListAchievement),
}

impl AchievementRecord {
    pub fn title(&self) -> &str {
        match self {
            AchievementRecord::Leveled(f) => &f.title,
            AchievementRecord::List(a) => &a.title,
        }
    }

    pub fn category(&self) -> &str {
        match self {
            AchievementRecord::Leveled(f) => &f.category,
            AchievementRecord::List(a) => &a.category,
        }
    }

    pub fn grouping(&self) -> Grouping {
        match self {
            AchievementRecord::Leveled(f) => f.grouping(),
            AchievementRecord::List(a) => a.grouping(),
        }
    }

    /// Points still obtainable plus points already earned, i.e. the sum
    /// over every tier (or the single record).
    pub fn total_points(&self) -> u32 {
        match self {
            AchievementRecord::Leveled(f) => f.levels.iter().map(|l| l.points).sum(),
            AchievementRecord::List(a) => a.points,
        }
    }
}
