//! The ordered collection of every achievement record.

use std::collections::BTreeSet;

use tracing::warn;

use crate::catalog::types::{AchievementRecord, FamilyId, Level, LeveledFamily};
use crate::errors::ToggleError;

/// All records in load order, plus dirty tracking for the next save.
///
/// Cascade logic reaches sibling tiers only through a family's own
/// bounded `levels` slice; nothing here walks the global list looking
/// for adjacent records.
#[derive(Debug)]
pub struct AchievementStore {
    records: Vec<AchievementRecord>,
    dirty: BTreeSet<usize>,
}

impl AchievementStore {
    pub fn new(records: Vec<AchievementRecord>) -> Self {
        Self {
            records,
            dirty: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AchievementRecord> {
        self.records.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut AchievementRecord> {
        self.records.get_mut(index)
    }

    /// All records in stable load order.
    pub fn records(&self) -> &[AchievementRecord] {
        &self.records
    }

    /// The family a level belongs to, by its explicit id.
    pub fn family(&self, id: FamilyId) -> Result<&LeveledFamily, ToggleError> {
        match self.records.get(id.0) {
            Some(AchievementRecord::Leveled(f)) => Ok(f),
            Some(record) => Err(ToggleError::NotLeveled {
                title: record.title().to_string(),
            }),
            None => Err(ToggleError::BadIndex(id.0)),
        }
    }

    /// Sibling tiers of a family in ascending tier order.
    pub fn family_levels(&self, id: FamilyId) -> Result<&[Level], ToggleError> {
        self.family(id).map(|f| f.levels.as_slice())
    }

    pub fn mark_dirty(&mut self, index: usize) {
        self.dirty.insert(index);
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.dirty.contains(&index)
    }

    /// Indices of records mutated since the last save, ascending.
    pub fn dirty_indices(&self) -> Vec<usize> {
        self.dirty.iter().copied().collect()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Repairs invariant violations a hand-edited catalog can carry:
    /// a completed tier above an incomplete one forces the lower tiers
    /// completed, and a tier both planned and completed drops the
    /// planned flag. Repaired records are marked dirty so the next save
    /// normalizes the file. Returns the number of flags changed.
    pub fn repair_invariants(&mut self) -> usize {
        let mut repaired = 0;
        for (index, record) in self.records.iter_mut().enumerate() {
            let mut touched = false;
            match record {
                AchievementRecord::Leveled(family) => {
                    let highest_completed = family.levels.iter().rposition(|l| l.completed);
                    if let Some(top) = highest_completed {
                        for level in &mut family.levels[..=top] {
                            if !level.completed {
                                warn!(
                                    title = family.title.as_str(),
                                    tier = level.rom_num.as_str(),
                                    "completing tier below a completed one"
                                );
                                level.completed = true;
                                repaired += 1;
                                touched = true;
                            }
                            if level.planned {
                                warn!(
                                    title = family.title.as_str(),
                                    tier = level.rom_num.as_str(),
                                    "clearing planned flag on completed tier"
                                );
                                level.planned = false;
                                repaired += 1;
                                touched = true;
                            }
                        }
                    }
                }
                AchievementRecord::List(a) => {
                    if a.completed && a.planned {
                        warn!(
                            title = a.title.as_str(),
                            "clearing planned flag on completed achievement"
                        );
                        a.planned = false;
                        repaired += 1;
                        touched = true;
                    }
                }
            }
            if touched {
                self.dirty.insert(index);
            }
        }
        repaired
    }
}
