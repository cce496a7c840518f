//! Catalog persistence: the two JSON definitions documents.
//!
//! Both documents are `{"achievements": [...]}` with planned/completed
//! flags stored as "0"/"1" strings. Loading parses each file once into a
//! raw document that is retained for the lifetime of the session; saving
//! rewrites only the flag fields of dirty records inside the retained
//! documents and then serializes each touched document in full. Every
//! other field passes through untouched.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::store::AchievementStore;
use crate::catalog::types::{AchievementRecord, FamilyId, Level, LeveledFamily, ListAchievement};
use crate::errors::{CatalogError, SaveError};
use crate::rewards::RewardTable;

pub const LEVELED_FILE: &str = "leveled_achievements.json";
pub const LIST_FILE: &str = "list_achievements.json";

/// Tier labels in ascending order; a family cannot be deeper than this.
const ROMAN_TIERS: &[&str] = &["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// Locations of the two definitions documents.
#[derive(Debug, Clone)]
pub struct CatalogPaths {
    pub leveled: PathBuf,
    pub list: PathBuf,
}

impl CatalogPaths {
    pub fn new(leveled: PathBuf, list: PathBuf) -> Self {
        Self { leveled, list }
    }

    /// Both documents under one directory, with the standard file names.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            leveled: dir.join(LEVELED_FILE),
            list: dir.join(LIST_FILE),
        }
    }

    /// The platform data directory for this tool.
    pub fn default_paths() -> io::Result<Self> {
        let dirs = ProjectDirs::from("", "", "trophy").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not determine data directory")
        })?;
        Ok(Self::in_dir(dirs.data_dir()))
    }
}

// Wire rows. Field names match the documents; serde reports any missing
// field with its name, which becomes the fatal load error.

#[derive(Debug, Deserialize)]
struct LeveledDoc {
    achievements: Vec<LeveledRow>,
}

#[derive(Debug, Deserialize)]
struct LeveledRow {
    category: String,
    title: String,
    description: String,
    info: String,
    overall_completed: String,
    levels: Vec<LevelRow>,
}

#[derive(Debug, Deserialize)]
struct LevelRow {
    rom_num: String,
    is_planned: String,
    is_completed: String,
    num_tasks: u32,
    points: u32,
    reward_amount: u64,
    reward: String,
}

#[derive(Debug, Deserialize)]
struct ListDoc {
    achievements: Vec<ListRow>,
}

#[derive(Debug, Deserialize)]
struct ListRow {
    category: String,
    title: String,
    description: String,
    task_list: Vec<String>,
    is_planned: String,
    is_completed: String,
    points: u32,
    reward_amount: u64,
    reward: String,
    info: String,
}

/// Where a record lives inside the retained documents.
#[derive(Debug, Clone, Copy)]
enum DocSlot {
    Leveled(usize),
    List(usize),
}

/// The parsed raw documents, retained for partial rewriting on save.
#[derive(Debug)]
pub struct CatalogDocuments {
    paths: CatalogPaths,
    leveled_doc: Value,
    list_doc: Value,
    /// Record index -> row in its document.
    slots: Vec<DocSlot>,
}

/// Reads both documents, builds the store, and returns it together with
/// the retained document handles. Any structural problem is fatal.
pub fn load(
    paths: CatalogPaths,
    rewards: &RewardTable,
) -> Result<(AchievementStore, CatalogDocuments), CatalogError> {
    let leveled_doc = read_document(&paths.leveled)?;
    let list_doc = read_document(&paths.list)?;

    let leveled_rows: LeveledDoc =
        serde_json::from_value(leveled_doc.clone()).map_err(|source| CatalogError::Json {
            path: paths.leveled.clone(),
            source,
        })?;
    let list_rows: ListDoc =
        serde_json::from_value(list_doc.clone()).map_err(|source| CatalogError::Json {
            path: paths.list.clone(),
            source,
        })?;

    let mut titles: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    let mut slots = Vec::new();
    let mut position = 0usize;

    for (row, raw) in leveled_rows.achievements.into_iter().enumerate() {
        if !titles.insert(raw.title.clone()) {
            return Err(CatalogError::DuplicateTitle { title: raw.title });
        }
        let family = build_family(FamilyId(records.len()), raw, rewards, &mut position)?;
        records.push(AchievementRecord::Leveled(family));
        slots.push(DocSlot::Leveled(row));
    }
    for (row, raw) in list_rows.achievements.into_iter().enumerate() {
        if !titles.insert(raw.title.clone()) {
            return Err(CatalogError::DuplicateTitle { title: raw.title });
        }
        let record = build_list(raw, rewards, &mut position)?;
        records.push(AchievementRecord::List(record));
        slots.push(DocSlot::List(row));
    }

    let mut store = AchievementStore::new(records);
    let repaired = store.repair_invariants();
    if repaired > 0 {
        warn!(repaired, "catalog invariants repaired at load");
    }
    info!(records = store.len(), "catalog loaded");

    Ok((
        store,
        CatalogDocuments {
            paths,
            leveled_doc,
            list_doc,
            slots,
        },
    ))
}

fn build_family(
    id: FamilyId,
    raw: LeveledRow,
    rewards: &RewardTable,
    position: &mut usize,
) -> Result<LeveledFamily, CatalogError> {
    if raw.levels.is_empty() {
        return Err(CatalogError::EmptyLevels { title: raw.title });
    }
    let mut levels = Vec::with_capacity(raw.levels.len());
    for (i, level) in raw.levels.into_iter().enumerate() {
        let expected = ROMAN_TIERS.get(i).copied().unwrap_or("?");
        if level.rom_num != expected {
            return Err(CatalogError::TierOrder {
                title: raw.title,
                expected: expected.to_string(),
                found: level.rom_num,
            });
        }
        if !rewards.contains(&level.reward) {
            return Err(CatalogError::UnknownReward {
                title: raw.title,
                reward: level.reward,
            });
        }
        levels.push(Level {
            family: id,
            rom_num: level.rom_num,
            planned: parse_flag(&level.is_planned, &raw.title, "is_planned")?,
            completed: parse_flag(&level.is_completed, &raw.title, "is_completed")?,
            num_tasks: level.num_tasks,
            points: level.points,
            reward: level.reward,
            reward_amount: level.reward_amount,
            position: *position,
        });
        *position += 1;
    }
    // The stored overall flag is a mirror; memory derives it from the
    // last tier.
    let mirrored = parse_flag(&raw.overall_completed, &raw.title, "overall_completed")?;
    let derived = levels.last().is_some_and(|l| l.completed);
    if mirrored != derived {
        warn!(
            title = raw.title.as_str(),
            "stored overall_completed disagrees with last tier"
        );
    }
    Ok(LeveledFamily {
        id,
        category: raw.category,
        title: raw.title,
        description: raw.description,
        info: raw.info,
        levels,
    })
}

fn build_list(
    raw: ListRow,
    rewards: &RewardTable,
    position: &mut usize,
) -> Result<ListAchievement, CatalogError> {
    if !rewards.contains(&raw.reward) {
        return Err(CatalogError::UnknownReward {
            title: raw.title,
            reward: raw.reward,
        });
    }
    let record = ListAchievement {
        planned: parse_flag(&raw.is_planned, &raw.title, "is_planned")?,
        completed: parse_flag(&raw.is_completed, &raw.title, "is_completed")?,
        category: raw.category,
        title: raw.title,
        description: raw.description,
        task_list: raw.task_list,
        points: raw.points,
        reward: raw.reward,
        reward_amount: raw.reward_amount,
        info: raw.info,
        position: *position,
    };
    *position += 1;
    Ok(record)
}

fn parse_flag(raw: &str, title: &str, field: &'static str) -> Result<bool, CatalogError> {
    match raw {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(CatalogError::InvalidFlag {
            title: title.to_string(),
            field,
            value: raw.to_string(),
        }),
    }
}

fn read_document(path: &Path) -> Result<Value, CatalogError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl CatalogDocuments {
    pub fn paths(&self) -> &CatalogPaths {
        &self.paths
    }

    /// Rewrites the flag fields of every dirty record inside the
    /// retained documents, then serializes each touched document in
    /// full. The output is built in memory before any file is written,
    /// and in-memory state is never modified here, so a failed save can
    /// simply be retried.
    pub fn save(&mut self, store: &AchievementStore, dirty: &[usize]) -> Result<(), SaveError> {
        let mut touched_leveled = false;
        let mut touched_list = false;
        for &index in dirty {
            let (Some(slot), Some(record)) = (self.slots.get(index), store.get(index)) else {
                continue;
            };
            match (slot, record) {
                (DocSlot::Leveled(row), AchievementRecord::Leveled(family)) => {
                    write_family(&mut self.leveled_doc, *row, family);
                    touched_leveled = true;
                }
                (DocSlot::List(row), AchievementRecord::List(a)) => {
                    write_list(&mut self.list_doc, *row, a);
                    touched_list = true;
                }
                // Slots were built from the same rows as the records, so
                // the kinds cannot disagree.
                _ => {}
            }
        }
        if touched_leveled {
            write_document(&self.paths.leveled, &self.leveled_doc)?;
        }
        if touched_list {
            write_document(&self.paths.list, &self.list_doc)?;
        }
        info!(records = dirty.len(), "catalog saved");
        Ok(())
    }
}

fn flag(value: bool) -> Value {
    Value::String(if value { "1" } else { "0" }.to_string())
}

fn write_family(doc: &mut Value, row: usize, family: &LeveledFamily) {
    let Some(entry) = doc
        .get_mut("achievements")
        .and_then(|a| a.get_mut(row))
    else {
        return;
    };
    entry["overall_completed"] = flag(family.overall_completed());
    if let Some(rows) = entry.get_mut("levels").and_then(Value::as_array_mut) {
        for (level, slot) in family.levels.iter().zip(rows.iter_mut()) {
            slot["is_planned"] = flag(level.planned);
            slot["is_completed"] = flag(level.completed);
        }
    }
}

fn write_list(doc: &mut Value, row: usize, a: &ListAchievement) {
    let Some(entry) = doc
        .get_mut("achievements")
        .and_then(|d| d.get_mut(row))
    else {
        return;
    };
    entry["is_planned"] = flag(a.planned);
    entry["is_completed"] = flag(a.completed);
}

fn write_document(path: &Path, doc: &Value) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(doc).map_err(|source| SaveError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}
