//! Shared catalog fixtures for the integration suites.
//!
//! The sample catalog mirrors the shape of the real definitions files:
//! two leveled families and two list achievements across four
//! categories, with rewards drawn from the built-in vocabulary.
//!
//! Record indices: 0 = "Win Matches" (3 tiers), 1 = "Pacifist"
//! (5 tiers), 2 = "Overachiever" (list), 3 = "Weapon Master" (list).

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;
use trophy::{CatalogPaths, TrackerContext};

pub const WIN_MATCHES: usize = 0;
pub const PACIFIST: usize = 1;
pub const OVERACHIEVER: usize = 2;
pub const WEAPON_MASTER: usize = 3;

pub fn leveled_doc() -> Value {
    json!({
        "achievements": [
            {
                "category": "Matches",
                "title": "Win Matches",
                "description": "Win {num_tasks} classic matches",
                "info": "Squad wins count for every member.",
                "overall_completed": "0",
                "levels": [
                    {
                        "rom_num": "I",
                        "is_planned": "0",
                        "is_completed": "0",
                        "num_tasks": 1,
                        "points": 10,
                        "reward_amount": 500,
                        "reward": "bp"
                    },
                    {
                        "rom_num": "II",
                        "is_planned": "0",
                        "is_completed": "0",
                        "num_tasks": 5,
                        "points": 20,
                        "reward_amount": 1000,
                        "reward": "bp"
                    },
                    {
                        "rom_num": "III",
                        "is_planned": "0",
                        "is_completed": "0",
                        "num_tasks": 10,
                        "points": 50,
                        "reward_amount": 1,
                        "reward": "premium_crate_coupon"
                    }
                ]
            },
            {
                "category": "Glorious Moments",
                "title": "Pacifist",
                "description": "Win {num_tasks} matches without a single kill",
                "info": "",
                "overall_completed": "0",
                "levels": [
                    {
                        "rom_num": "I",
                        "is_planned": "0",
                        "is_completed": "0",
                        "num_tasks": 1,
                        "points": 5,
                        "reward_amount": 100,
                        "reward": "silver"
                    },
                    {
                        "rom_num": "II",
                        "is_planned": "0",
                        "is_completed": "0",
                        "num_tasks": 3,
                        "points": 10,
                        "reward_amount": 200,
                        "reward": "silver"
                    },
                    {
                        "rom_num": "III",
                        "is_planned": "0",
                        "is_completed": "0",
                        "num_tasks": 5,
                        "points": 15,
                        "reward_amount": 300,
                        "reward": "silver"
                    },
                    {
                        "rom_num": "IV",
                        "is_planned": "0",
                        "is_completed": "0",
                        "num_tasks": 10,
                        "points": 20,
                        "reward_amount": 400,
                        "reward": "silver"
                    },
                    {
                        "rom_num": "V",
                        "is_planned": "0",
                        "is_completed": "0",
                        "num_tasks": 20,
                        "points": 30,
                        "reward_amount": 1,
                        "reward": "premium_crate_coupon"
                    }
                ]
            }
        ]
    })
}

pub fn list_doc() -> Value {
    json!({
        "achievements": [
            {
                "category": "Progress",
                "title": "Overachiever",
                "description": "Finish every daily mission in one day",
                "task_list": ["Log in", "Finish all daily missions"],
                "is_planned": "0",
                "is_completed": "0",
                "points": 5,
                "reward_amount": 100,
                "reward": "bp",
                "info": ""
            },
            {
                "category": "Items",
                "title": "Weapon Master",
                "description": "Use every weapon class in ranked matches",
                "task_list": [
                    "Get a kill with an assault rifle",
                    "Get a kill with a sniper rifle",
                    "Get a kill with a shotgun"
                ],
                "is_planned": "0",
                "is_completed": "0",
                "points": 30,
                "reward_amount": 500,
                "reward": "silver",
                "info": "Kills must happen in ranked classic mode."
            }
        ]
    })
}

pub fn write_catalog(dir: &Path, leveled: &Value, list: &Value) -> CatalogPaths {
    let paths = CatalogPaths::in_dir(dir);
    fs::write(
        &paths.leveled,
        serde_json::to_string_pretty(leveled).unwrap(),
    )
    .unwrap();
    fs::write(&paths.list, serde_json::to_string_pretty(list).unwrap()).unwrap();
    paths
}

/// A fresh context over the sample catalog. The TempDir must stay alive
/// as long as the context may save.
pub fn sample_context() -> (TempDir, TrackerContext) {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_catalog(dir.path(), &leveled_doc(), &list_doc());
    let ctx = TrackerContext::load(paths).unwrap();
    (dir, ctx)
}
