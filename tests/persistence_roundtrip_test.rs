//! Integration test: catalog persistence
//!
//! Saves rewrite only the planned/completed flag fields (and the
//! mirrored overall flag) of dirty records; every other field and the
//! document structure pass through byte for byte. Loading the saved
//! file reproduces the in-memory flags exactly, and a failed save
//! leaves memory intact for a retry.

mod common;

use std::fs;

use common::{leveled_doc, list_doc, write_catalog, OVERACHIEVER, PACIFIST, WIN_MATCHES};
use serde_json::{json, Value};
use trophy::{AchievementRecord, CatalogError, CatalogPaths, TrackerContext};

fn read_doc(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_save_then_load_reproduces_the_flags() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_catalog(dir.path(), &leveled_doc(), &list_doc());
    let mut ctx = TrackerContext::load(paths.clone()).unwrap();

    ctx.toggle_completed(WIN_MATCHES, Some(1), true).unwrap();
    ctx.toggle_planned(PACIFIST, Some(2), true).unwrap();
    ctx.toggle_completed(OVERACHIEVER, None, true).unwrap();
    let saved = ctx.save().unwrap();
    assert_eq!(saved, 3);

    let reloaded = TrackerContext::load(paths).unwrap();
    let AchievementRecord::Leveled(win) = reloaded.store.get(WIN_MATCHES).unwrap() else {
        panic!("expected leveled record");
    };
    let completed: Vec<bool> = win.levels.iter().map(|l| l.completed).collect();
    assert_eq!(completed, vec![true, true, false]);
    let AchievementRecord::Leveled(pacifist) = reloaded.store.get(PACIFIST).unwrap() else {
        panic!("expected leveled record");
    };
    let planned: Vec<bool> = pacifist.levels.iter().map(|l| l.planned).collect();
    assert_eq!(planned, vec![true, true, true, false, false]);
    let AchievementRecord::List(over) = reloaded.store.get(OVERACHIEVER).unwrap() else {
        panic!("expected list record");
    };
    assert!(over.completed);
    assert!(!over.planned);
}

#[test]
fn test_saved_document_differs_from_original_only_in_flags() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_catalog(dir.path(), &leveled_doc(), &list_doc());
    let mut ctx = TrackerContext::load(paths.clone()).unwrap();

    ctx.toggle_completed(WIN_MATCHES, Some(2), true).unwrap();
    ctx.save().unwrap();

    // Applying the expected flag edits to the original document must
    // reproduce the saved file exactly: same fields, same order.
    let mut expected = leveled_doc();
    for level in 0..3 {
        expected["achievements"][0]["levels"][level]["is_completed"] = json!("1");
    }
    expected["achievements"][0]["overall_completed"] = json!("1");
    assert_eq!(read_doc(&paths.leveled), expected);
}

#[test]
fn test_reloading_reproduces_stats_totals() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_catalog(dir.path(), &leveled_doc(), &list_doc());
    let mut ctx = TrackerContext::load(paths.clone()).unwrap();
    ctx.toggle_completed(PACIFIST, Some(3), true).unwrap();
    ctx.toggle_planned(WIN_MATCHES, Some(0), true).unwrap();
    ctx.save().unwrap();
    let before = ctx.overview();

    let reloaded = TrackerContext::load(paths).unwrap();
    let after = reloaded.overview();

    assert_eq!(before.overall, after.overall);
    assert_eq!(before.categories, after.categories);
    assert_eq!(before.rewards, after.rewards);
}

// =============================================================================
// Partial writes
// =============================================================================

#[test]
fn test_untouched_document_is_not_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_catalog(dir.path(), &leveled_doc(), &list_doc());
    let list_bytes_before = fs::read(&paths.list).unwrap();
    let mut ctx = TrackerContext::load(paths.clone()).unwrap();

    // Only a leveled record changes; the list document stays untouched.
    ctx.toggle_completed(WIN_MATCHES, Some(0), true).unwrap();
    ctx.save().unwrap();

    assert_eq!(fs::read(&paths.list).unwrap(), list_bytes_before);
    assert_ne!(
        fs::read(&paths.leveled).unwrap(),
        serde_json::to_string_pretty(&leveled_doc()).unwrap().into_bytes()
    );
}

#[test]
fn test_save_with_no_changes_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_catalog(dir.path(), &leveled_doc(), &list_doc());
    let leveled_before = fs::read(&paths.leveled).unwrap();
    let mut ctx = TrackerContext::load(paths.clone()).unwrap();

    assert_eq!(ctx.save().unwrap(), 0);

    assert_eq!(fs::read(&paths.leveled).unwrap(), leveled_before);
}

#[test]
fn test_overall_completed_mirror_follows_the_last_tier() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_catalog(dir.path(), &leveled_doc(), &list_doc());
    let mut ctx = TrackerContext::load(paths.clone()).unwrap();

    ctx.toggle_completed(PACIFIST, Some(4), true).unwrap();
    ctx.save().unwrap();
    assert_eq!(read_doc(&paths.leveled)["achievements"][1]["overall_completed"], json!("1"));

    ctx.toggle_completed(PACIFIST, Some(2), false).unwrap();
    ctx.save().unwrap();
    assert_eq!(read_doc(&paths.leveled)["achievements"][1]["overall_completed"], json!("0"));
}

// =============================================================================
// Save failure and retry
// =============================================================================

#[test]
fn test_failed_save_keeps_state_and_retry_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_catalog(dir.path(), &leveled_doc(), &list_doc());
    let mut ctx = TrackerContext::load(paths.clone()).unwrap();
    ctx.toggle_completed(WIN_MATCHES, Some(0), true).unwrap();

    // Make the target unwritable by replacing the file with a directory.
    fs::remove_file(&paths.leveled).unwrap();
    fs::create_dir(&paths.leveled).unwrap();
    assert!(ctx.save().is_err());

    // Memory is intact and the record is still dirty.
    assert_eq!(ctx.store.dirty_indices(), vec![WIN_MATCHES]);
    let AchievementRecord::Leveled(win) = ctx.store.get(WIN_MATCHES).unwrap() else {
        panic!("expected leveled record");
    };
    assert!(win.levels[0].completed);

    fs::remove_dir(&paths.leveled).unwrap();
    assert_eq!(ctx.save().unwrap(), 1);
    assert!(ctx.store.dirty_indices().is_empty());
    let saved = read_doc(&paths.leveled);
    assert_eq!(saved["achievements"][0]["levels"][0]["is_completed"], json!("1"));
}

// =============================================================================
// Hand-edited catalogs
// =============================================================================

#[test]
fn test_hand_edited_inconsistency_is_repaired_and_normalized_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut leveled = leveled_doc();
    // Tier III completed above incomplete tiers: repairable, not fatal.
    leveled["achievements"][0]["levels"][2]["is_completed"] = json!("1");
    let paths = write_catalog(dir.path(), &leveled, &list_doc());

    let mut ctx = TrackerContext::load(paths.clone()).unwrap();

    let AchievementRecord::Leveled(win) = ctx.store.get(WIN_MATCHES).unwrap() else {
        panic!("expected leveled record");
    };
    assert!(win.levels.iter().all(|l| l.completed));
    // The repair seeds stats from the corrected state.
    assert_eq!(ctx.overview().overall.completed_achievements, 3);

    // The repaired record is dirty; saving normalizes the file.
    ctx.save().unwrap();
    let saved = read_doc(&paths.leveled);
    for level in 0..3 {
        assert_eq!(saved["achievements"][0]["levels"][level]["is_completed"], json!("1"));
    }
    assert_eq!(saved["achievements"][0]["overall_completed"], json!("1"));
}

// =============================================================================
// Fatal load errors
// =============================================================================

#[test]
fn test_missing_document_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let paths = CatalogPaths::in_dir(dir.path());
    assert!(matches!(
        TrackerContext::load(paths),
        Err(CatalogError::Io { .. })
    ));
}

#[test]
fn test_missing_required_field_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut leveled = leveled_doc();
    leveled["achievements"][0]
        .as_object_mut()
        .unwrap()
        .remove("category");
    let paths = write_catalog(dir.path(), &leveled, &list_doc());
    assert!(matches!(
        TrackerContext::load(paths),
        Err(CatalogError::Json { .. })
    ));
}

#[test]
fn test_malformed_flag_string_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut list = list_doc();
    list["achievements"][0]["is_completed"] = json!("true");
    let paths = write_catalog(dir.path(), &leveled_doc(), &list);
    assert!(matches!(
        TrackerContext::load(paths),
        Err(CatalogError::InvalidFlag { field: "is_completed", .. })
    ));
}
