//! Tests for the fingerprinted dataset cache

use std::sync::Arc;

use churnlens::pipeline::{ChurnError, DatasetCache, LoadOptions};

#[path = "common/mod.rs"]
mod common;

use common::{create_bank_csv, csv_text, scenario_rows, write_text, BankRow};

#[test]
fn test_repeated_access_reuses_table() {
    let (_dir, path) = create_bank_csv(&scenario_rows());
    let mut cache = DatasetCache::new(&path, LoadOptions::default());
    assert!(cache.is_stale(), "nothing is cached yet");

    let first = cache.get_or_load().unwrap();
    let second = cache.get_or_load().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.load_count(), 1);
    assert!(!cache.is_stale());
}

#[test]
fn test_changed_file_triggers_reload() {
    let mut rows = scenario_rows();
    let (_dir, path) = create_bank_csv(&rows);
    let mut cache = DatasetCache::new(&path, LoadOptions::default());
    let first = cache.get_or_load().unwrap();
    assert_eq!(first.len(), 10);

    // Appending rows changes the length even when the mtime resolution is coarse
    rows.push(BankRow::new("Spain", "Male", 70, true));
    write_text(&path, &csv_text(&rows));

    assert!(cache.is_stale());
    let second = cache.get_or_load().unwrap();
    assert_eq!(second.len(), 11);
    assert_eq!(cache.load_count(), 2);

    // The old snapshot is still intact for whoever holds it
    assert_eq!(first.len(), 10);
}

#[test]
fn test_invalidate_forces_reload() {
    let (_dir, path) = create_bank_csv(&scenario_rows());
    let mut cache = DatasetCache::new(&path, LoadOptions::default());
    let first = cache.get_or_load().unwrap();

    cache.invalidate();
    let second = cache.get_or_load().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
    assert_eq!(cache.load_count(), 2);
}

#[test]
fn test_failed_load_is_not_cached() {
    let (_dir, path) = create_bank_csv(&scenario_rows());
    let mut cache = DatasetCache::new(&path, LoadOptions::default());
    cache.get_or_load().unwrap();

    write_text(&path, "CustomerId,Geography\n1,France\n");
    let err = cache.get_or_load().unwrap_err();
    assert!(matches!(err, ChurnError::Schema { .. }));

    // Restoring a valid file makes the cache usable again
    write_text(&path, &csv_text(&scenario_rows()));
    assert_eq!(cache.get_or_load().unwrap().len(), 10);
}

#[test]
fn test_missing_source() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut cache = DatasetCache::new(dir.path().join("gone.csv"), LoadOptions::default());
    assert!(cache.is_stale());
    assert!(matches!(cache.get_or_load().unwrap_err(), ChurnError::Io(_)));
}
