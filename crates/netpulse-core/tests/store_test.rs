// Integration tests for ResultStore.

#![allow(clippy::unwrap_used)]

use chrono::{TimeDelta, TimeZone, Utc};
use netpulse_core::{
    AggregatorConfig, CliTunnelProbe, CoreError, HealthAggregator, HealthSnapshot, ProbeConfig,
    ResultStore, ScriptedExecutor, SimulatedController, TunnelTopology,
};
use pretty_assertions::assert_eq;

async fn lab_snapshot() -> HealthSnapshot {
    let config = ProbeConfig::default();
    let topology = TunnelTopology::default();
    let probe = CliTunnelProbe::new(ScriptedExecutor::lab(&topology, &config), config);
    HealthAggregator::new(
        SimulatedController::sandbox(),
        probe,
        topology,
        AggregatorConfig::default(),
    )
    .snapshot()
    .await
}

#[tokio::test]
async fn test_save_creates_directories_and_names_by_utc_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::new(dir.path().join("results").join("nested"));

    let mut snapshot = lab_snapshot().await;
    snapshot.timestamp = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 5).unwrap();
    let path = store.save("snapshot", &snapshot).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "snapshot_20250601_083005.json"
    );
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\n  \"overall_status\": \"active\""));
}

#[tokio::test]
async fn test_history_round_trip_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::new(dir.path());
    let snapshot = lab_snapshot().await;

    let first_path = store.save("snapshot", &snapshot).unwrap();
    let newest = store.load_history("snapshot").unwrap().next().unwrap().unwrap();
    assert_eq!(newest, snapshot);

    // Re-saving the loaded entry under a fresh name reproduces the bytes
    let copy = ResultStore::new(dir.path().join("copy"));
    let second_path = copy.save("snapshot", &newest).unwrap();
    assert_eq!(
        std::fs::read_to_string(first_path).unwrap(),
        std::fs::read_to_string(second_path).unwrap()
    );
}

#[tokio::test]
async fn test_same_second_collision_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::new(dir.path());
    let mut snapshot = lab_snapshot().await;
    snapshot.timestamp = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 5).unwrap();

    let path = store.save("snapshot", &snapshot).unwrap();
    let original = std::fs::read_to_string(&path).unwrap();

    snapshot.timestamp += TimeDelta::milliseconds(400);
    snapshot.devices = None;
    let err = store.save("snapshot", &snapshot).unwrap_err();
    assert!(matches!(err, CoreError::SnapshotExists { .. }));

    // The first snapshot is untouched
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[tokio::test]
async fn test_history_is_newest_first_and_namespace_scoped() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::new(dir.path());
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    let mut snapshot = lab_snapshot().await;

    for minutes in [5, 1, 3] {
        snapshot.timestamp = base + TimeDelta::minutes(minutes);
        store.save("snapshot", &snapshot).unwrap();
    }
    store
        .save_document("snapshot_devices", &vec!["HQ-Router"], base)
        .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

    let timestamps: Vec<_> = store
        .load_history("snapshot")
        .unwrap()
        .map(|s| s.unwrap().timestamp)
        .collect();
    assert_eq!(
        timestamps,
        vec![
            base + TimeDelta::minutes(5),
            base + TimeDelta::minutes(3),
            base + TimeDelta::minutes(1),
        ]
    );

    let latest_two: Vec<_> = store.load_history("snapshot").unwrap().take(2).collect();
    assert_eq!(latest_two.len(), 2);

    let devices = store.entries("snapshot_devices").unwrap();
    assert_eq!(devices.len(), 1);
    let names: Vec<String> = devices[0].load_as().unwrap();
    assert_eq!(names, vec!["HQ-Router".to_owned()]);
}

#[test]
fn test_missing_directory_is_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::new(dir.path().join("never-created"));
    assert_eq!(store.load_history("snapshot").unwrap().count(), 0);
    assert!(!store.root().exists());
}

#[test]
fn test_corrupt_entry_surfaces_as_item_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("snapshot_20250601_080000.json"), "{ not json").unwrap();
    let store = ResultStore::new(dir.path());

    let mut history = store.load_history("snapshot").unwrap();
    assert!(matches!(
        history.next(),
        Some(Err(CoreError::Serialization(_)))
    ));
    assert!(history.next().is_none());
}

#[test]
fn test_invalid_namespace_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = ResultStore::new(dir.path());
    let err = store
        .save_document("../escape", &1, Utc::now())
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidNamespace { .. }));
}
