//! Trait contract tests for CaseStore.
//!
//! Every backend runs the same checks: ordered restartable loads, append-only
//! growth, first-match similarity lookups, and lossless round-trips.

use chrono::{Duration, TimeZone, Utc};

use aircon_state::fakes::{MemoryCaseStore, UnavailableCaseStore};
use aircon_state::{
    CaseEntry, CaseKey, CaseStore, FanSpeed, FlapDirection, JsonlCaseStore, Mode, Movement,
    OutputRecord, SimilarityTolerance, StorageError, SurrealCaseStore,
};

fn key(room_temp: f64, humidity: f64, people: u32, movement: Movement, timing: &str) -> CaseKey {
    CaseKey {
        room_temp,
        humidity,
        num_people: people,
        movement,
        timing: timing.parse().unwrap(),
    }
}

fn output(room_temp: f64, humidity: f64, temp: f64) -> OutputRecord {
    OutputRecord {
        room_temp,
        humidity,
        suggested_ac_temp: temp,
        mode: Mode::Dry,
        fan_speed: FanSpeed::High,
        flap_direction: FlapDirection::Rotate,
        estimated_units_per_day: 22.36,
    }
}

/// Entries with strictly increasing timestamps so every backend agrees on order.
fn sequence(keys: Vec<CaseKey>) -> Vec<CaseEntry> {
    let base = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
    keys.into_iter()
        .enumerate()
        .map(|(i, k)| {
            let out = output(k.room_temp, k.humidity, 18.0 + i as f64);
            let mut entry = CaseEntry::new(k, out);
            entry.recorded_at = base + Duration::seconds(i as i64);
            entry
        })
        .collect()
}

async fn check_empty_store(store: &dyn CaseStore) {
    assert!(store.load_all().await.unwrap().is_empty());
    assert_eq!(store.len().await.unwrap(), 0);
    assert!(store.is_empty().await.unwrap());
    let probe = key(30.0, 50.0, 1, Movement::Yes, "10:00");
    assert!(store
        .query_similar(&probe, &SimilarityTolerance::default())
        .await
        .unwrap()
        .is_none());
}

async fn check_append_is_ordered_and_restartable(store: &dyn CaseStore) {
    let entries = sequence(vec![
        key(38.4, 66.1, 0, Movement::No, "23:00"),
        key(29.9, 41.0, 3, Movement::Yes, "13:20"),
        key(33.3, 58.8, 1, Movement::Yes, "09:05"),
    ]);
    for e in &entries {
        store.append(e).await.unwrap();
    }

    let first = store.load_all().await.unwrap();
    let second = store.load_all().await.unwrap();
    assert_eq!(first, entries);
    assert_eq!(first, second);
    assert_eq!(store.len().await.unwrap(), 3);
}

async fn check_query_similar_first_match_wins(store: &dyn CaseStore) {
    let entries = sequence(vec![
        key(35.0, 50.0, 2, Movement::Yes, "14:00"),
        key(30.5, 52.0, 2, Movement::Yes, "14:40"),
        key(30.0, 50.0, 2, Movement::Yes, "14:10"),
    ]);
    for e in &entries {
        store.append(e).await.unwrap();
    }

    let probe = key(30.0, 50.0, 2, Movement::Yes, "14:55");
    let tol = SimilarityTolerance::default();
    let hit = store.query_similar(&probe, &tol).await.unwrap().unwrap();
    assert_eq!(hit.id, entries[1].id);

    // Same query, unchanged store, same answer.
    let again = store.query_similar(&probe, &tol).await.unwrap().unwrap();
    assert_eq!(again, hit);
}

async fn check_query_similar_respects_exact_fields(store: &dyn CaseStore) {
    let entries = sequence(vec![key(30.0, 50.0, 2, Movement::Yes, "14:00")]);
    store.append(&entries[0]).await.unwrap();
    let tol = SimilarityTolerance::default();

    for probe in [
        key(30.0, 50.0, 3, Movement::Yes, "14:00"),
        key(30.0, 50.0, 2, Movement::No, "14:00"),
        key(30.0, 50.0, 2, Movement::Yes, "15:00"),
        key(31.5, 50.0, 2, Movement::Yes, "14:00"),
        key(30.0, 55.5, 2, Movement::Yes, "14:00"),
    ] {
        assert!(
            store.query_similar(&probe, &tol).await.unwrap().is_none(),
            "{probe:?} must not match"
        );
    }
}

// ===========================================================================
// MemoryCaseStore
// ===========================================================================

#[tokio::test]
async fn memory_empty_store() {
    check_empty_store(&MemoryCaseStore::new()).await;
}

#[tokio::test]
async fn memory_append_is_ordered_and_restartable() {
    check_append_is_ordered_and_restartable(&MemoryCaseStore::new()).await;
}

#[tokio::test]
async fn memory_query_similar_first_match_wins() {
    check_query_similar_first_match_wins(&MemoryCaseStore::new()).await;
}

#[tokio::test]
async fn memory_query_similar_respects_exact_fields() {
    check_query_similar_respects_exact_fields(&MemoryCaseStore::new()).await;
}

#[tokio::test]
async fn memory_with_entries_preserves_seed_order() {
    let seed = sequence(vec![
        key(25.0, 40.0, 1, Movement::Yes, "08:00"),
        key(26.0, 41.0, 1, Movement::Yes, "08:00"),
    ]);
    let store = MemoryCaseStore::with_entries(seed.clone());
    assert_eq!(store.load_all().await.unwrap(), seed);
}

// ===========================================================================
// JsonlCaseStore
// ===========================================================================

fn jsonl_store() -> (tempfile::TempDir, JsonlCaseStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlCaseStore::open(dir.path().join("cases.jsonl")).unwrap();
    (dir, store)
}

#[tokio::test]
async fn jsonl_empty_store() {
    let (_dir, store) = jsonl_store();
    check_empty_store(&store).await;
}

#[tokio::test]
async fn jsonl_append_is_ordered_and_restartable() {
    let (_dir, store) = jsonl_store();
    check_append_is_ordered_and_restartable(&store).await;
}

#[tokio::test]
async fn jsonl_query_similar_first_match_wins() {
    let (_dir, store) = jsonl_store();
    check_query_similar_first_match_wins(&store).await;
}

#[tokio::test]
async fn jsonl_query_similar_respects_exact_fields() {
    let (_dir, store) = jsonl_store();
    check_query_similar_respects_exact_fields(&store).await;
}

#[tokio::test]
async fn jsonl_concurrent_appends_are_not_lost() {
    let (_dir, store) = jsonl_store();
    let store = std::sync::Arc::new(store);
    let entries = sequence(
        (0..16)
            .map(|i| key(30.0 + i as f64 * 0.1, 50.0, 2, Movement::Yes, "12:00"))
            .collect(),
    );

    let mut handles = Vec::new();
    for e in entries.clone() {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.append(&e).await }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), entries.len());
    for e in &entries {
        assert!(loaded.contains(e));
    }
}

// ===========================================================================
// SurrealCaseStore (in-memory engine)
// ===========================================================================

#[tokio::test]
async fn surreal_empty_store() {
    let store = SurrealCaseStore::in_memory().await.unwrap();
    check_empty_store(&store).await;
}

#[tokio::test]
async fn surreal_append_is_ordered_and_restartable() {
    let store = SurrealCaseStore::in_memory().await.unwrap();
    check_append_is_ordered_and_restartable(&store).await;
}

#[tokio::test]
async fn surreal_query_similar_first_match_wins() {
    let store = SurrealCaseStore::in_memory().await.unwrap();
    check_query_similar_first_match_wins(&store).await;
}

#[tokio::test]
async fn surreal_query_similar_respects_exact_fields() {
    let store = SurrealCaseStore::in_memory().await.unwrap();
    check_query_similar_respects_exact_fields(&store).await;
}

// ===========================================================================
// UnavailableCaseStore
// ===========================================================================

#[tokio::test]
async fn unavailable_store_fails_every_call() {
    let store = UnavailableCaseStore::new();
    let entry = sequence(vec![key(30.0, 50.0, 1, Movement::Yes, "10:00")]).remove(0);

    assert!(matches!(
        store.load_all().await.unwrap_err(),
        StorageError::Unavailable(_)
    ));
    assert!(store.append(&entry).await.is_err());
    assert!(store
        .query_similar(&entry.key, &SimilarityTolerance::default())
        .await
        .is_err());
    assert_eq!(store.append_attempts(), 1);
}
