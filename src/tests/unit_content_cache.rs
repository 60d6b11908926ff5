use std::fs;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::cache::ContentCache;
use crate::error::ContentError;

// a TTL long enough that no test ever sees a ticker-driven clear by accident
const LONG_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
struct Entry {
    id: String,
    value: u32,
}

fn entries(n: u32) -> Vec<Entry> {
    (0..n)
        .map(|i| Entry {
            id: format!("e{i}"),
            value: i,
        })
        .collect()
}

// write a backing file with the given records and return a cache over it
fn seed_cache(dir: &TempDir, records: &[Entry], ttl: Duration) -> ContentCache<Entry> {
    let path = dir.path().join("entries.json");
    fs::write(&path, serde_json::to_string(records).unwrap()).unwrap();
    ContentCache::new(path, ttl, "entry")
}

fn rewrite(cache: &ContentCache<Entry>, records: &[Entry]) {
    fs::write(cache.source_path(), serde_json::to_string(records).unwrap()).unwrap();
}

// the heart of the read-through contract: one load per epoch, then memory
#[tokio::test]
async fn populated_epoch_is_served_from_memory() {
    let dir = tempfile::tempdir().unwrap();
    let cache = seed_cache(&dir, &entries(3), LONG_TTL);

    let first = cache.get(None).unwrap();
    assert_eq!(&first[..], &entries(3)[..]);

    // the file changes on disk, but the epoch is already populated
    rewrite(&cache, &entries(5));
    let second = cache.get(None).unwrap();
    assert_eq!(second.len(), 3, "populated epoch must not re-read the file");

    // an explicit clear starts a fresh epoch and the change becomes visible
    cache.clear();
    let third = cache.get(None).unwrap();
    assert_eq!(third.len(), 5);
}

// a limit is a per-call view: leading records, original order, and the
// cached copy stays whole
#[tokio::test]
async fn limit_returns_a_leading_view() {
    let dir = tempfile::tempdir().unwrap();
    let cache = seed_cache(&dir, &entries(5), LONG_TTL);

    let limited = cache.get(Some(2)).unwrap();
    assert_eq!(&limited[..], &entries(5)[..2]);

    // a limit at or past the data length returns everything
    assert_eq!(cache.get(Some(5)).unwrap().len(), 5);
    assert_eq!(cache.get(Some(100)).unwrap().len(), 5);

    // a zero limit is an empty view, not an error
    assert!(cache.get(Some(0)).unwrap().is_empty());

    // earlier limited calls never truncated the shared copy
    assert_eq!(cache.get(None).unwrap().len(), 5);
}

// N racing callers against an unpopulated epoch: exactly one load, and
// every caller observes the same snapshot
#[tokio::test]
async fn concurrent_gets_share_a_single_load() {
    let dir = tempfile::tempdir().unwrap();
    let cache = seed_cache(&dir, &entries(4), LONG_TTL);

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| cache.get(None))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = results[0].as_ref().unwrap();
    for result in &results {
        let data = result.as_ref().unwrap();
        // same Arc, not just equal contents: all callers share one snapshot
        assert!(Arc::ptr_eq(first, data));
    }

    // and the single load really was the only file read: a later mutation
    // stays invisible for the rest of the epoch
    rewrite(&cache, &entries(9));
    assert_eq!(cache.get(None).unwrap().len(), 4);
}

// a failed load is cached for the epoch exactly like data would be
#[tokio::test]
async fn load_failure_is_terminal_for_the_epoch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.json");
    let cache: ContentCache<Entry> = ContentCache::new(path.clone(), LONG_TTL, "entry");

    let err = cache.get(None).unwrap_err();
    assert!(matches!(err, ContentError::SourceUnavailable { .. }));
    // the wrapped error carries the cache's display name
    assert!(err.to_string().contains("entry"));

    // the file appears afterwards, but the failure is already cached
    fs::write(&path, serde_json::to_string(&entries(2)).unwrap()).unwrap();
    assert!(cache.get(None).is_err(), "failed epoch must not retry");

    // clear starts a fresh epoch and the load succeeds
    cache.clear();
    assert_eq!(cache.get(None).unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entries.json");
    fs::write(&path, "{not json").unwrap();
    let cache: ContentCache<Entry> = ContentCache::new(path, LONG_TTL, "entry");

    let err = cache.get(None).unwrap_err();
    assert!(matches!(err, ContentError::MalformedSource { .. }));
    assert!(err.to_string().contains("entry"));
}

// disabling drops memoization entirely: every call is a fresh read
#[tokio::test]
async fn disabled_cache_reads_the_file_every_call() {
    let dir = tempfile::tempdir().unwrap();
    let cache = seed_cache(&dir, &entries(2), LONG_TTL);
    cache.set_disabled(true);
    assert!(cache.is_disabled());

    assert_eq!(cache.get(None).unwrap().len(), 2);

    rewrite(&cache, &entries(6));
    assert_eq!(
        cache.get(None).unwrap().len(),
        6,
        "a disabled cache must see every file change immediately"
    );

    // errors are not cached either while disabled
    fs::remove_file(cache.source_path()).unwrap();
    assert!(cache.get(None).is_err());
    rewrite(&cache, &entries(1));
    assert_eq!(cache.get(None).unwrap().len(), 1);
}

// re-enabling after a disable serves the epoch populated before the
// disable; the bypass never cleared it
#[tokio::test]
async fn reenabling_serves_the_previous_epoch() {
    let dir = tempfile::tempdir().unwrap();
    let cache = seed_cache(&dir, &entries(3), LONG_TTL);

    assert_eq!(cache.get(None).unwrap().len(), 3);

    cache.set_disabled(true);
    rewrite(&cache, &entries(7));
    assert_eq!(cache.get(None).unwrap().len(), 7);

    cache.set_disabled(false);
    assert_eq!(
        cache.get(None).unwrap().len(),
        3,
        "the epoch populated before disabling is still valid"
    );
}

// the ticker clears the cache every TTL, so changes become visible without
// anyone calling clear
#[tokio::test]
async fn ttl_expiry_starts_a_fresh_epoch() {
    let dir = tempfile::tempdir().unwrap();
    let cache = seed_cache(&dir, &entries(2), Duration::from_millis(100));

    assert_eq!(cache.get(None).unwrap().len(), 2);
    rewrite(&cache, &entries(8));

    // poll instead of a single sleep so the test is not at the mercy of
    // scheduler jitter
    for _ in 0..80 {
        tokio::time::sleep(Duration::from_millis(25)).await;
        if cache.get(None).unwrap().len() == 8 {
            return;
        }
    }
    panic!("ttl ticker never cleared the cache");
}

// dropping the cache aborts its ticker instead of leaking it for the
// process lifetime
#[tokio::test]
async fn dropping_the_cache_stops_the_ticker() {
    let dir = tempfile::tempdir().unwrap();
    let cache = seed_cache(&dir, &entries(1), Duration::from_millis(50));
    let probe = cache.ticker_probe();

    drop(cache);

    for _ in 0..50 {
        if probe.is_finished() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("ticker task still running after the cache was dropped");
}
