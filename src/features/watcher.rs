use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify::{EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

const DEBOUNCE_MS: u64 = 1500;

/// A backing file the watcher keeps an eye on, paired with the cache
/// invalidation to run when it changes.
pub struct WatchedSource {
    pub label: &'static str,
    pub path: PathBuf,
    pub invalidate: Arc<dyn Fn() + Send + Sync>,
}

/// Spawns a background task that watches the content directory and clears
/// the matching cache when one of the backing JSON files changes. Content
/// edits happen out-of-band, so this is the only push-style invalidation;
/// everything else is the caches' own TTL.
///
/// Events are matched to sources by file name: the backing files all live
/// directly under the content directory and their names are unique.
pub fn start_content_watcher(sources: Vec<WatchedSource>, content_dir: PathBuf) {
    // the conveyor belt between the OS watcher thread and the async worker
    let (tx, mut rx) = mpsc::channel::<PathBuf>(100);

    // overflow alarm, shared between the OS watcher and the worker
    let needs_full_invalidation = Arc::new(AtomicBool::new(false));
    let overflow_flag = needs_full_invalidation.clone();

    let watched_names: HashSet<String> = sources
        .iter()
        .filter_map(|source| {
            source
                .path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
        })
        .collect();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }

            for path in &event.paths {
                // only the JSON sources matter; blog HTML churn and editor
                // temp files are ignored
                let file_name = match path.file_name().and_then(|name| name.to_str()) {
                    Some(name) => name,
                    None => continue,
                };
                if !watched_names.contains(file_name) {
                    continue;
                }

                match tx.try_send(path.clone()) {
                    Ok(_) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        overflow_flag.store(true, Ordering::SeqCst);
                        warn!("file event dropped under high traffic, scheduling full invalidation");
                    }
                    Err(_) => {}
                }
            }
        }
    })
    .expect("failed to initialize content watcher");

    watcher
        .watch(&content_dir, RecursiveMode::Recursive)
        .expect("failed to watch content directory");

    tokio::spawn(async move {
        // the OS watcher stops when dropped, keep it alive with the worker
        let _kept_alive_watcher = watcher;
        let mut pending: HashSet<PathBuf> = HashSet::new();

        loop {
            // wait for the first event of a burst
            match rx.recv().await {
                Some(path) => {
                    pending.insert(path);
                }
                None => break,
            }

            // keep collecting until the burst goes quiet
            loop {
                match tokio::time::timeout(Duration::from_millis(DEBOUNCE_MS), rx.recv()).await {
                    Ok(Some(path)) => {
                        pending.insert(path);
                    }
                    Ok(None) => break,
                    Err(_) => break, // silence reached, process the batch
                }
            }

            if needs_full_invalidation.swap(false, Ordering::SeqCst) {
                info!("events were dropped, clearing every content cache");
                for source in &sources {
                    (source.invalidate)();
                }
                pending.clear();
                continue;
            }

            for path in pending.drain() {
                let changed = path.file_name().and_then(|name| name.to_str());
                if let Some(source) = sources
                    .iter()
                    .find(|source| source.path.file_name().and_then(|name| name.to_str()) == changed)
                {
                    info!(source = source.label, "backing file changed, clearing cache");
                    (source.invalidate)();
                }
            }
        }
    });
}
