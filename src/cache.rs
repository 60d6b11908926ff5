use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ContentError;

/// State of the current cache epoch. A load either fully succeeds or fully
/// fails; there is no partial population. `Empty` is the only state a new
/// epoch starts in, and only `clear` (manual or ticker-driven) gets back to
/// it.
enum Epoch<T> {
    Empty,
    Populated(Arc<[T]>),
    Failed(ContentError),
}

struct CacheInner<T> {
    path: PathBuf,
    name: &'static str,
    disabled: AtomicBool,
    epoch: Mutex<Epoch<T>>,
}

/// A read-through cache over a JSON file holding an array of records.
///
/// The first `get` of an epoch opens the backing file and decodes the whole
/// array; later calls are served from memory until the TTL ticker or an
/// explicit `clear` starts a new epoch. The epoch lock is held across the
/// load, so concurrent callers block until the single in-flight load finishes
/// and then all observe the same snapshot. A failed load is remembered for
/// the epoch exactly like a successful one; the file is touched at most once
/// per epoch no matter how many callers race.
///
/// Dropping the cache aborts its ticker task.
pub struct ContentCache<T> {
    inner: Arc<CacheInner<T>>,
    ticker: JoinHandle<()>,
}

impl<T> ContentCache<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a cache over `path`, clearing itself every `ttl`. Must be
    /// called from within a tokio runtime; the ticker runs until the cache
    /// is dropped.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration, name: &'static str) -> Self {
        let inner = Arc::new(CacheInner {
            path: path.into(),
            name,
            disabled: AtomicBool::new(false),
            epoch: Mutex::new(Epoch::Empty),
        });

        let ticker_inner = Arc::clone(&inner);
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(ttl);
            // the first tick of a tokio interval completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                debug!(cache = ticker_inner.name, "ttl expired, clearing cache");
                ticker_inner.clear();
            }
        });

        Self { inner, ticker }
    }

    /// Fetch the records, loading the backing file if this epoch has not
    /// been populated yet. With `limit` set and smaller than the data
    /// length, returns a view of the leading `limit` records; the cached
    /// copy itself is never truncated.
    ///
    /// When the cache is disabled this reads and decodes the file fresh on
    /// every call, with no memoization at all.
    pub fn get(&self, limit: Option<usize>) -> Result<Arc<[T]>, ContentError> {
        if self.inner.disabled.load(Ordering::SeqCst) {
            debug!(cache = self.inner.name, "cache disabled, reading from file");
            return Ok(Self::limited(self.inner.load()?, limit));
        }

        let mut epoch = self.inner.lock_epoch();
        let data = match &*epoch {
            Epoch::Populated(data) => Arc::clone(data),
            Epoch::Failed(err) => return Err(err.clone()),
            Epoch::Empty => {
                debug!(cache = self.inner.name, "populating cache from file");
                match self.inner.load() {
                    Ok(data) => {
                        *epoch = Epoch::Populated(Arc::clone(&data));
                        data
                    }
                    Err(err) => {
                        *epoch = Epoch::Failed(err.clone());
                        return Err(err);
                    }
                }
            }
        };
        drop(epoch);

        Ok(Self::limited(data, limit))
    }

    /// Toggle the read-through bypass. Takes effect on the next `get`; an
    /// epoch populated before disabling stays intact and is served again
    /// once the cache is re-enabled.
    pub fn set_disabled(&self, disabled: bool) {
        self.inner.disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.disabled.load(Ordering::SeqCst)
    }

    /// Wipe the current epoch, data or error alike; the next `get` reloads
    /// from the backing file. Safe to call while other threads are inside
    /// `get`.
    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn source_path(&self) -> &Path {
        &self.inner.path
    }

    fn limited(data: Arc<[T]>, limit: Option<usize>) -> Arc<[T]> {
        match limit {
            Some(n) if n < data.len() => data[..n].to_vec().into(),
            _ => data,
        }
    }

    #[cfg(test)]
    pub(crate) fn ticker_probe(&self) -> tokio::task::AbortHandle {
        self.ticker.abort_handle()
    }
}

impl<T> Drop for ContentCache<T> {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

impl<T: DeserializeOwned> CacheInner<T> {
    fn load(&self) -> Result<Arc<[T]>, ContentError> {
        let bytes = fs::read(&self.path).map_err(|err| ContentError::SourceUnavailable {
            name: self.name,
            path: self.path.clone(),
            source: Arc::new(err),
        })?;

        let records: Vec<T> =
            serde_json::from_slice(&bytes).map_err(|err| ContentError::MalformedSource {
                name: self.name,
                source: Arc::new(err),
            })?;

        Ok(records.into())
    }

    fn clear(&self) {
        *self.lock_epoch() = Epoch::Empty;
    }

    fn lock_epoch(&self) -> MutexGuard<'_, Epoch<T>> {
        // recover the guard on poison; the epoch enum is always left whole,
        // a panicking load never got to write it
        match self.epoch.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
