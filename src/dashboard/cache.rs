//! Memoization of the aggregate for the current record snapshot.

use std::sync::{Arc, Mutex};

use crate::{
    Error,
    dashboard::aggregation::{AggregateResult, aggregate},
    record::Record,
};

/// The last snapshot that was aggregated and its result.
#[derive(Debug)]
struct CacheEntry {
    records: Arc<[Record]>,
    result: Arc<AggregateResult>,
}

/// Caches the [AggregateResult] of the most recent record snapshot.
///
/// Entries are keyed on the snapshot's allocation, so a snapshot that was
/// replaced in the record store is never served from the cache.
#[derive(Debug, Clone, Default)]
pub struct AggregateCache {
    entry: Arc<Mutex<Option<CacheEntry>>>,
}

impl AggregateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the aggregate for `records`, computing it if `records` is not the
    /// snapshot seen last time.
    ///
    /// # Errors
    /// Returns [Error::CacheLockError] if the cache lock is poisoned.
    pub fn get_or_compute(&self, records: &Arc<[Record]>) -> Result<Arc<AggregateResult>, Error> {
        let mut entry = self
            .entry
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire aggregate cache lock: {error}"))
            .map_err(|_| Error::CacheLockError)?;

        if let Some(cached) = entry
            .as_ref()
            .filter(|cached| Arc::ptr_eq(&cached.records, records))
        {
            return Ok(cached.result.clone());
        }

        tracing::debug!("Aggregating {} records", records.len());
        let result = Arc::new(aggregate(records));
        *entry = Some(CacheEntry {
            records: records.clone(),
            result: result.clone(),
        });

        Ok(result)
    }
}
