//! The in-memory record provider for the dashboard.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::{Error, ingest::load_records, record::Record};

/// Holds the current snapshot of the records.
///
/// Readers get the whole snapshot as an `Arc<[Record]>`. A change replaces
/// the snapshot, so a reader never sees a half-updated list and every change
/// produces a snapshot with a new identity.
#[derive(Debug, Clone)]
pub struct RecordStore {
    snapshot: Arc<Mutex<Arc<[Record]>>>,
    source: Option<PathBuf>,
}

impl RecordStore {
    /// Create a store holding `records` with no file to reload from.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(records.into())),
            source: None,
        }
    }

    /// Create a store from the record file at `path`.
    ///
    /// The path is kept so the store can be refreshed with
    /// [RecordStore::reload].
    ///
    /// # Errors
    /// Returns any error from [load_records].
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let records = load_records(path)?;

        Ok(Self {
            snapshot: Arc::new(Mutex::new(records.into())),
            source: Some(path.to_owned()),
        })
    }

    /// The file the records were loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Get the current snapshot.
    ///
    /// # Errors
    /// Returns [Error::RecordStoreLockError] if the lock is poisoned.
    pub fn snapshot(&self) -> Result<Arc<[Record]>, Error> {
        let snapshot = self
            .snapshot
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire record store lock: {error}"))
            .map_err(|_| Error::RecordStoreLockError)?;

        Ok(snapshot.clone())
    }

    /// Replace the current snapshot with `records`.
    ///
    /// # Errors
    /// Returns [Error::RecordStoreLockError] if the lock is poisoned.
    pub fn replace(&self, records: Vec<Record>) -> Result<(), Error> {
        let mut snapshot = self
            .snapshot
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire record store lock: {error}"))
            .map_err(|_| Error::RecordStoreLockError)?;

        *snapshot = records.into();

        Ok(())
    }

    /// Read the source file again and replace the snapshot with its records.
    ///
    /// The current snapshot is kept if the file cannot be loaded.
    ///
    /// Returns the number of records loaded.
    ///
    /// # Errors
    /// Returns [Error::NoRecordSource] if the store was not created from a
    /// file, otherwise any error from [load_records] or
    /// [RecordStore::replace].
    pub fn reload(&self) -> Result<usize, Error> {
        let path = self.source.as_deref().ok_or(Error::NoRecordSource)?;
        let records = load_records(path)?;
        let count = records.len();

        self.replace(records)?;

        Ok(count)
    }
}
