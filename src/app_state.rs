//! Implements a struct that holds the state of the REST server.

use std::path::PathBuf;

use crate::{currency::CurrencyFormat, dashboard::AggregateCache, record_store::RecordStore};

/// The person viewing the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewer {
    /// Used to greet the viewer on the dashboard.
    pub first_name: String,
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The financial records shown on the dashboard.
    pub record_store: RecordStore,

    /// The aggregate of the most recent record snapshot.
    pub aggregate_cache: AggregateCache,

    /// How to display money amounts.
    pub currency: CurrencyFormat,

    /// The viewer's profile, if one was configured.
    pub viewer: Option<Viewer>,

    /// The directory to serve static files from.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create a new [AppState] that serves static files from "static/".
    pub fn new(
        record_store: RecordStore,
        currency: CurrencyFormat,
        viewer: Option<Viewer>,
    ) -> Self {
        Self {
            record_store,
            aggregate_cache: AggregateCache::new(),
            currency,
            viewer,
            static_dir: PathBuf::from("static/"),
        }
    }

    /// Serve static files from `static_dir` instead.
    pub fn with_static_dir(mut self, static_dir: PathBuf) -> Self {
        self.static_dir = static_dir;
        self
    }
}
