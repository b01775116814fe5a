//! The dashboard's view state: the record snapshot, the net total and which
//! chart is open.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    dashboard::{aggregation::net_monthly, charts::ChartKind},
    record::Record,
};

/// Which chart, if any, is shown in the dashboard overlay.
///
/// Only one chart can be open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartSelection {
    /// No chart is open.
    #[default]
    None,
    /// The overlay shows this chart.
    Open(ChartKind),
}

impl ChartSelection {
    /// The open chart, if any.
    pub fn chart(&self) -> Option<ChartKind> {
        match self {
            ChartSelection::None => None,
            ChartSelection::Open(kind) => Some(*kind),
        }
    }
}

impl From<Option<ChartKind>> for ChartSelection {
    fn from(kind: Option<ChartKind>) -> Self {
        kind.map_or(ChartSelection::None, ChartSelection::Open)
    }
}

/// The query string that carries the chart selection, e.g. `?chart=category-pie`.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    /// The chart to open. No chart is open when missing.
    pub chart: Option<ChartKind>,
}

impl From<ChartQuery> for ChartSelection {
    fn from(query: ChartQuery) -> Self {
        query.chart.into()
    }
}

/// How the net total should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetTreatment {
    /// Zero or more.
    Positive,
    /// Less than zero.
    Negative,
}

impl NetTreatment {
    fn for_amount(amount: f64) -> Self {
        if amount >= 0.0 {
            NetTreatment::Positive
        } else {
            NetTreatment::Negative
        }
    }
}

/// Owns the record snapshot shown on the dashboard and the chart selection.
///
/// The records are read only here; changes come from replacing the whole
/// snapshot with [DashboardController::set_records].
///
/// The HTTP handlers build a controller per request with
/// [DashboardController::with_selection], since the selection travels in the
/// `chart` query parameter. A caller that keeps one controller for a whole
/// session uses [DashboardController::set_records],
/// [DashboardController::open_chart] and [DashboardController::close_chart]
/// instead.
#[derive(Debug, Clone)]
pub struct DashboardController {
    records: Arc<[Record]>,
    net_monthly: f64,
    selection: ChartSelection,
}

impl DashboardController {
    /// Create a controller for `records` with no chart open.
    pub fn new(records: Arc<[Record]>) -> Self {
        let net_monthly = net_monthly(&records);

        Self {
            records,
            net_monthly,
            selection: ChartSelection::None,
        }
    }

    /// Set the chart selection, e.g. from the request's query string.
    pub fn with_selection(mut self, selection: ChartSelection) -> Self {
        self.selection = selection;
        self
    }

    /// The current record snapshot.
    pub fn records(&self) -> &Arc<[Record]> {
        &self.records
    }

    /// Replace the record snapshot and recompute the net total.
    ///
    /// The chart selection is kept. For long-lived controllers; the HTTP
    /// handlers take a fresh snapshot on every request.
    pub fn set_records(&mut self, records: Arc<[Record]>) {
        self.net_monthly = net_monthly(&records);
        self.records = records;
    }

    /// The signed sum of all record amounts.
    pub fn net_monthly(&self) -> f64 {
        self.net_monthly
    }

    /// How the net total should be styled.
    pub fn net_treatment(&self) -> NetTreatment {
        NetTreatment::for_amount(self.net_monthly)
    }

    /// The current chart selection.
    pub fn selection(&self) -> ChartSelection {
        self.selection
    }

    /// Open `kind`, replacing any chart that is already open.
    ///
    /// For long-lived controllers; the HTTP handlers read the selection from
    /// the `chart` query parameter.
    pub fn open_chart(&mut self, kind: ChartKind) {
        self.selection = ChartSelection::Open(kind);
    }

    /// Close the open chart, if any.
    ///
    /// Over HTTP the same transition is a request for the chart overlay
    /// without a `chart` query parameter.
    pub fn close_chart(&mut self) {
        self.selection = ChartSelection::None;
    }
}
