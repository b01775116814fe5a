//! Dashboard module
//!
//! Provides an overview page with the net monthly total and buttons that
//! open income, expense and per-category charts in an overlay.

mod aggregation;
mod cache;
mod charts;
mod controller;
mod handlers;
mod palette;

pub use aggregation::{AggregateResult, CategoryTotal, aggregate, net_monthly};
pub use cache::AggregateCache;
pub use charts::{ChartBody, ChartKind, ChartView, TotalsSummary, render_chart};
pub use controller::{ChartQuery, ChartSelection, DashboardController, NetTreatment};
pub use handlers::{get_chart_overlay, get_dashboard_page, get_summary, reload_records};
pub use palette::{Color, color_for};
