//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page. Takes an optional `chart` query parameter.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The chart overlay partial for htmx. Takes an optional `chart` query parameter.
pub const DASHBOARD_CHART: &str = "/dashboard/chart";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for the aggregated totals as JSON.
pub const SUMMARY_API: &str = "/api/summary";
/// The route for reloading the records from their source file.
pub const RELOAD_RECORDS: &str = "/api/records/reload";
