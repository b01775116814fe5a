//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for the dashboard page, the chart overlay and the summary API
//! - HTML view functions for rendering the dashboard UI
//! - The state used by the handlers

use axum::{
    Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error,
    app_state::Viewer,
    currency::CurrencyFormat,
    dashboard::{
        aggregation::AggregateResult,
        cache::AggregateCache,
        charts::{CHART_ELEMENT_ID, ChartBody, ChartKind, ChartView, chart_script, render_chart},
        controller::{ChartQuery, DashboardController, NetTreatment},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, HeadElement, PAGE_CONTAINER_STYLE, base,
    },
    record_store::RecordStore,
};

/// The ID of the element the chart overlay is swapped into.
const CHART_MODAL_ID: &str = "chart-modal";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The financial records to summarize.
    pub record_store: RecordStore,
    /// The aggregate of the latest record snapshot.
    pub aggregate_cache: AggregateCache,
    /// How to display money amounts.
    pub currency: CurrencyFormat,
    /// Who to greet, if anyone.
    pub viewer: Option<Viewer>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            record_store: state.record_store.clone(),
            aggregate_cache: state.aggregate_cache.clone(),
            currency: state.currency.clone(),
            viewer: state.viewer.clone(),
        }
    }
}

/// Display a page with the net monthly total and the chart buttons.
///
/// The chart named in the `chart` query parameter, if any, is shown in the
/// overlay so that a pushed URL such as `/dashboard?chart=category-pie`
/// restores the same view.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<ChartQuery>,
) -> Result<Response, Error> {
    let controller = DashboardController::new(state.record_store.snapshot()?)
        .with_selection(query.into());

    let chart = match controller.selection().chart() {
        Some(kind) => Some(build_chart_view(kind, &controller, &state)?),
        None => None,
    };

    Ok(dashboard_view(
        state.viewer.as_ref(),
        &controller,
        &state.currency,
        chart.as_ref(),
    )
    .into_response())
}

/// Get the chart overlay for htmx to swap into the dashboard.
///
/// Without a `chart` query parameter the overlay is empty, which closes it.
pub async fn get_chart_overlay(
    State(state): State<DashboardState>,
    Query(query): Query<ChartQuery>,
) -> Response {
    let snapshot = match state.record_store.snapshot() {
        Ok(snapshot) => snapshot,
        Err(error) => return error.into_alert_response(),
    };

    let controller = DashboardController::new(snapshot).with_selection(query.into());

    let Some(kind) = controller.selection().chart() else {
        return html!().into_response();
    };

    match build_chart_view(kind, &controller, &state) {
        Ok(view) => chart_overlay(&view).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Get the aggregate of the current records as JSON.
pub async fn get_summary(
    State(state): State<DashboardState>,
) -> Result<Json<AggregateResult>, Error> {
    let snapshot = state.record_store.snapshot()?;
    let aggregate = state.aggregate_cache.get_or_compute(&snapshot)?;

    Ok(Json(aggregate.as_ref().clone()))
}

/// Read the record file again and send the client back to the dashboard.
pub async fn reload_records(State(state): State<DashboardState>) -> Response {
    match state.record_store.reload() {
        Ok(count) => {
            tracing::info!("Reloaded {count} records");
            (
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                StatusCode::OK,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not reload records: {error}");
            error.into_alert_response()
        }
    }
}

fn build_chart_view(
    kind: ChartKind,
    controller: &DashboardController,
    state: &DashboardState,
) -> Result<ChartView, Error> {
    let aggregate = state.aggregate_cache.get_or_compute(controller.records())?;

    Ok(render_chart(kind, &aggregate, &state.currency))
}

/// The URL the browser shows while `kind` is open.
fn chart_page_url(kind: ChartKind) -> String {
    format!("{}?chart={}", endpoints::DASHBOARD_VIEW, kind.slug())
}

fn chart_overlay_url(kind: ChartKind) -> String {
    format!("{}?chart={}", endpoints::DASHBOARD_CHART, kind.slug())
}

fn greeting(viewer: Option<&Viewer>) -> String {
    match viewer {
        Some(viewer) => format!(
            "Welcome {}! Here is what your finances are looking like:",
            viewer.first_name
        ),
        None => "Welcome! Here is what your finances are looking like:".to_owned(),
    }
}

fn net_total_style(treatment: NetTreatment) -> &'static str {
    match treatment {
        NetTreatment::Positive => "text-green-600 dark:text-green-400",
        NetTreatment::Negative => "text-red-600 dark:text-red-400",
    }
}

fn dashboard_view(
    viewer: Option<&Viewer>,
    controller: &DashboardController,
    currency: &CurrencyFormat,
    chart: Option<&ChartView>,
) -> Markup {
    let net_total = currency.format(controller.net_monthly());
    let net_total_style = net_total_style(controller.net_treatment());

    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { (greeting(viewer)) }

            section
                id="net-monthly"
                class="w-full max-w-md mb-8 p-6 rounded-lg shadow-sm
                    bg-white dark:bg-gray-800 text-center"
            {
                h2 class="text-lg font-semibold text-gray-600 dark:text-gray-400"
                {
                    "Net Monthly Total"
                }

                p class={ "text-4xl font-bold " (net_total_style) } { (net_total) }
            }

            div id="chart-buttons" class="flex flex-wrap justify-center gap-4 mb-8"
            {
                @for kind in ChartKind::ALL {
                    button
                        type="button"
                        class=(BUTTON_PRIMARY_STYLE)
                        hx-get=(chart_overlay_url(kind))
                        hx-target={ "#" (CHART_MODAL_ID) }
                        hx-target-error="#alert-container"
                        hx-swap="innerHTML"
                        hx-push-url=(chart_page_url(kind))
                    {
                        (kind.button_label())
                    }
                }
            }

            button
                type="button"
                class=(BUTTON_SECONDARY_STYLE)
                hx-post=(endpoints::RELOAD_RECORDS)
                hx-target-error="#alert-container"
            {
                "Reload Records"
            }

            div id=(CHART_MODAL_ID)
            {
                @if let Some(chart) = chart {
                    (chart_overlay(chart))
                }
            }
        }
    );

    let scripts = [HeadElement::ScriptLink(
        "/static/echarts.6.0.0.min.js".to_owned(),
    )];

    base("Dashboard", &scripts, &content)
}

/// Renders a chart in a modal overlay with a close button.
fn chart_overlay(view: &ChartView) -> Markup {
    html!(
        div
            class="fixed inset-0 z-50 flex items-center justify-center bg-black/50"
            role="dialog"
            aria-modal="true"
            aria-labelledby="chart-title"
        {
            div
                class="relative w-full max-w-4xl mx-4 p-6 rounded-lg shadow-lg
                    bg-white dark:bg-gray-800 text-gray-900 dark:text-white"
            {
                button
                    type="button"
                    class="absolute top-2 right-4 text-2xl font-bold"
                    aria-label="Close"
                    hx-get=(endpoints::DASHBOARD_CHART)
                    hx-target={ "#" (CHART_MODAL_ID) }
                    hx-swap="innerHTML"
                    hx-push-url=(endpoints::DASHBOARD_VIEW)
                {
                    "×"
                }

                h2 id="chart-title" class="text-xl font-semibold mb-4" { (view.title()) }

                @match &view.body {
                    ChartBody::Placeholder => {
                        div id="chart-placeholder" class="py-16 text-center"
                        {
                            p class="text-lg font-semibold" { "No financial data available" }
                            p class="text-gray-600 dark:text-gray-400"
                            {
                                "Add some financial records to see your analytics!"
                            }
                        }
                    }
                    ChartBody::Chart { options, summary } => {
                        @if let Some(summary) = summary {
                            div id="chart-summary" class="grid grid-cols-2 gap-4 mb-4"
                            {
                                div class="p-4 rounded bg-green-50 dark:bg-gray-700"
                                {
                                    p class="text-sm" { "Total Income" }
                                    p class="text-xl font-bold text-green-600 dark:text-green-400"
                                    {
                                        (summary.income)
                                    }
                                }

                                div class="p-4 rounded bg-red-50 dark:bg-gray-700"
                                {
                                    p class="text-sm" { "Total Expenses" }
                                    p class="text-xl font-bold text-red-600 dark:text-red-400"
                                    {
                                        (summary.expenses)
                                    }
                                }
                            }
                        }

                        div id=(CHART_ELEMENT_ID) class="min-h-[380px] rounded dark:bg-gray-100" {}

                        script { (chart_script(options)) }
                    }
                }
            }
        }
    )
}
