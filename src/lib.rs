//! Finsight is a web dashboard for a snapshot of personal financial records.
//!
//! The library loads records from a CSV or JSON file, aggregates them into
//! income, expense and per-category totals, and serves the results as HTML
//! pages with ECharts visualizations.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod currency;
mod dashboard;
mod endpoints;
mod html;
mod ingest;
mod internal_server_error;
mod logging;
mod not_found;
mod record;
mod record_store;
mod routing;
#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, Viewer};
pub use currency::CurrencyFormat;
pub use dashboard::{
    AggregateCache, AggregateResult, CategoryTotal, ChartBody, ChartKind, ChartQuery,
    ChartSelection, ChartView, Color, DashboardController, NetTreatment, TotalsSummary,
    aggregate, color_for, net_monthly, render_chart,
};
pub use ingest::{load_records, parse_records_csv, parse_records_json};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use record::{Record, RecordBuilder};
pub use record_store::RecordStore;
pub use routing::build_router;

use crate::{alert::Alert, internal_server_error::InternalServerError};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A record amount was not a finite number.
    #[error("{0} is not a valid amount")]
    InvalidAmount(String),

    /// A record in the record file could not be used.
    ///
    /// Holds the position of the record, e.g. "line 3" or "entry 2", and the
    /// reason it was rejected.
    #[error("invalid record at {0}: {1}")]
    InvalidRecord(String, String),

    /// The CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The JSON had issues that prevented it from being parsed.
    #[error("Could not parse the JSON file: {0}")]
    InvalidJSON(String),

    /// The record file could not be read.
    ///
    /// Holds the path and the original error as a string.
    #[error("could not read the record file \"{0}\": {1}")]
    RecordFileError(String, String),

    /// The record store has no file to reload from.
    #[error("the records were not loaded from a file")]
    NoRecordSource,

    /// Could not acquire the record store lock
    #[error("could not acquire the record store lock")]
    RecordStoreLockError,

    /// Could not acquire the aggregate cache lock
    #[error("could not acquire the aggregate cache lock")]
    CacheLockError,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::RecordStoreLockError | Error::CacheLockError => {
                InternalServerError::default().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidRecord(position, reason) => Alert::error(
                "Could not reload records",
                &format!(
                    "The record at {position} is invalid: {reason}. \
                    Fix the record file and try again."
                ),
            )
            .into_response_with_status(StatusCode::UNPROCESSABLE_ENTITY),
            Error::InvalidCSV(reason) | Error::InvalidJSON(reason) => Alert::error(
                "Could not reload records",
                &format!("The record file could not be parsed: {reason}"),
            )
            .into_response_with_status(StatusCode::UNPROCESSABLE_ENTITY),
            Error::RecordFileError(path, _) => Alert::error(
                "Could not reload records",
                &format!("Could not read the record file \"{path}\". Check that the file exists."),
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            Error::NoRecordSource => Alert::error(
                "Could not reload records",
                "The records were not loaded from a file, so there is nothing to reload.",
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            _ => Alert::error(
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.",
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        test_utils::{get_header, parse_html_document, parse_html_fragment},
    };

    #[tokio::test]
    async fn lock_error_renders_internal_error_page() {
        let response = Error::RecordStoreLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("500"), "{text}");
    }

    #[tokio::test]
    async fn invalid_record_alert_names_position() {
        let response = Error::InvalidRecord("line 4".to_owned(), "amount is missing".to_owned())
            .into_alert_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(get_header(&response, "hx-retarget"), "#alert-container");
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("line 4"), "{text}");
        assert!(text.contains("amount is missing"), "{text}");
    }

    #[tokio::test]
    async fn missing_source_alert_is_bad_request() {
        let response = Error::NoRecordSource.into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
