use std::{
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use finsight::{
    AppState, CurrencyFormat, RecordStore, Viewer, build_router, graceful_shutdown,
    logging_middleware,
};

/// The web server for the Finsight dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the CSV or JSON file with the financial records.
    #[arg(long)]
    records: PathBuf,

    /// The port to serve the dashboard from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The IP address to listen on.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: IpAddr,

    /// The directory with the static files, e.g. ECharts and htmx.
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,

    /// The first name of the person viewing the dashboard.
    #[arg(long)]
    first_name: Option<String>,

    /// The symbol written before money amounts.
    #[arg(long, default_value = "R")]
    currency_symbol: String,

    /// The ISO 4217 currency code used by the charts.
    #[arg(long, default_value = "ZAR")]
    currency_code: String,

    /// The BCP 47 locale used by the charts.
    #[arg(long, default_value = "en-ZA")]
    locale: String,

    /// The separator between groups of three digits.
    #[arg(long, default_value_t = ' ')]
    group_separator: char,

    /// The separator between the whole and the fractional part of amounts.
    #[arg(long, default_value_t = ',')]
    decimal_separator: char,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging() {
        eprintln!("Could not create log file: {error}");
        return ExitCode::FAILURE;
    }

    let record_store = match RecordStore::from_file(&args.records) {
        Ok(record_store) => record_store,
        Err(error) => {
            tracing::error!("Could not load records: {error}");
            return ExitCode::FAILURE;
        }
    };

    let currency = CurrencyFormat {
        symbol: args.currency_symbol,
        code: args.currency_code,
        locale: args.locale,
        group_separator: args.group_separator,
        decimal_separator: args.decimal_separator,
    };
    let viewer = args.first_name.map(|first_name| Viewer { first_name });
    let state = AppState::new(record_store, currency, viewer).with_static_dir(args.static_dir);

    let addr = SocketAddr::new(args.address, args.port);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped with an error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
