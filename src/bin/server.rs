use std::{env, fs::OpenOptions, net::SocketAddr, path::Path, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use centsible::{AppState, build_router, graceful_shutdown, logging_middleware};

/// The web server for centsible.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file.
    #[arg(long)]
    db_path: String,

    /// Directory holding the TLS certificate `cert.pem` and key `key.pem`.
    #[arg(long)]
    cert_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();
    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");
    let tls_config = load_tls_config(&args.cert_path).await;

    let connection =
        Connection::open(&args.db_path).expect("Could not open the application database");
    let app_state =
        AppState::new(connection, &secret).expect("Could not initialize the application database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = with_request_tracing(build_router(app_state))
        .layer(middleware::from_fn(logging_middleware));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let address = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTPS server listening on {address}");
    axum_server::bind_rustls(address, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server exited with an error");
}

async fn load_tls_config(cert_path: &str) -> RustlsConfig {
    let cert_dir = Path::new(cert_path);

    RustlsConfig::from_pem_file(cert_dir.join("cert.pem"), cert_dir.join("key.pem"))
        .await
        .expect("Could not load the TLS certificate and key")
}

fn setup_logging() {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("centsible.log")
        .expect("Could not open the log file");

    // Console output stays at INFO, the log file keeps the DEBUG detail.
    let stdout_log = tracing_subscriber::fmt::layer().pretty();
    let file_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(file_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn with_request_tracing(router: Router) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request| {
            let matched_path = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str);

            tracing::debug_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                matched_path,
            )
        })
        // 5xx responses already go through the app's own error logging, so
        // TraceLayer's failure logging stays off.
        .on_failure(());

    router.layer(trace_layer)
}
