//! Centsible is a web app for tracking your personal finances against monthly budgets.
//!
//! The library serves server-rendered HTML over HTTPS: pages are full
//! documents and the `/api` routes return HTML fragments swapped in by htmx.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod aggregation;
mod alert;
mod app_state;
mod auth;
mod budget;
mod category;
mod chart;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error;
mod html;
mod internal_server_error;
mod logging;
mod month;
mod navigation;
mod not_found;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, get_user_by_id};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// Waits for ctrl+c or SIGTERM, whichever arrives first, then asks the server
/// behind `handle` to shut down gracefully.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("could not install the ctrl+c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("could not install the SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::debug!("Received ctrl+c, shutting down."),
        _ = terminate => tracing::debug!("Received SIGTERM, shutting down."),
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
