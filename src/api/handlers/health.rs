//! Liveness endpoint.

use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;
use tracing::warn;

use crate::api::response::json_response;
use crate::api::state::AppState;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    database: &'static str,
    version: &'static str,
}

/// GET /health
///
/// Reports 503 when the database does not answer a trivial query.
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let database_ok = state
        .with_db(|conn| Ok(conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?))
        .map_err(|err| warn!(error = %err, "Health check query failed"))
        .is_ok();

    let (status, body) = if database_ok {
        (
            StatusCode::OK,
            Health {
                status: "ok",
                database: "ok",
                version: env!("CARGO_PKG_VERSION"),
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Health {
                status: "degraded",
                database: "unavailable",
                version: env!("CARGO_PKG_VERSION"),
            },
        )
    };
    json_response(status, body)
}
