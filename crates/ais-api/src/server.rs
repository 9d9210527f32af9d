//! HTTP server implementation using axum.

use std::net::SocketAddr;

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::state::{QueryResponse, RelayState};

/// Create the axum router.
///
/// CORS is permissive so browser-based map frontends on other origins can
/// poll the snapshot endpoint directly.
pub fn create_router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api", get(query_snapshot))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness text on the root route.
async fn root() -> &'static str {
    "AIS relay running"
}

/// Filtered snapshot of the latest ship positions.
async fn query_snapshot(State(state): State<RelayState>) -> Json<QueryResponse> {
    Json(state.query())
}

/// Run the query HTTP server.
pub async fn run_server(
    state: RelayState,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(port = config.port, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
