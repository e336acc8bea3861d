//! Router assembly and the listening loop.

use anyhow::{Context, Result};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::frontend::FRONTEND_HTML;
use crate::state::AppState;

async fn serve_frontend() -> Html<&'static str> {
    Html(FRONTEND_HTML)
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(serve_frontend))
        .route("/api/types", get(api::types))
        .route("/api/commodities", get(api::commodities))
        .route("/api/columns", get(api::columns))
        .route("/api/series", get(api::series))
        .route("/api/prices", get(api::prices))
        .route("/api/export", get(api::export))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("cannot bind {bind}"))?;
    tracing::info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
