//! Axum router construction for the chart server.
//!
//! Assembles all routes (page, REST, `WebSocket`) into a single [`Router`]
//! with CORS and request tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the chart server.
///
/// The router includes:
/// - `GET /` -- chart page with the expense form
/// - `GET /chart.svg` -- latest frame as SVG
/// - `GET /ws/frames` -- `WebSocket` frame stream
/// - `GET|POST /api/expenses` -- snapshot and form submission
/// - `PUT|DELETE /api/expenses/{id}` -- modify and delete
/// - `GET /api/frame` -- latest frame as JSON
/// - `POST|DELETE /api/arcs/{id}/hover` -- hover enter and exit
/// - `POST /api/arcs/{id}/click` -- click to delete
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page
        .route("/", get(handlers::index))
        .route("/chart.svg", get(handlers::chart_svg))
        // WebSocket
        .route("/ws/frames", get(ws::ws_frames))
        // Expenses
        .route(
            "/api/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/api/expenses/{id}",
            put(handlers::update_expense).delete(handlers::delete_expense),
        )
        // Chart
        .route("/api/frame", get(handlers::get_frame))
        .route(
            "/api/arcs/{id}/hover",
            post(handlers::hover_enter).delete(handlers::hover_exit),
        )
        .route("/api/arcs/{id}/click", post(handlers::click))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
