use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use scout_core::ScoutConfig;
use std::sync::Arc;

use crate::research::Research;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: ScoutConfig,
    pub research: Research,
}

impl AppState {
    pub fn new(config: ScoutConfig, research: Research) -> Self {
        Self { config, research }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let slack = Router::new()
        .route(
            "/slack/commands",
            post(crate::http::commands::command_handler),
        )
        .route("/slack/events", post(crate::http::events::event_handler))
        .route(
            "/slack/interactions",
            post(crate::http::interactions::interaction_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::http::verify::verify_slack,
        ));

    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .merge(slack)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
