use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Form};
use tracing::{info, warn};

use scout_slack::blocks::{ResearchRequest, ACTION_RESEARCH, ACTION_SKIP};
use scout_slack::payload::InteractionForm;

use crate::app::AppState;

/// POST /slack/interactions — Block Kit button clicks.
pub async fn interaction_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<InteractionForm>,
) -> StatusCode {
    let payload = match form.parse() {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "unreadable interaction payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    for action in &payload.actions {
        match action.action_id.as_str() {
            ACTION_RESEARCH => {
                let request: ResearchRequest =
                    match action.value.as_deref().map(serde_json::from_str::<ResearchRequest>) {
                        Some(Ok(request)) => request,
                        _ => {
                            warn!("research button without a readable value");
                            continue;
                        }
                    };
                info!(user = %payload.user.id, company = %request.company, "proactive research requested");
                let research = state.research.clone();
                let user = payload.user.id.clone();
                tokio::spawn(async move {
                    research.brief_to_dm(&user, &request).await;
                });
            }
            ACTION_SKIP => {
                let Some(url) = payload.response_url.clone() else {
                    warn!("skip button without response_url");
                    continue;
                };
                let research = state.research.clone();
                tokio::spawn(async move {
                    research.acknowledge_skip(&url).await;
                });
            }
            other => warn!(action = %other, "unknown action"),
        }
    }

    StatusCode::OK
}
