use std::sync::Arc;

use axum::{extract::State, Form, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

use scout_slack::payload::SlashCommand;

use crate::app::AppState;
use crate::messages;

/// POST /slack/commands
///
/// Answers within Slack's 3 second window and leaves the research to a
/// background task.
pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    Form(cmd): Form<SlashCommand>,
) -> Json<Value> {
    if cmd.command != "/research" {
        warn!(command = %cmd.command, "unknown slash command");
        return Json(json!({
            "response_type": "ephemeral",
            "text": format!("Unknown command {}", cmd.command),
        }));
    }

    let company = cmd.text.trim().to_string();
    if company.is_empty() {
        return Json(json!({
            "response_type": "ephemeral",
            "text": messages::USAGE_HINT,
        }));
    }

    info!(user = %cmd.user_id, channel = %cmd.channel_id, %company, "/research received");
    let research = state.research.clone();
    let channel = cmd.channel_id.clone();
    let reply = messages::researching(&company);
    tokio::spawn(async move {
        research.brief_to_channel(&channel, &company).await;
    });

    Json(json!({
        "response_type": "in_channel",
        "text": reply,
    }))
}
