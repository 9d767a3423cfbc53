use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use tracing::debug;

use scout_slack::payload::{EventEnvelope, Incoming};

use crate::app::AppState;

/// POST /slack/events — Events API callbacks.
pub async fn event_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(envelope): Json<EventEnvelope>,
) -> Json<Value> {
    let event = match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            return Json(json!({ "challenge": challenge }));
        }
        EventEnvelope::EventCallback { event } => event,
        EventEnvelope::Other => return Json(json!({ "ok": true })),
    };

    // Slack redelivers when the first ack was slow; the original delivery
    // is already being handled.
    if headers.contains_key("x-slack-retry-num") {
        debug!("ignoring redelivered event");
        return Json(json!({ "ok": true }));
    }

    match event.classify() {
        Incoming::ThreadReply {
            channel,
            thread_ts,
            text,
            ..
        } => {
            let research = state.research.clone();
            let (channel, thread_ts, text) =
                (channel.to_string(), thread_ts.to_string(), text.to_string());
            tokio::spawn(async move {
                research.follow_up(&channel, &thread_ts, &text).await;
            });
        }
        Incoming::TopLevel {
            channel,
            user,
            text,
        } if text.contains("hello") => {
            let research = state.research.clone();
            let (channel, user) = (channel.to_string(), user.to_string());
            tokio::spawn(async move {
                research.greet(&channel, &user).await;
            });
        }
        _ => {}
    }

    Json(json!({ "ok": true }))
}
