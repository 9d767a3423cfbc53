//! Signature check applied to every `/slack/*` route.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use scout_slack::verify::{verify_signature, SIGNATURE_HEADER, TIMESTAMP_HEADER};

use crate::app::AppState;

/// Slack payloads are small; anything bigger is not from Slack.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Buffer the body, verify it against the signing secret, then hand the
/// request on with the body restored.
pub async fn verify_slack(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let secret = state.config.slack.signing_secret.as_str();
    if secret.is_empty() {
        return Err(auth_error("signing secret not configured"));
    }

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| auth_error("body too large or unreadable"))?;

    let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());
    verify_signature(
        secret,
        header(TIMESTAMP_HEADER),
        header(SIGNATURE_HEADER),
        &bytes,
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| auth_error(&e.to_string()))?;

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

fn auth_error(reason: &str) -> (StatusCode, Json<Value>) {
    warn!(reason = %reason, "slack request rejected");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "authentication failed", "reason": reason})),
    )
}
