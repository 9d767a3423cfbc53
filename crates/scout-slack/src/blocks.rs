//! Block Kit layouts and the action ids they carry.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const ACTION_RESEARCH: &str = "proactive_research";
pub const ACTION_SKIP: &str = "skip_research";

/// Button value attached to [`ACTION_RESEARCH`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub meeting_id: String,
    pub summary: String,
    pub company: String,
}

/// "You have an upcoming meeting" notice with research / skip buttons.
pub fn meeting_notice(summary: &str, start: &str, request: &ResearchRequest) -> Value {
    let value = serde_json::to_string(request).unwrap_or_default();
    json!([
        {
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "📅 You have an upcoming meeting:\n*{summary}*\n{start}\n\nWant me to research {} for you?",
                    request.company
                ),
            }
        },
        {
            "type": "actions",
            "elements": [
                {
                    "type": "button",
                    "text": { "type": "plain_text", "text": "🔍 Yes, research this" },
                    "style": "primary",
                    "value": value,
                    "action_id": ACTION_RESEARCH,
                },
                {
                    "type": "button",
                    "text": { "type": "plain_text", "text": "Not this one" },
                    "action_id": ACTION_SKIP,
                }
            ]
        }
    ])
}

/// Plain-text fallback shown in notifications for [`meeting_notice`].
pub fn meeting_notice_fallback(summary: &str) -> String {
    format!("Upcoming meeting: {summary}")
}
