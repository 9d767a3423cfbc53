//! Inbound Slack request bodies.

use serde::Deserialize;

use crate::error::{Result, SlackError};

/// `application/x-www-form-urlencoded` body of a slash command.
#[derive(Debug, Clone, Deserialize)]
pub struct SlashCommand {
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub channel_id: String,
    #[serde(default)]
    pub response_url: String,
}

/// Events API envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    UrlVerification { challenge: String },
    EventCallback { event: MessageEvent },
    #[serde(other)]
    Other,
}

/// The inner event. Only `message` events are acted on, but every event
/// type deserializes so unknown ones can be acknowledged and dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

/// What a message event means to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming<'a> {
    /// A reply inside an existing thread.
    ThreadReply {
        channel: &'a str,
        thread_ts: &'a str,
        user: &'a str,
        text: &'a str,
    },
    /// A message outside any thread.
    TopLevel {
        channel: &'a str,
        user: &'a str,
        text: &'a str,
    },
    /// Bot traffic, edits, joins and non-message events.
    Ignored,
}

impl MessageEvent {
    pub fn classify(&self) -> Incoming<'_> {
        if self.kind != "message" || self.bot_id.is_some() || self.subtype.is_some() {
            return Incoming::Ignored;
        }
        let (Some(channel), Some(user), Some(ts)) =
            (self.channel.as_deref(), self.user.as_deref(), self.ts.as_deref())
        else {
            return Incoming::Ignored;
        };

        match self.thread_ts.as_deref() {
            Some(thread_ts) if thread_ts != ts => Incoming::ThreadReply {
                channel,
                thread_ts,
                user,
                text: &self.text,
            },
            _ => Incoming::TopLevel {
                channel,
                user,
                text: &self.text,
            },
        }
    }
}

/// Form body of an interactivity request: a single `payload` JSON field.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionForm {
    pub payload: String,
}

impl InteractionForm {
    pub fn parse(&self) -> Result<InteractionPayload> {
        serde_json::from_str(&self.payload)
            .map_err(|e| SlackError::Parse(format!("interaction payload: {e}")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub user: SlackUser,
    #[serde(default)]
    pub actions: Vec<BlockAction>,
    #[serde(default)]
    pub response_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackUser {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockAction {
    pub action_id: String,
    #[serde(default)]
    pub value: Option<String>,
}
