use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::error::{Result, SlackError};

const SLACK_API_BASE: &str = "https://slack.com/api";

/// Where a message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A channel or DM id. A user id also works and lands in the bot's DM.
    Channel(String),
    /// A reply under an existing message.
    Thread { channel: String, thread_ts: String },
}

impl Destination {
    pub fn channel(id: impl Into<String>) -> Self {
        Self::Channel(id.into())
    }

    pub fn thread(channel: impl Into<String>, thread_ts: impl Into<String>) -> Self {
        Self::Thread {
            channel: channel.into(),
            thread_ts: thread_ts.into(),
        }
    }
}

/// Message content. `text` is always sent; it is the notification fallback
/// when `blocks` are present.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBody {
    pub text: String,
    pub blocks: Option<Value>,
}

impl MessageBody {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            blocks: None,
        }
    }

    pub fn with_blocks(text: impl Into<String>, blocks: Value) -> Self {
        Self {
            text: text.into(),
            blocks: Some(blocks),
        }
    }
}

/// A message Slack accepted. `ts` identifies it and roots its thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

/// Outbound messaging, abstracted so workflows can be exercised without Slack.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn post(&self, destination: &Destination, body: &MessageBody) -> Result<PostedMessage>;

    /// Open (or reuse) the DM with `user` and return its channel id.
    async fn open_dm(&self, user: &str) -> Result<String>;

    /// Replace the message an interaction came from.
    async fn respond(&self, response_url: &str, text: &str) -> Result<()>;
}

/// Slack Web API client authenticated with a bot token.
pub struct SlackClient {
    client: reqwest::Client,
    bot_token: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(bot_token: impl Into<String>, api_base: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token: bot_token.into(),
            api_base: api_base
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or_else(|| SLACK_API_BASE.to_string()),
        }
    }

    /// POST a Web API method and return the decoded body once `ok` is true.
    async fn call(&self, method: &str, body: &Value) -> Result<Value> {
        let resp = self
            .client
            .post(format!("{}/{}", self.api_base, method))
            .bearer_auth(&self.bot_token)
            .json(body)
            .send()
            .await?;

        let result: Value = resp.json().await?;
        if result["ok"].as_bool() != Some(true) {
            let err = result["error"].as_str().unwrap_or("unknown").to_string();
            warn!(%method, error = %err, "Slack API call failed");
            return Err(SlackError::Api(err));
        }
        Ok(result)
    }
}

#[async_trait]
impl MessageSink for SlackClient {
    #[instrument(skip(self, body), fields(text_len = body.text.len()))]
    async fn post(&self, destination: &Destination, body: &MessageBody) -> Result<PostedMessage> {
        let mut payload = json!({ "text": body.text, "mrkdwn": true });
        match destination {
            Destination::Channel(channel) => {
                payload["channel"] = json!(channel);
            }
            Destination::Thread { channel, thread_ts } => {
                payload["channel"] = json!(channel);
                payload["thread_ts"] = json!(thread_ts);
            }
        }
        if let Some(ref blocks) = body.blocks {
            payload["blocks"] = blocks.clone();
        }

        let result = self.call("chat.postMessage", &payload).await?;
        let channel = result["channel"]
            .as_str()
            .ok_or_else(|| SlackError::Parse("chat.postMessage: missing channel".to_string()))?;
        let ts = result["ts"]
            .as_str()
            .ok_or_else(|| SlackError::Parse("chat.postMessage: missing ts".to_string()))?;
        debug!(%channel, %ts, "message posted");

        Ok(PostedMessage {
            channel: channel.to_string(),
            ts: ts.to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn open_dm(&self, user: &str) -> Result<String> {
        let result = self
            .call("conversations.open", &json!({ "users": user }))
            .await?;
        result["channel"]["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| SlackError::Parse("conversations.open: missing channel id".to_string()))
    }

    #[instrument(skip(self, response_url, text))]
    async fn respond(&self, response_url: &str, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(response_url)
            .json(&json!({ "replace_original": true, "text": text }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "response_url rejected update");
            return Err(SlackError::Api(format!("response_url {}: {}", status.as_u16(), body)));
        }
        Ok(())
    }
}
