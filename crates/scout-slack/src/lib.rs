//! `scout-slack` — everything that speaks Slack.
//!
//! Outbound: [`mrkdwn`] converts model Markdown into Slack's dialect,
//! [`client::SlackClient`] posts it, [`blocks`] lays out interactive notices.
//! Inbound: [`verify`] checks request signatures and [`payload`] types the
//! slash-command, Events API and interaction bodies.

pub mod blocks;
pub mod client;
pub mod error;
pub mod mrkdwn;
pub mod payload;
pub mod verify;

pub use client::{Destination, MessageBody, MessageSink, PostedMessage, SlackClient};
pub use error::{Result, SlackError};
pub use mrkdwn::to_mrkdwn;
