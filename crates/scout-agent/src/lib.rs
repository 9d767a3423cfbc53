//! `scout-agent` — the text-generation boundary.
//!
//! [`provider::LlmProvider`] abstracts the completion API,
//! [`anthropic::AnthropicProvider`] implements it over HTTP, and
//! [`research::ResearchAgent`] turns companies and follow-up questions into
//! requests.

pub mod anthropic;
pub mod prompt;
pub mod provider;
pub mod research;

pub use provider::{ChatRequest, ChatResponse, LlmProvider, Message, ProviderError, Role};
pub use research::ResearchAgent;
