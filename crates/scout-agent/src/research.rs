use std::sync::Arc;

use tracing::{info, instrument};

use scout_context::ResearchContext;
use scout_core::config::{AnthropicConfig, ResearchConfig};

use crate::prompt::ResearchPrompt;
use crate::provider::{ChatRequest, LlmProvider, Message, ProviderError};

/// Generates company briefs and answers follow-up questions about them.
#[derive(Clone)]
pub struct ResearchAgent {
    provider: Arc<dyn LlmProvider>,
    prompt: ResearchPrompt,
    model: String,
    max_tokens: u32,
}

impl ResearchAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        prompt: ResearchPrompt,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            prompt,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn from_config(
        provider: Arc<dyn LlmProvider>,
        anthropic: &AnthropicConfig,
        research: &ResearchConfig,
    ) -> Self {
        Self::new(
            provider,
            ResearchPrompt::from_config(research),
            &anthropic.model,
            anthropic.max_tokens,
        )
    }

    /// Produce a Markdown brief for `company`.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn brief(&self, company: &str) -> Result<String, ProviderError> {
        let req = self.brief_request(company);
        let resp = self.provider.send(&req).await?;
        info!(
            tokens_in = resp.tokens_in,
            tokens_out = resp.tokens_out,
            "brief generated"
        );
        Ok(resp.content)
    }

    /// Answer `question` with the thread's brief and prior turns as history.
    #[instrument(skip(self, context, question), fields(key = %context.key, turns = context.conversation.len()))]
    pub async fn follow_up(
        &self,
        context: &ResearchContext,
        question: &str,
    ) -> Result<String, ProviderError> {
        let req = self.follow_up_request(context, question);
        let resp = self.provider.send(&req).await?;
        info!(tokens_out = resp.tokens_out, "follow-up answered");
        Ok(resp.content)
    }

    pub fn brief_request(&self, company: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            system: None,
            messages: vec![Message::user(self.prompt.brief(company))],
            max_tokens: self.max_tokens,
        }
    }

    pub fn follow_up_request(&self, context: &ResearchContext, question: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(context.conversation.len() + 3);
        messages.push(Message::user(self.prompt.brief(&context.company)));
        messages.push(Message::assistant(context.brief.clone()));
        messages.extend(context.conversation.iter().map(Message::from));
        messages.push(Message::user(question));

        ChatRequest {
            model: self.model.clone(),
            system: Some(self.prompt.follow_up_system(&context.company)),
            messages,
            max_tokens: self.max_tokens,
        }
    }
}
