use scout_core::config::ResearchConfig;

/// Prompt text for briefs and follow-ups, parameterised by who is selling.
#[derive(Debug, Clone)]
pub struct ResearchPrompt {
    seller: String,
    seller_context: String,
}

impl ResearchPrompt {
    pub fn new(seller: impl Into<String>, seller_context: impl Into<String>) -> Self {
        Self {
            seller: seller.into(),
            seller_context: seller_context.into(),
        }
    }

    pub fn from_config(config: &ResearchConfig) -> Self {
        Self::new(&config.seller, &config.seller_context)
    }

    /// The single user message that asks for a company brief.
    pub fn brief(&self, company: &str) -> String {
        format!(
            "You are a sales research assistant supporting the {seller} sales and presales team. \
{context} Create a brief company overview for {company} that would help a sales person \
prepare for a meeting to sell {seller}'s platform.

Include:
- 📈What the company does
- 📊Industry and size (estimate if needed)
- 📰Recent news or developments
- 💡Potential pain points a sales person should know

Keep it concise - 3-4 paragraphs max.

Use markdown formatting for the output.",
            seller = self.seller,
            context = self.seller_context,
        )
    }

    /// System instruction used when answering questions in a research thread.
    pub fn follow_up_system(&self, company: &str) -> String {
        format!(
            "You are the same sales research assistant for the {seller} team. \
You already wrote the brief on {company} shown earlier in this conversation. \
Answer the salesperson's follow-up question concisely, staying consistent with the brief \
and saying so when you are unsure. Use markdown formatting.",
            seller = self.seller,
        )
    }
}

impl Default for ResearchPrompt {
    fn default() -> Self {
        Self::from_config(&ResearchConfig::default())
    }
}
