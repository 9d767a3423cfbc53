//! Research workflows: everything that happens after Slack has been acked.
//!
//! Each entry point runs to completion on its own task and reports failures
//! back to the user in Slack; none of them return errors to the caller.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use scout_agent::{ProviderError, ResearchAgent};
use scout_context::{ContextStore, Lookup, ThreadKey, Turn};
use scout_slack::blocks::ResearchRequest;
use scout_slack::{to_mrkdwn, Destination, MessageBody, MessageSink, PostedMessage, SlackError};

use crate::messages;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Slack(#[from] SlackError),
}

#[derive(Clone)]
pub struct Research {
    agent: ResearchAgent,
    contexts: Arc<ContextStore>,
    sink: Arc<dyn MessageSink>,
}

impl Research {
    pub fn new(agent: ResearchAgent, contexts: Arc<ContextStore>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            agent,
            contexts,
            sink,
        }
    }

    fn ttl_hours(&self) -> i64 {
        self.contexts.ttl().num_hours()
    }

    /// `/research` — post a brief into `channel` and open a thread on it.
    #[instrument(skip(self))]
    pub async fn brief_to_channel(&self, channel: &str, company: &str) {
        match self
            .publish_brief(Destination::channel(channel), company, None)
            .await
        {
            Ok(posted) => info!(ts = %posted.ts, "brief posted"),
            Err(e) => {
                error!(error = %e, "research failed");
                self.say(&Destination::channel(channel), messages::research_failed(&e))
                    .await;
            }
        }
    }

    /// "Yes, research this" — DM the brief for a calendar meeting.
    #[instrument(skip(self, request), fields(company = %request.company))]
    pub async fn brief_to_dm(&self, user: &str, request: &ResearchRequest) {
        let dm = match self.sink.open_dm(user).await {
            Ok(channel) => channel,
            Err(e) => {
                warn!(error = %e, "could not open DM, falling back to user id");
                user.to_string()
            }
        };

        match self
            .publish_brief(
                Destination::channel(dm.as_str()),
                &request.company,
                Some(&request.summary),
            )
            .await
        {
            Ok(posted) => info!(ts = %posted.ts, "brief sent by DM"),
            Err(e) => {
                error!(error = %e, "DM research failed");
                self.say(
                    &Destination::channel(dm),
                    messages::dm_research_failed(&request.company, &e),
                )
                .await;
            }
        }
    }

    async fn publish_brief(
        &self,
        destination: Destination,
        company: &str,
        meeting: Option<&str>,
    ) -> Result<PostedMessage, WorkflowError> {
        let brief = self.agent.brief(company).await?;
        let text = messages::brief(company, &to_mrkdwn(&brief), meeting, self.ttl_hours());
        let posted = self
            .sink
            .post(&destination, &MessageBody::text(text))
            .await?;

        self.contexts
            .create(&ThreadKey::new(&posted.channel, &posted.ts), company, &brief);
        Ok(posted)
    }

    /// A reply inside a thread. Threads the bot did not start are ignored.
    #[instrument(skip(self, question))]
    pub async fn follow_up(&self, channel: &str, thread_ts: &str, question: &str) {
        let key = ThreadKey::new(channel, thread_ts);
        let thread = Destination::thread(channel, thread_ts);

        let context = match self.contexts.lookup(&key) {
            Lookup::Missing => {
                debug!("not a research thread");
                return;
            }
            Lookup::Expired(context) => {
                self.say(&thread, messages::expired(&context.company, self.ttl_hours()))
                    .await;
                return;
            }
            Lookup::Live(context) => context,
        };

        let answer = match self.agent.follow_up(&context, question).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "follow-up failed");
                self.say(&thread, messages::follow_up_failed(&e)).await;
                return;
            }
        };

        match self
            .sink
            .post(&thread, &MessageBody::text(to_mrkdwn(&answer)))
            .await
        {
            Ok(_) => self
                .contexts
                .append_turns(&key, &[Turn::user(question), Turn::assistant(answer)]),
            Err(e) => warn!(error = %e, "could not deliver follow-up answer"),
        }
    }

    pub async fn greet(&self, channel: &str, user: &str) {
        self.say(&Destination::channel(channel), messages::greeting(user))
            .await;
    }

    pub async fn acknowledge_skip(&self, response_url: &str) {
        if let Err(e) = self.sink.respond(response_url, messages::SKIP_ACK).await {
            warn!(error = %e, "could not replace meeting notice");
        }
    }

    /// Best-effort plain message; failures are only logged.
    async fn say(&self, destination: &Destination, text: String) {
        if let Err(e) = self.sink.post(destination, &MessageBody::text(text)).await {
            warn!(error = %e, ?destination, "could not send message");
        }
    }
}
