use std::sync::Arc;

use async_trait::async_trait;

use scout_calendar::{CalendarError, MeetingNotice, MeetingNotifier};
use scout_slack::blocks::{meeting_notice, meeting_notice_fallback, ResearchRequest};
use scout_slack::{Destination, MessageBody, MessageSink};

/// Delivers calendar meeting notices as interactive Slack DMs.
pub struct SlackMeetingNotifier {
    sink: Arc<dyn MessageSink>,
}

impl SlackMeetingNotifier {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl MeetingNotifier for SlackMeetingNotifier {
    async fn notify(&self, notice: &MeetingNotice) -> scout_calendar::Result<()> {
        let request = ResearchRequest {
            meeting_id: notice.meeting_id.clone(),
            summary: notice.summary.clone(),
            company: notice.company.clone(),
        };
        let body = MessageBody::with_blocks(
            meeting_notice_fallback(&notice.summary),
            meeting_notice(&notice.summary, &notice.start, &request),
        );
        // Posting to a user id lands in the bot's DM with that user.
        self.sink
            .post(&Destination::channel(notice.slack_user_id.as_str()), &body)
            .await
            .map_err(|e| CalendarError::Notify(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::testing::RecordingSink;

    #[tokio::test]
    async fn notice_goes_to_the_user_with_buttons() {
        let sink = Arc::new(RecordingSink::default());
        let notifier = SlackMeetingNotifier::new(sink.clone());
        notifier
            .notify(&MeetingNotice {
                slack_user_id: "U1".to_string(),
                meeting_id: "ev1".to_string(),
                summary: "Intro call".to_string(),
                start: "2026-03-02T15:00:00Z".to_string(),
                company: "Acme".to_string(),
            })
            .await
            .unwrap();

        let posts = sink.posts.lock().unwrap();
        assert_eq!(posts[0].0, Destination::channel("U1"));
        assert_eq!(posts[0].1.text, "Upcoming meeting: Intro call");
        let blocks = posts[0].1.blocks.as_ref().expect("blocks attached");
        assert_eq!(blocks[1]["elements"][0]["action_id"], "proactive_research");
    }
}
