use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use scout_core::config::{CalendarConfig, StorageConfig};

use crate::client::{CalendarSource, ScanWindow};
use crate::credentials::{ConnectedUser, CredentialStore};
use crate::domains::{company_from_domain, external_domains};
use crate::error::Result;
use crate::notified::{notification_key, NotificationLog};

/// An offer to research the company behind an upcoming meeting.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingNotice {
    pub slack_user_id: String,
    pub meeting_id: String,
    pub summary: String,
    pub start: String,
    pub company: String,
}

/// Delivers meeting offers to users.
#[async_trait]
pub trait MeetingNotifier: Send + Sync {
    async fn notify(&self, notice: &MeetingNotice) -> Result<()>;
}

/// Counters from one pass over every connected calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub users: usize,
    pub events: usize,
    pub notified: usize,
    pub failed_users: usize,
}

pub struct CalendarScanner {
    credentials: CredentialStore,
    notified_path: PathBuf,
    source: Arc<dyn CalendarSource>,
    notifier: Arc<dyn MeetingNotifier>,
    config: CalendarConfig,
}

impl CalendarScanner {
    pub fn new(
        storage: &StorageConfig,
        config: CalendarConfig,
        source: Arc<dyn CalendarSource>,
        notifier: Arc<dyn MeetingNotifier>,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(storage.tokens_path()),
            notified_path: storage.notified_path(),
            source,
            notifier,
            config,
        }
    }

    /// Scan every connected calendar once. A failing user is logged and skipped.
    #[instrument(skip(self))]
    pub async fn scan_once(&self) -> ScanReport {
        info!("scanning connected calendars");
        let mut report = ScanReport::default();
        let mut log = NotificationLog::load(&self.notified_path);
        let window = ScanWindow::ahead(
            Utc::now(),
            self.config.window_start_hours,
            self.config.window_end_hours,
            self.config.max_results,
        );

        for mut user in self.credentials.connected_users() {
            report.users += 1;
            if let Err(e) = self.scan_user(&mut user, &window, &mut log, &mut report).await {
                report.failed_users += 1;
                error!(slack_user = %user.slack_user_id, error = %e, "calendar scan failed for user");
            }
        }

        info!(
            users = report.users,
            events = report.events,
            notified = report.notified,
            failed = report.failed_users,
            "calendar scan complete"
        );
        report
    }

    async fn scan_user(
        &self,
        user: &mut ConnectedUser,
        window: &ScanWindow,
        log: &mut NotificationLog,
        report: &mut ScanReport,
    ) -> Result<()> {
        let before = user.credentials.clone();
        let fetched = self.source.upcoming_events(&mut user.credentials, window).await;

        if user.credentials != before {
            if let Err(e) = self.credentials.update_credentials(&user.state, &user.credentials) {
                warn!(state = %user.state, error = %e, "could not persist refreshed credentials");
            }
        }

        for event in fetched? {
            report.events += 1;
            let key = notification_key(&user.slack_user_id, &event.id);
            if log.contains(&key) {
                continue;
            }

            let domains = external_domains(&event.attendees, &self.config.personal_domains);
            let Some(first) = domains.first() else {
                debug!(event = %event.id, "no external attendees");
                continue;
            };

            let notice = MeetingNotice {
                slack_user_id: user.slack_user_id.clone(),
                meeting_id: event.id.clone(),
                summary: event.summary.clone(),
                start: event.start.clone(),
                company: company_from_domain(first),
            };
            self.notifier.notify(&notice).await?;
            report.notified += 1;
            info!(slack_user = %notice.slack_user_id, summary = %notice.summary, company = %notice.company, "meeting notice sent");

            if let Err(e) = log.record(key, &event.id) {
                warn!(error = %e, "could not persist notification log");
            }
        }
        Ok(())
    }

    /// Scan now, then every `interval`, until `shutdown` broadcasts `true`.
    pub async fn run(self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "calendar scanner started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.scan_once().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("calendar scanner shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::client::CalendarEvent;
    use crate::credentials::UserCredentials;
    use crate::error::CalendarError;

    struct FixedCalendar {
        events: Vec<CalendarEvent>,
        /// When set, the fetch swaps in this access token as if it had refreshed.
        refreshed_token: Option<String>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl CalendarSource for FixedCalendar {
        async fn upcoming_events(
            &self,
            credentials: &mut UserCredentials,
            _window: &ScanWindow,
        ) -> Result<Vec<CalendarEvent>> {
            if self.fail_for.as_deref() == Some(credentials.token.as_str()) {
                return Err(CalendarError::Api {
                    status: 500,
                    message: "backend error".to_string(),
                });
            }
            if let Some(ref token) = self.refreshed_token {
                credentials.token = token.clone();
            }
            Ok(self.events.clone())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<MeetingNotice>>,
    }

    #[async_trait]
    impl MeetingNotifier for RecordingNotifier {
        async fn notify(&self, notice: &MeetingNotice) -> Result<()> {
            self.sent.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    fn event(id: &str, attendees: &[&str]) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: format!("Meeting {id}"),
            start: "2026-03-02T15:00:00Z".to_string(),
            attendees: attendees.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn storage(dir: &tempfile::TempDir, users: &serde_json::Value) -> StorageConfig {
        let storage = StorageConfig {
            dir: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        };
        std::fs::write(storage.tokens_path(), users.to_string()).unwrap();
        storage
    }

    fn one_user() -> serde_json::Value {
        serde_json::json!({
            "state-1": {
                "credentials": { "token": "old", "refresh_token": "r", "client_id": "c" },
                "slack_user_id": "U1"
            }
        })
    }

    fn scanner(
        storage: &StorageConfig,
        calendar: FixedCalendar,
        notifier: Arc<RecordingNotifier>,
    ) -> CalendarScanner {
        CalendarScanner::new(storage, CalendarConfig::default(), Arc::new(calendar), notifier)
    }

    #[tokio::test]
    async fn notifies_once_per_external_meeting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = storage(&dir, &one_user());
        let notifier = Arc::new(RecordingNotifier::default());
        let calendar = || FixedCalendar {
            events: vec![
                event("ev1", &["cto@acme.com", "me@seller.com"]),
                event("ev2", &["me@gmail.com", "pal@gmail.com"]),
            ],
            refreshed_token: None,
            fail_for: None,
        };

        let report = scanner(&storage, calendar(), notifier.clone()).scan_once().await;
        assert_eq!(report.users, 1);
        assert_eq!(report.events, 2);
        assert_eq!(report.notified, 1);

        {
            let sent = notifier.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].slack_user_id, "U1");
            assert_eq!(sent[0].meeting_id, "ev1");
            assert_eq!(sent[0].company, "Acme");
        }

        // A second scan over the same events stays quiet.
        let report = scanner(&storage, calendar(), notifier.clone()).scan_once().await;
        assert_eq!(report.notified, 0);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
        assert!(NotificationLog::load(storage.notified_path()).contains("U1_ev1"));
    }

    #[tokio::test]
    async fn refreshed_credentials_are_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = storage(&dir, &one_user());
        let calendar = FixedCalendar {
            events: Vec::new(),
            refreshed_token: Some("fresh".to_string()),
            fail_for: None,
        };

        scanner(&storage, calendar, Arc::new(RecordingNotifier::default()))
            .scan_once()
            .await;

        let users = CredentialStore::new(storage.tokens_path()).connected_users();
        assert_eq!(users[0].credentials.token, "fresh");
    }

    #[tokio::test]
    async fn one_failing_user_does_not_stop_the_scan() {
        let dir = tempfile::tempdir().expect("tempdir");
        let users = serde_json::json!({
            "a": { "credentials": { "token": "broken", "client_id": "c" }, "slack_user_id": "U1" },
            "b": { "credentials": { "token": "fine", "client_id": "c" }, "slack_user_id": "U2" },
            "c": { "slack_user_id": "U3" }
        });
        let storage = storage(&dir, &users);
        let notifier = Arc::new(RecordingNotifier::default());
        let calendar = FixedCalendar {
            events: vec![event("ev1", &["buyer@globex.com"])],
            refreshed_token: None,
            fail_for: Some("broken".to_string()),
        };

        let report = scanner(&storage, calendar, notifier.clone()).scan_once().await;
        assert_eq!(report.users, 2);
        assert_eq!(report.failed_users, 1);
        assert_eq!(report.notified, 1);
        assert_eq!(notifier.sent.lock().unwrap()[0].slack_user_id, "U2");
    }
}
