//! Google Calendar API v3, primary calendar only.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::credentials::UserCredentials;
use crate::error::{CalendarError, Result};

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

/// Time range and page size for one calendar fetch.
#[derive(Debug, Clone, Copy)]
pub struct ScanWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub max_results: u32,
}

impl ScanWindow {
    /// `[now + start_hours, now + end_hours]`.
    pub fn ahead(now: DateTime<Utc>, start_hours: i64, end_hours: i64, max_results: u32) -> Self {
        Self {
            from: now + Duration::hours(start_hours),
            to: now + Duration::hours(end_hours),
            max_results,
        }
    }
}

/// A calendar event reduced to what the scan needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    /// `dateTime` for timed events, `date` for all-day ones.
    pub start: String,
    /// Attendee emails in the order the calendar lists them.
    pub attendees: Vec<String>,
}

/// Anything that can list a user's upcoming events.
///
/// `credentials` may be rewritten in place when the access token is refreshed;
/// callers persist it if it changed.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn upcoming_events(
        &self,
        credentials: &mut UserCredentials,
        window: &ScanWindow,
    ) -> Result<Vec<CalendarEvent>>;
}

pub struct GoogleCalendar {
    client: reqwest::Client,
    events_url: String,
}

impl GoogleCalendar {
    pub fn new() -> Self {
        Self::with_events_url(EVENTS_URL)
    }

    pub fn with_events_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            events_url: url.into(),
        }
    }

    async fn list_events(&self, access_token: &str, window: &ScanWindow) -> Result<Vec<CalendarEvent>> {
        let time_min = window.from.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = window.to.to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = window.max_results.to_string();

        let resp = self
            .client
            .get(&self.events_url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CalendarError::AuthExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: EventsResponse = resp.json().await?;
        Ok(body.items.into_iter().map(CalendarEvent::from).collect())
    }

    /// Exchange the refresh token for a new access token, updating `credentials`.
    async fn refresh(&self, credentials: &mut UserCredentials) -> Result<()> {
        let refresh_token = credentials
            .refresh_token
            .clone()
            .ok_or(CalendarError::AuthExpired)?;

        let request = {
            let mut form = vec![
                ("client_id", credentials.client_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ];
            if let Some(secret) = credentials.client_secret.as_deref() {
                form.push(("client_secret", secret));
            }
            self.client.post(&credentials.token_uri).form(&form)
        };

        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = status.as_u16(), "token refresh rejected");
            return Err(CalendarError::RefreshFailed(format!("{}: {}", status.as_u16(), body)));
        }

        let refreshed: RefreshResponse = serde_json::from_str(&body)
            .map_err(|e| CalendarError::RefreshFailed(format!("bad token response: {e}")))?;

        credentials.token = refreshed.access_token;
        credentials.expiry = Some(
            (Utc::now() + Duration::seconds(refreshed.expires_in.unwrap_or(3600)))
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        if let Some(rotated) = refreshed.refresh_token {
            credentials.refresh_token = Some(rotated);
        }
        info!("google access token refreshed");
        Ok(())
    }
}

impl Default for GoogleCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendar {
    #[instrument(skip_all, fields(from = %window.from, to = %window.to))]
    async fn upcoming_events(
        &self,
        credentials: &mut UserCredentials,
        window: &ScanWindow,
    ) -> Result<Vec<CalendarEvent>> {
        match self.list_events(&credentials.token, window).await {
            Err(CalendarError::AuthExpired) => {
                debug!("access token rejected, refreshing");
                self.refresh(credentials).await?;
                self.list_events(&credentials.token, window).await
            }
            other => other,
        }
    }
}

// Wire types.

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    start: Option<EventDateTime>,
    #[serde(default)]
    attendees: Vec<Attendee>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Attendee {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

impl From<RawEvent> for CalendarEvent {
    fn from(raw: RawEvent) -> Self {
        let start = raw
            .start
            .and_then(|s| s.date_time.or(s.date))
            .unwrap_or_default();
        Self {
            id: raw.id,
            summary: raw.summary.unwrap_or_else(|| "No title".to_string()),
            start,
            attendees: raw
                .attendees
                .into_iter()
                .map(|a| a.email)
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_relative_to_now() {
        let now = Utc::now();
        let window = ScanWindow::ahead(now, 24, 48, 10);
        assert_eq!(window.from - now, Duration::hours(24));
        assert_eq!(window.to - now, Duration::hours(48));
        assert_eq!(window.max_results, 10);
    }

    #[test]
    fn raw_event_defaults() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"id": "ev1", "start": {"date": "2026-03-02"}, "attendees": [{"email": ""}, {"email": "a@b.io"}]}"#,
        )
        .unwrap();
        let event = CalendarEvent::from(raw);
        assert_eq!(event.summary, "No title");
        assert_eq!(event.start, "2026-03-02");
        assert_eq!(event.attendees, vec!["a@b.io"]);
    }

    #[test]
    fn timed_start_wins_over_date() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"id": "ev2", "summary": "Sync", "start": {"dateTime": "2026-03-02T15:00:00Z", "date": "2026-03-02"}}"#,
        )
        .unwrap();
        assert_eq!(CalendarEvent::from(raw).start, "2026-03-02T15:00:00Z");
    }
}
