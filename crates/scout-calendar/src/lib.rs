//! `scout-calendar` — proactive meeting discovery.
//!
//! Reads connected users from the credentials file, pulls their upcoming
//! Google Calendar events, and asks a [`scan::MeetingNotifier`] to offer a
//! brief for each meeting with external attendees, at most once per meeting.

pub mod client;
pub mod credentials;
pub mod domains;
pub mod error;
pub mod notified;
pub mod scan;

pub use client::{CalendarEvent, CalendarSource, GoogleCalendar, ScanWindow};
pub use credentials::{ConnectedUser, CredentialStore, StoredUser, UserCredentials};
pub use error::{CalendarError, Result};
pub use notified::{notification_key, NotificationLog, NotificationRecord};
pub use scan::{CalendarScanner, MeetingNotice, MeetingNotifier, ScanReport};
