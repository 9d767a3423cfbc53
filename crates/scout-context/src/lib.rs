//! `scout-context` — per-thread research conversations with lazy TTL expiry.
//!
//! A research thread starts when a brief is delivered and accumulates the
//! follow-up turns asked in that Slack thread. Records live behind the
//! [`ContextRepository`] trait so the backing store can be a flat JSON file
//! or a SQLite table without touching callers; [`ContextStore`] layers the
//! TTL policy and the fail-open error policy on top.

pub mod db;
pub mod error;
pub mod file;
pub mod repo;
pub mod sqlite;
pub mod store;
pub mod types;

pub use error::{ContextError, Result};
pub use file::JsonFileRepository;
pub use repo::ContextRepository;
pub use sqlite::SqliteRepository;
pub use store::{ContextStore, Lookup};
pub use types::{ResearchContext, ThreadKey, Turn, TurnRole};
