//! Shared building blocks for every `scout-*` crate: configuration, the
//! top-level error type and fail-open JSON map files.

pub mod config;
pub mod error;
pub mod persist;

pub use config::ScoutConfig;
pub use error::{Result, ScoutError};
pub use persist::JsonMapFile;
