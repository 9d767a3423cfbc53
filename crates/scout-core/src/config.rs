use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
/// Follow-up window for a research thread.
pub const DEFAULT_CONTEXT_TTL_HOURS: i64 = 48;
/// Calendar scan cadence (6 hours).
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 21_600;

pub const CONTEXTS_FILE: &str = "research_contexts.json";
pub const CONTEXTS_DB_FILE: &str = "scout.db";
pub const TOKENS_FILE: &str = "user_tokens.json";
pub const NOTIFIED_FILE: &str = "notified_meetings.json";

/// Top-level config (scout.toml + SCOUT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub research: ResearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Bot User OAuth token (`xoxb-...`).
    #[serde(default)]
    pub bot_token: String,
    /// Signing secret used to verify inbound requests.
    #[serde(default)]
    pub signing_secret: String,
    #[serde(default = "default_slack_api_base")]
    pub api_base: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            signing_secret: String::new(),
            api_base: default_slack_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_anthropic_base_url(),
            model: default_model(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which repository backs the research-context store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContextBackend {
    /// Flat JSON document, rewritten in full on every mutation.
    #[default]
    File,
    /// SQLite table with transactional read-modify-write.
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding every persisted file.
    #[serde(default = "default_storage_dir")]
    pub dir: String,
    #[serde(default)]
    pub context_backend: ContextBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            context_backend: ContextBackend::default(),
        }
    }
}

impl StorageConfig {
    pub fn contexts_path(&self) -> PathBuf {
        let name = match self.context_backend {
            ContextBackend::File => CONTEXTS_FILE,
            ContextBackend::Sqlite => CONTEXTS_DB_FILE,
        };
        Path::new(&self.dir).join(name)
    }

    pub fn tokens_path(&self) -> PathBuf {
        Path::new(&self.dir).join(TOKENS_FILE)
    }

    pub fn notified_path(&self) -> PathBuf {
        Path::new(&self.dir).join(NOTIFIED_FILE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_CONTEXT_TTL_HOURS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    /// Start of the look-ahead window, in hours from now.
    #[serde(default = "default_window_start")]
    pub window_start_hours: i64,
    /// End of the look-ahead window, in hours from now.
    #[serde(default = "default_window_end")]
    pub window_end_hours: i64,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Attendee domains that never count as a company.
    #[serde(default = "default_personal_domains")]
    pub personal_domains: Vec<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
            window_start_hours: default_window_start(),
            window_end_hours: default_window_end(),
            max_results: default_max_results(),
            personal_domains: default_personal_domains(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Company the sales team works for.
    #[serde(default = "default_seller")]
    pub seller: String,
    /// One-sentence pitch describing what the seller sells.
    #[serde(default = "default_seller_context")]
    pub seller_context: String,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            seller: default_seller(),
            seller_context: default_seller_context(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}
fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_storage_dir() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.scout", home)
}
fn default_ttl_hours() -> i64 {
    DEFAULT_CONTEXT_TTL_HOURS
}
fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}
fn default_window_start() -> i64 {
    24
}
fn default_window_end() -> i64 {
    48
}
fn default_max_results() -> u32 {
    10
}
fn default_personal_domains() -> Vec<String> {
    vec!["gmail.com".to_string()]
}
fn default_seller() -> String {
    "OutSystems".to_string()
}
fn default_seller_context() -> String {
    "We are pitching a low-code app dev platform for agentic AI workflows and app experiences."
        .to_string()
}

impl ScoutConfig {
    /// Load config from defaults, a TOML file and `SCOUT_*` env overrides.
    ///
    /// The file is, in order: the explicit path argument, then
    /// `~/.scout/scout.toml`. A missing file is not an error.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let mut config: ScoutConfig = Self::figment(config_path)
            .extract()
            .map_err(|e| crate::error::ScoutError::Config(e.to_string()))?;
        config.apply_bare_env();
        Ok(config)
    }

    /// Same as [`ScoutConfig::load`] but reads `.env` from the working directory first.
    pub fn load_with_dotenv(config_path: Option<&str>) -> crate::error::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load(config_path)
    }

    /// Build the provider chain: defaults < TOML < `SCOUT_*` (nested with `__`).
    pub fn figment(config_path: Option<&str>) -> Figment {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Figment::from(Serialized::defaults(ScoutConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("SCOUT_").split("__"))
    }

    /// Fill empty secrets from the unprefixed variables a Slack/Anthropic
    /// deployment usually already exports.
    fn apply_bare_env(&mut self) {
        fill_from_env(&mut self.slack.bot_token, "SLACK_BOT_TOKEN");
        fill_from_env(&mut self.slack.signing_secret, "SLACK_SIGNING_SECRET");
        fill_from_env(&mut self.anthropic.api_key, "ANTHROPIC_API_KEY");
    }
}

fn fill_from_env(slot: &mut String, var: &str) {
    if slot.is_empty() {
        if let Ok(value) = std::env::var(var) {
            *slot = value;
        }
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.scout/scout.toml", home)
}
