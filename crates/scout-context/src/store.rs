use chrono::{Duration, Utc};
use scout_core::config::{ContextBackend, ContextConfig, StorageConfig};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::file::JsonFileRepository;
use crate::repo::ContextRepository;
use crate::sqlite::SqliteRepository;
use crate::types::{ResearchContext, ThreadKey, Turn, TurnRole};

/// Outcome of resolving a thread for a follow-up.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Unexpired context, safe to answer from.
    Live(ResearchContext),
    /// Context past its TTL. It has already been removed from the store.
    Expired(ResearchContext),
    /// No research thread is known under this key.
    Missing,
}

/// Research-thread store with lazy TTL expiry.
///
/// Every method fails open: repository errors are logged and the call
/// behaves as if the store were empty. Losing a thread's context is
/// preferable to failing the Slack request that touched it.
pub struct ContextStore {
    repo: Box<dyn ContextRepository>,
    ttl: Duration,
}

impl ContextStore {
    /// Wrap a repository with the default 48 hour TTL.
    pub fn new(repo: Box<dyn ContextRepository>) -> Self {
        Self {
            repo,
            ttl: Duration::hours(scout_core::config::DEFAULT_CONTEXT_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Build the store selected by `storage.context_backend`.
    ///
    /// An unreadable SQLite file is set aside and replaced with an empty
    /// database; only filesystem failures (e.g. an unwritable directory)
    /// are returned.
    pub fn open(storage: &StorageConfig, context: &ContextConfig) -> Result<Self> {
        let path = storage.contexts_path();
        let repo: Box<dyn ContextRepository> = match storage.context_backend {
            ContextBackend::File => Box::new(JsonFileRepository::new(&path)),
            ContextBackend::Sqlite => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(scout_core::ScoutError::from)?;
                }
                Box::new(SqliteRepository::open_or_recover(&path)?)
            }
        };
        info!(backend = repo.name(), path = %path.display(), ttl_hours = context.ttl_hours, "context store ready");
        Ok(Self::new(repo).with_ttl(Duration::hours(context.ttl_hours)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a research thread with an empty conversation.
    ///
    /// Overwrites whatever was stored under `key`.
    #[instrument(skip(self, brief), fields(key = %key))]
    pub fn create(&self, key: &ThreadKey, company: &str, brief: &str) {
        let context = ResearchContext::new(key.clone(), company, brief);
        if let Err(e) = self.repo.put(&context) {
            warn!(error = %e, "failed to persist research context");
        }
    }

    /// Fetch the stored context, expired or not.
    pub fn get(&self, key: &ThreadKey) -> Option<ResearchContext> {
        match self.repo.get(key) {
            Ok(found) => found,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to read research context");
                None
            }
        }
    }

    pub fn is_expired(&self, context: &ResearchContext) -> bool {
        context.is_expired_at(Utc::now(), self.ttl)
    }

    /// Append one turn. Unknown keys are logged and ignored.
    pub fn append_turn(&self, key: &ThreadKey, role: TurnRole, content: &str) {
        self.append_turns(
            key,
            &[Turn {
                role,
                content: content.to_string(),
            }],
        );
    }

    /// Append several turns in one atomic step, so a question and its answer
    /// stay adjacent even when other follow-ups on the thread land meanwhile.
    /// Unknown keys are logged and ignored.
    #[instrument(skip(self, turns), fields(key = %key, count = turns.len()))]
    pub fn append_turns(&self, key: &ThreadKey, turns: &[Turn]) {
        let mut appended = false;
        let result = self.repo.modify(key, &mut |slot| {
            if let Some(context) = slot.as_mut() {
                context.conversation.extend_from_slice(turns);
                appended = true;
            }
        });

        match result {
            Ok(()) if appended => debug!("turns appended"),
            Ok(()) => warn!("append on unknown research thread ignored"),
            Err(e) => warn!(error = %e, "failed to append turns"),
        }
    }

    /// Remove a thread. Deleting an unknown key is a no-op.
    #[instrument(skip(self), fields(key = %key))]
    pub fn delete(&self, key: &ThreadKey) {
        match self.repo.delete(key) {
            Ok(true) => debug!("research context deleted"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to delete research context"),
        }
    }

    /// Resolve a thread for answering, removing it in the same atomic step
    /// if its TTL has run out.
    #[instrument(skip(self), fields(key = %key))]
    pub fn lookup(&self, key: &ThreadKey) -> Lookup {
        let now = Utc::now();
        let ttl = self.ttl;
        let mut outcome = Lookup::Missing;

        let result = self.repo.modify(key, &mut |slot| {
            outcome = match slot.take() {
                None => Lookup::Missing,
                Some(context) if context.is_expired_at(now, ttl) => Lookup::Expired(context),
                Some(context) => {
                    *slot = Some(context.clone());
                    Lookup::Live(context)
                }
            };
        });

        match result {
            Ok(()) => {
                if let Lookup::Expired(ref context) = outcome {
                    info!(company = %context.company, "research thread expired and removed");
                }
                outcome
            }
            Err(e) => {
                warn!(error = %e, "failed to resolve research context");
                Lookup::Missing
            }
        }
    }
}
