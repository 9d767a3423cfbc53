use crate::error::Result;
use crate::types::{ResearchContext, ThreadKey};

/// Keyed storage for research contexts.
///
/// Every method reads the backing store fresh; implementations keep no cache
/// so several gateway processes can share one store.
pub trait ContextRepository: Send + Sync {
    /// Backend name for logs (e.g. `"file"`, `"sqlite"`).
    fn name(&self) -> &str;

    fn get(&self, key: &ThreadKey) -> Result<Option<ResearchContext>>;

    /// Insert or overwrite the record stored under `context.key`.
    fn put(&self, context: &ResearchContext) -> Result<()>;

    /// Remove a record. Returns whether anything was deleted.
    fn delete(&self, key: &ThreadKey) -> Result<bool>;

    /// Atomic read-modify-write of a single slot.
    ///
    /// `f` receives the current record (or `None`). Leaving `Some` stores the
    /// result, setting `None` deletes the record. No other `modify`/`put`/
    /// `delete` on this repository interleaves with the call.
    fn modify(
        &self,
        key: &ThreadKey,
        f: &mut dyn FnMut(&mut Option<ResearchContext>),
    ) -> Result<()>;
}
