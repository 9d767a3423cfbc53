use std::path::PathBuf;
use std::sync::Mutex;

use scout_core::JsonMapFile;
use tracing::debug;

use crate::error::Result;
use crate::repo::ContextRepository;
use crate::types::{ResearchContext, ThreadKey};

/// Research contexts kept in one pretty-printed JSON document
/// (`{ "channel:thread_ts": { ... } }`).
///
/// The whole document is re-read on every call and rewritten on every
/// mutation. Mutations inside this process are serialised by a mutex;
/// processes sharing the file can still lose each other's writes, use
/// [`SqliteRepository`](crate::SqliteRepository) when that matters.
pub struct JsonFileRepository {
    file: JsonMapFile<ResearchContext>,
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonMapFile::new(path),
            write_lock: Mutex::new(()),
        }
    }
}

impl ContextRepository for JsonFileRepository {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &ThreadKey) -> Result<Option<ResearchContext>> {
        Ok(self.file.load().remove(&key.format()))
    }

    fn put(&self, context: &ResearchContext) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let mut map = self.file.load();
        map.insert(context.key.format(), context.clone());
        self.file.save(&map)?;
        Ok(())
    }

    fn delete(&self, key: &ThreadKey) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap();
        let mut map = self.file.load();
        if map.remove(&key.format()).is_none() {
            return Ok(false);
        }
        self.file.save(&map)?;
        Ok(true)
    }

    fn modify(
        &self,
        key: &ThreadKey,
        f: &mut dyn FnMut(&mut Option<ResearchContext>),
    ) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let key_str = key.format();
        let mut map = self.file.load();

        let before = map.remove(&key_str);
        let mut slot = before.clone();
        f(&mut slot);

        if slot == before {
            debug!(key = %key, "modify left record unchanged, skipping write");
            return Ok(());
        }
        if let Some(context) = slot {
            map.insert(key_str, context);
        }
        self.file.save(&map)?;
        Ok(())
    }
}
