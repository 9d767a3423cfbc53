//! Flat JSON files holding a `{ key: record }` mapping.
//!
//! Reads fail open: a missing, empty or unparsable file is an empty map, so a
//! single bad write costs state instead of taking the bot down. Writes go to a
//! sibling temp file that is renamed over the target, so concurrent readers
//! never observe a half-written document.

use std::collections::BTreeMap;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;

/// Handle on one JSON map file. Cheap to clone; holds no open descriptors.
#[derive(Debug, Clone)]
pub struct JsonMapFile<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonMapFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole mapping fresh from disk.
    pub fn load(&self) -> BTreeMap<String, T> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "map file absent, treating as empty");
                return BTreeMap::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "map file unreadable, treating as empty");
                return BTreeMap::new();
            }
        };

        if raw.trim().is_empty() {
            return BTreeMap::new();
        }

        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "map file corrupt, treating as empty");
                BTreeMap::new()
            }
        }
    }

    /// Replace the file contents with `map`.
    pub fn save(&self, map: &BTreeMap<String, T>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let body = serde_json::to_string_pretty(map)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        value: u32,
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file: JsonMapFile<Record> = JsonMapFile::new(dir.path().join("nope.json"));
        assert!(file.load().is_empty());
    }

    #[test]
    fn empty_and_corrupt_files_are_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        let file: JsonMapFile<Record> = JsonMapFile::new(&path);

        std::fs::write(&path, "").unwrap();
        assert!(file.load().is_empty());

        std::fs::write(&path, "{ \"a\": {\"value\": ").unwrap();
        assert!(file.load().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file: JsonMapFile<Record> = JsonMapFile::new(dir.path().join("nested/state.json"));

        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Record { value: 1 });
        map.insert("b".to_string(), Record { value: 2 });
        file.save(&map).expect("save");

        assert_eq!(file.load(), map);
    }

    #[test]
    fn save_overwrites_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let file: JsonMapFile<Record> = JsonMapFile::new(&path);
        let mut map = file.load();
        map.insert("fresh".to_string(), Record { value: 7 });
        file.save(&map).expect("save");

        assert_eq!(file.load().get("fresh"), Some(&Record { value: 7 }));
    }
}
