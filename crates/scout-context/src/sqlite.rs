use std::sync::Mutex;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use tracing::{instrument, warn};

use crate::db::init_db;
use crate::error::{ContextError, Result};
use crate::repo::ContextRepository;
use crate::types::{ResearchContext, ThreadKey, Turn};

const SELECT_CONTEXT: &str = "SELECT channel, thread_ts, company, brief, conversation, created_at
     FROM research_contexts WHERE thread_key = ?1";

/// Research contexts in a SQLite table.
///
/// `modify` runs inside an `IMMEDIATE` transaction, so concurrent follow-ups
/// from separate processes serialise on the database write lock instead of
/// overwriting each other's turns.
pub struct SqliteRepository {
    db: Mutex<Connection>,
}

impl SqliteRepository {
    /// Wrap an open connection, creating the table if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        Self::new(conn)
    }

    /// Like [`open`](Self::open), but a file that is not a readable SQLite
    /// database is moved aside to `<name>.corrupt-<unix ts>` and replaced
    /// with a fresh, empty one.
    pub fn open_or_recover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::open(path) {
            Err(e) if is_unreadable_database(&e) => {
                let aside = quarantine_path(path);
                warn!(
                    path = %path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "context database unreadable, starting empty"
                );
                std::fs::rename(path, &aside).map_err(scout_core::ScoutError::from)?;
                for suffix in ["-wal", "-shm"] {
                    let side = sidecar_path(path, suffix);
                    if side.exists() {
                        let _ = std::fs::remove_file(side);
                    }
                }
                Self::open(path)
            }
            other => other,
        }
    }
}

fn is_unreadable_database(err: &ContextError) -> bool {
    matches!(
        err,
        ContextError::Database(rusqlite::Error::SqliteFailure(e, _))
            if matches!(e.code, ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt)
    )
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn quarantine_path(path: &Path) -> PathBuf {
    sidecar_path(path, &format!(".corrupt-{}", Utc::now().timestamp()))
}

impl ContextRepository for SqliteRepository {
    fn name(&self) -> &str {
        "sqlite"
    }

    #[instrument(skip(self), fields(key = %key))]
    fn get(&self, key: &ThreadKey) -> Result<Option<ResearchContext>> {
        let db = self.db.lock().unwrap();
        read_context(&db, key)
    }

    #[instrument(skip(self, context), fields(key = %context.key))]
    fn put(&self, context: &ResearchContext) -> Result<()> {
        let db = self.db.lock().unwrap();
        write_context(&db, context)
    }

    #[instrument(skip(self), fields(key = %key))]
    fn delete(&self, key: &ThreadKey) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "DELETE FROM research_contexts WHERE thread_key = ?1",
            rusqlite::params![key.format()],
        )?;
        Ok(n > 0)
    }

    #[instrument(skip(self, f), fields(key = %key))]
    fn modify(
        &self,
        key: &ThreadKey,
        f: &mut dyn FnMut(&mut Option<ResearchContext>),
    ) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let before = read_context(&tx, key)?;
        let mut slot = before.clone();
        f(&mut slot);

        if slot != before {
            match slot {
                Some(ref context) => write_context(&tx, context)?,
                None => {
                    tx.execute(
                        "DELETE FROM research_contexts WHERE thread_key = ?1",
                        rusqlite::params![key.format()],
                    )?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn read_context(conn: &Connection, key: &ThreadKey) -> Result<Option<ResearchContext>> {
    let row = conn
        .query_row(SELECT_CONTEXT, rusqlite::params![key.format()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .optional()?;

    let Some((channel, thread_ts, company, brief, conversation, created_at)) = row else {
        return Ok(None);
    };

    // A damaged row reads as "no context" rather than failing the caller.
    let conversation: Vec<Turn> = match serde_json::from_str(&conversation) {
        Ok(turns) => turns,
        Err(e) => {
            warn!(key = %key, error = %e, "corrupt conversation column, ignoring record");
            return Ok(None);
        }
    };
    let created_at = match DateTime::parse_from_rfc3339(&created_at) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            warn!(key = %key, error = %e, "corrupt created_at column, ignoring record");
            return Ok(None);
        }
    };

    Ok(Some(ResearchContext {
        key: ThreadKey::new(channel, thread_ts),
        company,
        brief,
        created_at,
        conversation,
    }))
}

fn write_context(conn: &Connection, context: &ResearchContext) -> Result<()> {
    let conversation = serde_json::to_string(&context.conversation)?;
    conn.execute(
        "INSERT INTO research_contexts
         (thread_key, channel, thread_ts, company, brief, conversation, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(thread_key) DO UPDATE SET
             company      = excluded.company,
             brief        = excluded.brief,
             conversation = excluded.conversation,
             created_at   = excluded.created_at",
        rusqlite::params![
            context.key.format(),
            context.key.channel,
            context.key.thread_ts,
            context.company,
            context.brief,
            conversation,
            context.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}
