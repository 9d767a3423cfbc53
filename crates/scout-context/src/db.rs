use rusqlite::Connection;

use crate::error::Result;

/// Initialise the research-context table.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS research_contexts (
            thread_key    TEXT PRIMARY KEY,
            channel       TEXT NOT NULL,
            thread_ts     TEXT NOT NULL,
            company       TEXT NOT NULL,
            brief         TEXT NOT NULL,
            conversation  TEXT NOT NULL DEFAULT '[]',  -- JSON array of turns
            created_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_research_contexts_created
            ON research_contexts(created_at);",
    )?;
    Ok(())
}
