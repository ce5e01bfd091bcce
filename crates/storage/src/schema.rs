use rusqlite::Connection;

use crate::error::StorageError;

pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA cache_size = -32000;
        PRAGMA busy_timeout = 5000;
    ",
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, unixepoch())",
        [SCHEMA_VERSION],
    )?;
    Ok(())
}

// Event collections carry a UNIQUE (user_id, video_id) so a racing duplicate
// insert fails instead of double counting.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    interests BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS video_metadata (
    id INTEGER PRIMARY KEY,
    creator_id INTEGER NOT NULL,
    description TEXT NOT NULL,
    series TEXT NOT NULL,
    public INTEGER NOT NULL,
    likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
    tags BLOB NOT NULL,
    modifiers BLOB NOT NULL,
    storage_key TEXT NOT NULL CHECK (length(storage_key) = 64)
);
CREATE INDEX IF NOT EXISTS idx_video_metadata_creator ON video_metadata (creator_id);

CREATE TABLE IF NOT EXISTS liked_videos (
    rowid INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    video_id INTEGER NOT NULL,
    UNIQUE (user_id, video_id)
);
CREATE INDEX IF NOT EXISTS idx_liked_videos_video ON liked_videos (video_id);

CREATE TABLE IF NOT EXISTS watched_videos (
    rowid INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    video_id INTEGER NOT NULL,
    UNIQUE (user_id, video_id)
);
CREATE INDEX IF NOT EXISTS idx_watched_videos_video ON watched_videos (video_id);
";
