//! SQL schema for the wordpool SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- The shared word list. Rows are never deleted.
CREATE TABLE IF NOT EXISTS wordlist (
    id    INTEGER PRIMARY KEY,
    word  TEXT    NOT NULL UNIQUE,
    used  INTEGER NOT NULL DEFAULT 0 CHECK (used IN (0, 1))
);

-- One row per visitor, created on the first successful draw.
CREATE TABLE IF NOT EXISTS visitors (
    visitor       TEXT PRIMARY KEY,  -- address or its iterated SHA-256
    last_access   TEXT NOT NULL,     -- RFC 3339 UTC, fixed width; last allowed draw
    last_message  TEXT,              -- NULL once undone
    last_words    TEXT,              -- JSON array of wordlist ids; NULL once undone
    tz_offset     INTEGER            -- minutes east of UTC
);

CREATE INDEX IF NOT EXISTS wordlist_used_idx     ON wordlist(used);
CREATE INDEX IF NOT EXISTS visitors_access_idx   ON visitors(last_access);

PRAGMA user_version = 1;
";
