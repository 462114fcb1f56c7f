//! SQL schema for the paywall SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS documents (
    slug                  TEXT PRIMARY KEY,   -- exact, case-sensitive
    title_json            TEXT NOT NULL,      -- JSON array of rich-text blocks
    content_json          TEXT NOT NULL,      -- JSON array of rich-text blocks
    last_publication_date TEXT NOT NULL,      -- RFC 3339 or YYYY-MM-DD
    stored_at             TEXT NOT NULL
);

-- Raw tokens are never stored; rows are keyed by their SHA-256 digest.
CREATE TABLE IF NOT EXISTS sessions (
    token_digest        TEXT PRIMARY KEY,
    subject             TEXT NOT NULL,
    email               TEXT,
    active_subscription TEXT,
    expires_at          TEXT                -- RFC 3339 UTC or NULL for no expiry
);

PRAGMA user_version = 1;
";
