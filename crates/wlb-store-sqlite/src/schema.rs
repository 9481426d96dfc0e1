//! SQL schema for the WLB SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Children reference their parent's external id, never its row id.
/// Taxonomy parents cannot be deleted while children exist; logs go with
/// their tag or their user.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'basic',  -- 'admin' | 'basic'
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS activity_domains (
    id           TEXT PRIMARY KEY,                -- internal row id
    domain_id    TEXT NOT NULL UNIQUE,            -- external id, AD-XXXXXXXX
    name         TEXT NOT NULL,
    description  TEXT,
    is_published INTEGER NOT NULL DEFAULT 1,
    sort_order   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS activity_types (
    id           TEXT PRIMARY KEY,
    type_id      TEXT NOT NULL UNIQUE,            -- AT-XXXXXXXX
    domain_id    TEXT NOT NULL
                 REFERENCES activity_domains(domain_id) ON DELETE RESTRICT,
    name         TEXT NOT NULL,
    is_published INTEGER NOT NULL DEFAULT 1,
    sort_order   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS activity_tags (
    id           TEXT PRIMARY KEY,
    tag_id       TEXT NOT NULL UNIQUE,            -- AG-XXXXXXXX
    type_id      TEXT NOT NULL
                 REFERENCES activity_types(type_id) ON DELETE RESTRICT,
    name         TEXT NOT NULL,
    is_published INTEGER NOT NULL DEFAULT 1,
    sort_order   INTEGER NOT NULL DEFAULT 0
);

-- Logs are never updated once written.
CREATE TABLE IF NOT EXISTS activity_logs (
    id               TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL
                     REFERENCES users(user_id) ON DELETE CASCADE,
    tag_id           TEXT NOT NULL
                     REFERENCES activity_tags(tag_id) ON DELETE CASCADE,
    start_time       TEXT NOT NULL,               -- RFC 3339 UTC
    duration_seconds INTEGER NOT NULL CHECK (duration_seconds > 0),
    notes            TEXT
);

CREATE INDEX IF NOT EXISTS types_domain_idx ON activity_types(domain_id, sort_order);
CREATE INDEX IF NOT EXISTS tags_type_idx    ON activity_tags(type_id, sort_order);
CREATE INDEX IF NOT EXISTS logs_user_idx    ON activity_logs(user_id, start_time);
CREATE INDEX IF NOT EXISTS logs_tag_idx     ON activity_logs(tag_id);

PRAGMA user_version = 1;
";
