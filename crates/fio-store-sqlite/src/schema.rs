//! SQL schema for the FIO SQLite store.

/// Connection-level settings, applied on every open.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
";

/// Table DDL. Only run when the `persons` table does not exist yet.
///
/// `AUTOINCREMENT` keeps the high-water mark in `sqlite_sequence`, so ids of
/// deleted rows are never handed out again.
pub const SCHEMA: &str = "
CREATE TABLE persons (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL CHECK (name    <> ''),
    surname     TEXT    NOT NULL CHECK (surname <> ''),
    patronymic  TEXT    NOT NULL DEFAULT '',
    age         INTEGER NOT NULL,
    gender      TEXT    NOT NULL,
    ethnicity   TEXT    NOT NULL,
    created_at  TEXT    NOT NULL,   -- RFC 3339 UTC; server-assigned
    updated_at  TEXT    NOT NULL    -- RFC 3339 UTC; refreshed on every edit
);

CREATE INDEX persons_gender_idx    ON persons(gender);
CREATE INDEX persons_ethnicity_idx ON persons(ethnicity);
CREATE INDEX persons_age_idx       ON persons(age);

PRAGMA user_version = 1;
";

/// Name of the table every query in this crate targets.
pub const TABLE: &str = "persons";

/// Unicode-aware lowercase used for case-insensitive substring filters.
/// SQLite's built-in `lower()` and `LIKE` only fold ASCII.
pub const CASEFOLD_FN: &str = "casefold";
