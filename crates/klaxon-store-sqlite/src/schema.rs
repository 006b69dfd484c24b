//! SQL schema for the Klaxon SQLite store.
//!
//! Applied in full at connection startup. `PRAGMA user_version` records the
//! schema revision so future migrations have something to gate on.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS incidents (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    service     TEXT NOT NULL,
    severity    TEXT NOT NULL
                CHECK (severity IN ('SEV1', 'SEV2', 'SEV3', 'SEV4')),
    status      TEXT NOT NULL DEFAULT 'OPEN'
                CHECK (status IN ('OPEN', 'MITIGATED', 'RESOLVED')),
    owner       TEXT,            -- NULL = unowned
    summary     TEXT,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; set once
    updated_at  TEXT NOT NULL    -- RFC 3339 UTC; moves on every mutation
);

CREATE INDEX IF NOT EXISTS incidents_created_idx  ON incidents(created_at DESC);
CREATE INDEX IF NOT EXISTS incidents_status_idx   ON incidents(status);
CREATE INDEX IF NOT EXISTS incidents_severity_idx ON incidents(severity);
CREATE INDEX IF NOT EXISTS incidents_service_idx  ON incidents(service);

PRAGMA user_version = 1;
";
