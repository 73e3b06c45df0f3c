// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `call_records` table definition.
//!
//! There is a single table and no migration history; the statement is
//! idempotent and runs on every start.

/// Creates `call_records` if it does not exist.
///
/// `AUTOINCREMENT` keeps ids strictly increasing and never reused, even if
/// rows are removed by outside tools.
pub const CREATE_CALL_RECORDS: &str = "
CREATE TABLE IF NOT EXISTS call_records (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    transcript      TEXT    NOT NULL,
    intent          TEXT    NOT NULL,
    sentiment       TEXT    NOT NULL CHECK (sentiment IN ('positive', 'neutral', 'negative')),
    summary         TEXT    NOT NULL,
    action_required INTEGER NOT NULL CHECK (action_required IN (0, 1)),
    created_at      TEXT    NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
";

/// Applies the schema on one connection.
pub fn ensure_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(CREATE_CALL_RECORDS)
}
