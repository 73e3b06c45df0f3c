// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call record writes and audit reads.

use std::str::FromStr;

use callsight_core::{CallRecord, CallsightError, Insight, Sentiment, Transcript};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::debug;

use crate::database::map_tr_err;
use crate::pool::ConnectionPool;

const SELECT_COLUMNS: &str =
    "SELECT id, transcript, intent, sentiment, summary, action_required, created_at FROM call_records";

/// Writes one record inside an IMMEDIATE transaction.
///
/// The connection is held only for the duration of the write and goes back
/// to the pool when the guard drops, on success or failure.
pub async fn insert_record(
    pool: &ConnectionPool,
    transcript: &Transcript,
    insight: &Insight,
) -> Result<CallRecord, CallsightError> {
    let transcript = transcript.as_str().to_string();
    let insight = insight.clone();
    let conn = pool.acquire().await?;

    let record = conn
        .call(move |conn| -> Result<CallRecord, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let (id, created_at): (i64, String) = tx.query_row(
                "INSERT INTO call_records (transcript, intent, sentiment, summary, action_required)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id, created_at",
                params![
                    transcript,
                    insight.customer_intent,
                    insight.sentiment.as_str(),
                    insight.summary,
                    insight.action_required,
                ],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            tx.commit()?;

            Ok(CallRecord {
                id,
                transcript,
                intent: insight.customer_intent,
                sentiment: insight.sentiment,
                summary: insight.summary,
                action_required: insight.action_required,
                created_at,
            })
        })
        .await
        .map_err(map_tr_err)?;

    debug!(record_id = record.id, "call record inserted");
    Ok(record)
}

/// Number of persisted records.
pub async fn count_records(pool: &ConnectionPool) -> Result<u64, CallsightError> {
    let conn = pool.acquire().await?;
    let count = conn
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM call_records", [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err)?;
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Looks up one record by id.
pub async fn get_record(
    pool: &ConnectionPool,
    id: i64,
) -> Result<Option<CallRecord>, CallsightError> {
    let conn = pool.acquire().await?;
    conn.call(move |conn| -> Result<Option<CallRecord>, rusqlite::Error> {
        conn.query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], row_to_record)
            .optional()
    })
    .await
    .map_err(map_tr_err)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<CallRecord, rusqlite::Error> {
    let sentiment: String = row.get(3)?;
    let sentiment = Sentiment::from_str(&sentiment)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(CallRecord {
        id: row.get(0)?,
        transcript: row.get(1)?,
        intent: row.get(2)?,
        sentiment,
        summary: row.get(4)?,
        action_required: row.get(5)?,
        created_at: row.get(6)?,
    })
}
