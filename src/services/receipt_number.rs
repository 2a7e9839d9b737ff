use chrono::{Datelike, Utc};
use sea_orm::{ConnectionTrait, DatabaseTransaction, DbBackend, Statement};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const PREFIX: &str = "REC";

pub fn format_receipt_number(year: i32, seq: i32) -> String {
    format!("{PREFIX}-{year}-{seq:06}")
}

/// Extract `(year, seq)` from a receipt number like `REC-2026-000123`.
pub fn parse_receipt_number(receipt_number: &str) -> Option<(i32, i32)> {
    let mut parts = receipt_number.split('-');
    if parts.next()? != PREFIX {
        return None;
    }
    let year = parts.next()?.parse().ok()?;
    let seq = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((year, seq))
}

/// Allocate the next receipt number for `store_id` in the current year.
///
/// The counter row stays locked until `txn` ends, so concurrent sales in the
/// same store queue here; a rolled-back sale also rolls back its number. The
/// first allocation of a year starts after the highest receipt already stored
/// for that year. The unique `(store_id, receipt_number)` constraint is the backstop.
pub async fn next(txn: &DatabaseTransaction, store_id: Uuid) -> AppResult<String> {
    let year = Utc::now().year();
    let seq = next_sequence(txn, store_id, year).await?;
    Ok(format_receipt_number(year, seq))
}

async fn next_sequence(txn: &DatabaseTransaction, store_id: Uuid, year: i32) -> AppResult<i32> {
    let pattern = format!("{PREFIX}-{year}-%");
    let row = txn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO receipt_counters (store_id, year, last_seq)
            SELECT $1, $2, COALESCE(MAX(CAST(split_part(receipt_number, '-', 3) AS INTEGER)), 0) + 1
            FROM sales
            WHERE store_id = $1 AND receipt_number LIKE $3
            ON CONFLICT (store_id, year)
            DO UPDATE SET last_seq = receipt_counters.last_seq + 1
            RETURNING last_seq
            "#,
            [store_id.into(), year.into(), pattern.into()],
        ))
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("receipt counter returned no row")))?;

    let seq: i32 = row.try_get("", "last_seq")?;
    Ok(seq)
}
