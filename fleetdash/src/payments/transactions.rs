//! Ledger backed by the record store's `transactions` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use super::{Result, RevenueLedger};
use crate::db::models::series::DailySum;

pub struct TransactionsLedger {
    /// Status a transaction must have to count as revenue
    completed_status: String,
}

impl TransactionsLedger {
    pub fn new(completed_status: String) -> Self {
        Self { completed_status }
    }
}

#[async_trait]
impl RevenueLedger for TransactionsLedger {
    #[instrument(skip(self, db), err)]
    async fn total(&self, db: &PgPool, since: Option<DateTime<Utc>>) -> Result<Decimal> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM transactions
            WHERE status = $1 AND ($2::timestamptz IS NULL OR created_at >= $2)
            "#,
        )
        .bind(&self.completed_status)
        .bind(since)
        .fetch_one(db)
        .await?;
        Ok(total)
    }

    #[instrument(skip(self, db), err)]
    async fn daily_totals(&self, db: &PgPool, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<DailySum>> {
        let rows = sqlx::query_as::<_, DailySum>(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, SUM(amount) AS value
            FROM transactions
            WHERE status = $1 AND created_at >= $2 AND created_at < $3
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(&self.completed_status)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
