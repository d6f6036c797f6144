//! Ledger used when no payment source is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{PaymentError, Result, RevenueLedger};
use crate::db::models::series::DailySum;

pub struct DisabledLedger;

#[async_trait]
impl RevenueLedger for DisabledLedger {
    async fn total(&self, _db: &PgPool, _since: Option<DateTime<Utc>>) -> Result<Decimal> {
        Err(PaymentError::NotConfigured)
    }

    async fn daily_totals(&self, _db: &PgPool, _start: DateTime<Utc>, _end: DateTime<Utc>) -> Result<Vec<DailySum>> {
        Err(PaymentError::NotConfigured)
    }
}
