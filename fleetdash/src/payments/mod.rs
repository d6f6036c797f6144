//! Revenue ledger abstraction
//!
//! Revenue is optional: deployments without a payment ledger report zero revenue and an empty
//! revenue series. The `RevenueLedger` trait hides where completed payments live.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::{PaymentConfig, StatusValues};
use crate::db::models::series::DailySum;

pub mod disabled;
pub mod transactions;

/// Create a revenue ledger from configuration
///
/// No payment configuration means revenue is not tracked at all.
pub fn create_ledger(config: Option<&PaymentConfig>, status_values: &StatusValues) -> Arc<dyn RevenueLedger> {
    match config {
        Some(PaymentConfig::Transactions) => {
            Arc::new(transactions::TransactionsLedger::new(status_values.transaction_completed.clone()))
        }
        None => Arc::new(disabled::DisabledLedger),
    }
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("No payment ledger is configured")]
    NotConfigured,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Source of completed payments
#[async_trait]
pub trait RevenueLedger: Send + Sync {
    /// Sum of completed payments, optionally only those at or after `since`
    async fn total(&self, db: &PgPool, since: Option<DateTime<Utc>>) -> Result<Decimal>;

    /// Completed payments summed per UTC day in `[start, end)`. Days without payments are absent.
    async fn daily_totals(&self, db: &PgPool, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<DailySum>>;
}

/// Collapse ledger failures into `T::default()`, logging anything other than a missing ledger.
///
/// Revenue must never take down the overview or the chart.
pub fn or_default<T: Default>(result: Result<T>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(PaymentError::NotConfigured) => {
            tracing::debug!("Revenue not tracked, reporting empty {}", what);
            T::default()
        }
        Err(e) => {
            tracing::warn!("Failed to read {} from payment ledger: {}", what, e);
            T::default()
        }
    }
}
