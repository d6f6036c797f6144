//! Aggregate rows: per-day buckets and per-category counts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Number of records falling on one UTC calendar day.
#[derive(Debug, Clone, FromRow)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub value: i64,
}

/// Sum of an amount column over one UTC calendar day.
#[derive(Debug, Clone, FromRow)]
pub struct DailySum {
    pub day: NaiveDate,
    pub value: Decimal,
}

/// Count of records sharing a (possibly missing) category value.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryCount {
    pub name: Option<String>,
    pub value: i64,
}
