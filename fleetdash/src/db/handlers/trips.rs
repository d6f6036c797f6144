use crate::config::CapabilitiesConfig;
use crate::db::{errors::Result, models::series::DailyCount};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Trips<'c> {
    db: &'c mut PgConnection,
    capabilities: &'c CapabilitiesConfig,
}

impl<'c> Trips<'c> {
    pub fn new(db: &'c mut PgConnection, capabilities: &'c CapabilitiesConfig) -> Self {
        Self { db, capabilities }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trips")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Trips currently in progress; 0 when trip activity isn't tracked.
    #[instrument(skip(self), err)]
    pub async fn count_active(&mut self) -> Result<i64> {
        if !self.capabilities.trip_activity {
            return Ok(0);
        }

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trips WHERE is_active IS TRUE")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Trips per UTC day in `[start, end)`, bucketed by start date, falling back to creation time.
    #[instrument(skip(self), err)]
    pub async fn daily_counts(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<DailyCount>> {
        let rows = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT (COALESCE(start_date, created_at) AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS value
            FROM trips
            WHERE COALESCE(start_date, created_at) >= $1 AND COALESCE(start_date, created_at) < $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }
}
