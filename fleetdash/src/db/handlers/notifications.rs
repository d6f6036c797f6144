use crate::config::{CapabilitiesConfig, StatusValues};
use crate::db::{errors::Result, models::series::DailyCount};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Postgres, query_builder::QueryBuilder};
use tracing::instrument;

pub struct Notifications<'c> {
    db: &'c mut PgConnection,
    capabilities: &'c CapabilitiesConfig,
    status_values: &'c StatusValues,
}

impl<'c> Notifications<'c> {
    pub fn new(db: &'c mut PgConnection, capabilities: &'c CapabilitiesConfig, status_values: &'c StatusValues) -> Self {
        Self {
            db,
            capabilities,
            status_values,
        }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scheduled_notifications")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Delivered notifications; 0 when notification status isn't tracked.
    #[instrument(skip(self), err)]
    pub async fn count_sent(&mut self) -> Result<i64> {
        if !self.capabilities.notification_status {
            return Ok(0);
        }

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scheduled_notifications WHERE status = $1")
            .bind(&self.status_values.notification_sent)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Notifications per UTC day in `[start, end)`, bucketed by send time, falling back to creation time.
    ///
    /// Only delivered notifications are counted when status is tracked; otherwise every row is.
    #[instrument(skip(self), err)]
    pub async fn daily_counts(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<DailyCount>> {
        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT (COALESCE(sent_at, created_at) AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS value
            FROM scheduled_notifications
            WHERE COALESCE(sent_at, created_at) >= "#,
        );
        query.push_bind(start);
        query.push(" AND COALESCE(sent_at, created_at) < ");
        query.push_bind(end);
        if self.capabilities.notification_status {
            query.push(" AND status = ");
            query.push_bind(self.status_values.notification_sent.as_str());
        }
        query.push(" GROUP BY 1 ORDER BY 1");

        let rows = query.build_query_as::<DailyCount>().fetch_all(&mut *self.db).await?;
        Ok(rows)
    }
}
