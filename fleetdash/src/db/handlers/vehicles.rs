use crate::db::{errors::Result, models::series::CategoryCount};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Vehicles<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Vehicles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// The `limit` most common vehicle types. Ties are broken by name so the order is stable.
    ///
    /// Blank and missing types share one unnamed bucket.
    #[instrument(skip(self), err)]
    pub async fn type_distribution(&mut self, limit: i64) -> Result<Vec<CategoryCount>> {
        let rows = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT NULLIF(vehicle_type, '') AS name, COUNT(*) AS value
            FROM vehicles
            GROUP BY 1
            ORDER BY value DESC, name ASC NULLS LAST
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }
}
