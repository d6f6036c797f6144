use crate::config::{CapabilitiesConfig, StatusValues};
use crate::db::errors::Result;
use sqlx::PgConnection;
use tracing::instrument;

pub struct ContactMessages<'c> {
    db: &'c mut PgConnection,
    capabilities: &'c CapabilitiesConfig,
    status_values: &'c StatusValues,
}

impl<'c> ContactMessages<'c> {
    pub fn new(db: &'c mut PgConnection, capabilities: &'c CapabilitiesConfig, status_values: &'c StatusValues) -> Self {
        Self {
            db,
            capabilities,
            status_values,
        }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Messages awaiting a reply; 0 when message status isn't tracked.
    #[instrument(skip(self), err)]
    pub async fn count_pending(&mut self) -> Result<i64> {
        if !self.capabilities.message_status {
            return Ok(0);
        }

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contact_messages WHERE status = $1")
            .bind(&self.status_values.message_pending)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}
