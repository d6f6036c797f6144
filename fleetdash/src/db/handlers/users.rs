//! Database repository for users.

use crate::config::{CapabilitiesConfig, StatusValues};
use crate::db::{
    errors::Result,
    models::{
        series::{CategoryCount, DailyCount},
        users::UserDBResponse,
    },
};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Postgres, query_builder::QueryBuilder};
use tracing::instrument;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    /// Blank search terms are treated as no search at all.
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self
    }
}

/// Escape LIKE metacharacters so the term matches literally, then wrap it for a substring match.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
    capabilities: &'c CapabilitiesConfig,
    status_values: &'c StatusValues,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection, capabilities: &'c CapabilitiesConfig, status_values: &'c StatusValues) -> Self {
        Self {
            db,
            capabilities,
            status_values,
        }
    }

    /// Column list for [`UserDBResponse`]; optional columns become typed NULLs when disabled.
    fn columns(&self) -> String {
        let phone = if self.capabilities.user_phone {
            "phone"
        } else {
            "NULL::text AS phone"
        };
        let membership = if self.capabilities.membership_tracking {
            "membership_type"
        } else {
            "NULL::text AS membership_type"
        };
        format!(
            "id, username, email, first_name, last_name, {phone}, is_active, is_staff, is_superuser, date_joined, {membership}"
        )
    }

    fn push_search_filter(&self, query: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
        let Some(term) = search else { return };
        let pattern = contains_pattern(term);

        query.push(" AND (LOWER(username) LIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR LOWER(email) LIKE ");
        query.push_bind(pattern.clone());
        if self.capabilities.user_phone {
            query.push(" OR LOWER(COALESCE(phone, '')) LIKE ");
            query.push_bind(pattern);
        }
        query.push(")");
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn count_active(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Users who joined at or after `since`
    #[instrument(skip(self), err)]
    pub async fn count_joined_since(&mut self, since: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE date_joined >= $1")
            .bind(since)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Users who joined in `[start, end)`
    #[instrument(skip(self), err)]
    pub async fn count_joined_between(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE date_joined >= $1 AND date_joined < $2")
            .bind(start)
            .bind(end)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Users on the premium membership; 0 without membership tracking.
    #[instrument(skip(self), err)]
    pub async fn count_premium(&mut self) -> Result<i64> {
        if !self.capabilities.membership_tracking {
            return Ok(0);
        }

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE LOWER(membership_type) = LOWER($1)")
            .bind(&self.status_values.premium_membership)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    /// Signups per UTC day in `[start, end)`. Days without signups are absent.
    #[instrument(skip(self), err)]
    pub async fn daily_signups(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<DailyCount>> {
        let rows = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT (date_joined AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS value
            FROM users
            WHERE date_joined >= $1 AND date_joined < $2
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

    /// Users grouped by membership, largest group first.
    ///
    /// Blank and missing memberships share one unnamed bucket. Without membership tracking this
    /// is a single unnamed bucket holding every user.
    #[instrument(skip(self), err)]
    pub async fn membership_distribution(&mut self) -> Result<Vec<CategoryCount>> {
        if !self.capabilities.membership_tracking {
            let total = self.count().await?;
            return Ok(vec![CategoryCount { name: None, value: total }]);
        }

        let rows = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT NULLIF(membership_type, '') AS name, COUNT(*) AS value
            FROM users
            GROUP BY 1
            ORDER BY value DESC, name ASC NULLS LAST
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows)
    }

    /// Count users matching the filter's search (pagination is ignored)
    #[instrument(skip(self, filter), err)]
    pub async fn count_matching(&mut self, filter: &UserFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1=1");
        self.push_search_filter(&mut query, filter.search.as_deref());

        let count = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// One page of users matching the filter, ordered by id
    #[instrument(skip(self, filter), fields(offset = filter.skip, limit = filter.limit), err)]
    pub async fn list(&mut self, filter: &UserFilter) -> Result<Vec<UserDBResponse>> {
        let mut query = QueryBuilder::new(format!("SELECT {} FROM users WHERE 1=1", self.columns()));
        self.push_search_filter(&mut query, filter.search.as_deref());

        query.push(" ORDER BY id ASC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let users = query.build_query_as::<UserDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(users)
    }

    /// Every inactive user, ordered by id
    #[instrument(skip(self), err)]
    pub async fn list_blocked(&mut self) -> Result<Vec<UserDBResponse>> {
        let sql = format!("SELECT {} FROM users WHERE NOT is_active ORDER BY id ASC", self.columns());
        let users = sqlx::query_as::<_, UserDBResponse>(&sql).fetch_all(&mut *self.db).await?;
        Ok(users)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: UserId) -> Result<Option<UserDBResponse>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", self.columns());
        let user = sqlx::query_as::<_, UserDBResponse>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", self.columns());
        let user = sqlx::query_as::<_, UserDBResponse>(&sql)
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportWindow;
    use crate::test_utils::{TestUser, insert_user};
    use chrono::Duration;
    use sqlx::PgPool;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Alice"), "%alice%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_blank_search_is_ignored() {
        assert_eq!(UserFilter::new(0, 20).with_search(Some("   ".to_string())).search, None);
        assert_eq!(
            UserFilter::new(0, 20).with_search(Some(" bob ".to_string())).search,
            Some("bob".to_string())
        );
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_growth_windows(pool: PgPool) {
        let window = ReportWindow::current();
        let this_month = window.month_start() + Duration::days(1);
        let last_month = window.previous_month().0 + Duration::days(1);

        for i in 0..12 {
            insert_user(&pool, &TestUser::builder().username(format!("new{i}")).date_joined(this_month).build()).await;
        }
        for i in 0..10 {
            insert_user(&pool, &TestUser::builder().username(format!("old{i}")).date_joined(last_month).build()).await;
        }

        let caps = CapabilitiesConfig::default();
        let statuses = StatusValues::default();
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn, &caps, &statuses);

        assert_eq!(repo.count().await.unwrap(), 22);
        assert_eq!(repo.count_joined_since(window.month_start()).await.unwrap(), 12);
        let (start, end) = window.previous_month();
        assert_eq!(repo.count_joined_between(start, end).await.unwrap(), 10);
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_search_matches_username_email_and_phone(pool: PgPool) {
        insert_user(&pool, &TestUser::builder().username("alice").email("alice@fleet.io").build()).await;
        insert_user(&pool, &TestUser::builder().username("bob").email("robert@FLEET.io").build()).await;
        insert_user(
            &pool,
            &TestUser::builder().username("carol").email("carol@example.com").phone("+254700111222").build(),
        )
        .await;

        let statuses = StatusValues::default();
        let mut conn = pool.acquire().await.unwrap();

        let caps = CapabilitiesConfig::default();
        let mut repo = Users::new(&mut conn, &caps, &statuses);
        let filter = UserFilter::new(0, 20).with_search(Some("fleet".to_string()));
        assert_eq!(repo.count_matching(&filter).await.unwrap(), 2);

        // Phone is only searched when the column is enabled
        let filter = UserFilter::new(0, 20).with_search(Some("700111".to_string()));
        assert_eq!(repo.count_matching(&filter).await.unwrap(), 0);

        let caps = CapabilitiesConfig {
            user_phone: true,
            ..Default::default()
        };
        let mut repo = Users::new(&mut conn, &caps, &statuses);
        let users = repo.list(&filter).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "carol");
        assert_eq!(users[0].phone.as_deref(), Some("+254700111222"));
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_optional_columns_are_null_when_disabled(pool: PgPool) {
        insert_user(
            &pool,
            &TestUser::builder()
                .username("dora")
                .phone("+1555")
                .membership_type("premium")
                .build(),
        )
        .await;

        let caps = CapabilitiesConfig::default();
        let statuses = StatusValues::default();
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn, &caps, &statuses);

        let user = repo.get_by_username("dora").await.unwrap().unwrap();
        assert_eq!(user.phone, None);
        assert_eq!(user.membership_type, None);
        assert_eq!(repo.count_premium().await.unwrap(), 0);
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_membership_distribution(pool: PgPool) {
        for (name, membership) in [
            ("a", Some("Premium")),
            ("b", Some("premium")),
            ("c", None),
            ("d", Some("basic")),
            ("e", Some("Premium")),
            ("f", Some("")),
        ] {
            insert_user(&pool, &TestUser::builder().username(name).maybe_membership_type(membership).build()).await;
        }

        let caps = CapabilitiesConfig {
            membership_tracking: true,
            ..Default::default()
        };
        let statuses = StatusValues::default();
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn, &caps, &statuses);

        let distribution = repo.membership_distribution().await.unwrap();
        assert_eq!(distribution[0].name.as_deref(), Some("Premium"));
        assert_eq!(distribution[0].value, 2);
        assert_eq!(distribution.iter().map(|c| c.value).sum::<i64>(), 6);
        // Blank and missing memberships are one group
        let unnamed: Vec<_> = distribution.iter().filter(|c| c.name.is_none()).collect();
        assert_eq!(unnamed.len(), 1);
        assert_eq!(unnamed[0].value, 2);
        assert!(!distribution.iter().any(|c| c.name.as_deref() == Some("")));

        // Premium matching ignores case
        assert_eq!(repo.count_premium().await.unwrap(), 3);
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_list_blocked(pool: PgPool) {
        insert_user(&pool, &TestUser::builder().username("active").build()).await;
        insert_user(&pool, &TestUser::builder().username("blocked1").is_active(false).build()).await;
        insert_user(&pool, &TestUser::builder().username("blocked2").is_active(false).build()).await;

        let caps = CapabilitiesConfig::default();
        let statuses = StatusValues::default();
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn, &caps, &statuses);

        let blocked = repo.list_blocked().await.unwrap();
        let names: Vec<_> = blocked.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["blocked1", "blocked2"]);
        assert_eq!(repo.count_active().await.unwrap(), 1);
    }
}
