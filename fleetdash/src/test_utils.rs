//! Test fixtures: configuration, app construction, and record store seeding.

use crate::{
    AppState, Application,
    auth::session,
    config::Config,
    db::models::users::UserDBResponse,
    payments,
    types::UserId,
};
use axum_test::TestServer;
use bon::Builder;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-jwt".to_string()),
        // The Prometheus recorder is process-global and can only be installed once
        enable_metrics: false,
        ..Default::default()
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    let config = create_test_config();
    AppState::builder()
        .db(pool)
        .ledger(payments::create_ledger(config.payment.as_ref(), &config.status_values))
        .config(config)
        .build()
}

/// Build a test server over `pool`; the config is handed back for signing tokens.
pub async fn create_test_app(pool: PgPool, config: Config) -> (TestServer, Config) {
    let app = Application::with_pool(config.clone(), pool).expect("Failed to build application");
    (app.into_test_server(), config)
}

/// A user row to seed
#[derive(Debug, Builder)]
pub struct TestUser {
    #[builder(into)]
    pub username: String,
    /// Defaults to `<username>@example.com`
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub phone: Option<String>,
    #[builder(into)]
    pub membership_type: Option<String>,
    #[builder(default = true)]
    pub is_active: bool,
    #[builder(default)]
    pub is_staff: bool,
    #[builder(default = Utc::now())]
    pub date_joined: DateTime<Utc>,
}

pub async fn insert_user(pool: &PgPool, user: &TestUser) -> UserDBResponse {
    let email = user.email.clone().unwrap_or_else(|| format!("{}@example.com", user.username));

    sqlx::query_as::<_, UserDBResponse>(
        r#"
        INSERT INTO users (username, email, first_name, last_name, phone, is_active, is_staff, is_superuser, date_joined, membership_type)
        VALUES ($1, $2, 'Test', 'User', $3, $4, $5, FALSE, $6, $7)
        RETURNING id, username, email, first_name, last_name, phone, is_active, is_staff, is_superuser, date_joined, membership_type
        "#,
    )
    .bind(&user.username)
    .bind(email)
    .bind(&user.phone)
    .bind(user.is_active)
    .bind(user.is_staff)
    .bind(user.date_joined)
    .bind(&user.membership_type)
    .fetch_one(pool)
    .await
    .expect("Failed to create test user")
}

pub async fn create_test_user(pool: &PgPool) -> UserDBResponse {
    let n = USER_COUNTER.fetch_add(1, Ordering::Relaxed);
    insert_user(pool, &TestUser::builder().username(format!("testuser_{n}")).build()).await
}

pub async fn create_test_admin_user(pool: &PgPool) -> UserDBResponse {
    let n = USER_COUNTER.fetch_add(1, Ordering::Relaxed);
    insert_user(
        pool,
        &TestUser::builder().username(format!("testadmin_{n}")).is_staff(true).build(),
    )
    .await
}

pub fn bearer_token(user_id: UserId, config: &Config) -> String {
    session::create_access_token(user_id, Duration::from_secs(3600), config).expect("Failed to sign test token")
}

/// `Authorization` header value for `user_id`
pub fn bearer_header(user_id: UserId, config: &Config) -> String {
    format!("Bearer {}", bearer_token(user_id, config))
}

pub async fn insert_vehicle(pool: &PgPool, vehicle_type: Option<&str>) {
    sqlx::query("INSERT INTO vehicles (vehicle_type) VALUES ($1)")
        .bind(vehicle_type)
        .execute(pool)
        .await
        .expect("Failed to create test vehicle");
}

pub async fn insert_trip(pool: &PgPool, start_date: Option<DateTime<Utc>>, is_active: Option<bool>) {
    sqlx::query("INSERT INTO trips (start_date, is_active) VALUES ($1, $2)")
        .bind(start_date)
        .bind(is_active)
        .execute(pool)
        .await
        .expect("Failed to create test trip");
}

pub async fn insert_notification(pool: &PgPool, status: Option<&str>, sent_at: Option<DateTime<Utc>>) {
    sqlx::query("INSERT INTO scheduled_notifications (status, sent_at) VALUES ($1, $2)")
        .bind(status)
        .bind(sent_at)
        .execute(pool)
        .await
        .expect("Failed to create test notification");
}

pub async fn insert_message(pool: &PgPool, status: Option<&str>) {
    sqlx::query("INSERT INTO contact_messages (status) VALUES ($1)")
        .bind(status)
        .execute(pool)
        .await
        .expect("Failed to create test message");
}

pub async fn insert_transaction(pool: &PgPool, amount: Decimal, status: &str, created_at: DateTime<Utc>) {
    sqlx::query("INSERT INTO transactions (amount, status, created_at) VALUES ($1, $2, $3)")
        .bind(amount)
        .bind(status)
        .bind(created_at)
        .execute(pool)
        .await
        .expect("Failed to create test transaction");
}
