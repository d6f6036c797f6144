use axum::{Json, extract::State};
use rust_decimal::prelude::ToPrimitive;

use crate::{
    AppState,
    api::models::stats::OverviewStats,
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        errors::DbError,
        handlers::{ContactMessages, Notifications, Trips, Users, Vehicles},
    },
    errors::Result,
    payments,
    reports::{ReportWindow, growth_percentage},
};

/// Get overview statistics
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "dashboard",
    summary = "Overview statistics",
    description = "Headline user, fleet, notification, message and revenue figures. Figures that depend on an untracked attribute are 0.",
    responses(
        (status = 200, description = "Overview statistics", body = OverviewStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - staff only"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("BearerAuth" = []),
        ("ProxyHeader" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_stats(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<OverviewStats>> {
    let window = ReportWindow::current();
    let config = &state.config;
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let mut users = Users::new(&mut conn, &config.capabilities, &config.status_values);
    let total_users = users.count().await?;
    let active_users = users.count_active().await?;
    let premium_users = users.count_premium().await?;
    let new_users_this_month = users.count_joined_since(window.month_start()).await?;
    let new_users_this_week = users.count_joined_since(window.week_start()).await?;
    let (previous_start, previous_end) = window.previous_month();
    let previous_month = users.count_joined_between(previous_start, previous_end).await?;

    let total_vehicles = Vehicles::new(&mut conn).count().await?;

    let mut trips = Trips::new(&mut conn, &config.capabilities);
    let total_trips = trips.count().await?;
    let active_trips = trips.count_active().await?;

    let mut notifications = Notifications::new(&mut conn, &config.capabilities, &config.status_values);
    let total_notifications = notifications.count().await?;
    let sent_notifications = notifications.count_sent().await?;

    let mut messages = ContactMessages::new(&mut conn, &config.capabilities, &config.status_values);
    let total_messages = messages.count().await?;
    let pending_messages = messages.count_pending().await?;

    // The ledger takes its own connection; holding ours meanwhile can starve a small pool
    drop(conn);

    let total_revenue = payments::or_default(state.ledger.total(&state.db, None).await, "total revenue");
    let monthly_revenue = payments::or_default(
        state.ledger.total(&state.db, Some(window.month_start())).await,
        "monthly revenue",
    );

    Ok(Json(OverviewStats {
        total_users,
        active_users,
        premium_users,
        new_users_this_month,
        new_users_this_week,
        user_growth_percentage: growth_percentage(new_users_this_month, previous_month),
        total_vehicles,
        total_trips,
        active_trips,
        total_notifications,
        sent_notifications,
        total_messages,
        pending_messages,
        total_revenue: total_revenue.to_f64().unwrap_or_default(),
        monthly_revenue: monthly_revenue.to_f64().unwrap_or_default(),
    }))
}
