//! Chart endpoints.
//!
//! Daily series always cover the seven UTC days ending today, oldest first, with zero for days
//! that have no records. Revenue is the exception: without a working payment ledger it is `[]`.

use axum::{Json, extract::State};
use rust_decimal::prelude::ToPrimitive;

use crate::{
    AppState,
    api::models::charts::{
        DistributionEntry, FREE_MEMBERSHIP, NotificationPoint, RevenuePoint, TripPoint, UNKNOWN_VEHICLE_TYPE,
        UserGrowthPoint,
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        errors::DbError,
        handlers::{Notifications, Trips, Users, Vehicles},
        models::series::DailyCount,
    },
    errors::Result,
    payments,
    reports::{ReportWindow, fill_missing_days},
};

/// Number of vehicle types shown in the distribution
pub const TOP_VEHICLE_TYPES: i64 = 5;

fn daily_series<P: From<(chrono::NaiveDate, i64)>>(rows: Vec<DailyCount>, window: &ReportWindow) -> Vec<P> {
    fill_missing_days(rows.into_iter().map(|r| (r.day, r.value)), window)
        .into_iter()
        .map(P::from)
        .collect()
}

/// Get daily user signups
#[utoipa::path(
    get,
    path = "/api/dashboard/charts/users-growth",
    tag = "charts",
    summary = "User signups per day",
    responses(
        (status = 200, description = "Seven daily points, oldest first", body = Vec<UserGrowthPoint>),
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
pub async fn users_growth(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<Vec<UserGrowthPoint>>> {
    let window = ReportWindow::current();
    let (start, end) = window.series_range();
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let rows = Users::new(&mut conn, &state.config.capabilities, &state.config.status_values)
        .daily_signups(start, end)
        .await?;

    Ok(Json(daily_series(rows, &window)))
}

/// Get daily notifications sent
#[utoipa::path(
    get,
    path = "/api/dashboard/charts/notifications",
    tag = "charts",
    summary = "Notifications sent per day",
    description = "Counts only delivered notifications when notification status is tracked, otherwise all of them.",
    responses(
        (status = 200, description = "Seven daily points, oldest first", body = Vec<NotificationPoint>),
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
pub async fn notifications(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<Vec<NotificationPoint>>> {
    let window = ReportWindow::current();
    let (start, end) = window.series_range();
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let rows = Notifications::new(&mut conn, &state.config.capabilities, &state.config.status_values)
        .daily_counts(start, end)
        .await?;

    Ok(Json(daily_series(rows, &window)))
}

/// Get daily trips
#[utoipa::path(
    get,
    path = "/api/dashboard/charts/trips",
    tag = "charts",
    summary = "Trips per day",
    responses(
        (status = 200, description = "Seven daily points, oldest first", body = Vec<TripPoint>),
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
pub async fn trips(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<Vec<TripPoint>>> {
    let window = ReportWindow::current();
    let (start, end) = window.series_range();
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let rows = Trips::new(&mut conn, &state.config.capabilities)
        .daily_counts(start, end)
        .await?;

    Ok(Json(daily_series(rows, &window)))
}

/// Get daily revenue
#[utoipa::path(
    get,
    path = "/api/dashboard/charts/revenue",
    tag = "charts",
    summary = "Revenue per day",
    description = "Empty when no payment ledger is configured or the ledger cannot be read.",
    responses(
        (status = 200, description = "Seven daily points, oldest first, or empty", body = Vec<RevenuePoint>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - staff only")
    ),
    security(
        ("BearerAuth" = []),
        ("ProxyHeader" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn revenue(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<Vec<RevenuePoint>>> {
    let window = ReportWindow::current();
    let (start, end) = window.series_range();

    let series = state.ledger.daily_totals(&state.db, start, end).await.map(|rows| {
        let points = rows.into_iter().map(|r| (r.day, r.value));
        fill_missing_days(points, &window)
            .into_iter()
            .map(|(day, total)| RevenuePoint::from((day, total.to_f64().unwrap_or_default())))
            .collect::<Vec<_>>()
    });

    Ok(Json(payments::or_default(series, "revenue series")))
}

/// Get the vehicle type distribution
#[utoipa::path(
    get,
    path = "/api/dashboard/charts/vehicle-types",
    tag = "charts",
    summary = "Most common vehicle types",
    description = "The five most common vehicle types, largest first. Vehicles without a type are grouped as `Unknown`.",
    responses(
        (status = 200, description = "At most five entries", body = Vec<DistributionEntry>),
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
pub async fn vehicle_types(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<Vec<DistributionEntry>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let rows = Vehicles::new(&mut conn).type_distribution(TOP_VEHICLE_TYPES).await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| DistributionEntry::from_category(row, UNKNOWN_VEHICLE_TYPE))
            .collect(),
    ))
}

/// Get the membership distribution
#[utoipa::path(
    get,
    path = "/api/dashboard/charts/memberships",
    tag = "charts",
    summary = "Users per membership type",
    description = "Users without a membership, or every user when memberships aren't tracked, are counted as `Free`.",
    responses(
        (status = 200, description = "One entry per membership type", body = Vec<DistributionEntry>),
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
pub async fn memberships(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
) -> Result<Json<Vec<DistributionEntry>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let rows = Users::new(&mut conn, &state.config.capabilities, &state.config.status_values)
        .membership_distribution()
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| DistributionEntry::from_category(row, FREE_MEMBERSHIP))
            .collect(),
    ))
}
