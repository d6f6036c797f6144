use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Headline figures for the dashboard overview.
///
/// Counts that depend on an untracked attribute are reported as 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_users: i64,
    pub active_users: i64,
    pub premium_users: i64,
    /// Joined in the last 30 days
    pub new_users_this_month: i64,
    /// Joined in the last 7 days
    pub new_users_this_week: i64,
    /// Change in signups against the preceding 30 days, in percent
    pub user_growth_percentage: f64,
    pub total_vehicles: i64,
    pub total_trips: i64,
    pub active_trips: i64,
    pub total_notifications: i64,
    pub sent_notifications: i64,
    pub total_messages: i64,
    pub pending_messages: i64,
    pub total_revenue: f64,
    /// Completed payments in the last 30 days
    pub monthly_revenue: f64,
}
