//! Chart payloads: one point per day for the series, `{name, value}` for distributions.

use crate::db::models::series::CategoryCount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Name used for vehicles without a type.
pub const UNKNOWN_VEHICLE_TYPE: &str = "Unknown";

/// Name used for users without a membership.
pub const FREE_MEMBERSHIP: &str = "Free";

/// Declares a daily series point whose metric is serialized under `$metric`.
macro_rules! daily_point {
    ($(#[$meta:meta])* $name:ident { $metric:ident: $ty:ty }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
        pub struct $name {
            /// Calendar date, `YYYY-MM-DD`
            pub date: String,
            /// Weekday abbreviation, e.g. `Mon`
            pub day: String,
            pub $metric: $ty,
            /// Month and day, e.g. `Jan 05`
            pub label: String,
        }

        impl From<(NaiveDate, $ty)> for $name {
            fn from((date, $metric): (NaiveDate, $ty)) -> Self {
                Self {
                    date: date.format("%Y-%m-%d").to_string(),
                    day: date.format("%a").to_string(),
                    $metric,
                    label: date.format("%b %d").to_string(),
                }
            }
        }
    };
}

daily_point!(
    /// New signups on one day
    UserGrowthPoint { users: i64 }
);

daily_point!(
    /// Notifications sent on one day
    NotificationPoint { count: i64 }
);

daily_point!(
    /// Trips started on one day
    TripPoint { trips: i64 }
);

daily_point!(
    /// Completed payments on one day
    RevenuePoint { revenue: f64 }
);

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DistributionEntry {
    pub name: String,
    pub value: i64,
}

impl DistributionEntry {
    /// Name the bucket, substituting `fallback` when the category is missing or blank.
    pub fn from_category(category: CategoryCount, fallback: &str) -> Self {
        Self {
            name: category
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| fallback.to_string()),
            value: category.value,
        }
    }
}
