//! OpenAPI documentation for the dashboard API.
//!
//! Served as JSON at `/api-docs/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Bearer tokens plus the optional trusted proxy header.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token issued by the identity provider:\n\n\
                            ```\nAuthorization: Bearer YOUR_ACCESS_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
            components.security_schemes.insert(
                "ProxyHeader".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-fleetdash-user",
                    "Username set by a trusted reverse proxy. Only honoured when proxy header auth is enabled; the header name is configurable.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        api::handlers::stats::get_stats,
        api::handlers::charts::users_growth,
        api::handlers::charts::notifications,
        api::handlers::charts::vehicle_types,
        api::handlers::charts::memberships,
        api::handlers::charts::revenue,
        api::handlers::charts::trips,
        api::handlers::users::list_users,
        api::handlers::users::list_blocked_users,
        api::handlers::auth::get_me,
    ),
    components(
        schemas(
            api::models::stats::OverviewStats,
            api::models::charts::UserGrowthPoint,
            api::models::charts::NotificationPoint,
            api::models::charts::TripPoint,
            api::models::charts::RevenuePoint,
            api::models::charts::DistributionEntry,
            api::models::users::UserListItem,
            api::models::users::BlockedUser,
            api::models::users::ProfileResponse,
            api::models::users::Role,
            api::models::pagination::PageQuery,
        )
    ),
    tags(
        (name = "dashboard", description = "Headline figures for the admin overview."),
        (name = "charts", description = "Seven-day series and category distributions. Days are UTC calendar dates."),
        (name = "users", description = "Browse user accounts."),
        (name = "auth", description = "Identity of the caller."),
    ),
    info(
        title = "Fleet Dashboard API",
        version = "1.0.0",
        description = "Read-only reporting over the fleet platform's records.

## Authentication

Every endpoint requires an active user. Dashboard endpoints additionally require the staff flag;
`/api/auth/me` is available to any user.

## Trailing slashes

Paths are accepted with or without a trailing slash."
    )
)]
pub struct ApiDoc;
