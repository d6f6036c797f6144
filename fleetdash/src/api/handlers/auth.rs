use axum::Json;

use crate::{
    api::models::users::ProfileResponse,
    auth::permissions::{RequiresPermission, operation, resource},
    errors::Result,
};

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    summary = "Current user",
    description = "Profile of the authenticated caller. Available to every active user, staff or not.",
    responses(
        (status = 200, description = "Caller profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("ProxyHeader" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_me(caller: RequiresPermission<resource::Profile, operation::ReadOwn>) -> Result<Json<ProfileResponse>> {
    Ok(Json(ProfileResponse::from(caller.user)))
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::{ProfileResponse, Role};
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use sqlx::PgPool;

    const DASHBOARD_PATHS: [&str; 9] = [
        "/api/dashboard/stats/",
        "/api/dashboard/charts/users-growth/",
        "/api/dashboard/charts/notifications/",
        "/api/dashboard/charts/vehicle-types/",
        "/api/dashboard/charts/memberships/",
        "/api/dashboard/charts/revenue/",
        "/api/dashboard/charts/trips/",
        "/api/dashboard/users/",
        "/api/dashboard/users/blocked/",
    ];

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_me_for_regular_user(pool: PgPool) {
        let (server, config) = create_test_app(pool.clone(), create_test_config()).await;
        let user = create_test_user(&pool).await;

        let response = server
            .get("/api/auth/me/")
            .add_header("authorization", bearer_header(user.id, &config))
            .await;
        response.assert_status_ok();

        let profile: ProfileResponse = response.json();
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.username, user.username);
        assert_eq!(profile.role, Role::User);
        assert!(!profile.is_staff);
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_me_for_admin(pool: PgPool) {
        let (server, config) = create_test_app(pool.clone(), create_test_config()).await;
        let admin = create_test_admin_user(&pool).await;

        let response = server
            .get("/api/auth/me")
            .add_header("authorization", bearer_header(admin.id, &config))
            .await;
        response.assert_status_ok();

        let profile: ProfileResponse = response.json();
        assert_eq!(profile.role, Role::Admin);
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_non_staff_gets_403_on_every_dashboard_path(pool: PgPool) {
        let (server, config) = create_test_app(pool.clone(), create_test_config()).await;
        let user = create_test_user(&pool).await;

        for path in DASHBOARD_PATHS {
            let response = server
                .get(path)
                .add_header("authorization", bearer_header(user.id, &config))
                .expect_failure()
                .await;
            response.assert_status(StatusCode::FORBIDDEN);
        }
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_missing_credentials_get_401(pool: PgPool) {
        let (server, _config) = create_test_app(pool.clone(), create_test_config()).await;

        for path in DASHBOARD_PATHS.iter().chain(["/api/auth/me/"].iter()) {
            let response = server.get(path).expect_failure().await;
            response.assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_bad_tokens_get_401(pool: PgPool) {
        let (server, config) = create_test_app(pool.clone(), create_test_config()).await;
        let admin = create_test_admin_user(&pool).await;

        let secret = config.secret_key.clone().unwrap();
        let expired = encode(
            &Header::default(),
            &serde_json::json!({"user_id": admin.id, "exp": (Utc::now() - Duration::hours(2)).timestamp()}),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        let wrong_secret = encode(
            &Header::default(),
            &serde_json::json!({"user_id": admin.id, "exp": (Utc::now() + Duration::hours(2)).timestamp()}),
            &EncodingKey::from_secret(b"someone-elses-secret"),
        )
        .unwrap();

        for token in [expired.as_str(), wrong_secret.as_str(), "garbage"] {
            let response = server
                .get("/api/dashboard/stats/")
                .add_header("authorization", format!("Bearer {token}"))
                .expect_failure()
                .await;
            response.assert_status(StatusCode::UNAUTHORIZED);
        }
    }
}
