use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    db::{errors::DbError, handlers::Users, models::users::UserDBResponse},
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use sqlx::PgPool;
use tracing::{debug, instrument, trace};

/// Turn a looked-up user row into an authenticated caller, rejecting unknown and deactivated accounts
fn into_active_user(user: Option<UserDBResponse>) -> Result<CurrentUser> {
    match user {
        Some(user) if user.is_active => Ok(CurrentUser::from(user)),
        Some(_) => Err(Error::Unauthenticated {
            message: Some("User account is disabled".to_string()),
        }),
        None => Err(Error::Unauthenticated {
            message: Some("User not found".to_string()),
        }),
    }
}

/// Extract user from a bearer access token if present and valid
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(user)): Valid token for an active user
/// - Some(Err(error)): Bearer token present but invalid, or its user is unknown/inactive
#[instrument(skip(parts, config, db))]
async fn try_bearer_auth(parts: &Parts, config: &Config, db: &PgPool) -> Option<Result<CurrentUser>> {
    let auth_header = parts.headers.get(AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    // Not a Bearer token, try other auth methods
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    let user_id = match session::verify_access_token(token, config) {
        Ok(id) => id,
        Err(e) => return Some(Err(e)),
    };

    let mut conn = match db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return Some(Err(DbError::from(e).into())),
    };
    let mut users = Users::new(&mut conn, &config.capabilities, &config.status_values);

    match users.get_by_id(user_id).await {
        Ok(user) => Some(into_active_user(user)),
        Err(e) => Some(Err(Error::Database(e))),
    }
}

/// Extract user from proxy header if present and valid
/// Returns:
/// - None: No proxy header present
/// - Some(Ok(user)): Header names an active user
/// - Some(Err(error)): Header present but the user is unknown/inactive or lookup failed
#[instrument(skip(parts, config, db))]
async fn try_proxy_header_auth(parts: &Parts, config: &Config, db: &PgPool) -> Option<Result<CurrentUser>> {
    let username = parts
        .headers
        .get(&config.auth.proxy_header.header_name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    let mut conn = match db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return Some(Err(DbError::from(e).into())),
    };
    let mut users = Users::new(&mut conn, &config.capabilities, &config.status_values);

    match users.get_by_username(username).await {
        Ok(user) => Some(into_active_user(user)),
        Err(e) => Some(Err(Error::Database(e))),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Each method returns Option<Result<CurrentUser>>:
        // - None means the auth method is not applicable (no credentials present)
        // - Some(Ok(user)) means successful authentication
        // - Some(Err(error)) means credentials were present but invalid
        //
        // The first success wins, so a stale bearer token doesn't lock out a proxied user.
        let mut auth_errors = Vec::new();

        if state.config.auth.jwt.enabled {
            match try_bearer_auth(parts, &state.config, &state.db).await {
                Some(Ok(user)) => {
                    debug!("Found bearer token authenticated user: {}", user.id);
                    return Ok(user);
                }
                Some(Err(e)) => {
                    trace!("Bearer token authentication failed: {:?}", e);
                    auth_errors.push(("Bearer token", e));
                }
                None => {
                    trace!("No bearer token authentication attempted");
                }
            }
        }

        if state.config.auth.proxy_header.enabled {
            match try_proxy_header_auth(parts, &state.config, &state.db).await {
                Some(Ok(user)) => {
                    debug!("Found proxy header authenticated user: {}", user.id);
                    return Ok(user);
                }
                Some(Err(e)) => {
                    trace!("Proxy header authentication failed: {:?}", e);
                    auth_errors.push(("Proxy header", e));
                }
                None => {
                    trace!("No proxy header authentication attempted");
                }
            }
        }

        if auth_errors.is_empty() {
            trace!("No authentication credentials found in request");
            return Err(Error::Unauthenticated { message: None });
        }

        trace!("All authentication attempts failed ({}): {:?}", auth_errors.len(), auth_errors);

        // Infrastructure failures surface as such; everything else is a plain 401
        let mut errors = auth_errors.into_iter().map(|(_, e)| e);
        match errors.find(|e| !matches!(e, Error::Unauthenticated { .. } | Error::BadRequest { .. })) {
            Some(e) => Err(e),
            None => Err(Error::Unauthenticated { message: None }),
        }
    }
}
