use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    api::models::{
        pagination::Paginated,
        users::{BlockedUser, ListUsersQuery, UserListItem},
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        errors::DbError,
        handlers::{Users, users::UserFilter},
    },
    errors::Result,
};

/// List users
#[utoipa::path(
    get,
    path = "/api/dashboard/users",
    tag = "users",
    summary = "List users",
    description = "Users ordered by id, one page at a time. Pages past the end are empty rather than an error.",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users", body = Paginated<UserListItem>),
        (status = 400, description = "Malformed query parameters"),
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
pub async fn list_users(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Users, operation::ReadAll>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Paginated<UserListItem>>> {
    let listing = &state.config.listing;
    let page = query.pagination.page();
    let (skip, limit) = query.pagination.bounds(listing);
    let filter = UserFilter::new(skip, limit).with_search(query.search);

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Users::new(&mut conn, &state.config.capabilities, &state.config.status_values);

    let count = repo.count_matching(&filter).await?;
    let users = repo.list(&filter).await?;

    Ok(Json(Paginated::new(
        users.into_iter().map(UserListItem::from).collect(),
        count,
        page,
        limit,
    )))
}

/// List blocked users
#[utoipa::path(
    get,
    path = "/api/dashboard/users/blocked",
    tag = "users",
    summary = "List blocked users",
    description = "Every inactive user, ordered by id.",
    responses(
        (status = 200, description = "Inactive users", body = Vec<BlockedUser>),
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
pub async fn list_blocked_users(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Users, operation::ReadAll>,
) -> Result<Json<Vec<BlockedUser>>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let users = Users::new(&mut conn, &state.config.capabilities, &state.config.status_values)
        .list_blocked()
        .await?;

    Ok(Json(users.into_iter().map(BlockedUser::from).collect()))
}
