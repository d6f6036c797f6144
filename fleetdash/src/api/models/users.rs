//! API request/response models for users.

use super::charts::FREE_MEMBERSHIP;
use super::pagination::PageQuery;
use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Coarse role derived from the staff flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// The authenticated caller, as resolved by the auth extractors
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.is_staff
    }

    pub fn role(&self) -> Role {
        if self.is_admin() { Role::Admin } else { Role::User }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            email: db.email,
            first_name: db.first_name,
            last_name: db.last_name,
            phone: db.phone,
            is_active: db.is_active,
            is_staff: db.is_staff,
            is_superuser: db.is_superuser,
            date_joined: db.date_joined,
        }
    }
}

/// The caller's own profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Empty when unknown
    pub phone: String,
    pub role: Role,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl From<CurrentUser> for ProfileResponse {
    fn from(user: CurrentUser) -> Self {
        let role = user.role();
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone.unwrap_or_default(),
            role,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            date_joined: user.date_joined,
        }
    }
}

/// One row of the user listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Empty when unknown
    pub phone: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    /// `Free` when the user has no membership
    pub membership_type: String,
}

impl From<UserDBResponse> for UserListItem {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            email: db.email,
            phone: db.phone.unwrap_or_default(),
            is_active: db.is_active,
            date_joined: db.date_joined,
            membership_type: db
                .membership_type
                .filter(|membership| !membership.is_empty())
                .unwrap_or_else(|| FREE_MEMBERSHIP.to_string()),
        }
    }
}

/// An inactive user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockedUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub date_joined: DateTime<Utc>,
}

impl From<UserDBResponse> for BlockedUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            email: db.email,
            phone: db.phone.unwrap_or_default(),
            date_joined: db.date_joined,
        }
    }
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListUsersQuery {
    #[serde(flatten)]
    pub pagination: PageQuery,

    /// Case-insensitive substring matched against username, email and phone
    pub search: Option<String>,
}
