//! Authentication and authorization.
//!
//! Identities are issued elsewhere; this service only verifies them and loads the matching user
//! row from the record store.
//!
//! # Authentication Methods
//!
//! Tried in order, first success wins:
//!
//! 1. **Bearer token**: `Authorization: Bearer <jwt>`, an HS256 access token signed with
//!    `secret_key` and carrying a `user_id` claim.
//! 2. **Proxy header** (opt-in): a trusted reverse proxy puts the caller's username in a
//!    configured header.
//!
//! Unknown or deactivated users are rejected as unauthenticated.
//!
//! # Authorization
//!
//! Any authenticated user may read their own profile. Everything else requires the staff flag.
//! Handlers declare what they need with the [`permissions::RequiresPermission`] extractor:
//!
//! ```ignore
//! async fn get_stats(
//!     State(state): State<AppState>,
//!     _: RequiresPermission<resource::Dashboard, operation::ReadAll>,
//! ) -> Result<Json<OverviewStats>> { ... }
//! ```
//!
//! # Modules
//!
//! - [`current_user`]: the [`CurrentUser`](crate::api::models::users::CurrentUser) extractor
//! - [`permissions`]: permission checks and the `RequiresPermission` extractor
//! - [`session`]: access token verification

pub mod current_user;
pub mod permissions;
pub mod session;
