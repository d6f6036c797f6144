//! API response and query models.
//!
//! These are distinct from the row types in [`crate::db::models`]: they fix the public JSON
//! contract (camelCase keys, defaults for absent attributes) independently of how the record
//! store lays things out. Every model is annotated with `utoipa` for the generated docs.
//!
//! - [`stats`]: the overview figures
//! - [`charts`]: daily series points and distribution entries
//! - [`users`]: listing rows, blocked users, the caller's profile
//! - [`pagination`]: page/page_size query parameters and the paginated envelope

pub mod charts;
pub mod pagination;
pub mod stats;
pub mod users;
