//! HTTP request handlers.
//!
//! Every handler is a read-only GET. Authentication and authorization happen in the
//! [`RequiresPermission`](crate::auth::permissions::RequiresPermission) extractor, so a handler
//! body only runs for callers allowed to see its data.
//!
//! - [`stats`]: overview figures
//! - [`charts`]: daily series and distributions
//! - [`users`]: user listing and blocked users
//! - [`auth`]: the caller's own profile
//!
//! Handlers return [`crate::errors::Error`] on failure, which converts to the matching status code.

pub mod auth;
pub mod charts;
pub mod stats;
pub mod users;
