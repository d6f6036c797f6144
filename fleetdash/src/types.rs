//! Identifiers and the vocabulary of access checks.
//!
//! Everything the dashboard serves is read-only, so a check only asks what is being read
//! ([`Resource`]) and whether it is everyone's records or the caller's own ([`Operation`]).
//! [`Permission`] names what a rejected caller was missing.

use std::fmt;

/// Primary key of `users`; the record store uses 64-bit serials.
pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Any record
    ReadAll,
    /// Only records belonging to the caller
    ReadOwn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Aggregates: stats and charts
    Dashboard,
    /// User listings
    Users,
    /// The caller's own account
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// Staff flag set on the caller's account
    Staff,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("read")
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Dashboard => "dashboard",
            Resource::Users => "users",
            Resource::Profile => "profile",
        };
        f.write_str(name)
    }
}
