//! Row structures returned by the repositories.
//!
//! These mirror query results, not whole tables: the record store's tables carry more columns
//! than the dashboard ever reads. API models in [`crate::api::models`] are built from these via
//! `From` conversions.

pub mod series;
pub mod users;
