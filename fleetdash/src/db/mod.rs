//! Database layer: read-only access to the record store.
//!
//! This module implements the data access layer using SQLx with PostgreSQL. The record store is
//! owned by other services; everything here only reads from it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - one per collection)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - query result rows)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repositories for users, vehicles, trips, notifications and messages
//! - [`models`]: Row structures returned by those repositories
//! - [`errors`]: Database-specific error types
//!
//! Revenue lives behind [`crate::payments`] rather than here, since the ledger is optional.
//!
//! ## Example Usage
//!
//! ```ignore
//! use fleetdash::db::handlers::Users;
//!
//! async fn example(pool: &sqlx::PgPool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut users = Users::new(&mut conn, &config.capabilities, &config.status_values);
//!     println!("{} users", users.count().await?);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
