//! HTTP API: handlers and the request/response models they exchange.

pub mod handlers;
pub mod models;
