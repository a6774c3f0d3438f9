//! Route groups nested under `/api`.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod client;

use serde::Serialize;

/// Body of state-changing order endpoints.
#[derive(Debug, Serialize)]
pub struct OrderMessage<T> {
    pub message: &'static str,
    pub order: T,
}
