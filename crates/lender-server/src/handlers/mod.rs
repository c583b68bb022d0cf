//! HTTP route handlers for the lender server.

pub mod application;
pub mod predict;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
