//! HTTP routes and handlers.
//!
//! GET page endpoints return JSON view models for the rendering layer
//! (an external collaborator); POST form endpoints respond with
//! redirects plus one-shot flash cookies.

pub mod admin;
pub mod auth;
pub mod checkin;
pub mod premium;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(auth::routes())
        .merge(checkin::routes())
        .merge(premium::routes())
        .merge(admin::routes())
}
