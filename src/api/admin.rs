//! Admin endpoints: user listing, detail and premium toggling.
//!
//! Every handler takes the RequireAdmin gate; non-admins are redirected
//! before any of this code runs.

use crate::{
    context::AppContext,
    error::{AppError, AppResult},
    flash::{self, Level},
    session::RequireAdmin,
};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

/// Check-ins shown on the user detail page
const DETAIL_CHECKIN_LIMIT: i64 = 200;

/// Build admin routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/admin", get(overview))
        .route("/admin/user/:id", get(user_detail))
        .route("/admin/user/:id/toggle-premium", post(toggle_premium))
}

/// User list (newest first) plus aggregate stats
async fn overview(
    State(ctx): State<AppContext>,
    RequireAdmin(_admin): RequireAdmin,
    jar: CookieJar,
) -> AppResult<Response> {
    let users = ctx.accounts.list_users().await?;
    let stats = ctx.accounts.stats().await?;

    let (jar, flashes) = flash::take(jar);
    Ok((
        jar,
        Json(json!({ "users": users, "stats": stats, "flashes": flashes })),
    )
        .into_response())
}

async fn user_detail(
    State(ctx): State<AppContext>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<i64>,
    jar: CookieJar,
) -> AppResult<Response> {
    match ctx.accounts.get_user(user_id).await {
        Ok(target) => {
            let checkins = ctx.checkins.history(user_id, DETAIL_CHECKIN_LIMIT).await?;
            let (jar, flashes) = flash::take(jar);
            Ok((
                jar,
                Json(json!({ "target": target, "checkins": checkins, "flashes": flashes })),
            )
                .into_response())
        }
        Err(AppError::NotFound(_)) => {
            let jar = flash::push(jar, Level::Danger, "User not found.");
            Ok((jar, Redirect::to("/admin")).into_response())
        }
        Err(err) => Err(err),
    }
}

async fn toggle_premium(
    State(ctx): State<AppContext>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<i64>,
    jar: CookieJar,
) -> AppResult<Response> {
    match ctx.accounts.toggle_premium(user_id).await {
        Ok(_) => {
            let jar = flash::push(jar, Level::Success, "Premium status updated.");
            Ok((jar, Redirect::to(&format!("/admin/user/{}", user_id))).into_response())
        }
        Err(AppError::NotFound(_)) => {
            let jar = flash::push(jar, Level::Danger, "User not found.");
            Ok((jar, Redirect::to("/admin")).into_response())
        }
        Err(err) => Err(err),
    }
}
