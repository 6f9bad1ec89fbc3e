//! Premium info page and upgrade stub.

use crate::{
    context::AppContext,
    flash::{self, Level},
    session::RequireUser,
};
use axum::{
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

/// Build premium routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/premium", get(premium_page))
        .route("/premium/upgrade", post(premium_upgrade))
}

async fn premium_page(RequireUser(user): RequireUser, jar: CookieJar) -> Response {
    let (jar, flashes) = flash::take(jar);
    (jar, Json(json!({ "user": user, "flashes": flashes }))).into_response()
}

/// Intentional stub: no payment provider is integrated
async fn premium_upgrade(RequireUser(_user): RequireUser, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = flash::push(
        jar,
        Level::Info,
        "Premium upgrade will be integrated later.",
    );
    (jar, Redirect::to("/premium"))
}
