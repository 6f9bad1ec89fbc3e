//! Registration, login and logout endpoints.

use crate::{
    context::AppContext,
    error::{AppError, AppResult},
    flash::{self, Level},
    session::{self, MaybeUser},
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

/// Build auth routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(home))
        .route("/register", get(register_page).post(register_submit))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct RegisterForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    next_path: String,
}

#[derive(Debug, Deserialize)]
struct LoginQuery {
    next: Option<String>,
}

/// Landing page: straight to the dashboard or the login form
async fn home(MaybeUser(user): MaybeUser) -> Redirect {
    if user.is_some() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

async fn register_page(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response {
    let (jar, flashes) = flash::take(jar);
    (jar, Json(json!({ "user": user, "flashes": flashes }))).into_response()
}

async fn register_submit(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    match ctx
        .accounts
        .register(&form.email, &form.username, &form.password)
        .await
    {
        Ok(user) => {
            let token = ctx.sessions.sign(user.id)?;
            let jar = jar.add(session::session_cookie(token));
            let jar = flash::push(jar, Level::Success, "Account created.");
            Ok((jar, Redirect::to("/dashboard")).into_response())
        }
        Err(AppError::Validation(message)) => {
            let jar = flash::push(jar, Level::Danger, message);
            Ok((jar, Redirect::to("/register")).into_response())
        }
        Err(AppError::Conflict(_)) => {
            // Send the caller toward login instead of erroring
            let jar = flash::push(jar, Level::Warning, "Email already registered. Please log in.");
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(err) => Err(err),
    }
}

async fn login_page(
    MaybeUser(user): MaybeUser,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    let (jar, flashes) = flash::take(jar);
    (jar, Json(json!({ "next": query.next, "flashes": flashes }))).into_response()
}

async fn login_submit(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match ctx.accounts.login(&form.email, &form.password).await {
        Ok(user) => {
            let token = ctx.sessions.sign(user.id)?;
            let jar = jar.add(session::session_cookie(token));
            let jar = flash::push(jar, Level::Success, "Welcome back.");

            let target = if is_safe_next_path(&form.next_path) {
                form.next_path.as_str()
            } else {
                "/dashboard"
            };
            Ok((jar, Redirect::to(target)).into_response())
        }
        Err(AppError::Authentication(message)) => {
            let jar = flash::push(jar, Level::Danger, message);
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(err) => Err(err),
    }
}

/// Clear the session cookie; idempotent
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = session::clear_session(jar);
    let jar = flash::push(jar, Level::Info, "Logged out.");
    (jar, Redirect::to("/login"))
}

/// A `next` redirect target is honored only when it is a same-origin
/// relative path: it must start with `/` and may not be
/// protocol-relative (`//host`).
fn is_safe_next_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_path_guard_allows_relative_paths_only() {
        assert!(is_safe_next_path("/dashboard"));
        assert!(is_safe_next_path("/admin/user/3"));

        assert!(!is_safe_next_path(""));
        assert!(!is_safe_next_path("dashboard"));
        assert!(!is_safe_next_path("https://evil.example/phish"));
        assert!(!is_safe_next_path("//evil.example/phish"));
    }
}
