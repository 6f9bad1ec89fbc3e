//! Dashboard and check-in submission endpoints.

use crate::{
    context::AppContext,
    error::{AppError, AppResult},
    flash::{self, Level},
    session::RequireUser,
};
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

/// Build check-in routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/checkin", post(checkin_submit))
}

#[derive(Debug, Deserialize)]
struct CheckinForm {
    #[serde(default)]
    date: String,
    #[serde(default)]
    mood: String,
    #[serde(default)]
    stress: String,
    #[serde(default)]
    sleep: String,
    #[serde(default)]
    journal: String,
}

/// Dashboard view model: 7-day trend, recent history and today's entry
async fn dashboard(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let today = Utc::now().date_naive();

    let series = ctx.checkins.weekly_series(user.id, today).await?;
    let history = ctx.checkins.history(user.id, 60).await?;
    let existing_today = ctx.checkins.for_date(user.id, today).await?;

    let (jar, flashes) = flash::take(jar);
    Ok((
        jar,
        Json(json!({
            "user": user,
            "today": today,
            "series": series,
            "history": history,
            "existing_today": existing_today,
            "flashes": flashes,
        })),
    )
        .into_response())
}

async fn checkin_submit(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    jar: CookieJar,
    Form(form): Form<CheckinForm>,
) -> AppResult<Response> {
    match ctx
        .checkins
        .submit(
            user.id,
            &form.date,
            &form.mood,
            &form.stress,
            &form.sleep,
            &form.journal,
        )
        .await
    {
        Ok(_) => {
            let jar = flash::push(jar, Level::Success, "Check-in saved.");
            Ok((jar, Redirect::to("/dashboard")).into_response())
        }
        Err(AppError::Validation(message)) => {
            let jar = flash::push(jar, Level::Danger, message);
            Ok((jar, Redirect::to("/dashboard")).into_response())
        }
        Err(err) => Err(err),
    }
}
