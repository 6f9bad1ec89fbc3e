//! End-to-end router tests over an in-memory database.
//!
//! Drives the real router with oneshot requests: form posts, session
//! cookies, redirects and JSON view models.

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use moodline::{
    account::AccountManager,
    checkin::CheckinManager,
    config::{LoggingConfig, ServerConfig, ServiceConfig, SessionConfig, StorageConfig},
    context::AppContext,
    db,
    server::build_router,
    session::SessionSigner,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt;

const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

async fn test_app() -> (Router, SqlitePool) {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();
    db::run_migrations(&db).await.unwrap();

    let config = ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 0,
        },
        storage: StorageConfig {
            data_directory: "./data".into(),
            database: ":memory:".into(),
        },
        session: SessionConfig {
            secret: TEST_SECRET.to_string(),
            ttl_hours: 24,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
        },
    };

    let ctx = AppContext {
        config: Arc::new(config),
        db: db.clone(),
        accounts: Arc::new(AccountManager::new(db.clone())),
        checkins: Arc::new(CheckinManager::new(db.clone())),
        sessions: Arc::new(SessionSigner::new(TEST_SECRET.to_string(), 24)),
    };

    (build_router(ctx), db)
}

fn form_post(path: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get_with_cookie(path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("moodline_session="))
        .and_then(|value| value.split(';').next())
        .expect("session cookie set")
        .to_string()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register an account and return its session cookie
async fn register(app: &Router, email: &str, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            format!("email={}&username={}&password=password123", email, username),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    session_cookie(&response)
}

#[tokio::test]
async fn register_then_view_dashboard() {
    let (app, _db) = test_app().await;

    let registered = app
        .clone()
        .oneshot(form_post(
            "/register",
            "email=alice@example.com&username=alice&password=password123".to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(registered.status(), StatusCode::SEE_OTHER);

    // Forward both the session and the pending flash cookie
    let cookie = registered
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .collect::<Vec<_>>()
        .join("; ");

    let response = app
        .clone()
        .oneshot(get_with_cookie("/dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["series"]["labels"].as_array().unwrap().len(), 7);
    assert_eq!(body["existing_today"], serde_json::Value::Null);

    // The success flash from registration is consumed by this view
    assert_eq!(body["flashes"][0]["level"], "success");
}

#[tokio::test]
async fn dashboard_requires_login() {
    let (app, _db) = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login?next="));
}

#[tokio::test]
async fn duplicate_registration_redirects_to_login() {
    let (app, db) = test_app().await;
    register(&app, "alice@example.com", "alice").await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/register",
            "email=ALICE@example.com&username=other&password=password456".to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn login_honors_safe_next_path_only() {
    let (app, _db) = test_app().await;
    register(&app, "alice@example.com", "alice").await;

    let safe = app
        .clone()
        .oneshot(form_post(
            "/login",
            "email=alice@example.com&password=password123&next_path=/premium".to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(location(&safe), "/premium");

    let unsafe_target = app
        .clone()
        .oneshot(form_post(
            "/login",
            "email=alice@example.com&password=password123&next_path=https://evil.example"
                .to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(location(&unsafe_target), "/dashboard");
}

#[tokio::test]
async fn bad_credentials_redirect_back_to_login() {
    let (app, _db) = test_app().await;
    register(&app, "alice@example.com", "alice").await;

    let response = app
        .clone()
        .oneshot(form_post(
            "/login",
            "email=alice@example.com&password=wrong-password".to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn checkin_upserts_one_row_per_day() {
    let (app, db) = test_app().await;
    let cookie = register(&app, "alice@example.com", "alice").await;

    for body in [
        "date=2024-01-10&mood=3&stress=5&sleep=7&journal=first",
        "date=2024-01-10&mood=5&stress=2&sleep=8&journal=second",
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/checkin")
                    .header(header::COOKIE, &cookie)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
    }

    let (count, mood, stress, sleep): (i64, i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), mood, stress, sleep FROM checkins WHERE date = '2024-01-10'",
    )
    .fetch_one(&db)
    .await
    .unwrap();
    assert_eq!(count, 1);
    assert_eq!((mood, stress, sleep), (5, 2, 8));
}

#[tokio::test]
async fn invalid_checkin_writes_nothing() {
    let (app, db) = test_app().await;
    let cookie = register(&app, "alice@example.com", "alice").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/checkin")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("date=2024-01-10&mood=6&stress=5&sleep=7"))
                .unwrap(),
        )
        .await
        .unwrap();

    // Recovered as a redirect with a danger flash, not an error page
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM checkins")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn admin_routes_gate_on_the_admin_flag() {
    let (app, _db) = test_app().await;
    let admin_cookie = register(&app, "alice@example.com", "alice").await;
    let user_cookie = register(&app, "bob@example.com", "bob").await;

    // Non-admin never reaches the listing; redirected with a flash
    let denied = app
        .clone()
        .oneshot(get_with_cookie("/admin", &user_cookie))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&denied), "/dashboard");

    // First registered account is the admin
    let allowed = app
        .clone()
        .oneshot(get_with_cookie("/admin", &admin_cookie))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);

    let body = json_body(allowed).await;
    assert_eq!(body["stats"]["user_count"], 2);
    assert_eq!(body["users"][0]["email"], "bob@example.com");
}

#[tokio::test]
async fn admin_toggles_premium_and_unknown_ids_flash_not_found() {
    let (app, db) = test_app().await;
    let admin_cookie = register(&app, "alice@example.com", "alice").await;
    register(&app, "bob@example.com", "bob").await;

    let bob_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = 'bob@example.com'")
        .fetch_one(&db)
        .await
        .unwrap();

    let toggled = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/admin/user/{}/toggle-premium", bob_id))
                .header(header::COOKIE, &admin_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(toggled.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&toggled), format!("/admin/user/{}", bob_id));

    let premium: bool = sqlx::query_scalar("SELECT is_premium FROM users WHERE id = ?1")
        .bind(bob_id)
        .fetch_one(&db)
        .await
        .unwrap();
    assert!(premium);

    let missing = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/user/9999/toggle-premium")
                .header(header::COOKIE, &admin_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&missing), "/admin");
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (app, _db) = test_app().await;
    let cookie = register(&app, "alice@example.com", "alice").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // The removal cookie empties the session value
    let removal = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("moodline_session="))
        .expect("session removal cookie");
    assert!(removal.starts_with("moodline_session=;"));
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let (app, _db) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}
