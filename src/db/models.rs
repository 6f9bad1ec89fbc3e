//! Database models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// User record in the database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    /// Lower-cased, unique; the login key
    pub email: String,
    /// Display name, not unique
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// True only for the first ever registered account
    pub is_admin: bool,
    /// Admin-controlled entitlement flag
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

/// One daily check-in. At most one row per (user_id, date).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Checkin {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    /// 1..=5
    pub mood: i64,
    /// 0..=10
    pub stress: i64,
    /// 0..=10, approximate hours
    pub sleep: i64,
    pub journal: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counts for the admin overview
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Stats {
    pub user_count: i64,
    pub checkin_count: i64,
    pub premium_count: i64,
}
