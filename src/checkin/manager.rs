//! Check-in manager implementation using runtime queries.

use crate::{
    db::models::Checkin,
    error::{AppError, AppResult},
};
use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;

const CHECKIN_COLUMNS: &str =
    "id, user_id, date, mood, stress, sleep, journal, created_at, updated_at";

/// Per-series values for the trailing 7 days, oldest first.
/// Missing days are None; 0 is a valid stress/sleep reading.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WeeklySeries {
    pub labels: Vec<String>,
    pub mood: Vec<Option<i64>>,
    pub stress: Vec<Option<i64>>,
    pub sleep: Vec<Option<i64>>,
}

/// Check-in manager service
pub struct CheckinManager {
    db: SqlitePool,
}

impl CheckinManager {
    /// Create a new check-in manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Validate and upsert one check-in for (user, date).
    ///
    /// All values arrive as raw form strings. Any parse, range or date
    /// failure rejects the whole submission with one generic validation
    /// message and nothing is written. On success a single
    /// insert-or-update statement stores the row: `created_at` is set
    /// once, `updated_at` refreshed on every submission.
    pub async fn submit(
        &self,
        user_id: i64,
        date: &str,
        mood: &str,
        stress: &str,
        sleep: &str,
        journal: &str,
    ) -> AppResult<Checkin> {
        let (date, mood, stress, sleep) = validate_values(date, mood, stress, sleep)?;
        let journal = journal.trim();
        let now = Utc::now();

        let checkin = sqlx::query_as::<_, Checkin>(
            "INSERT INTO checkins (user_id, date, mood, stress, sleep, journal, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (user_id, date) DO UPDATE SET
               mood = excluded.mood,
               stress = excluded.stress,
               sleep = excluded.sleep,
               journal = excluded.journal,
               updated_at = excluded.updated_at
             RETURNING id, user_id, date, mood, stress, sleep, journal, created_at, updated_at",
        )
        .bind(user_id)
        .bind(date)
        .bind(mood)
        .bind(stress)
        .bind(sleep)
        .bind(journal)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(user_id, date = %date, "check-in saved");

        Ok(checkin)
    }

    /// Compute the 7-day trend ending at `today` inclusive, oldest first.
    /// Always exactly 7 points per series regardless of how many
    /// check-ins exist.
    pub async fn weekly_series(&self, user_id: i64, today: NaiveDate) -> AppResult<WeeklySeries> {
        let start = today - Duration::days(6);

        let rows = sqlx::query_as::<_, Checkin>(&format!(
            "SELECT {CHECKIN_COLUMNS} FROM checkins
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date ASC"
        ))
        .bind(user_id)
        .bind(start)
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        let by_date: HashMap<NaiveDate, &Checkin> = rows.iter().map(|c| (c.date, c)).collect();

        let mut series = WeeklySeries {
            labels: Vec::with_capacity(7),
            mood: Vec::with_capacity(7),
            stress: Vec::with_capacity(7),
            sleep: Vec::with_capacity(7),
        };

        for offset in 0..7 {
            let day = start + Duration::days(offset);
            let entry = by_date.get(&day);
            series.labels.push(day.format("%a").to_string());
            series.mood.push(entry.map(|c| c.mood));
            series.stress.push(entry.map(|c| c.stress));
            series.sleep.push(entry.map(|c| c.sleep));
        }

        Ok(series)
    }

    /// A user's check-in for one exact date, if any
    pub async fn for_date(&self, user_id: i64, date: NaiveDate) -> AppResult<Option<Checkin>> {
        let checkin = sqlx::query_as::<_, Checkin>(&format!(
            "SELECT {CHECKIN_COLUMNS} FROM checkins WHERE user_id = ?1 AND date = ?2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;

        Ok(checkin)
    }

    /// A user's check-ins, newest date first
    pub async fn history(&self, user_id: i64, limit: i64) -> AppResult<Vec<Checkin>> {
        let checkins = sqlx::query_as::<_, Checkin>(&format!(
            "SELECT {CHECKIN_COLUMNS} FROM checkins
             WHERE user_id = ?1 ORDER BY date DESC LIMIT ?2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(checkins)
    }
}

/// Parse and range-check the raw form values.
/// Every failure folds into the same user-facing message.
fn validate_values(
    date: &str,
    mood: &str,
    stress: &str,
    sleep: &str,
) -> AppResult<(NaiveDate, i64, i64, i64)> {
    let mood: i64 = mood.trim().parse().map_err(|_| invalid())?;
    let stress: i64 = stress.trim().parse().map_err(|_| invalid())?;
    let sleep: i64 = sleep.trim().parse().map_err(|_| invalid())?;

    if !(1..=5).contains(&mood) {
        return Err(invalid());
    }
    if !(0..=10).contains(&stress) {
        return Err(invalid());
    }
    if !(0..=10).contains(&sleep) {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| invalid())?;

    Ok((date, mood, stress, sleep))
}

fn invalid() -> AppError {
    AppError::Validation("Invalid check-in values.".to_string())
}
