//! Account manager implementation using runtime queries.

use crate::{
    db::models::{Stats, User},
    error::{AppError, AppResult},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str = "id, email, username, password_hash, is_admin, is_premium, created_at";

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Register a new account.
    ///
    /// The email is trimmed and lower-cased before any lookup. The very
    /// first row in the users table gets the admin flag; the flag is
    /// computed inside the insert statement itself so two concurrent
    /// first registrations cannot both become admin.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> AppResult<User> {
        let email = normalize_email(email);
        let username = username.trim();

        if email.is_empty() || username.is_empty() || password.is_empty() {
            return Err(AppError::Validation("Please fill all fields.".to_string()));
        }
        if password.len() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters.".to_string(),
            ));
        }

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?1")
            .bind(&email)
            .fetch_optional(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("Email already registered.".to_string()));
        }

        let password_hash = hash_password(password)?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, username, password_hash, is_admin, is_premium, created_at)
             VALUES (?1, ?2, ?3, (SELECT COUNT(*) FROM users) = 0, 0, ?4)
             RETURNING id, email, username, password_hash, is_admin, is_premium, created_at",
        )
        .bind(&email)
        .bind(username)
        .bind(&password_hash)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = user.id, is_admin = user.is_admin, "account registered");

        Ok(user)
    }

    /// Authenticate by email and password.
    ///
    /// Unknown email and wrong password produce the identical error so
    /// responses carry no account-enumeration signal.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let email = normalize_email(email);

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(&email)
        .fetch_optional(&self.db)
        .await?;

        let user = match user {
            Some(user) => user,
            None => return Err(invalid_credentials()),
        };

        if !verify_password(password, &user.password_hash) {
            return Err(invalid_credentials());
        }

        Ok(user)
    }

    /// Resolve a user id to a row; None when the id no longer resolves
    pub async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// Get a user by id, erroring when the id does not resolve
    pub async fn get_user(&self, id: i64) -> AppResult<User> {
        self.find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    /// List all users, newest-registered first
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    /// Aggregate counts for the admin overview
    pub async fn stats(&self) -> AppResult<Stats> {
        let stats = sqlx::query_as::<_, Stats>(
            "SELECT
               (SELECT COUNT(*) FROM users) AS user_count,
               (SELECT COUNT(*) FROM checkins) AS checkin_count,
               (SELECT COUNT(*) FROM users WHERE is_premium) AS premium_count",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(stats)
    }

    /// Flip a user's premium flag, returning the new value.
    /// A single conditional update; no row is touched for unknown ids.
    pub async fn toggle_premium(&self, id: i64) -> AppResult<bool> {
        let premium: Option<bool> = sqlx::query_scalar(
            "UPDATE users SET is_premium = NOT is_premium WHERE id = ?1 RETURNING is_premium",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        let premium = premium.ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        tracing::info!(user_id = id, is_premium = premium, "premium flag toggled");

        Ok(premium)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> AppError {
    AppError::Authentication("Invalid email or password.".to_string())
}

/// Hash a password with Argon2id and a fresh random salt
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
