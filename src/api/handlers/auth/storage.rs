//! Database helpers for user and token state.
//!
//! Every operation touches exactly one `users` row, so coordination is
//! delegated to single-statement atomicity: uniqueness to the email
//! constraint, the one-live-refresh-token invariant to last-write-wins
//! overwrites, and reset-token expiry to `NOW()` comparisons done in SQL.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// User fields loaded for token issuance and profile responses.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub provider: String,
}

/// [`UserRecord`] plus the bcrypt hash, only loaded for password login.
pub(super) struct CredentialRecord {
    pub(super) user: UserRecord,
    pub(super) password_hash: Option<String>,
}

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub(super) enum InsertOutcome {
    Created(UserRecord),
    Conflict,
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        avatar: row.get("avatar"),
        provider: row.get("provider"),
    }
}

/// Insert a password-backed user. Email uniqueness violations map to
/// [`InsertOutcome::Conflict`] instead of an error.
pub(super) async fn insert_local_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<InsertOutcome> {
    let query = "
        INSERT INTO users (name, email, password_hash, provider)
        VALUES ($1, $2, $3, 'local')
        RETURNING id, name, email, avatar, provider
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(InsertOutcome::Created(user_from_row(&row))),
        Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

/// Insert a federated user; no password hash is stored.
pub(super) async fn insert_google_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    avatar: &str,
) -> Result<InsertOutcome> {
    let query = "
        INSERT INTO users (name, email, avatar, provider)
        VALUES ($1, $2, $3, 'google')
        RETURNING id, name, email, avatar, provider
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(avatar)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(InsertOutcome::Created(user_from_row(&row))),
        Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert federated user"),
    }
}

/// Look up a user with credentials by normalized email (password login).
pub(super) async fn find_credentials_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<CredentialRecord>> {
    let query = "
        SELECT id, name, email, avatar, provider, password_hash
        FROM users
        WHERE email = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup credentials")?;

    Ok(row.map(|row| CredentialRecord {
        user: user_from_row(&row),
        password_hash: row.get("password_hash"),
    }))
}

/// Look up public user fields by normalized email (federated login).
pub(super) async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
    let query = "
        SELECT id, name, email, avatar, provider
        FROM users
        WHERE email = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;

    Ok(row.map(|row| user_from_row(&row)))
}

/// Overwrite the user's refresh-token slot. Older tokens stop matching as a
/// side effect.
pub(super) async fn set_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    refresh_token_hash: &str,
) -> Result<()> {
    let query = "
        UPDATE users
        SET refresh_token_hash = $2,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(refresh_token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to persist refresh token")?;
    Ok(())
}

/// Fetch the stored refresh-token hash for a user. Outer `None` means the
/// user no longer exists.
pub(super) async fn fetch_refresh_token_hash(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<Option<String>>> {
    let query = "
        SELECT refresh_token_hash
        FROM users
        WHERE id = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch refresh token")?;

    Ok(row.map(|row| row.get("refresh_token_hash")))
}

/// Clear the refresh-token slot of whichever user holds the presented token.
/// Logout is idempotent; clearing nothing is fine.
pub(super) async fn clear_refresh_token_by_hash(
    pool: &PgPool,
    refresh_token_hash: &str,
) -> Result<bool> {
    let query = "
        UPDATE users
        SET refresh_token_hash = NULL,
            updated_at = NOW()
        WHERE refresh_token_hash = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(refresh_token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to clear refresh token")?;
    Ok(result.rows_affected() > 0)
}

/// Arm the password-reset slot for the given email. Returns `false` when no
/// user matches (the caller still reports success to avoid account probing).
pub(super) async fn set_reset_token(
    pool: &PgPool,
    email: &str,
    reset_token_hash: &str,
    ttl_seconds: i64,
) -> Result<bool> {
    let query = "
        UPDATE users
        SET reset_token_hash = $2,
            reset_token_expires_at = NOW() + ($3 * INTERVAL '1 second'),
            updated_at = NOW()
        WHERE email = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(email)
        .bind(reset_token_hash)
        .bind(ttl_seconds)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to set reset token")?;
    Ok(result.rows_affected() > 0)
}

/// Replace the password and clear the reset slot in one statement, but only
/// while the token is unexpired. Returns `false` when nothing matched.
pub(super) async fn consume_reset_token(
    pool: &PgPool,
    reset_token_hash: &str,
    new_password_hash: &str,
) -> Result<bool> {
    let query = "
        UPDATE users
        SET password_hash = $2,
            reset_token_hash = NULL,
            reset_token_expires_at = NULL,
            updated_at = NOW()
        WHERE reset_token_hash = $1
          AND reset_token_expires_at > NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(reset_token_hash)
        .bind(new_password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to consume reset token")?;
    Ok(result.rows_affected() > 0)
}
