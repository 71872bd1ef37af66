//! User directory queries.
//!
//! Accounts are owned by the surrounding application; this module only
//! reads them and, for finished recoveries, rewrites the stored password.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Account record as stored in the user directory.
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub verified: bool,
}

/// Look up a user by email (case-sensitive, per directory contract).
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let query = "SELECT id, email, password, verified FROM users WHERE email = $1";
    let span = info_span!(
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

    Ok(row.map(user_from_row))
}

/// Look up a user by the id embedded in a verified token.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let query = "SELECT id, email, password, verified FROM users WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by id")?;

    Ok(row.map(user_from_row))
}

/// Persist a new password credential and mark the account verified.
///
/// Finishing a recovery proves control of the mailbox, which is why
/// `verified` flips to true here.
pub async fn update_password(pool: &PgPool, id: Uuid, password: &str) -> Result<()> {
    let query = "UPDATE users SET password = $2, verified = TRUE WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(password)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update user password")?;

    Ok(())
}

fn user_from_row(row: sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password: row.get("password"),
        verified: row.get("verified"),
    }
}
