//! Permanent token store.
//!
//! Permanent tokens are long-lived opaque credentials, one per login, so a
//! user may hold several at once (multi-device). The token string is
//! unique across all users; inserts are retried on the off chance two
//! generated tokens collide.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sqlx::{PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::is_unique_violation;

const TOKEN_BYTES: usize = 48;
const CREATE_ATTEMPTS: usize = 3;

/// Long-lived credential row.
pub struct PermanentToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at_unix: i64,
}

/// Generate a new high-entropy opaque token string.
pub(crate) fn generate_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate permanent token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Mint and persist a permanent token for `user_id`.
pub async fn create(pool: &PgPool, user_id: Uuid) -> Result<PermanentToken> {
    let query = r"
        INSERT INTO user_tokens (user_id, token)
        VALUES ($1, $2)
        RETURNING id, EXTRACT(EPOCH FROM created_at)::BIGINT AS created_at_unix
    ";

    for _ in 0..CREATE_ATTEMPTS {
        let token = generate_token()?;
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(&token)
            .fetch_one(pool)
            .instrument(span)
            .await;

        match result {
            Ok(row) => {
                return Ok(PermanentToken {
                    id: row.get("id"),
                    user_id,
                    token,
                    created_at_unix: row.get("created_at_unix"),
                });
            }
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err).context("failed to insert permanent token"),
        }
    }

    Err(anyhow!("failed to insert permanent token: token collision"))
}

/// Resolve a presented token string to its row, if any.
pub async fn find(pool: &PgPool, token: &str) -> Result<Option<PermanentToken>> {
    let query = r"
        SELECT id, user_id, token, EXTRACT(EPOCH FROM created_at)::BIGINT AS created_at_unix
        FROM user_tokens
        WHERE token = $1
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup permanent token")?;

    Ok(row.map(|row| PermanentToken {
        id: row.get("id"),
        user_id: row.get("user_id"),
        token: row.get("token"),
        created_at_unix: row.get("created_at_unix"),
    }))
}

/// Delete a single token (individual logout). Returns the rows removed.
pub async fn delete(pool: &PgPool, token: &str) -> Result<u64> {
    let query = "DELETE FROM user_tokens WHERE token = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(token)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete permanent token")?;

    Ok(result.rows_affected())
}

/// Delete every token owned by `user_id` (logout-all). Returns the count.
pub async fn delete_all(pool: &PgPool, user_id: Uuid) -> Result<u64> {
    let query = "DELETE FROM user_tokens WHERE user_id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete permanent tokens")?;

    Ok(result.rows_affected())
}
