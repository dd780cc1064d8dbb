use chrono::{DateTime, Duration, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::new_id;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct AdminSession {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn create_session(
    pool: &SqlitePool,
    username: &str,
    ttl: Duration,
) -> sqlx::Result<AdminSession> {
    let session = AdminSession {
        token: new_id(),
        username: username.to_owned(),
        expires_at: Utc::now() + ttl,
    };
    sqlx::query("INSERT INTO admin_sessions (token, username, expires_at) VALUES (?1, ?2, ?3)")
        .bind(&session.token)
        .bind(&session.username)
        .bind(session.expires_at)
        .execute(pool)
        .await?;
    Ok(session)
}

/// Expired sessions are treated as absent.
pub async fn find_session(pool: &SqlitePool, token: &str) -> sqlx::Result<Option<AdminSession>> {
    let session = sqlx::query_as::<_, AdminSession>(
        "SELECT token, username, expires_at FROM admin_sessions WHERE token = ?1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(session.filter(|s| s.expires_at > Utc::now()))
}

pub async fn purge_expired_sessions(pool: &SqlitePool) -> sqlx::Result<u64> {
    let sessions = sqlx::query_as::<_, AdminSession>(
        "SELECT token, username, expires_at FROM admin_sessions",
    )
    .fetch_all(pool)
    .await?;
    let now = Utc::now();
    let expired: Vec<&str> = sessions
        .iter()
        .filter(|s| s.expires_at <= now)
        .map(|s| s.token.as_str())
        .collect();
    if expired.is_empty() {
        return Ok(0);
    }
    let mut query =
        QueryBuilder::<Sqlite>::new("DELETE FROM admin_sessions WHERE token IN (");
    let mut tokens = query.separated(", ");
    for token in expired {
        tokens.push_bind(token);
    }
    tokens.push_unseparated(")");
    Ok(query.build().execute(pool).await?.rows_affected())
}
