use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::new_id;

/// A chapter points at its category by name, not by id.
#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: String,
    pub category: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewChapter {
    #[serde(default)]
    pub id: Option<String>,
    pub category: String,
    pub name: String,
}

pub async fn get_chapters(pool: &SqlitePool, category: Option<&str>) -> sqlx::Result<Vec<Chapter>> {
    sqlx::query_as::<_, Chapter>(
        r#"
SELECT id, category, name, created_at
FROM chapters
WHERE ?1 IS NULL OR chapters.category = ?1
ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

pub async fn get_chapter(pool: &SqlitePool, id: &str) -> sqlx::Result<Chapter> {
    sqlx::query_as::<_, Chapter>(
        "SELECT id, category, name, created_at FROM chapters WHERE chapters.id = ?1",
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn find_chapter(
    pool: &SqlitePool,
    category: &str,
    name: &str,
) -> sqlx::Result<Option<Chapter>> {
    sqlx::query_as::<_, Chapter>(
        r#"
SELECT id, category, name, created_at
FROM chapters
WHERE chapters.category = ?1 AND chapters.name = ?2
        "#,
    )
    .bind(category)
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// Fails with a unique violation when the category already has a chapter of that name.
pub async fn create_chapter(pool: &SqlitePool, chapter: NewChapter) -> sqlx::Result<String> {
    let id = chapter.id.unwrap_or_else(new_id);
    sqlx::query(
        r#"
INSERT INTO chapters (id, category, name, created_at) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&id)
    .bind(chapter.category.trim())
    .bind(chapter.name.trim())
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn delete_chapter(pool: &SqlitePool, id: &str) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM chapters WHERE chapters.id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
