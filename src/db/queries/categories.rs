use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::new_id;

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewCategory {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub const DEFAULT_ICON: &str = "HelpCircle";

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, name, icon, color, description, created_at
FROM categories
ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category(pool: &SqlitePool, id: &str) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, name, icon, color, description, created_at
FROM categories
WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn find_category_by_name(
    pool: &SqlitePool,
    name: &str,
) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, name, icon, color, description, created_at
FROM categories
WHERE categories.name = ?1
ORDER BY created_at
LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn create_category(pool: &SqlitePool, category: NewCategory) -> sqlx::Result<String> {
    let id = category.id.unwrap_or_else(new_id);
    sqlx::query(
        r#"
INSERT INTO categories (id, name, icon, color, description, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&id)
    .bind(category.name.trim())
    .bind(category.icon.as_deref().unwrap_or(DEFAULT_ICON))
    .bind(category.color.as_deref().unwrap_or(""))
    .bind(category.description.as_deref())
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(id)
}

/// Returns the number of deleted rows.
pub async fn delete_category(pool: &SqlitePool, id: &str) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM categories WHERE categories.id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
