use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::chapters::{self, get_chapter, get_chapters},
        Chapter, NewChapter,
    },
    server::{
        app::AppState,
        auth::Admin,
        deserializers::empty_string_as_none,
        error::{data, ApiError, ApiJson, ApiResponse, Data},
    },
    telemetry::CONTENT_CNTR,
};

#[derive(Deserialize)]
struct ChaptersQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
}

async fn list_chapters(
    State(pool): State<SqlitePool>,
    Query(ChaptersQuery { category }): Query<ChaptersQuery>,
) -> ApiResponse<Json<Data<Vec<Chapter>>>> {
    Ok(data(get_chapters(&pool, category.as_deref()).await?))
}

async fn create_chapter(
    admin: Admin,
    State(pool): State<SqlitePool>,
    ApiJson(new_chapter): ApiJson<NewChapter>,
) -> ApiResponse<Json<Data<Chapter>>> {
    if new_chapter.category.trim().is_empty() {
        return Err(ApiError::Validation("Chapter category is required".to_owned()));
    }
    if new_chapter.name.trim().is_empty() {
        return Err(ApiError::Validation("Chapter name is required".to_owned()));
    }
    let id = chapters::create_chapter(&pool, new_chapter)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                ApiError::Conflict("Chapter already exists in this category".to_owned())
            }
            other => other,
        })?;
    CONTENT_CNTR.with_label_values(&["chapter", "create"]).inc();
    tracing::info!(admin = %admin.username, %id, "Chapter created");
    Ok(data(get_chapter(&pool, &id).await?))
}

async fn delete_chapter(
    admin: Admin,
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> ApiResponse<Json<Data<String>>> {
    if chapters::delete_chapter(&pool, &id).await? == 0 {
        return Err(ApiError::NotFound("Chapter".to_owned()));
    }
    CONTENT_CNTR.with_label_values(&["chapter", "delete"]).inc();
    tracing::info!(admin = %admin.username, %id, "Chapter deleted");
    Ok(data(id))
}

pub fn chapter_router(state: AppState) -> Router {
    Router::new()
        .route("/chapters", get(list_chapters).post(create_chapter))
        .route("/chapters/{id}", delete(delete_chapter))
        .with_state(state)
}
