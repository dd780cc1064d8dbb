use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::categories::{self, get_all_categories, get_category},
        Category, NewCategory,
    },
    server::{
        app::AppState,
        auth::Admin,
        error::{data, ApiError, ApiJson, ApiResponse, Data},
    },
    telemetry::CONTENT_CNTR,
};

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<Data<Vec<Category>>>> {
    Ok(data(get_all_categories(&pool).await?))
}

async fn create_category(
    admin: Admin,
    State(pool): State<SqlitePool>,
    ApiJson(new_category): ApiJson<NewCategory>,
) -> ApiResponse<Json<Data<Category>>> {
    if new_category.name.trim().is_empty() {
        return Err(ApiError::Validation("Category name is required".to_owned()));
    }
    let id = categories::create_category(&pool, new_category).await?;
    CONTENT_CNTR.with_label_values(&["category", "create"]).inc();
    tracing::info!(admin = %admin.username, %id, "Category created");
    Ok(data(get_category(&pool, &id).await?))
}

async fn delete_category(
    admin: Admin,
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> ApiResponse<Json<Data<String>>> {
    if categories::delete_category(&pool, &id).await? == 0 {
        return Err(ApiError::NotFound("Category".to_owned()));
    }
    CONTENT_CNTR.with_label_values(&["category", "delete"]).inc();
    tracing::info!(admin = %admin.username, %id, "Category deleted");
    Ok(data(id))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
        .with_state(state)
}
