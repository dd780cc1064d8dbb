use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::questions::{self, get_question, get_questions},
        NewQuestion, Question, QuestionFilter,
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
struct QuestionsQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    chapter: Option<String>,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    Query(QuestionsQuery { category, chapter }): Query<QuestionsQuery>,
) -> ApiResponse<Json<Data<Vec<Question>>>> {
    let filter = QuestionFilter { category, chapter };
    Ok(data(get_questions(&pool, &filter).await?))
}

async fn create_question(
    admin: Admin,
    State(pool): State<SqlitePool>,
    ApiJson(new_question): ApiJson<NewQuestion>,
) -> ApiResponse<Json<Data<Question>>> {
    new_question
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let id = questions::create_question(&pool, new_question).await?;
    CONTENT_CNTR.with_label_values(&["question", "create"]).inc();
    tracing::info!(admin = %admin.username, %id, "Question created");
    Ok(data(get_question(&pool, &id).await?))
}

async fn delete_question(
    admin: Admin,
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> ApiResponse<Json<Data<String>>> {
    if questions::delete_question(&pool, &id).await? == 0 {
        return Err(ApiError::NotFound("Question".to_owned()));
    }
    CONTENT_CNTR.with_label_values(&["question", "delete"]).inc();
    tracing::info!(admin = %admin.username, %id, "Question deleted");
    Ok(data(id))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
