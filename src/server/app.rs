use std::path::PathBuf;
use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{extract::FromRef, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::error::{ApiError, ApiResponse};
use super::routes::{auth_router, contacts_router, shuashua_router};
use crate::db::queries::categories::get_all_categories;
use crate::db::queries::sessions::purge_expired_sessions;
use crate::settings::{AuthSettings, Settings};

#[derive(FromRef, Clone)]
pub struct AppState {
    pool: SqlitePool,
    static_dir: PathBuf,
    auth: Arc<AuthSettings>,
}

impl AppState {
    pub fn new(pool: SqlitePool, static_dir: PathBuf, auth: AuthSettings) -> Self {
        Self {
            pool,
            static_dir,
            auth: Arc::new(auth),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/metrics", get(metrics))
        .route("/shua", get(quiz_home).with_state(state.clone()))
        .nest_service("/static", ServeDir::new(state.static_dir.clone()))
        .nest("/api/shuashua", shuashua_router(state.clone()))
        .nest("/api/auth", auth_router(state.clone()))
        .nest("/api/connect", contacts_router(state.clone()))
        .fallback(|| async {
            tracing::info!("Fallback");
            ApiError::NotFound("Route".to_owned())
        })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(pool: SqlitePool, settings: &Settings) -> anyhow::Result<()> {
    let purged = purge_expired_sessions(&pool).await?;
    if purged > 0 {
        tracing::info!("Purged {purged} expired admin sessions");
    }
    let state = AppState::new(pool, settings.static_dir.clone(), settings.auth());
    let app = build_router(state);

    let addr = settings.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Serving on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "code": "200",
        "success": true,
        "message": "Connected",
        "date": Utc::now(),
    }))
}

pub fn icon_emoji(icon: &str) -> &'static str {
    match icon {
        "Cpu" => "💾",
        "Code" => "👨‍💻",
        "Earth" => "🌍",
        "Beaker" => "⚗️",
        "BookOpen" => "📖",
        "Lightbulb" => "💡",
        "Rocket" => "🚀",
        "NotepadText" => "📝",
        _ => "❓",
    }
}

struct CategoryCard {
    id: String,
    name: String,
    icon: &'static str,
    color: String,
    blurb: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "shua.html")]
struct QuizHomePage {
    cards: Vec<CategoryCard>,
}

async fn quiz_home(State(pool): State<SqlitePool>) -> ApiResponse<QuizHomePage> {
    let cards = get_all_categories(&pool)
        .await?
        .into_iter()
        .map(|c| CategoryCard {
            icon: icon_emoji(&c.icon),
            blurb: c
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "Start practising".to_owned()),
            id: c.id,
            name: c.name,
            color: c.color,
        })
        .collect();
    Ok(QuizHomePage { cards })
}

async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    if let Err(e) = encoder.encode(&metrics, &mut buf) {
        tracing::error!("Failed to encode metrics: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    ([(header::CONTENT_TYPE, encoder.format_type().to_owned())], Body::from(buf)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_icons_fall_back_to_question_mark() {
        assert_eq!(icon_emoji("Rocket"), "🚀");
        assert_eq!(icon_emoji("HelpCircle"), "❓");
        assert_eq!(icon_emoji(""), "❓");
    }
}
