use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::queries::sessions::{create_session, purge_expired_sessions},
    server::{
        app::AppState,
        auth::{credentials_match, Admin},
        error::{ApiError, ApiJson, ApiResponse},
    },
    settings::AuthSettings,
    telemetry::LOGIN_CNTR,
};

const ADMIN_ROLE: &str = "admin";

#[derive(Deserialize)]
struct Login {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct UserInfo {
    username: String,
    role: &'static str,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    message: &'static str,
    token: String,
    user: UserInfo,
}

#[derive(Serialize)]
struct VerifyResponse {
    success: bool,
    message: &'static str,
    user: UserInfo,
}

async fn login(
    State(pool): State<SqlitePool>,
    State(auth): State<Arc<AuthSettings>>,
    ApiJson(Login { username, password }): ApiJson<Login>,
) -> ApiResponse<Json<LoginResponse>> {
    if !credentials_match(&auth, &username, &password) {
        LOGIN_CNTR.with_label_values(&["rejected"]).inc();
        tracing::warn!(%username, "Rejected admin login");
        return Err(ApiError::InvalidCredentials);
    }
    let purged = purge_expired_sessions(&pool).await?;
    if purged > 0 {
        tracing::debug!("Purged {purged} expired admin sessions");
    }
    let session = create_session(&pool, &auth.admin_username, auth.token_ttl).await?;
    LOGIN_CNTR.with_label_values(&["accepted"]).inc();
    tracing::info!(%username, expires_at = %session.expires_at, "Admin logged in");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
        token: session.token,
        user: UserInfo {
            username: session.username,
            role: ADMIN_ROLE,
        },
    }))
}

async fn verify(admin: Admin) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        message: "Token is valid",
        user: UserInfo {
            username: admin.username,
            role: ADMIN_ROLE,
        },
    })
}

pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/verify", get(verify))
        .with_state(state)
}
