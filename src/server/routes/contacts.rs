use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::contacts::{create_contact, get_contacts},
        Contact, NewContact,
    },
    server::{
        app::AppState,
        auth::Admin,
        deserializers::empty_string_as_none,
        error::{ApiError, ApiJson, ApiResponse},
    },
    telemetry::CONTACT_CNTR,
};

#[derive(Deserialize)]
struct ContactsQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    search: Option<String>,
}

#[derive(Serialize)]
struct Submitted {
    success: bool,
    code: u16,
    message: &'static str,
    date: DateTime<Utc>,
}

#[derive(Serialize)]
struct ContactList {
    success: bool,
    code: u16,
    data: Vec<Contact>,
    message: &'static str,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ContactStats {
    pub total: usize,
    pub today: usize,
    pub last_week: usize,
}

#[derive(Serialize)]
struct StatsResponse {
    success: bool,
    code: u16,
    data: ContactStats,
}

/// "today" is the current UTC calendar day, "last week" the trailing seven days.
pub fn contact_stats(contacts: &[Contact], now: DateTime<Utc>) -> ContactStats {
    let week_ago = now - Duration::days(7);
    ContactStats {
        total: contacts.len(),
        today: contacts
            .iter()
            .filter(|c| c.date.date_naive() == now.date_naive())
            .count(),
        last_week: contacts.iter().filter(|c| c.date >= week_ago).count(),
    }
}

async fn submit(
    State(pool): State<SqlitePool>,
    ApiJson(contact): ApiJson<NewContact>,
) -> ApiResponse<Json<Submitted>> {
    let name = contact
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("Name is required".to_owned()))?;
    let saved = create_contact(
        &pool,
        name,
        contact.email.as_deref().unwrap_or("").trim(),
        contact.message.as_deref().unwrap_or("").trim(),
    )
    .await?;
    CONTACT_CNTR.inc();
    tracing::info!(id = %saved.id, "Contact message received");
    Ok(Json(Submitted {
        success: true,
        code: 200,
        message: "Message received, thanks for reaching out",
        date: saved.date,
    }))
}

async fn list_contacts(
    _admin: Admin,
    State(pool): State<SqlitePool>,
    Query(ContactsQuery { search }): Query<ContactsQuery>,
) -> ApiResponse<Json<ContactList>> {
    let data = get_contacts(&pool, search.as_deref()).await?;
    Ok(Json(ContactList {
        success: true,
        code: 200,
        data,
        message: "Contacts loaded",
    }))
}

async fn stats(_admin: Admin, State(pool): State<SqlitePool>) -> ApiResponse<Json<StatsResponse>> {
    let contacts = get_contacts(&pool, None).await?;
    Ok(Json(StatsResponse {
        success: true,
        code: 200,
        data: contact_stats(&contacts, Utc::now()),
    }))
}

pub fn contacts_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(submit))
        .route("/submit", post(submit))
        .route("/connect-me", get(list_contacts))
        .route("/stats", get(stats))
        .with_state(state)
}
