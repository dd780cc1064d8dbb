mod auth;
mod categories;
mod chapters;
mod contacts;
mod questions;

pub use auth::auth_router;
pub use categories::category_router;
pub use chapters::chapter_router;
pub use contacts::contacts_router;
pub use questions::questions_router;

use axum::Router;

use super::app::AppState;

/// Everything under `/api/shuashua`.
pub fn shuashua_router(state: AppState) -> Router {
    Router::new()
        .merge(category_router(state.clone()))
        .merge(chapter_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(auth_router(state))
}
