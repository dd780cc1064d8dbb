pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use queries::categories::{Category, NewCategory};
pub use queries::chapters::{Chapter, NewChapter};
pub use queries::contacts::{Contact, NewContact};
pub use queries::questions::{NewQuestion, Question, QuestionFilter, QuestionType, QuizOption};
pub use queries::sessions::AdminSession;

use sqlx::Error;

pub async fn establish_connection(path: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(format!("sqlite:{}", path).as_str())?
        .create_if_missing(true);
    SqlitePool::connect_with(options).await
}

/// Single-connection pool over a private in-memory database.
pub async fn in_memory() -> Result<SqlitePool, Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Ids are UUID v4 strings unless the client brings its own.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
