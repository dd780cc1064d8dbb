use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::new_id;

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub date: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn create_contact(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    message: &str,
) -> sqlx::Result<Contact> {
    let contact = Contact {
        id: new_id(),
        name: name.to_owned(),
        email: email.to_owned(),
        message: message.to_owned(),
        date: Utc::now(),
    };
    sqlx::query("INSERT INTO contacts (id, name, email, message, date) VALUES (?1, ?2, ?3, ?4, ?5)")
        .bind(&contact.id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.message)
        .bind(contact.date)
        .execute(pool)
        .await?;
    Ok(contact)
}

/// Case-insensitive substring search over name, email and message, newest first.
pub async fn get_contacts(pool: &SqlitePool, search: Option<&str>) -> sqlx::Result<Vec<Contact>> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    sqlx::query_as::<_, Contact>(
        r#"
SELECT id, name, email, message, date
FROM contacts
WHERE ?1 IS NULL
   OR instr(lower(name), lower(?1)) > 0
   OR instr(lower(email), lower(?1)) > 0
   OR instr(lower(message), lower(?1)) > 0
ORDER BY date DESC, rowid DESC
        "#,
    )
    .bind(search)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{in_memory, run_migrations};

    #[tokio::test]
    async fn search_matches_any_field() {
        let pool = in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();

        create_contact(&pool, "Alice", "alice@example.com", "Hello there")
            .await
            .unwrap();
        create_contact(&pool, "Bob", "bob@example.org", "Nice FIREWORKS page")
            .await
            .unwrap();

        let all = get_contacts(&pool, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Bob");

        let by_email = get_contacts(&pool, Some("EXAMPLE.COM")).await.unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].name, "Alice");

        let by_message = get_contacts(&pool, Some("fireworks")).await.unwrap();
        assert_eq!(by_message.len(), 1);
        assert_eq!(by_message[0].name, "Bob");

        assert_eq!(get_contacts(&pool, Some("   ")).await.unwrap().len(), 2);
        assert!(get_contacts(&pool, Some("nobody")).await.unwrap().is_empty());
    }
}
