use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::new_id;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[serde(alias = "SINGLE_CHOICE")]
    SingleChoice,
    #[serde(alias = "MULTIPLE_CHOICE")]
    MultipleChoice,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_choice" | "SINGLE_CHOICE" => Ok(QuestionType::SingleChoice),
            "multiple_choice" | "MULTIPLE_CHOICE" => Ok(QuestionType::MultipleChoice),
            other => Err(format!("Unknown question type {other}")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    pub id: String,
    pub category: String,
    pub chapter: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub options: Vec<QuizOption>,
    #[serde(alias = "correctOptionIds")]
    pub correct_option_ids: Vec<String>,
    #[serde(default)]
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

// options and correct ids live in JSON text columns
#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: String,
    category: String,
    chapter: String,
    text: String,
    #[sqlx(rename = "type")]
    kind: String,
    options: String,
    correct_option_ids: String,
    explanation: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = sqlx::Error;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Question {
            kind: row.kind.parse().map_err(decode_error::<String>)?,
            options: serde_json::from_str(&row.options).map_err(decode_error)?,
            correct_option_ids: serde_json::from_str(&row.correct_option_ids)
                .map_err(decode_error)?,
            id: row.id,
            category: row.category,
            chapter: row.chapter,
            text: row.text,
            explanation: row.explanation,
            created_at: row.created_at,
        })
    }
}

fn decode_error<E>(e: E) -> sqlx::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    sqlx::Error::Decode(e.into())
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewQuestion {
    #[serde(default)]
    pub id: Option<String>,
    pub category: String,
    pub chapter: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub options: Vec<QuizOption>,
    #[serde(alias = "correctOptionIds")]
    pub correct_option_ids: Vec<String>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvalidQuestion {
    #[error("Question text is empty")]
    EmptyText,
    #[error("Question category is empty")]
    EmptyCategory,
    #[error("Question chapter is empty")]
    EmptyChapter,
    #[error("A question needs at least two options")]
    TooFewOptions,
    #[error("Option {0} has no text")]
    EmptyOption(String),
    #[error("Option id {0} is used more than once")]
    DuplicateOption(String),
    #[error("At least one correct option is required")]
    NoCorrectOption,
    #[error("Correct option {0} is not one of the options")]
    UnknownCorrectOption(String),
    #[error("A single choice question has exactly one correct option")]
    SingleChoiceArity,
}

impl NewQuestion {
    pub fn validate(&self) -> Result<(), InvalidQuestion> {
        if self.text.trim().is_empty() {
            return Err(InvalidQuestion::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(InvalidQuestion::EmptyCategory);
        }
        if self.chapter.trim().is_empty() {
            return Err(InvalidQuestion::EmptyChapter);
        }
        if self.options.len() < 2 {
            return Err(InvalidQuestion::TooFewOptions);
        }
        let mut seen = HashSet::new();
        for option in &self.options {
            if option.text.trim().is_empty() {
                return Err(InvalidQuestion::EmptyOption(option.id.clone()));
            }
            if !seen.insert(option.id.as_str()) {
                return Err(InvalidQuestion::DuplicateOption(option.id.clone()));
            }
        }
        if self.correct_option_ids.is_empty() {
            return Err(InvalidQuestion::NoCorrectOption);
        }
        if let Some(unknown) = self
            .correct_option_ids
            .iter()
            .find(|id| !seen.contains(id.as_str()))
        {
            return Err(InvalidQuestion::UnknownCorrectOption(unknown.clone()));
        }
        let distinct: HashSet<&str> = self.correct_option_ids.iter().map(String::as_str).collect();
        if self.kind == QuestionType::SingleChoice && distinct.len() != 1 {
            return Err(InvalidQuestion::SingleChoiceArity);
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct QuestionFilter {
    pub category: Option<String>,
    pub chapter: Option<String>,
}

const SELECT_QUESTIONS: &str = r#"
SELECT id, category, chapter, text, type, options, correct_option_ids, explanation, created_at
FROM questions
"#;

pub async fn get_questions(pool: &SqlitePool, filter: &QuestionFilter) -> sqlx::Result<Vec<Question>> {
    let sql = format!(
        "{SELECT_QUESTIONS} WHERE (?1 IS NULL OR category = ?1) AND (?2 IS NULL OR chapter = ?2) \
         ORDER BY created_at DESC, rowid DESC"
    );
    let rows = sqlx::query_as::<_, QuestionRow>(&sql)
        .bind(filter.category.as_deref())
        .bind(filter.chapter.as_deref())
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(Question::try_from).collect()
}

pub async fn get_question(pool: &SqlitePool, id: &str) -> sqlx::Result<Question> {
    let sql = format!("{SELECT_QUESTIONS} WHERE id = ?1");
    let row = sqlx::query_as::<_, QuestionRow>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await?;
    Question::try_from(row)
}

/// Stores the question as given; callers validate first.
pub async fn create_question(pool: &SqlitePool, question: NewQuestion) -> sqlx::Result<String> {
    let id = question.id.unwrap_or_else(new_id);
    let options =
        serde_json::to_string(&question.options).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    let correct = serde_json::to_string(&question.correct_option_ids)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        r#"
INSERT INTO questions (id, category, chapter, text, type, options, correct_option_ids, explanation, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&id)
    .bind(question.category.trim())
    .bind(question.chapter.trim())
    .bind(question.text.trim())
    .bind(question.kind.as_str())
    .bind(options)
    .bind(correct)
    .bind(question.explanation.trim())
    .bind(question.created_at.unwrap_or_else(Utc::now))
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn delete_question(pool: &SqlitePool, id: &str) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM questions WHERE questions.id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
