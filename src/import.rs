//! Bulk import of JSON question banks.
//!
//! A bank file is a JSON array of items like
//! `{"type": "single_choice", "content": "...", "options": ["..", ".."], "answer": "A"}`.
//! Options may also be given as `{"id", "text"}` objects; plain strings get the
//! ids `A`, `B`, `C`, ... in order. A list `answer` marks a multiple choice item.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::queries::{categories, chapters, questions};
use crate::db::{NewCategory, NewChapter, NewQuestion, QuestionType, QuizOption};

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum BankOption {
    Text(String),
    Full(QuizOption),
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum BankAnswer {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize, Debug, Clone)]
pub struct BankItem {
    #[serde(rename = "type", default)]
    pub kind: Option<QuestionType>,
    #[serde(alias = "text")]
    pub content: String,
    pub options: Vec<BankOption>,
    pub answer: BankAnswer,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
}

fn option_id(index: usize) -> String {
    // A..Z, then AA, AB, ... like spreadsheet columns
    let mut n = index;
    let mut id = Vec::new();
    loop {
        id.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    id.reverse();
    String::from_utf8_lossy(&id).into_owned()
}

impl BankItem {
    pub fn into_new_question(self, category: &str, chapter: &str) -> NewQuestion {
        let options: Vec<QuizOption> = self
            .options
            .into_iter()
            .enumerate()
            .map(|(n, option)| match option {
                BankOption::Text(text) => QuizOption {
                    id: option_id(n),
                    text,
                },
                BankOption::Full(option) => option,
            })
            .collect();
        let correct_option_ids = match self.answer {
            BankAnswer::One(answer) => vec![answer.trim().to_owned()],
            BankAnswer::Many(answers) => answers.into_iter().map(|a| a.trim().to_owned()).collect(),
        };
        let kind = self.kind.unwrap_or(if correct_option_ids.len() > 1 {
            QuestionType::MultipleChoice
        } else {
            QuestionType::SingleChoice
        });
        NewQuestion {
            id: None,
            category: category.to_owned(),
            chapter: chapter.to_owned(),
            text: self.content,
            kind,
            options,
            correct_option_ids,
            explanation: self.explanation,
            created_at: None,
        }
    }
}

pub fn parse_bank(raw: &str) -> anyhow::Result<Vec<Value>> {
    let root: Value = serde_json::from_str(raw).context("Question bank is not valid JSON")?;
    match root {
        Value::Array(items) => Ok(items),
        _ => anyhow::bail!("Question bank root must be an array"),
    }
}

/// Creates the category and chapter when missing.
pub async fn ensure_category_and_chapter(
    pool: &SqlitePool,
    category: &str,
    chapter: &str,
) -> anyhow::Result<()> {
    // stored names are trimmed, so lookups must be too
    let (category, chapter) = (category.trim(), chapter.trim());
    if categories::find_category_by_name(pool, category).await?.is_none() {
        let id = categories::create_category(
            pool,
            NewCategory {
                name: category.to_owned(),
                icon: Some("BookOpen".to_owned()),
                description: Some(format!("{category} question bank")),
                ..Default::default()
            },
        )
        .await?;
        tracing::info!(%id, "Created category {category}");
    }
    if chapters::find_chapter(pool, category, chapter).await?.is_none() {
        let id = chapters::create_chapter(
            pool,
            NewChapter {
                id: None,
                category: category.to_owned(),
                name: chapter.to_owned(),
            },
        )
        .await?;
        tracing::info!(%id, "Created chapter {chapter}");
    }
    Ok(())
}

/// Broken items are logged and counted, the rest are still imported.
pub async fn import_items(
    pool: &SqlitePool,
    items: Vec<Value>,
    category: &str,
    chapter: &str,
) -> anyhow::Result<ImportReport> {
    let (category, chapter) = (category.trim(), chapter.trim());
    ensure_category_and_chapter(pool, category, chapter).await?;

    let mut report = ImportReport::default();
    for (n, item) in items.into_iter().enumerate() {
        let question = match serde_json::from_value::<BankItem>(item) {
            Ok(item) => item.into_new_question(category, chapter),
            Err(e) => {
                tracing::warn!("Item {} is malformed: {e}", n + 1);
                report.failed += 1;
                continue;
            }
        };
        if let Err(e) = question.validate() {
            tracing::warn!("Item {} is invalid: {e}", n + 1);
            report.failed += 1;
            continue;
        }
        questions::create_question(pool, question).await?;
        report.imported += 1;
    }
    tracing::info!(
        "Imported {} questions into {category}/{chapter}, {} failed",
        report.imported,
        report.failed
    );
    Ok(report)
}

pub async fn import_file(
    pool: &SqlitePool,
    path: &Path,
    category: &str,
    chapter: &str,
) -> anyhow::Result<ImportReport> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let items = parse_bank(&raw).with_context(|| format!("In {}", path.display()))?;
    import_items(pool, items, category, chapter).await
}
