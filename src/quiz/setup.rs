use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{Question, QuestionType};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizMode {
    /// Newest questions first
    #[default]
    Sequential,
    Random,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeFilter {
    #[default]
    All,
    Single,
    Multiple,
}

impl TypeFilter {
    pub fn accepts(&self, kind: QuestionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Single => kind == QuestionType::SingleChoice,
            TypeFilter::Multiple => kind == QuestionType::MultipleChoice,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    pub mode: QuizMode,
    #[serde(rename = "type")]
    pub kind: TypeFilter,
    pub count: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            mode: QuizMode::default(),
            kind: TypeFilter::default(),
            count: 5,
        }
    }
}

/// The questions a quiz run will go through, in order.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizPlan {
    pub questions: Vec<Question>,
    pub settings: QuizSettings,
    pub started_at: DateTime<Utc>,
}

impl QuizPlan {
    /// Replays the given questions as they are, in stored order.
    pub fn replay(questions: Vec<Question>) -> Result<Self, SetupError> {
        if questions.is_empty() {
            return Err(SetupError::NoQuestions);
        }
        Ok(Self {
            settings: QuizSettings {
                count: questions.len(),
                ..QuizSettings::default()
            },
            questions,
            started_at: Utc::now(),
        })
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SetupError {
    #[error("There are no questions in this category yet")]
    NoQuestions,
    #[error("No questions match the current filter")]
    NoneMatchFilter,
}

pub fn select_questions(all: Vec<Question>, category: &str, chapter: Option<&str>) -> Vec<Question> {
    all.into_iter()
        .filter(|q| q.category == category)
        .filter(|q| chapter.map_or(true, |c| q.chapter == c))
        .collect()
}

pub fn apply_filter(questions: &[Question], kind: TypeFilter) -> Vec<Question> {
    questions
        .iter()
        .filter(|q| kind.accepts(q.kind))
        .cloned()
        .collect()
}

/// Never more than available, never zero while something is available.
pub fn clamp_count(count: usize, available: usize) -> usize {
    if available == 0 {
        0
    } else {
        count.clamp(1, available)
    }
}

pub fn build_plan(questions: Vec<Question>, settings: QuizSettings) -> Result<QuizPlan, SetupError> {
    if questions.is_empty() {
        return Err(SetupError::NoQuestions);
    }
    let mut chosen = apply_filter(&questions, settings.kind);
    if chosen.is_empty() {
        return Err(SetupError::NoneMatchFilter);
    }
    let count = clamp_count(settings.count, chosen.len());

    match settings.mode {
        QuizMode::Sequential => chosen.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        QuizMode::Random => chosen.sort_by_cached_key(|_| Uuid::new_v4()),
    }
    chosen.truncate(count);

    Ok(QuizPlan {
        questions: chosen,
        settings: QuizSettings { count, ..settings },
        started_at: Utc::now(),
    })
}
