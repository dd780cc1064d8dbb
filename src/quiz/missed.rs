use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::db::Question;

use super::setup::{QuizPlan, SetupError};

#[derive(Error, Debug)]
pub enum MissedError {
    #[error("Cannot access missed questions file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Missed questions file {path} is corrupted: {source}")]
    Corrupted {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Wrongly answered questions kept in a JSON file between runs.
#[derive(Debug)]
pub struct MissedStore {
    path: PathBuf,
    questions: Vec<Question>,
}

impl MissedStore {
    /// A missing file opens as an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MissedError> {
        let path = path.as_ref().to_path_buf();
        let questions = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| MissedError::Corrupted {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(MissedError::Io { path, source }),
        };
        Ok(Self { path, questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Adds the questions, replacing older copies with the same id.
    pub fn record(&mut self, questions: &[Question]) {
        for question in questions {
            self.questions.retain(|q| q.id != question.id);
            self.questions.push(question.clone());
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != id);
        before != self.questions.len()
    }

    pub fn clear(&mut self) {
        self.questions.clear();
    }

    pub fn save(&self) -> Result<(), MissedError> {
        let io_error = |source| MissedError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let raw = serde_json::to_string_pretty(&self.questions).map_err(|source| {
            MissedError::Corrupted {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, raw).map_err(io_error)
    }

    pub fn replay_plan(&self) -> Result<QuizPlan, SetupError> {
        QuizPlan::replay(self.questions.clone())
    }
}
