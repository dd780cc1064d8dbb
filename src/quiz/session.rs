use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::db::{Question, QuestionType};

use super::setup::QuizPlan;

pub const NO_EXPLANATION: &str = "No explanation yet";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("A quiz needs at least one question")]
    Empty,
    #[error("Option {0} does not belong to the current question")]
    UnknownOption(String),
    #[error("Select at least one option before submitting")]
    NothingSelected,
    #[error("The current question was already answered")]
    AlreadyAnswered,
    #[error("Answer the current question first")]
    NotAnswered,
    #[error("The quiz is over")]
    Finished,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub correct_option_ids: Vec<String>,
    pub selected_option_ids: Vec<String>,
    pub explanation: String,
    pub is_last: bool,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Finished(QuizResult),
}

/// The answer counts only when the selection is exactly the correct set.
pub fn is_correct(selected: &BTreeSet<String>, correct: &[String]) -> bool {
    let correct: BTreeSet<&str> = correct.iter().map(String::as_str).collect();
    selected.len() == correct.len() && selected.iter().all(|id| correct.contains(id.as_str()))
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    index: usize,
    score: usize,
    selected: BTreeSet<String>,
    answered: bool,
    finished: bool,
    missed: Vec<Question>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            questions,
            index: 0,
            score: 0,
            selected: BTreeSet::new(),
            answered: false,
            finished: false,
            missed: Vec::new(),
        })
    }

    pub fn from_plan(plan: QuizPlan) -> Result<Self, SessionError> {
        Self::new(plan.questions)
    }

    pub fn current(&self) -> Option<&Question> {
        if self.finished {
            None
        } else {
            self.questions.get(self.index)
        }
    }

    /// 1-based position of the current question and the total.
    pub fn position(&self) -> (usize, usize) {
        ((self.index + 1).min(self.questions.len()), self.questions.len())
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn missed(&self) -> &[Question] {
        &self.missed
    }

    /// Single choice replaces the selection, multiple choice toggles.
    /// Selecting after the answer was submitted changes nothing.
    pub fn select(&mut self, option_id: &str) -> Result<(), SessionError> {
        let question = self.current().ok_or(SessionError::Finished)?;
        if self.answered {
            return Ok(());
        }
        if !question.has_option(option_id) {
            return Err(SessionError::UnknownOption(option_id.to_owned()));
        }
        match question.kind {
            QuestionType::SingleChoice => {
                self.selected.clear();
                self.selected.insert(option_id.to_owned());
            }
            QuestionType::MultipleChoice => {
                if !self.selected.remove(option_id) {
                    self.selected.insert(option_id.to_owned());
                }
            }
        }
        Ok(())
    }

    /// No-op once the answer was submitted.
    pub fn clear_selection(&mut self) {
        if !self.answered {
            self.selected.clear();
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.finished && !self.answered && !self.selected.is_empty()
    }

    pub fn submit(&mut self) -> Result<Feedback, SessionError> {
        let question = self.current().ok_or(SessionError::Finished)?;
        if self.answered {
            return Err(SessionError::AlreadyAnswered);
        }
        if self.selected.is_empty() {
            return Err(SessionError::NothingSelected);
        }

        let correct = is_correct(&self.selected, &question.correct_option_ids);
        let explanation = if question.explanation.trim().is_empty() {
            NO_EXPLANATION.to_owned()
        } else {
            question.explanation.clone()
        };
        let feedback = Feedback {
            correct,
            correct_option_ids: question.correct_option_ids.clone(),
            selected_option_ids: self.selected.iter().cloned().collect(),
            explanation,
            is_last: self.index + 1 == self.questions.len(),
        };

        if correct {
            self.score += 1;
        } else {
            let question = question.clone();
            self.missed.push(question);
        }
        self.answered = true;
        Ok(feedback)
    }

    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        if !self.answered {
            return Err(SessionError::NotAnswered);
        }
        self.selected.clear();
        self.answered = false;
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            Ok(Advance::Next)
        } else {
            self.finished = true;
            Ok(Advance::Finished(self.result()))
        }
    }

    /// Share of questions already behind, in percent.
    pub fn progress(&self) -> f64 {
        if self.finished {
            100.0
        } else {
            self.index as f64 / self.questions.len() as f64 * 100.0
        }
    }

    pub fn result(&self) -> QuizResult {
        let total = self.questions.len();
        QuizResult {
            score: self.score,
            total,
            percent: (self.score as f64 / total as f64 * 100.0).round() as u32,
        }
    }

    pub fn restart(&mut self) {
        self.index = 0;
        self.score = 0;
        self.selected.clear();
        self.answered = false;
        self.finished = false;
        self.missed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::setup::tests::question;

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn session() -> QuizSession {
        QuizSession::new(vec![
            question("q1", QuestionType::SingleChoice, &["b"]),
            question("q2", QuestionType::MultipleChoice, &["a", "c"]),
            question("q3", QuestionType::SingleChoice, &["d"]),
        ])
        .unwrap()
    }

    #[test]
    fn judging_is_set_equality() {
        let correct = vec!["a".to_owned(), "c".to_owned()];
        assert!(is_correct(&ids(&["c", "a"]), &correct));
        assert!(!is_correct(&ids(&["a"]), &correct));
        assert!(!is_correct(&ids(&["a", "b", "c"]), &correct));
        assert!(!is_correct(&ids(&["a", "b"]), &correct));
    }

    #[test]
    fn single_choice_replaces_selection() {
        let mut s = session();
        s.select("a").unwrap();
        s.select("b").unwrap();
        assert_eq!(s.selected().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(
            s.select("zz").unwrap_err(),
            SessionError::UnknownOption("zz".to_owned())
        );
    }

    #[test]
    fn multiple_choice_toggles() {
        let mut s = session();
        s.select("b").unwrap();
        s.submit().unwrap();
        s.advance().unwrap();

        s.select("a").unwrap();
        s.select("c").unwrap();
        s.select("b").unwrap();
        s.select("b").unwrap();
        assert_eq!(s.selected().collect::<Vec<_>>(), vec!["a", "c"]);
        assert!(s.submit().unwrap().correct);
    }

    #[test]
    fn submit_requires_selection_and_locks() {
        let mut s = session();
        assert!(!s.can_submit());
        assert_eq!(s.submit().unwrap_err(), SessionError::NothingSelected);
        assert_eq!(s.advance().unwrap_err(), SessionError::NotAnswered);

        s.select("a").unwrap();
        assert!(s.can_submit());
        let feedback = s.submit().unwrap();
        assert!(!feedback.correct);
        assert_eq!(feedback.correct_option_ids, vec!["b"]);
        assert_eq!(feedback.selected_option_ids, vec!["a"]);
        assert_eq!(feedback.explanation, NO_EXPLANATION);
        assert!(!feedback.is_last);

        // locked after submit
        s.select("b").unwrap();
        assert_eq!(s.selected().collect::<Vec<_>>(), vec!["a"]);
        assert!(!s.can_submit());
        assert_eq!(s.submit().unwrap_err(), SessionError::AlreadyAnswered);
    }

    #[test]
    fn full_run_scores_and_tracks_missed() {
        let mut s = session();
        assert_eq!(s.position(), (1, 3));
        assert_eq!(s.progress(), 0.0);

        s.select("b").unwrap();
        assert!(s.submit().unwrap().correct);
        assert_eq!(s.advance().unwrap(), Advance::Next);

        s.select("a").unwrap();
        assert!(!s.submit().unwrap().correct);
        assert_eq!(s.advance().unwrap(), Advance::Next);
        assert_eq!(s.position(), (3, 3));

        s.select("d").unwrap();
        let feedback = s.submit().unwrap();
        assert!(feedback.correct);
        assert!(feedback.is_last);

        let expected = QuizResult {
            score: 2,
            total: 3,
            percent: 67,
        };
        assert_eq!(s.advance().unwrap(), Advance::Finished(expected));
        assert!(s.is_finished());
        assert!(s.current().is_none());
        assert_eq!(s.progress(), 100.0);
        assert_eq!(s.result(), expected);
        assert_eq!(s.missed().len(), 1);
        assert_eq!(s.missed()[0].id, "q2");
        assert_eq!(s.select("a").unwrap_err(), SessionError::Finished);
        assert_eq!(s.advance().unwrap_err(), SessionError::Finished);
    }

    #[test]
    fn restart_resets_everything() {
        let mut s = session();
        s.select("a").unwrap();
        s.submit().unwrap();
        s.advance().unwrap();
        s.restart();

        assert_eq!(s.position(), (1, 3));
        assert_eq!(s.score(), 0);
        assert!(s.missed().is_empty());
        assert!(!s.is_answered());
        assert_eq!(s.current().map(|q| q.id.as_str()), Some("q1"));
    }

    #[test]
    fn empty_session_is_rejected() {
        assert_eq!(QuizSession::new(vec![]).unwrap_err(), SessionError::Empty);
    }
}
