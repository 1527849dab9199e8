//! One quiz from generation to export.
//!
//! A session moves `Empty → Generated → Attempted → Evaluated`. Generating
//! always starts over; answers are only accepted once questions exist;
//! evaluation needs an answer for every question and may be repeated.

use std::fmt;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::core::LowLevelClient;
use crate::error::QuizError;
use crate::export::{persist_table, ExportTarget, QuizResult, ResultTable};
use crate::generator::QuestionGenerator;
use crate::question::{Difficulty, Question, QuestionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Generated,
    Attempted,
    Evaluated,
}

/// Correct answers out of the total, as shown after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {}/{} ({:.1}%)", self.correct, self.total, self.percentage())
    }
}

/// Case-insensitive comparison ignoring surrounding whitespace.
pub fn answers_match(user_answer: &str, correct_answer: &str) -> bool {
    user_answer.trim().to_lowercase() == correct_answer.trim().to_lowercase()
}

#[derive(Debug, Default)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: Vec<String>,
    results: Vec<QuizResult>,
    state: SessionState,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn results(&self) -> &[QuizResult] {
        &self.results
    }

    fn reset(&mut self) {
        self.questions.clear();
        self.answers.clear();
        self.results.clear();
        self.state = SessionState::Empty;
    }

    /// Replace the quiz with `count` fresh questions of one kind.
    ///
    /// All or nothing: if any question exhausts its retries the session is
    /// left empty and the failure is returned.
    #[instrument(target = "quiz_forge::session", skip(self, generator))]
    pub async fn generate<C: LowLevelClient>(
        &mut self,
        generator: &QuestionGenerator<C>,
        topic: &str,
        kind: QuestionKind,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<&[Question], QuizError> {
        self.reset();
        info!(count, "Generating questions");

        let mut batch = Vec::with_capacity(count);
        for index in 0..count {
            match generator.generate(kind, topic, difficulty).await {
                Ok(question) => batch.push(question),
                Err(err) => {
                    warn!(question = index + 1, error = %err, "Aborting batch");
                    return Err(err.into());
                }
            }
        }

        self.questions = batch;
        self.state = SessionState::Generated;
        info!(generated = self.questions.len(), "Quiz ready");
        Ok(&self.questions)
    }

    /// Record the answer to question `index` (0-based).
    ///
    /// Answers arrive in question order; `index` equal to the number already
    /// recorded appends, a smaller one replaces an earlier answer.
    pub fn record_answer(&mut self, index: usize, answer: impl Into<String>) -> Result<(), QuizError> {
        if self.state == SessionState::Empty {
            return Err(QuizError::NotGenerated);
        }
        let total = self.questions.len();
        if index >= total {
            return Err(QuizError::AnswerIndexOutOfRange { index, total });
        }
        let answer = answer.into();
        match index.cmp(&self.answers.len()) {
            std::cmp::Ordering::Less => self.answers[index] = answer,
            std::cmp::Ordering::Equal => self.answers.push(answer),
            std::cmp::Ordering::Greater => {
                return Err(QuizError::AnswerOutOfOrder {
                    index,
                    expected: self.answers.len(),
                })
            }
        }
        // stale once any answer changes
        self.results.clear();
        self.state = SessionState::Attempted;
        Ok(())
    }

    /// Replace all answers at once, in question order.
    ///
    /// On error the session keeps its previous answers and state.
    pub fn submit_answers<I, S>(&mut self, answers: I) -> Result<(), QuizError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.state == SessionState::Empty {
            return Err(QuizError::NotGenerated);
        }
        let total = self.questions.len();
        let answers: Vec<String> = answers.into_iter().map(Into::into).collect();
        if answers.len() > total {
            return Err(QuizError::AnswerIndexOutOfRange { index: total, total });
        }

        self.state = if answers.is_empty() {
            SessionState::Generated
        } else {
            SessionState::Attempted
        };
        self.answers = answers;
        self.results.clear();
        Ok(())
    }

    /// Score every answer. Recomputes from scratch each time.
    pub fn evaluate(&mut self) -> Result<&[QuizResult], QuizError> {
        if self.state == SessionState::Empty {
            return Err(QuizError::NotGenerated);
        }
        if self.answers.len() != self.questions.len() {
            return Err(QuizError::IncompleteAnswers {
                answered: self.answers.len(),
                total: self.questions.len(),
            });
        }

        self.results = self
            .questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(i, (question, user_answer))| QuizResult {
                question_number: i + 1,
                question: question.text().to_string(),
                question_type: question.kind(),
                user_answer: user_answer.clone(),
                correct_answer: question.correct_answer().to_string(),
                is_correct: answers_match(user_answer, question.correct_answer()),
            })
            .collect();
        self.state = SessionState::Evaluated;

        Ok(&self.results)
    }

    /// `None` until the quiz has been evaluated.
    pub fn score(&self) -> Option<Score> {
        if self.state != SessionState::Evaluated {
            return None;
        }
        Some(Score {
            correct: self.results.iter().filter(|r| r.is_correct).count(),
            total: self.results.len(),
        })
    }

    pub fn export(&self) -> ResultTable {
        ResultTable::new(self.results.clone())
    }

    /// Save the results table under `target` and return the written path.
    pub async fn persist(&self, target: &ExportTarget) -> Result<PathBuf, QuizError> {
        if self.results.is_empty() {
            warn!("No results to save");
            return Err(QuizError::NoResults);
        }
        persist_table(&self.export(), target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case_and_surrounding_whitespace() {
        assert!(answers_match(" Paris ", "paris"));
        assert!(answers_match("TRUE", "True"));
        assert!(!answers_match("Par is", "Paris"));
    }

    #[test]
    fn score_formats_one_decimal() {
        let score = Score { correct: 2, total: 3 };
        assert_eq!(score.to_string(), "Score: 2/3 (66.7%)");
        assert_eq!(Score { correct: 0, total: 0 }.percentage(), 0.0);
    }

    #[test]
    fn answers_need_questions() {
        let mut session = QuizSession::new();
        assert!(matches!(session.record_answer(0, "x"), Err(QuizError::NotGenerated)));
        assert!(matches!(session.evaluate(), Err(QuizError::NotGenerated)));
        assert!(session.export().is_empty());
    }
}
