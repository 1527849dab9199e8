//! Question shapes: what the model is asked to return, and the validated form the quiz stores.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Placeholder a blank-fill question must contain.
pub const BLANK_MARKER: &str = "_____";

/// Shorter run of underscores the model sometimes emits instead of [`BLANK_MARKER`].
const SHORT_BLANK_MARKER: &str = "___";

pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum QuestionKind {
    #[serde(rename = "MCQ")]
    Choice,
    #[serde(rename = "Fill in the Blank")]
    Blank,
    #[serde(rename = "True/False")]
    Boolean,
}

impl QuestionKind {
    /// Label used in the exported `question_type` column.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Choice => "MCQ",
            Self::Blank => "Fill in the Blank",
            Self::Boolean => "True/False",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the question text as a plain string, or unwraps it from whatever
/// nested value the model produced instead.
fn question_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        Value::Object(mut map) => match map.remove("description") {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => Value::Object(map).to_string(),
        },
        other => other.to_string(),
    })
}

/// Multiple-choice question as returned by the model, before validation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[schemars(title = "Multiple Choice Question")]
pub struct ChoiceDraft {
    /// The question text
    #[serde(deserialize_with = "question_text")]
    #[schemars(with = "String")]
    pub question: String,
    /// List of 4 possible answers
    pub options: Vec<String>,
    /// The correct answer from the options
    pub correct_answer: String,
}

/// Fill-in-the-blank question as returned by the model, before validation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[schemars(title = "Fill in the Blank Question")]
pub struct BlankDraft {
    /// The question text with '_____' for the blank
    #[serde(deserialize_with = "question_text")]
    #[schemars(with = "String")]
    pub question: String,
    /// The correct word or phrase for the blank
    pub answer: String,
}

/// True/false question as returned by the model, before validation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[schemars(title = "True/False Question")]
pub struct BooleanDraft {
    /// The statement for the True/False question
    #[serde(deserialize_with = "question_text")]
    #[schemars(with = "String")]
    pub question: String,
    /// The correct answer (True or False)
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceQuestion {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankQuestion {
    /// Always contains [`BLANK_MARKER`].
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanQuestion {
    pub statement: String,
    pub answer: bool,
}

impl BooleanQuestion {
    pub fn correct_answer(&self) -> &'static str {
        bool_literal(self.answer)
    }
}

fn bool_literal(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// A validated question of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    Choice(ChoiceQuestion),
    Blank(BlankQuestion),
    Boolean(BooleanQuestion),
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::Choice(_) => QuestionKind::Choice,
            Self::Blank(_) => QuestionKind::Blank,
            Self::Boolean(_) => QuestionKind::Boolean,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Choice(q) => &q.question,
            Self::Blank(q) => &q.question,
            Self::Boolean(q) => &q.statement,
        }
    }

    pub fn correct_answer(&self) -> &str {
        match self {
            Self::Choice(q) => &q.correct_answer,
            Self::Blank(q) => &q.answer,
            Self::Boolean(q) => q.correct_answer(),
        }
    }

    /// Selectable answers; empty for blank-fill questions, which take free text.
    pub fn choices(&self) -> Vec<&str> {
        match self {
            Self::Choice(q) => q.options.iter().map(String::as_str).collect(),
            Self::Blank(_) => Vec::new(),
            Self::Boolean(_) => vec![bool_literal(true), bool_literal(false)],
        }
    }
}

impl From<ChoiceQuestion> for Question {
    fn from(q: ChoiceQuestion) -> Self {
        Self::Choice(q)
    }
}

impl From<BlankQuestion> for Question {
    fn from(q: BlankQuestion) -> Self {
        Self::Blank(q)
    }
}

impl From<BooleanQuestion> for Question {
    fn from(q: BooleanQuestion) -> Self {
        Self::Boolean(q)
    }
}

/// A shape the model fills in, and the rules that turn it into a stored question.
pub trait QuestionDraft: serde::de::DeserializeOwned + JsonSchema + Send {
    type Output: Into<Question> + Send;

    const KIND: QuestionKind;

    fn validate(self) -> Result<Self::Output, ValidationError>;
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl QuestionDraft for ChoiceDraft {
    type Output = ChoiceQuestion;

    const KIND: QuestionKind = QuestionKind::Choice;

    fn validate(self) -> Result<ChoiceQuestion, ValidationError> {
        if is_blank(&self.question) {
            return Err(ValidationError::EmptyQuestion);
        }
        if is_blank(&self.correct_answer) {
            return Err(ValidationError::EmptyAnswer);
        }
        let options: [String; OPTION_COUNT] = self
            .options
            .try_into()
            .map_err(|options: Vec<String>| ValidationError::OptionCount(options.len()))?;
        let unique = options
            .iter()
            .enumerate()
            .all(|(i, option)| !options[..i].contains(option));
        if !unique {
            return Err(ValidationError::DuplicateOptions);
        }
        if !options.contains(&self.correct_answer) {
            return Err(ValidationError::AnswerNotInOptions(self.correct_answer));
        }
        Ok(ChoiceQuestion {
            question: self.question,
            options,
            correct_answer: self.correct_answer,
        })
    }
}

impl QuestionDraft for BlankDraft {
    type Output = BlankQuestion;

    const KIND: QuestionKind = QuestionKind::Blank;

    fn validate(self) -> Result<BlankQuestion, ValidationError> {
        if is_blank(&self.question) {
            return Err(ValidationError::EmptyQuestion);
        }
        if is_blank(&self.answer) {
            return Err(ValidationError::EmptyAnswer);
        }
        let mut question = self.question;
        if !question.contains(BLANK_MARKER) {
            question = question.replace(SHORT_BLANK_MARKER, BLANK_MARKER);
            if !question.contains(BLANK_MARKER) {
                return Err(ValidationError::MissingBlankMarker);
            }
        }
        Ok(BlankQuestion {
            question,
            answer: self.answer,
        })
    }
}

impl QuestionDraft for BooleanDraft {
    type Output = BooleanQuestion;

    const KIND: QuestionKind = QuestionKind::Boolean;

    fn validate(self) -> Result<BooleanQuestion, ValidationError> {
        if is_blank(&self.question) {
            return Err(ValidationError::EmptyQuestion);
        }
        let answer = match self.correct_answer.as_str() {
            "True" => true,
            "False" => false,
            _ => return Err(ValidationError::InvalidBooleanLiteral(self.correct_answer)),
        };
        Ok(BooleanQuestion {
            statement: self.question,
            answer,
        })
    }
}
