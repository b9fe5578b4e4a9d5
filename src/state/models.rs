//! Poll and form entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate a fresh random entity id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A single choice within a poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub text: String,
    pub count: u32,
}

impl PollOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            count: 0,
        }
    }
}

/// A poll with its options and running vote totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: String,
    pub question: String,
    pub options: Vec<PollOption>,
    pub total_votes: u32,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    pub fn option(&self, option_id: &str) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Share of all votes held by an option, as a percentage.
    /// Returns 0 when nothing has been voted yet or the option is unknown.
    pub fn percentage(&self, option_id: &str) -> f64 {
        if self.total_votes == 0 {
            return 0.0;
        }
        self.option(option_id)
            .map(|o| f64::from(o.count) * 100.0 / f64::from(self.total_votes))
            .unwrap_or(0.0)
    }

    /// Options holding the highest count (ties included).
    /// Empty until at least one vote has been cast.
    pub fn leading_options(&self) -> Vec<&PollOption> {
        let Some(max) = self.options.iter().map(|o| o.count).max() else {
            return Vec::new();
        };
        if max == 0 {
            return Vec::new();
        }
        self.options.iter().filter(|o| o.count == max).collect()
    }
}

/// Discriminant for the four question kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    ShortAnswer,
    LongAnswer,
    Number,
    Radio,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        Self::ShortAnswer,
        Self::LongAnswer,
        Self::Number,
        Self::Radio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortAnswer => "short-answer",
            Self::LongAnswer => "long-answer",
            Self::Number => "number",
            Self::Radio => "radio",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ShortAnswer => "Short answer",
            Self::LongAnswer => "Long answer",
            Self::Number => "Number",
            Self::Radio => "Multiple choice",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown question type: {0}")]
pub struct UnknownQuestionType(pub String);

impl FromStr for QuestionType {
    type Err = UnknownQuestionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownQuestionType(s.to_string()))
    }
}

/// A selectable choice on a radio question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioOption {
    pub id: String,
    pub text: String,
}

impl RadioOption {
    /// Fresh option with empty text
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            text: String::new(),
        }
    }
}

/// Kind-specific question data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    ShortAnswer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    LongAnswer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Radio {
        #[serde(default)]
        options: Vec<RadioOption>,
    },
}

impl QuestionKind {
    /// Build a kind of the given type. Radio starts with two blank options.
    pub fn with_placeholder(question_type: QuestionType, placeholder: Option<String>) -> Self {
        match question_type {
            QuestionType::ShortAnswer => Self::ShortAnswer { placeholder },
            QuestionType::LongAnswer => Self::LongAnswer { placeholder },
            QuestionType::Number => Self::Number { placeholder },
            QuestionType::Radio => Self::Radio {
                options: vec![RadioOption::blank(), RadioOption::blank()],
            },
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::ShortAnswer { .. } => QuestionType::ShortAnswer,
            Self::LongAnswer { .. } => QuestionType::LongAnswer,
            Self::Number { .. } => QuestionType::Number,
            Self::Radio { .. } => QuestionType::Radio,
        }
    }

    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Self::ShortAnswer { placeholder }
            | Self::LongAnswer { placeholder }
            | Self::Number { placeholder } => placeholder.as_deref(),
            Self::Radio { .. } => None,
        }
    }
}

/// A form question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub required: bool,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// Empty, optional short-answer question
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            text: String::new(),
            required: false,
            kind: QuestionKind::ShortAnswer { placeholder: None },
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Radio options, `None` for the other kinds
    pub fn options(&self) -> Option<&[RadioOption]> {
        match &self.kind {
            QuestionKind::Radio { options } => Some(options),
            _ => None,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<RadioOption>> {
        match &mut self.kind {
            QuestionKind::Radio { options } => Some(options),
            _ => None,
        }
    }
}

/// A committed form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

impl Form {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

/// Kind-specific answer data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Answer {
    ShortAnswer {
        value: String,
    },
    LongAnswer {
        value: String,
    },
    Number {
        value: f64,
    },
    Radio {
        #[serde(rename = "optionId")]
        option_id: String,
    },
}

impl Answer {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::ShortAnswer { .. } => QuestionType::ShortAnswer,
            Self::LongAnswer { .. } => QuestionType::LongAnswer,
            Self::Number { .. } => QuestionType::Number,
            Self::Radio { .. } => QuestionType::Radio,
        }
    }
}

/// One answer within a submitted response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub question_id: String,
    #[serde(flatten)]
    pub answer: Answer,
}

impl QuestionResponse {
    pub fn new(question_id: impl Into<String>, answer: Answer) -> Self {
        Self {
            question_id: question_id.into(),
            answer,
        }
    }
}

/// A submitted set of answers for one form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: String,
    pub form_id: String,
    pub responses: Vec<QuestionResponse>,
    pub submitted_at: DateTime<Utc>,
}
