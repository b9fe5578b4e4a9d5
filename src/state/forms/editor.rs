//! Question editing while a form is being authored

use crate::state::models::{Question, QuestionKind, QuestionType, RadioOption};
use thiserror::Error;

/// Index errors from editor operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("question index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("option index {option_index} out of range for question {index} (len {len})")]
    OptionIndexOutOfRange {
        index: usize,
        option_index: usize,
        len: usize,
    },
}

/// First problem found when checking authored questions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("All questions must have text")]
    MissingText { index: usize },
    #[error("Radio questions must have at least 2 options")]
    TooFewOptions { index: usize },
}

impl QuestionError {
    /// Position of the offending question
    pub fn index(&self) -> usize {
        match self {
            Self::MissingText { index } | Self::TooFewOptions { index } => *index,
        }
    }
}

/// Minimum number of filled-in options on a radio question
const MIN_RADIO_OPTIONS: usize = 2;

/// Ordered, mutable question list for a form in progress.
///
/// Always holds at least one question once initialized.
#[derive(Debug, Clone)]
pub struct QuestionEditor {
    questions: Vec<Question>,
}

impl QuestionEditor {
    pub fn new() -> Self {
        let mut editor = Self {
            questions: Vec::new(),
        };
        editor.initialize();
        editor
    }

    /// Reset to a single blank short-answer question
    pub fn initialize(&mut self) {
        self.questions = vec![Question::blank()];
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Hand over the authored questions and start again from a blank question
    pub fn take(&mut self) -> Vec<Question> {
        let questions = std::mem::take(&mut self.questions);
        self.initialize();
        questions
    }

    pub fn add(&mut self) {
        self.questions.push(Question::blank());
    }

    /// Remove a question. Ignored while only one question remains.
    pub fn remove(&mut self, index: usize) -> Result<(), EditorError> {
        if self.questions.len() <= 1 {
            return Ok(());
        }
        self.check_index(index)?;
        self.questions.remove(index);
        Ok(())
    }

    /// Switch a question to another kind, keeping id, text and required.
    ///
    /// Radio always starts over with two blank options. A placeholder carries
    /// over between the text kinds but never out of radio.
    pub fn set_type(&mut self, index: usize, new_type: QuestionType) -> Result<(), EditorError> {
        let question = self.question_mut(index)?;
        let placeholder = question.kind.placeholder().map(str::to_string);
        question.kind = QuestionKind::with_placeholder(new_type, placeholder);
        Ok(())
    }

    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<(), EditorError> {
        self.question_mut(index)?.text = text.into();
        Ok(())
    }

    pub fn set_required(&mut self, index: usize, required: bool) -> Result<(), EditorError> {
        self.question_mut(index)?.required = required;
        Ok(())
    }

    /// Set the placeholder on a text or number question; radio questions are left as is
    pub fn set_placeholder(
        &mut self,
        index: usize,
        value: Option<String>,
    ) -> Result<(), EditorError> {
        match &mut self.question_mut(index)?.kind {
            QuestionKind::ShortAnswer { placeholder }
            | QuestionKind::LongAnswer { placeholder }
            | QuestionKind::Number { placeholder } => *placeholder = value,
            QuestionKind::Radio { .. } => {}
        }
        Ok(())
    }

    /// Append a blank option to a radio question. No-op for other kinds.
    pub fn add_option(&mut self, index: usize) -> Result<(), EditorError> {
        if let Some(options) = self.question_mut(index)?.options_mut() {
            options.push(RadioOption::blank());
        }
        Ok(())
    }

    /// Remove an option from a radio question.
    ///
    /// Blocked only when a single option is left, so a list can shrink from
    /// two options to one here. `validate` catches that case.
    pub fn remove_option(&mut self, index: usize, option_index: usize) -> Result<(), EditorError> {
        let Some(options) = self.question_mut(index)?.options_mut() else {
            return Ok(());
        };
        if options.len() <= 1 {
            return Ok(());
        }
        if option_index >= options.len() {
            return Err(EditorError::OptionIndexOutOfRange {
                index,
                option_index,
                len: options.len(),
            });
        }
        options.remove(option_index);
        Ok(())
    }

    /// Set the text of a radio option. No-op for other kinds.
    pub fn set_option_text(
        &mut self,
        index: usize,
        option_index: usize,
        text: impl Into<String>,
    ) -> Result<(), EditorError> {
        let Some(options) = self.question_mut(index)?.options_mut() else {
            return Ok(());
        };
        let len = options.len();
        let option = options
            .get_mut(option_index)
            .ok_or(EditorError::OptionIndexOutOfRange {
                index,
                option_index,
                len,
            })?;
        option.text = text.into();
        Ok(())
    }

    /// Check the questions in order and report the first problem
    pub fn validate(&self) -> Result<(), QuestionError> {
        for (index, question) in self.questions.iter().enumerate() {
            if question.text.trim().is_empty() {
                return Err(QuestionError::MissingText { index });
            }

            if let Some(options) = question.options() {
                let filled = options.iter().filter(|o| !o.text.trim().is_empty()).count();
                if filled < MIN_RADIO_OPTIONS {
                    return Err(QuestionError::TooFewOptions { index });
                }
            }
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), EditorError> {
        if index >= self.questions.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        Ok(())
    }

    fn question_mut(&mut self, index: usize) -> Result<&mut Question, EditorError> {
        self.check_index(index)?;
        Ok(&mut self.questions[index])
    }
}

impl Default for QuestionEditor {
    fn default() -> Self {
        Self::new()
    }
}
