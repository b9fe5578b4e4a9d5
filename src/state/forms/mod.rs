//! Form authoring layer
//!
//! Question editing for forms in progress and the generic field validator
//! used by input surfaces before anything reaches a store.

mod editor;
mod field;
mod validation;

pub use editor::{EditorError, QuestionEditor, QuestionError};
pub use field::FieldValue;
pub use validation::{Fields, Rule, RuleSet, Validator};
