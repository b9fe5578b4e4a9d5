//! Rule-based field validation

use super::field::FieldValue;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Field values keyed by field name
pub type Fields = BTreeMap<String, FieldValue>;

const REQUIRED_MESSAGE: &str = "This field is required";
const PATTERN_MESSAGE: &str = "Invalid format";

type Predicate = Box<dyn Fn(&FieldValue) -> bool + Send + Sync>;

/// A predicate over a field value paired with the message shown when it fails
pub struct Rule {
    check: Predicate,
    message: String,
}

impl Rule {
    pub fn new<F>(check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Box::new(check),
            message: message.into(),
        }
    }

    /// Non-blank text, non-empty list, or any present value
    pub fn required() -> Self {
        Self::required_with(REQUIRED_MESSAGE)
    }

    pub fn required_with(message: impl Into<String>) -> Self {
        Self::new(
            |value| match value {
                FieldValue::Text(s) => !s.trim().is_empty(),
                FieldValue::List(items) => !items.is_empty(),
                FieldValue::Empty => false,
                FieldValue::Number(_) | FieldValue::Bool(_) => true,
            },
            message,
        )
    }

    /// Text whose trimmed length is at least `min` characters
    pub fn min_length(min: usize) -> Self {
        Self::min_length_with(min, format!("Must be at least {min} characters"))
    }

    pub fn min_length_with(min: usize, message: impl Into<String>) -> Self {
        Self::new(
            move |value| {
                value
                    .as_text()
                    .is_some_and(|s| s.trim().chars().count() >= min)
            },
            message,
        )
    }

    /// Value whose string form matches `regex`
    pub fn pattern(regex: Regex) -> Self {
        Self::pattern_with(regex, PATTERN_MESSAGE)
    }

    pub fn pattern_with(regex: Regex, message: impl Into<String>) -> Self {
        Self::new(move |value| regex.is_match(&value.to_string()), message)
    }

    pub fn custom<F>(check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        Self::new(check, message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn passes(&self, value: &FieldValue) -> bool {
        (self.check)(value)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Ordered rules for a set of fields
#[derive(Debug, Default)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for a field (builder style)
    pub fn field(mut self, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.fields.push((name.into(), rules));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields.iter().map(|(n, r)| (n.as_str(), r.as_slice()))
    }
}

/// Tracks the current error message for each field
#[derive(Debug, Clone, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `rules` against `value` in order, recording the first failure.
    /// Any previous error for the field is cleared first.
    pub fn validate_field(&mut self, name: &str, value: &FieldValue, rules: &[Rule]) -> bool {
        self.errors.remove(name);

        if let Some(failed) = rules.iter().find(|rule| !rule.passes(value)) {
            tracing::debug!(field = name, message = failed.message(), "field failed validation");
            self.errors
                .insert(name.to_string(), failed.message().to_string());
            return false;
        }

        true
    }

    /// Reset all errors, then validate every field named in `rules`.
    /// Fields missing from `fields` are checked as empty.
    pub fn validate_fields(&mut self, fields: &Fields, rules: &RuleSet) -> bool {
        self.errors.clear();

        let mut is_valid = true;
        for (name, field_rules) in rules.iter() {
            let value = fields.get(name).unwrap_or(&FieldValue::Empty);
            if !self.validate_field(name, value, field_rules) {
                is_valid = false;
            }
        }
        is_valid
    }

    /// Current error for a field, or "" when it has none
    pub fn field_error(&self, name: &str) -> &str {
        self.errors.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}
