//! Form and response collection

use super::models::{new_id, Answer, Form, FormResponse, Question, QuestionResponse};
use crate::persistence::Snapshot;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Answer count for one radio option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTally {
    pub option_id: String,
    pub text: String,
    pub count: usize,
}

/// Owns every form and every submitted response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormStore {
    forms: Vec<Form>,
    responses: Vec<FormResponse>,
}

impl Snapshot for FormStore {
    const KEY: &'static str = "form";
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    pub fn get(&self, form_id: &str) -> Option<&Form> {
        self.forms.iter().find(|f| f.id == form_id)
    }

    /// Responses for a form, in submission order
    pub fn responses_for<'a>(&'a self, form_id: &'a str) -> impl Iterator<Item = &'a FormResponse> {
        self.responses.iter().filter(move |r| r.form_id == form_id)
    }

    pub fn response_count(&self, form_id: &str) -> usize {
        self.responses_for(form_id).count()
    }

    /// Store a form as given. Questions are expected to be validated already.
    pub fn create_form(&mut self, title: impl Into<String>, questions: Vec<Question>) -> String {
        let form = Form {
            id: new_id(),
            title: title.into(),
            questions,
            created_at: Utc::now(),
        };
        let id = form.id.clone();
        tracing::debug!(form_id = %id, questions = form.questions.len(), "created form");
        self.forms.push(form);
        id
    }

    /// Remove a form together with all of its responses.
    /// Returns the number of responses removed, or `None` if the form was not found.
    pub fn delete_form(&mut self, form_id: &str) -> Option<usize> {
        let index = self.forms.iter().position(|f| f.id == form_id)?;
        self.forms.remove(index);

        let before = self.responses.len();
        self.responses.retain(|r| r.form_id != form_id);
        let removed = before - self.responses.len();

        tracing::debug!(form_id, responses_removed = removed, "deleted form");
        Some(removed)
    }

    /// Record a response. The form id and answers are not checked against existing forms.
    pub fn submit_response(
        &mut self,
        form_id: impl Into<String>,
        responses: Vec<QuestionResponse>,
    ) -> String {
        let response = FormResponse {
            id: new_id(),
            form_id: form_id.into(),
            responses,
            submitted_at: Utc::now(),
        };
        let id = response.id.clone();
        tracing::debug!(response_id = %id, form_id = %response.form_id, "response submitted");
        self.responses.push(response);
        id
    }

    /// Per-option counts of radio answers to one question, in option order.
    /// `None` when the form or a radio question with that id does not exist.
    pub fn radio_tally(&self, form_id: &str, question_id: &str) -> Option<Vec<OptionTally>> {
        let options = self.get(form_id)?.question(question_id)?.options()?;

        let mut tally: Vec<OptionTally> = options
            .iter()
            .map(|o| OptionTally {
                option_id: o.id.clone(),
                text: o.text.clone(),
                count: 0,
            })
            .collect();

        let chosen = self
            .responses_for(form_id)
            .flat_map(|r| &r.responses)
            .filter(|r| r.question_id == question_id)
            .filter_map(|r| match &r.answer {
                Answer::Radio { option_id } => Some(option_id),
                _ => None,
            });
        for option_id in chosen {
            if let Some(entry) = tally.iter_mut().find(|t| &t.option_id == option_id) {
                entry.count += 1;
            }
        }

        Some(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::models::{QuestionKind, RadioOption};

    fn text_question(text: &str) -> Question {
        Question {
            text: text.to_string(),
            ..Question::blank()
        }
    }

    fn radio_question(text: &str, options: &[&str]) -> Question {
        Question {
            text: text.to_string(),
            kind: QuestionKind::Radio {
                options: options
                    .iter()
                    .map(|t| RadioOption {
                        text: t.to_string(),
                        ..RadioOption::blank()
                    })
                    .collect(),
            },
            ..Question::blank()
        }
    }

    fn short_answer(question_id: &str, value: &str) -> QuestionResponse {
        QuestionResponse::new(
            question_id,
            Answer::ShortAnswer {
                value: value.to_string(),
            },
        )
    }

    fn radio_answer(question_id: &str, option_id: &str) -> QuestionResponse {
        QuestionResponse::new(
            question_id,
            Answer::Radio {
                option_id: option_id.to_string(),
            },
        )
    }

    mod create {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_stores_questions_as_given() {
            let mut store = FormStore::new();
            let questions = vec![text_question("Name"), text_question("")];

            let id = store.create_form("Signup", questions.clone());

            let form = store.get(&id).unwrap();
            assert_eq!(form.title, "Signup");
            assert_eq!(form.questions, questions);
        }

        #[test]
        fn test_get_unknown() {
            assert!(FormStore::new().get("missing").is_none());
        }
    }

    mod responses {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_listed_in_submission_order() {
            let mut store = FormStore::new();
            let form = store.create_form("F", vec![text_question("Q")]);
            let q = store.get(&form).unwrap().questions[0].id.clone();

            let first = store.submit_response(&form, vec![short_answer(&q, "one")]);
            let second = store.submit_response(&form, vec![short_answer(&q, "two")]);

            let ids: Vec<&str> = store.responses_for(&form).map(|r| r.id.as_str()).collect();
            assert_eq!(ids, vec![first.as_str(), second.as_str()]);
            assert_eq!(store.response_count(&form), 2);
        }

        #[test]
        fn test_accepted_for_unknown_form() {
            let mut store = FormStore::new();
            let id = store.submit_response("no-such-form", vec![]);
            let stored: Vec<&FormResponse> = store.responses_for("no-such-form").collect();
            assert_eq!(stored.len(), 1);
            assert_eq!(stored[0].id, id);
        }
    }

    mod delete {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_cascades_to_own_responses_only() {
            let mut store = FormStore::new();
            let doomed = store.create_form("Doomed", vec![text_question("Q")]);
            let kept = store.create_form("Kept", vec![text_question("Q")]);
            store.submit_response(&doomed, vec![]);
            store.submit_response(&kept, vec![]);
            store.submit_response(&doomed, vec![]);

            assert_eq!(store.delete_form(&doomed), Some(2));

            assert!(store.get(&doomed).is_none());
            assert_eq!(store.response_count(&doomed), 0);
            assert!(store.get(&kept).is_some());
            assert_eq!(store.response_count(&kept), 1);
        }

        #[test]
        fn test_unknown_form_leaves_orphans() {
            let mut store = FormStore::new();
            store.submit_response("orphan", vec![]);

            assert_eq!(store.delete_form("orphan"), None);

            assert_eq!(store.response_count("orphan"), 1);
        }
    }

    mod tally {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_counts_radio_answers_in_option_order() {
            let mut store = FormStore::new();
            let form = store.create_form(
                "Colors",
                vec![text_question("Name"), radio_question("Pick", &["Red", "Blue"])],
            );
            let (name_q, pick_q, red, blue) = {
                let f = store.get(&form).unwrap();
                let opts = f.questions[1].options().unwrap();
                (
                    f.questions[0].id.clone(),
                    f.questions[1].id.clone(),
                    opts[0].id.clone(),
                    opts[1].id.clone(),
                )
            };
            store.submit_response(
                &form,
                vec![short_answer(&name_q, "a"), radio_answer(&pick_q, &blue)],
            );
            store.submit_response(&form, vec![radio_answer(&pick_q, &blue)]);
            store.submit_response(&form, vec![radio_answer(&pick_q, &red)]);
            store.submit_response(&form, vec![radio_answer(&pick_q, "stale-option")]);

            let tally = store.radio_tally(&form, &pick_q).unwrap();

            let counts: Vec<(&str, usize)> =
                tally.iter().map(|t| (t.text.as_str(), t.count)).collect();
            assert_eq!(counts, vec![("Red", 1), ("Blue", 2)]);
        }

        #[test]
        fn test_none_for_non_radio_or_unknown() {
            let mut store = FormStore::new();
            let form = store.create_form("F", vec![text_question("Name")]);
            let q = store.get(&form).unwrap().questions[0].id.clone();

            assert!(store.radio_tally(&form, &q).is_none());
            assert!(store.radio_tally(&form, "missing").is_none());
            assert!(store.radio_tally("missing", &q).is_none());
        }
    }
}
