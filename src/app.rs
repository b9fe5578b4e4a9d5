//! Command handling on top of the workspace

use crate::persistence::BlobStore;
use crate::state::{
    Answer, FieldValue, Fields, Form, Poll, QuestionEditor, QuestionResponse, QuestionType, Rule,
    RuleSet, UnknownQuestionType, Validator, Workspace,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::{self, Write};
use std::str::FromStr;
use thiserror::Error;

/// Create polls and forms, vote, respond and tally results
#[derive(Debug, Parser)]
#[command(name = "pollbox", version, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// List polls and their results
    Polls,
    /// Create, vote on or delete a poll
    #[command(subcommand)]
    Poll(PollCommand),
    /// List forms
    Forms,
    /// Create, show, answer or delete a form
    #[command(subcommand)]
    Form(FormCommand),
    /// Show or change the color scheme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum PollCommand {
    /// Create a poll with at least 2 options
    Create {
        question: String,
        #[arg(allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Vote by option number or option id
    Vote { poll_id: String, option: String },
    /// Delete a poll
    Delete { poll_id: String },
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum FormCommand {
    /// Create a form
    Create {
        title: String,
        /// <type>[!]:<text>[:<extra>] where type is short-answer, long-answer,
        /// number or radio, `!` makes the answer required and extra is a
        /// placeholder, or opt1|opt2|... for radio. Write `\:` for a colon
        /// inside the text.
        questions: Vec<QuestionSpec>,
    },
    /// Show questions and a response summary
    Show { form_id: String },
    /// Answer every question in order ("" to skip)
    Respond {
        form_id: String,
        #[arg(allow_hyphen_values = true)]
        answers: Vec<String>,
    },
    /// Delete a form and its responses
    Delete { form_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeMode {
    Toggle,
    Dark,
    Light,
}

#[derive(Debug, Error)]
pub enum QuestionSpecError {
    #[error("question {0:?} should look like <type>:<text>")]
    MissingText(String),
    #[error(transparent)]
    UnknownType(#[from] UnknownQuestionType),
}

/// A question as written on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSpec {
    pub question_type: QuestionType,
    pub required: bool,
    pub text: String,
    pub extra: Option<String>,
}

/// Split on the first two unescaped colons. `\:` stands for a literal colon.
fn split_spec(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&':') => {
                chars.next();
                current.push(':');
            }
            ':' if parts.len() < 2 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

impl FromStr for QuestionSpec {
    type Err = QuestionSpecError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = split_spec(raw).into_iter();
        let head = parts.next().unwrap_or_default();
        let text = parts
            .next()
            .ok_or_else(|| QuestionSpecError::MissingText(raw.to_string()))?;
        let extra = parts.next();

        let (type_name, required) = match head.strip_suffix('!') {
            Some(name) => (name, true),
            None => (head.as_str(), false),
        };
        Ok(Self {
            question_type: type_name.parse()?,
            required,
            text,
            extra,
        })
    }
}

/// Front end state: the workspace plus the authoring helpers used by commands
pub struct App<B: BlobStore> {
    pub workspace: Workspace<B>,
    editor: QuestionEditor,
    validator: Validator,
}

impl<B: BlobStore> App<B> {
    pub fn new(workspace: Workspace<B>) -> Self {
        Self {
            workspace,
            editor: QuestionEditor::new(),
            validator: Validator::new(),
        }
    }

    /// Run one command and return what should be printed
    pub fn run(&mut self, command: Command) -> Result<String> {
        match command {
            Command::Polls => self.list_polls(),
            Command::Poll(PollCommand::Create { question, options }) => {
                self.create_poll(&question, options)
            }
            Command::Poll(PollCommand::Vote { poll_id, option }) => self.vote(&poll_id, &option),
            Command::Poll(PollCommand::Delete { poll_id }) => {
                if !self.workspace.delete_poll(&poll_id) {
                    bail!("no poll with id {poll_id}");
                }
                Ok(format!("Deleted poll {poll_id}\n"))
            }
            Command::Forms => self.list_forms(),
            Command::Form(FormCommand::Create { title, questions }) => {
                self.create_form(&title, questions)
            }
            Command::Form(FormCommand::Show { form_id }) => self.show_form(&form_id),
            Command::Form(FormCommand::Respond { form_id, answers }) => {
                self.respond(&form_id, &answers)
            }
            Command::Form(FormCommand::Delete { form_id }) => {
                match self.workspace.delete_form(&form_id) {
                    Some(removed) => Ok(format!(
                        "Deleted form {form_id} and {removed} response(s)\n"
                    )),
                    None => bail!("no form with id {form_id}"),
                }
            }
            Command::Theme { mode } => Ok(self.theme(mode)),
        }
    }

    /// Collect validator messages for `names` in the given order
    fn collect_errors<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> String {
        names
            .into_iter()
            .filter_map(|name| {
                let message = self.validator.field_error(name);
                (!message.is_empty()).then(|| format!("{name}: {message}"))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn create_poll(&mut self, question: &str, options: Vec<String>) -> Result<String> {
        let options: Vec<String> = options
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let fields = Fields::from([
            ("question".to_string(), FieldValue::from(question)),
            ("options".to_string(), FieldValue::texts(options.iter().cloned())),
        ]);
        let rules = RuleSet::new()
            .field("question", vec![Rule::required_with("Please enter a question")])
            .field(
                "options",
                vec![Rule::custom(
                    |v| matches!(v, FieldValue::List(items) if items.len() >= 2),
                    "Please add at least 2 options",
                )],
            );
        if !self.validator.validate_fields(&fields, &rules) {
            bail!("{}", self.collect_errors(["question", "options"]));
        }

        let poll_id = self.workspace.create_poll(question.trim(), options);
        Ok(format!("Created poll {poll_id}\n"))
    }

    fn vote(&mut self, poll_id: &str, choice: &str) -> Result<String> {
        let poll = self
            .workspace
            .polls()
            .get(poll_id)
            .with_context(|| format!("no poll with id {poll_id}"))?;
        let option = match choice.parse::<usize>() {
            Ok(n) => n.checked_sub(1).and_then(|i| poll.options.get(i)),
            Err(_) => poll.option(choice),
        }
        .with_context(|| format!("poll {poll_id} has no option {choice}"))?;
        let (option_id, text) = (option.id.clone(), option.text.clone());

        self.workspace.vote(poll_id, &option_id);
        Ok(format!("Voted for {text:?}\n"))
    }

    fn list_polls(&self) -> Result<String> {
        let polls = self.workspace.polls().polls();
        if polls.is_empty() {
            return Ok("No polls yet\n".to_string());
        }
        let mut out = String::new();
        for poll in polls {
            render_poll(&mut out, poll)?;
        }
        Ok(out)
    }

    fn create_form(&mut self, title: &str, specs: Vec<QuestionSpec>) -> Result<String> {
        let fields = Fields::from([("title".to_string(), FieldValue::from(title))]);
        let rules =
            RuleSet::new().field("title", vec![Rule::required_with("Please enter a form title")]);
        if !self.validator.validate_fields(&fields, &rules) {
            bail!("{}", self.collect_errors(["title"]));
        }
        if specs.is_empty() {
            bail!("a form needs at least one question");
        }

        self.editor.initialize();
        for (index, spec) in specs.into_iter().enumerate() {
            if index > 0 {
                self.editor.add();
            }
            self.editor.set_type(index, spec.question_type)?;
            self.editor.set_text(index, spec.text.trim())?;
            self.editor.set_required(index, spec.required)?;

            match (spec.question_type, spec.extra) {
                (QuestionType::Radio, Some(extra)) => {
                    let texts: Vec<&str> = extra.split('|').collect();
                    for _ in 2..texts.len() {
                        self.editor.add_option(index)?;
                    }
                    for (option_index, text) in texts.iter().enumerate() {
                        self.editor.set_option_text(index, option_index, text.trim())?;
                    }
                }
                (_, extra) => self.editor.set_placeholder(index, extra)?,
            }
        }

        if let Err(e) = self.editor.validate() {
            bail!("question {}: {e}", e.index() + 1);
        }
        let questions = self.editor.take();
        let form_id = self.workspace.create_form(title.trim(), questions);
        Ok(format!("Created form {form_id}\n"))
    }

    fn list_forms(&self) -> Result<String> {
        let forms = self.workspace.forms();
        if forms.forms().is_empty() {
            return Ok("No forms yet\n".to_string());
        }
        let mut out = String::new();
        for form in forms.forms() {
            writeln!(
                out,
                "{}  {}  ({} questions, {} responses)",
                form.id,
                form.title,
                form.questions.len(),
                forms.response_count(&form.id)
            )?;
        }
        Ok(out)
    }

    fn show_form(&self, form_id: &str) -> Result<String> {
        let store = self.workspace.forms();
        let form = store
            .get(form_id)
            .with_context(|| format!("no form with id {form_id}"))?;

        let mut out = String::new();
        writeln!(out, "{}", form.title)?;
        writeln!(
            out,
            "Created {}  |  {} response(s)",
            form.created_at.format("%Y-%m-%d %H:%M"),
            store.response_count(form_id)
        )?;
        for (i, question) in form.questions.iter().enumerate() {
            let marker = if question.required { " *" } else { "" };
            writeln!(
                out,
                "{}. {}{} [{}]",
                i + 1,
                question.text,
                marker,
                question.question_type().label()
            )?;
            if let Some(tally) = store.radio_tally(form_id, &question.id) {
                for (n, entry) in tally.iter().enumerate() {
                    writeln!(out, "   {}) {}  {}", n + 1, entry.text, entry.count)?;
                }
            } else {
                let answered = store
                    .responses_for(form_id)
                    .filter(|r| r.responses.iter().any(|a| a.question_id == question.id))
                    .count();
                writeln!(out, "   {answered} answer(s)")?;
            }
        }
        Ok(out)
    }

    fn respond(&mut self, form_id: &str, answers: &[String]) -> Result<String> {
        let form = self
            .workspace
            .forms()
            .get(form_id)
            .with_context(|| format!("no form with id {form_id}"))?
            .clone();
        if answers.len() != form.questions.len() {
            bail!(
                "form has {} question(s) but {} answer(s) were given",
                form.questions.len(),
                answers.len()
            );
        }

        let names: Vec<String> = (1..=form.questions.len())
            .map(|n| format!("question {n}"))
            .collect();
        let fields: Fields = names
            .iter()
            .cloned()
            .zip(answers.iter().map(|a| FieldValue::from(a.as_str())))
            .collect();
        let rules = answer_rules(&form, &names);
        if !self.validator.validate_fields(&fields, &rules) {
            bail!("{}", self.collect_errors(names.iter().map(String::as_str)));
        }

        let responses = build_responses(&form, answers)?;
        let response_id = self.workspace.submit_response(form_id, responses);
        Ok(format!("Recorded response {response_id}\n"))
    }

    fn theme(&mut self, mode: Option<ThemeMode>) -> String {
        match mode {
            None => {}
            Some(ThemeMode::Toggle) => {
                self.workspace.toggle_theme();
            }
            Some(ThemeMode::Dark) => self.workspace.set_dark_mode(true),
            Some(ThemeMode::Light) => self.workspace.set_dark_mode(false),
        }
        format!("Theme: {}\n", self.workspace.theme().label())
    }
}

fn render_poll(out: &mut String, poll: &Poll) -> fmt::Result {
    writeln!(out, "{}  {}  ({} votes)", poll.id, poll.question, poll.total_votes)?;
    let leaders: Vec<&str> = poll
        .leading_options()
        .iter()
        .map(|o| o.id.as_str())
        .collect();
    for (i, option) in poll.options.iter().enumerate() {
        let lead = if leaders.contains(&option.id.as_str()) {
            " <"
        } else {
            ""
        };
        writeln!(
            out,
            "  {}. {}  {} ({:.1}%){}",
            i + 1,
            option.text,
            option.count,
            poll.percentage(&option.id),
            lead
        )?;
    }
    Ok(())
}

fn is_blank(value: &FieldValue) -> bool {
    value.as_text().is_some_and(|s| s.trim().is_empty())
}

/// Finite decimal number, surrounding whitespace allowed
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Rules for each positional answer, derived from the form's questions
fn answer_rules(form: &Form, names: &[String]) -> RuleSet {
    let mut rules = RuleSet::new();

    for (question, name) in form.questions.iter().zip(names) {
        let mut field_rules = Vec::new();
        if question.required {
            field_rules.push(Rule::required());
        }
        match question.options() {
            Some(options) => {
                let count = options.len();
                field_rules.push(Rule::custom(
                    move |v| {
                        is_blank(v)
                            || v.as_text()
                                .and_then(|s| s.trim().parse::<usize>().ok())
                                .is_some_and(|n| (1..=count).contains(&n))
                    },
                    format!("Choose an option between 1 and {count}"),
                ));
            }
            None if question.question_type() == QuestionType::Number => {
                field_rules.push(Rule::custom(
                    |v| is_blank(v) || v.as_text().and_then(parse_number).is_some(),
                    "Please enter a number",
                ));
            }
            None => {}
        }
        rules = rules.field(name.clone(), field_rules);
    }
    rules
}

/// Turn validated answers into responses, skipping blank ones
fn build_responses(form: &Form, answers: &[String]) -> Result<Vec<QuestionResponse>> {
    let mut responses = Vec::new();
    for (n, (question, raw)) in form.questions.iter().zip(answers).enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let answer = match question.question_type() {
            QuestionType::ShortAnswer => Answer::ShortAnswer {
                value: raw.to_string(),
            },
            QuestionType::LongAnswer => Answer::LongAnswer {
                value: raw.to_string(),
            },
            QuestionType::Number => Answer::Number {
                value: parse_number(raw)
                    .with_context(|| format!("question {}: {raw:?} is not a number", n + 1))?,
            },
            QuestionType::Radio => {
                let option = raw
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| i.checked_sub(1))
                    .and_then(|i| question.options()?.get(i))
                    .with_context(|| format!("question {}: no option {raw}", n + 1))?;
                Answer::Radio {
                    option_id: option.id.clone(),
                }
            }
        };
        responses.push(QuestionResponse::new(question.id.clone(), answer));
    }
    Ok(responses)
}
