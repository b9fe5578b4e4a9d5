//! Stores bundled with their persistence and change notification

use super::form_store::FormStore;
use super::models::{Question, QuestionResponse};
use super::poll_store::PollStore;
use super::theme::ThemeStore;
use crate::persistence::{BlobStore, Snapshot, StorageError};
use std::fmt;

/// Change applied to one of the stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    PollCreated { poll_id: String },
    VoteCast { poll_id: String, option_id: String },
    PollDeleted { poll_id: String },
    FormCreated { form_id: String },
    FormDeleted { form_id: String, responses_removed: usize },
    ResponseSubmitted { form_id: String, response_id: String },
    ThemeChanged { dark_mode: bool },
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Owns the poll, form and theme stores plus the blob store they persist to.
///
/// Every mutation that changes state saves the affected store and then
/// notifies subscribers. A failed save is logged; the in-memory change stands.
pub struct Workspace<B: BlobStore> {
    polls: PollStore,
    forms: FormStore,
    theme: ThemeStore,
    blobs: B,
    listeners: Vec<Listener>,
}

impl<B: BlobStore> fmt::Debug for Workspace<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("polls", &self.polls.polls().len())
            .field("forms", &self.forms.forms().len())
            .field("theme", &self.theme)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

fn persist<S: Snapshot>(blobs: &mut dyn BlobStore, state: &S) {
    if let Err(e) = state.save(blobs) {
        tracing::warn!(key = S::KEY, error = %e, "failed to save snapshot");
    }
}

impl<B: BlobStore> Workspace<B> {
    /// Restore every store from `blobs`. Missing keys start empty.
    pub fn open(blobs: B, system_prefers_dark: bool) -> Result<Self, StorageError> {
        let polls = PollStore::load(&blobs)?;
        let forms = FormStore::load(&blobs)?;
        let theme = ThemeStore::load(&blobs, system_prefers_dark)?;
        tracing::info!(
            polls = polls.polls().len(),
            forms = forms.forms().len(),
            dark_mode = theme.is_dark(),
            "restored workspace"
        );

        Ok(Self {
            polls,
            forms,
            theme,
            blobs,
            listeners: Vec::new(),
        })
    }

    pub fn polls(&self) -> &PollStore {
        &self.polls
    }

    pub fn forms(&self) -> &FormStore {
        &self.forms
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn blob_store(&self) -> &B {
        &self.blobs
    }

    /// Register a callback invoked after every change
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, event: StoreEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn save_polls(&mut self) {
        persist(&mut self.blobs, &self.polls);
    }

    fn save_forms(&mut self) {
        persist(&mut self.blobs, &self.forms);
    }

    fn save_theme(&mut self) {
        if let Err(e) = self.theme.save(&mut self.blobs) {
            tracing::warn!(key = ThemeStore::KEY, error = %e, "failed to save theme preference");
        }
    }

    pub fn create_poll<I, S>(&mut self, question: impl Into<String>, option_texts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let poll_id = self.polls.create_poll(question, option_texts);
        self.save_polls();
        self.notify(StoreEvent::PollCreated {
            poll_id: poll_id.clone(),
        });
        poll_id
    }

    pub fn vote(&mut self, poll_id: &str, option_id: &str) -> bool {
        if !self.polls.vote(poll_id, option_id) {
            return false;
        }
        self.save_polls();
        self.notify(StoreEvent::VoteCast {
            poll_id: poll_id.to_string(),
            option_id: option_id.to_string(),
        });
        true
    }

    pub fn delete_poll(&mut self, poll_id: &str) -> bool {
        if !self.polls.delete_poll(poll_id) {
            return false;
        }
        self.save_polls();
        self.notify(StoreEvent::PollDeleted {
            poll_id: poll_id.to_string(),
        });
        true
    }

    pub fn create_form(&mut self, title: impl Into<String>, questions: Vec<Question>) -> String {
        let form_id = self.forms.create_form(title, questions);
        self.save_forms();
        self.notify(StoreEvent::FormCreated {
            form_id: form_id.clone(),
        });
        form_id
    }

    pub fn delete_form(&mut self, form_id: &str) -> Option<usize> {
        let removed = self.forms.delete_form(form_id)?;
        self.save_forms();
        self.notify(StoreEvent::FormDeleted {
            form_id: form_id.to_string(),
            responses_removed: removed,
        });
        Some(removed)
    }

    pub fn submit_response(&mut self, form_id: &str, responses: Vec<QuestionResponse>) -> String {
        let response_id = self.forms.submit_response(form_id, responses);
        self.save_forms();
        self.notify(StoreEvent::ResponseSubmitted {
            form_id: form_id.to_string(),
            response_id: response_id.clone(),
        });
        response_id
    }

    /// Flip dark mode and return the new setting
    pub fn toggle_theme(&mut self) -> bool {
        self.theme.toggle();
        self.theme_changed();
        self.theme.is_dark()
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        if self.theme.is_dark() == dark_mode {
            return;
        }
        self.theme.set(dark_mode);
        self.theme_changed();
    }

    fn theme_changed(&mut self) {
        self.save_theme();
        self.notify(StoreEvent::ThemeChanged {
            dark_mode: self.theme.is_dark(),
        });
    }

    /// Save every store, reporting the first failure
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.polls.save(&mut self.blobs)?;
        self.forms.save(&mut self.blobs)?;
        self.theme.save(&mut self.blobs)?;
        Ok(())
    }
}
