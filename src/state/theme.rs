//! Dark mode preference

use crate::persistence::{BlobStore, StorageError};

/// Dark mode preference, stored as the literal strings "true" / "false"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeStore {
    dark_mode: bool,
}

impl ThemeStore {
    pub const KEY: &'static str = "darkMode";

    pub fn new(dark_mode: bool) -> Self {
        Self { dark_mode }
    }

    /// Restore the saved preference. Falls back to the system preference
    /// when nothing was saved; any saved value other than "true" means light.
    pub fn load(store: &dyn BlobStore, system_prefers_dark: bool) -> Result<Self, StorageError> {
        let dark_mode = match store.get(Self::KEY)? {
            Some(value) => value == "true",
            None => system_prefers_dark,
        };
        Ok(Self { dark_mode })
    }

    pub fn save(&self, store: &mut dyn BlobStore) -> Result<(), StorageError> {
        store.set(Self::KEY, if self.dark_mode { "true" } else { "false" })
    }

    pub fn is_dark(&self) -> bool {
        self.dark_mode
    }

    pub fn toggle(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    pub fn set(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
    }

    pub fn label(&self) -> &'static str {
        if self.dark_mode {
            "dark"
        } else {
            "light"
        }
    }
}
