use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;
use crate::store::storage::Storage;

/// Storage key for the theme preference (`dark` / `light`).
pub const THEME_STORAGE_KEY: &str = "theme";

/// Dark/light preference, persisted on every change.
pub struct ThemeStore {
    storage: Arc<dyn Storage>,
    is_dark: AtomicBool,
}

impl ThemeStore {
    /// Restore the stored preference, falling back to `prefers_dark` when
    /// nothing (or something unrecognised) is stored.
    pub fn load(storage: Arc<dyn Storage>, prefers_dark: bool) -> Self {
        let is_dark = match storage.get(THEME_STORAGE_KEY).as_deref() {
            Some("dark") => true,
            Some("light") => false,
            _ => prefers_dark,
        };
        Self {
            storage,
            is_dark: AtomicBool::new(is_dark),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.is_dark.load(Ordering::SeqCst)
    }

    pub fn set_theme(&self, is_dark: bool) -> Result<()> {
        self.is_dark.store(is_dark, Ordering::SeqCst);
        self.storage
            .set(THEME_STORAGE_KEY, if is_dark { "dark" } else { "light" })
    }

    /// Flip the preference and return the new value.
    pub fn toggle(&self) -> Result<bool> {
        let is_dark = !self.is_dark();
        self.set_theme(is_dark)?;
        Ok(is_dark)
    }
}
