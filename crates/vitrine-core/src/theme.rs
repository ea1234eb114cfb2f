//! # Theme store
//!
//! One light/dark flag per page, owned by a [`ThemeStore`] that is built once
//! at start-up and handed to every consumer (directly or through
//! [`crate::provide_theme_store`]).
//!
//! ```rust
//! use vitrine_core::*;
//!
//! let store = ThemeStore::new(MemoryStorage::default());
//! assert_eq!(store.get(), Theme::Light);
//!
//! let sub = store.subscribe(|t| println!("theme is now {t}"));
//! store.toggle();
//! assert_eq!(store.get(), Theme::Dark);
//! sub.unsubscribe();
//! ```
//!
//! Persistence is best effort: a failing backend is logged and ignored, the
//! in-memory value stays authoritative for the session.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, ThemeParseError};
use crate::{Signal, Subscription};

pub const DEFAULT_THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}

/// Durable client-side key-value storage (a browser's local storage, a
/// settings file, ...).
pub trait ThemeStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn store(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Clones share the same map, so a test can keep a handle
/// to inspect what the store wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn with_entry(key: &str, value: &str) -> Self {
        let s = Self::default();
        s.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        s
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl ThemeStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, one string value per key.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ThemeStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut all = self.read_all().unwrap_or_default();
        all.insert(key.to_string(), value.to_string());
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&all)?)?;
        Ok(())
    }
}

/// Process-wide light/dark flag with persistence and change notification.
#[derive(Clone)]
pub struct ThemeStore {
    inner: Rc<StoreInner>,
}

struct StoreInner {
    current: Signal<Theme>,
    storage: Box<dyn ThemeStorage>,
    key: String,
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("theme", &self.get())
            .field("key", &self.inner.key)
            .finish()
    }
}

impl ThemeStore {
    pub fn new(storage: impl ThemeStorage + 'static) -> Self {
        Self::with_key(storage, DEFAULT_THEME_KEY)
    }

    /// Reads the prior preference under `key`; absent, unreadable, or
    /// unrecognised values all resolve to [`Theme::Light`].
    pub fn with_key(storage: impl ThemeStorage + 'static, key: impl Into<String>) -> Self {
        let key = key.into();
        let initial = match storage.load(&key) {
            Ok(Some(raw)) => raw.parse::<Theme>().unwrap_or_else(|e| {
                log::debug!("ignoring persisted theme: {e}");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                log::warn!("theme storage unreadable, defaulting to light: {e}");
                Theme::default()
            }
        };
        log::debug!("theme store initialised: {initial}");
        Self {
            inner: Rc::new(StoreInner {
                current: Signal::new(initial),
                storage: Box::new(storage),
                key,
            }),
        }
    }

    pub fn get(&self) -> Theme {
        self.inner.current.get()
    }

    /// Flips the theme, persists it (best effort), then notifies subscribers.
    pub fn toggle(&self) -> Theme {
        let next = self.get().toggled();
        if let Err(e) = self.inner.storage.store(&self.inner.key, next.as_str()) {
            log::warn!("failed to persist theme {next}: {e}");
        }
        self.inner.current.set(next);
        next
    }

    /// `f` runs with the new value after every toggle. Call
    /// [`Subscription::unsubscribe`] when the consumer unmounts.
    pub fn subscribe(&self, f: impl Fn(Theme) + 'static) -> Subscription {
        self.inner.current.subscribe(move |t| f(*t))
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.current.subscriber_count()
    }
}
