//! User settings and runtime messages
//!
//! Settings are a small key-value record: a family per role, a ligature
//! toggle, and a global kill switch. Stores are pluggable behind
//! [`SettingsStore`] so hosts can back them with whatever storage they have.

use std::future::Future;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::utils::{RefontError, Result};

/// Families prefixed with this marker resolve against the hosted catalog
/// and need an import rule; everything else is assumed locally installed.
pub const REMOTE_PREFIX: &str = "GF-";

/// The two generic slots a selection can replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Sans,
    Monospace,
}

/// A configured family for one role, with the remote marker stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSelection {
    pub role: Role,
    pub family: String,
    pub is_remote: bool,
}

impl FontSelection {
    /// Parse a raw setting value. Empty or whitespace-only values mean the
    /// role is inactive and keep the page's own fonts.
    pub fn from_setting(role: Role, raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.strip_prefix(REMOTE_PREFIX) {
            Some(rest) => Self {
                role,
                family: rest.to_string(),
                is_remote: true,
            },
            None => Self {
                role,
                family: trimmed.to_string(),
                is_remote: false,
            },
        }
    }

    pub fn is_active(&self) -> bool {
        !self.family.is_empty()
    }
}

/// The persisted settings record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSettings {
    #[serde(rename = "font-default", default)]
    pub font_default: String,
    #[serde(rename = "font-mono", default)]
    pub font_mono: String,
    #[serde(default)]
    pub ligatures: bool,
    #[serde(default)]
    pub off: bool,
}

impl FontSettings {
    pub fn sans_selection(&self) -> FontSelection {
        FontSelection::from_setting(Role::Sans, &self.font_default)
    }

    pub fn monospace_selection(&self) -> FontSelection {
        FontSelection::from_setting(Role::Monospace, &self.font_mono)
    }
}

/// Read access to the settings record.
pub trait SettingsStore: Send + Sync {
    fn settings(&self) -> impl Future<Output = Result<FontSettings>> + Send;

    /// The kill switch, readable without loading the full record.
    fn is_off(&self) -> impl Future<Output = Result<bool>> + Send;
}

/// In-memory store for tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<FontSettings>,
    fail_reads: RwLock<bool>,
}

impl MemoryStore {
    pub fn new(settings: FontSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
            fail_reads: RwLock::new(false),
        }
    }

    pub fn set(&self, settings: FontSettings) {
        if let Ok(mut inner) = self.inner.write() {
            *inner = settings;
        }
    }

    /// Make subsequent reads fail, to exercise error paths.
    pub fn fail_reads(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_reads.write() {
            *flag = fail;
        }
    }

    fn read(&self) -> Result<FontSettings> {
        let failing = self
            .fail_reads
            .read()
            .map(|flag| *flag)
            .unwrap_or(true);
        if failing {
            return Err(RefontError::Settings("simulated read failure".into()));
        }
        self.inner
            .read()
            .map(|inner| inner.clone())
            .map_err(|_| RefontError::Settings("settings lock poisoned".into()))
    }
}

impl SettingsStore for MemoryStore {
    fn settings(&self) -> impl Future<Output = Result<FontSettings>> + Send {
        let result = self.read();
        async move { result }
    }

    fn is_off(&self) -> impl Future<Output = Result<bool>> + Send {
        let result = self.read().map(|settings| settings.off);
        async move { result }
    }
}

/// Runtime commands delivered to an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Message {
    #[serde(rename = "executePreview")]
    ExecutePreview,
    #[serde(rename = "executeCleanup")]
    ExecuteCleanup,
}

impl Message {
    /// Parse a raw JSON message; unknown actions return `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selection_strips_remote_prefix() {
        let selection = FontSelection::from_setting(Role::Sans, "GF-Roboto Mono");
        assert_eq!(selection.family, "Roboto Mono");
        assert!(selection.is_remote);
        assert!(selection.is_active());
    }

    #[test]
    fn test_selection_local_family() {
        let selection = FontSelection::from_setting(Role::Monospace, "  Menlo ");
        assert_eq!(selection.family, "Menlo");
        assert!(!selection.is_remote);
    }

    #[test]
    fn test_empty_selection_inactive() {
        let selection = FontSelection::from_setting(Role::Sans, "   ");
        assert!(!selection.is_active());
        assert!(!selection.is_remote);
    }

    #[test]
    fn test_settings_deserialize_with_renamed_keys() {
        let settings: FontSettings = serde_json::from_str(
            r#"{"font-default":"Inter","font-mono":"GF-Fira Code","ligatures":true}"#,
        )
        .unwrap();
        assert_eq!(settings.font_default, "Inter");
        assert!(settings.monospace_selection().is_remote);
        assert!(settings.ligatures);
        assert!(!settings.off);
    }

    #[test]
    fn test_message_parse() {
        assert_eq!(
            Message::parse(r#"{"action":"executePreview"}"#),
            Some(Message::ExecutePreview)
        );
        assert_eq!(
            Message::parse(r#"{"action":"executeCleanup"}"#),
            Some(Message::ExecuteCleanup)
        );
        assert_eq!(Message::parse(r#"{"action":"reload"}"#), None);
        assert_eq!(Message::parse("not json"), None);
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new(FontSettings {
            font_default: "GF-Inter".into(),
            ..FontSettings::default()
        });
        let settings = store.settings().await.unwrap();
        assert_eq!(settings.sans_selection().family, "Inter");
        assert!(!store.is_off().await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_failure_mode() {
        let store = MemoryStore::default();
        store.fail_reads(true);
        assert!(matches!(
            store.settings().await,
            Err(RefontError::Settings(_))
        ));
    }
}
