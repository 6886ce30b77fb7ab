use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Preference key holding the prompt trailer
pub const APPEND_LINE_KEY: &str = "composer.appendLine";

/// Small string key/value store persisted with the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    values: BTreeMap<String, String>,
}

impl Preferences {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// The trailer, if one is set and not blank
    pub fn append_line(&self) -> Option<&str> {
        self.get(APPEND_LINE_KEY).filter(|line| !line.trim().is_empty())
    }

    /// A blank trailer clears the key
    pub fn set_append_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.remove(APPEND_LINE_KEY);
        } else {
            self.set(APPEND_LINE_KEY, line);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
