use std::collections::HashMap;

use displaydoc::Display;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// A reference into the configuration's [`StringStorage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct InternedString {
    pub key: String,
}

impl InternedString {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Interned strings, stored once and referenced by key.
///
/// Built together with the configuration and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StringStorage(HashMap<String, String>);

impl StringStorage {
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Resolve an interned string, failing with the missing key.
    pub fn load(&self, interned: &InternedString) -> Result<String, MissingInternedString> {
        self.lookup(&interned.key)
            .map(str::to_string)
            .ok_or_else(|| MissingInternedString {
                key: interned.key.clone(),
            })
    }
}

impl From<HashMap<String, String>> for StringStorage {
    fn from(strings: HashMap<String, String>) -> Self {
        Self(strings)
    }
}

impl FromIterator<(String, String)> for StringStorage {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// no string found for key "{key}"
#[derive(Debug, Clone, Display, Error, PartialEq, Eq)]
pub struct MissingInternedString {
    pub key: String,
}
