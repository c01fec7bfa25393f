//! Namespaced keys for persistent data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when parsing an invalid namespaced key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("key `{0}` is missing a `namespace:` prefix")]
    MissingNamespace(String),

    #[error("namespace `{0}` is empty or contains characters outside [a-z0-9._-]")]
    InvalidNamespace(String),

    #[error("key path `{0}` is empty or contains characters outside [a-z0-9/._-]")]
    InvalidKey(String),
}

/// A `namespace:key` identifier, as hosts use for persistent data entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespacedKey {
    namespace: String,
    key: String,
}

fn valid_namespace(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}

fn valid_key(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '/' | '.' | '_' | '-')
        })
}

impl NamespacedKey {
    /// Create a key, validating both halves.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Result<Self, KeyParseError> {
        let namespace = namespace.into();
        let key = key.into();

        if !valid_namespace(&namespace) {
            return Err(KeyParseError::InvalidNamespace(namespace));
        }
        if !valid_key(&key) {
            return Err(KeyParseError::InvalidKey(key));
        }

        Ok(NamespacedKey { namespace, key })
    }

    /// Parse `namespace:key`.
    pub fn parse(input: &str) -> Result<Self, KeyParseError> {
        let (namespace, key) = input
            .split_once(':')
            .ok_or_else(|| KeyParseError::MissingNamespace(input.to_string()))?;
        NamespacedKey::new(namespace, key)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FromStr for NamespacedKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamespacedKey::parse(s)
    }
}

impl fmt::Display for NamespacedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

impl Serialize for NamespacedKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NamespacedKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        NamespacedKey::parse(&s).map_err(serde::de::Error::custom)
    }
}
