//! Shim registry - ordered version predicates mapped to shim constructors.
//!
//! Key principle: the registry is assembled explicitly and then frozen.
//! `ShimRegistryBuilder` is the only way to add or drop entries; a built
//! `ShimRegistry` has no mutating API. Entry order is the tie-break when
//! several predicates match a version: the first registered entry wins.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::compat::error::ShimError;
use crate::compat::trait_def::CompatLayer;
use crate::compat::{ComponentShim, LegacyShim};
use crate::core::predicate::VersionPredicate;
use crate::core::version::HostVersion;
use crate::dispatch::errors::RegistryError;
use crate::host::HostRuntime;

/// Boxed shim constructor.
pub type ShimConstructor =
    Box<dyn Fn(Arc<dyn HostRuntime>) -> Result<Box<dyn CompatLayer>, ShimError> + Send + Sync>;

/// A registered shim.
pub struct ShimEntry {
    name: String,
    predicate: VersionPredicate,
    description: String,
    constructor: ShimConstructor,
}

impl ShimEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> &VersionPredicate {
        &self.predicate
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Build the shim against `host`.
    pub fn construct(&self, host: Arc<dyn HostRuntime>) -> Result<Box<dyn CompatLayer>, ShimError> {
        (self.constructor)(host)
    }
}

impl fmt::Debug for ShimEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShimEntry")
            .field("name", &self.name)
            .field("predicate", &self.predicate)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ShimEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.predicate)
    }
}

/// Builder for a `ShimRegistry`.
#[derive(Default)]
pub struct ShimRegistryBuilder {
    entries: Vec<ShimEntry>,
}

impl ShimRegistryBuilder {
    pub fn new() -> Self {
        ShimRegistryBuilder::default()
    }

    /// Append a shim. Order of registration is the match order.
    pub fn register<S, F>(
        mut self,
        name: impl Into<String>,
        predicate: VersionPredicate,
        description: impl Into<String>,
        constructor: F,
    ) -> Self
    where
        S: CompatLayer + 'static,
        F: Fn(Arc<dyn HostRuntime>) -> Result<S, ShimError> + Send + Sync + 'static,
    {
        self.entries.push(ShimEntry {
            name: name.into(),
            predicate,
            description: description.into(),
            constructor: Box::new(move |host| {
                constructor(host).map(|shim| Box::new(shim) as Box<dyn CompatLayer>)
            }),
        });
        self
    }

    /// Drop every entry called `name`.
    pub fn without(mut self, name: &str) -> Self {
        self.entries.retain(|entry| entry.name != name);
        self
    }

    /// Freeze the registry. Shim names must be unique.
    pub fn build(self) -> Result<ShimRegistry, RegistryError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(RegistryError::DuplicateShim {
                    name: entry.name.clone(),
                });
            }
        }
        Ok(ShimRegistry {
            entries: self.entries,
        })
    }
}

/// Frozen, ordered shim registry.
#[derive(Debug)]
pub struct ShimRegistry {
    entries: Vec<ShimEntry>,
}

impl ShimRegistry {
    pub fn builder() -> ShimRegistryBuilder {
        ShimRegistryBuilder::new()
    }

    /// Builder pre-loaded with the built-in shims, in match order.
    pub fn builtin_builder() -> ShimRegistryBuilder {
        ShimRegistryBuilder::new()
            .register(
                LegacyShim::NAME,
                LegacyShim::targets(),
                "integer model data, no text shadows",
                LegacyShim::new,
            )
            .register(
                ComponentShim::NAME,
                ComponentShim::targets(),
                "component model data, text shadows",
                ComponentShim::new,
            )
    }

    /// Registry with all built-in shims.
    pub fn builtin() -> Self {
        ShimRegistry {
            entries: Self::builtin_builder().entries,
        }
    }

    /// First entry whose predicate accepts `version`.
    pub fn find_match(&self, version: &HostVersion) -> Option<&ShimEntry> {
        self.entries.iter().find(|e| e.predicate.matches(version))
    }

    /// Every entry whose predicate accepts `version`, in registry order.
    pub fn matching<'a>(&'a self, version: &'a HostVersion) -> impl Iterator<Item = &'a ShimEntry> + 'a {
        self.entries.iter().filter(move |e| e.predicate.matches(version))
    }

    pub fn entries(&self) -> &[ShimEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&ShimEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// `name (predicate)` for every entry, for messages.
    pub fn describe(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> HostVersion {
        HostVersion::parse(s).unwrap()
    }

    fn p(s: &str) -> VersionPredicate {
        VersionPredicate::parse(s).unwrap()
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ShimRegistry::builtin();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.entries()[0].name(), "v1_21_1");
        assert_eq!(registry.entries()[1].name(), "v1_21_4");

        assert_eq!(registry.find_match(&v("1.21.1")).unwrap().name(), "v1_21_1");
        assert_eq!(registry.find_match(&v("1.21.3")).unwrap().name(), "v1_21_1");
        assert_eq!(registry.find_match(&v("1.21.4")).unwrap().name(), "v1_21_4");
        assert_eq!(registry.find_match(&v("1.21.11")).unwrap().name(), "v1_21_4");
        assert!(registry.find_match(&v("1.20.6")).is_none());
        assert!(registry.find_match(&v("1.22")).is_none());
    }

    #[test]
    fn test_first_registered_wins() {
        let registry = ShimRegistry::builder()
            .register("broad", p(">=1.21.0"), "", LegacyShim::new)
            .register("narrow", p("1.21.1"), "", LegacyShim::new)
            .build()
            .unwrap();

        assert_eq!(registry.find_match(&v("1.21.1")).unwrap().name(), "broad");
        let version = v("1.21.1");
        let all: Vec<_> = registry.matching(&version).map(|e| e.name()).collect();
        assert_eq!(all, vec!["broad", "narrow"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = ShimRegistry::builder()
            .register("a", p("1.21.1"), "", LegacyShim::new)
            .register("a", p("1.21.4"), "", ComponentShim::new)
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateShim { name: "a".into() });
    }

    #[test]
    fn test_without_drops_entries() {
        let registry = ShimRegistry::builtin_builder()
            .without("v1_21_1")
            .build()
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("v1_21_1"));
        assert!(registry.find_match(&v("1.21.1")).is_none());
    }

    #[test]
    fn test_describe() {
        let registry = ShimRegistry::builder()
            .register("v1_21_1", p("1.21.1"), "", LegacyShim::new)
            .build()
            .unwrap();
        assert_eq!(registry.describe(), vec!["v1_21_1 (1.21.1)".to_string()]);
        assert!(ShimRegistry::builder().build().unwrap().is_empty());
    }
}
