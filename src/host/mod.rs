//! The raw host runtime ABI.
//!
//! The host process owns all game state and exposes it through a small,
//! version-dependent surface: a version string, a set of feature flags and
//! raw tag storage per holder. Shims are the only code that talks to this
//! layer directly.

pub mod memory;
pub mod tag;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::core::version::HostVersion;

pub use memory::MemoryHost;
pub use tag::{Tag, TagError, TagPath};

/// Optional parts of the host API that come and go between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostFeature {
    /// Item data lives in typed data components.
    DataComponents,
    /// `custom_model_data` is a single integer.
    IntegerModelData,
    /// `custom_model_data` is a compound of floats/flags/strings/colors.
    ComponentModelData,
    /// Text components accept a `shadow_color`.
    TextShadow,
}

impl HostFeature {
    pub const ALL: [HostFeature; 4] = [
        HostFeature::DataComponents,
        HostFeature::IntegerModelData,
        HostFeature::ComponentModelData,
        HostFeature::TextShadow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HostFeature::DataComponents => "data_components",
            HostFeature::IntegerModelData => "integer_model_data",
            HostFeature::ComponentModelData => "component_model_data",
            HostFeature::TextShadow => "text_shadow",
        }
    }

    /// Features a stock host of `version` ships with.
    pub fn defaults_for(version: &HostVersion) -> BTreeSet<HostFeature> {
        let mut features = BTreeSet::new();
        if *version >= HostVersion::new(1, 20, 5) {
            features.insert(HostFeature::DataComponents);
        }
        if *version >= HostVersion::new(1, 21, 4) {
            features.insert(HostFeature::ComponentModelData);
            features.insert(HostFeature::TextShadow);
        } else {
            features.insert(HostFeature::IntegerModelData);
        }
        features
    }
}

impl fmt::Display for HostFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HostFeature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostFeature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = HostFeature::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown host feature '{}', valid values: {}", s, valid.join(", "))
            })
    }
}

/// Kind of object that can carry persistent data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HolderKind {
    Item,
    Entity,
}

impl HolderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolderKind::Item => "item",
            HolderKind::Entity => "entity",
        }
    }
}

/// Reference to a data holder inside the host, written `kind:id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HolderId {
    pub kind: HolderKind,
    pub id: String,
}

impl HolderId {
    pub fn item(id: impl Into<String>) -> Self {
        HolderId {
            kind: HolderKind::Item,
            id: id.into(),
        }
    }

    pub fn entity(id: impl Into<String>) -> Self {
        HolderId {
            kind: HolderKind::Entity,
            id: id.into(),
        }
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

impl FromStr for HolderId {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HostError::InvalidHolder(s.to_string());
        let (kind, id) = s.split_once(':').ok_or_else(invalid)?;
        if id.is_empty() {
            return Err(invalid());
        }
        match kind {
            "item" => Ok(HolderId::item(id)),
            "entity" => Ok(HolderId::entity(id)),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for HolderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HolderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors raised by the raw host API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("invalid holder reference `{0}`, expected `item:<id>` or `entity:<id>`")]
    InvalidHolder(String),

    #[error("tag error on {holder}: {source}")]
    Tag {
        holder: HolderId,
        #[source]
        source: TagError,
    },

    #[error("host storage lock poisoned")]
    Poisoned,
}

/// The raw, version-dependent API a host runtime exposes.
///
/// Implementations must be safe to call from several threads once the
/// plugin is running.
pub trait HostRuntime: Send + Sync {
    /// Version string exactly as the host reports it.
    fn version_string(&self) -> String;

    /// Whether the host exposes `feature`.
    fn supports(&self, feature: HostFeature) -> bool;

    /// Read the tag at `path` inside `holder`'s storage.
    fn read_tag(&self, holder: &HolderId, path: &TagPath) -> Result<Option<Tag>, HostError>;

    /// Write a tag, creating the holder and intermediate compounds.
    fn write_tag(&self, holder: &HolderId, path: &TagPath, tag: Tag) -> Result<(), HostError>;

    /// Remove a tag, returning the previous value.
    fn remove_tag(&self, holder: &HolderId, path: &TagPath) -> Result<Option<Tag>, HostError>;
}
