//! In-process host runtime.
//!
//! `MemoryHost` stands in for a real server: it reports a configurable
//! version, exposes a configurable feature set and keeps holder storage in
//! memory behind an `RwLock`. Its state can be saved to and loaded from a
//! JSON snapshot so CLI invocations can share one host.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::version::HostVersion;
use crate::host::tag::{Tag, TagPath};
use crate::host::{HolderId, HostError, HostFeature, HostRuntime};

/// Serializable form of a `MemoryHost`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// Reported version string
    pub version: String,

    /// Exposed features
    #[serde(default)]
    pub features: BTreeSet<HostFeature>,

    /// Root tag per holder
    #[serde(default)]
    pub holders: BTreeMap<HolderId, Tag>,
}

/// A host runtime that lives entirely in memory.
#[derive(Debug)]
pub struct MemoryHost {
    version: String,
    features: BTreeSet<HostFeature>,
    holders: RwLock<BTreeMap<HolderId, Tag>>,
}

impl MemoryHost {
    /// Create a host reporting `version` with the stock feature set for it.
    ///
    /// An unparseable version gets no features; the dispatcher will reject
    /// it anyway.
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        let features = HostVersion::parse(&version)
            .map(|v| HostFeature::defaults_for(&v))
            .unwrap_or_default();

        MemoryHost {
            version,
            features,
            holders: RwLock::new(BTreeMap::new()),
        }
    }

    /// Replace the feature set.
    pub fn with_features(mut self, features: impl IntoIterator<Item = HostFeature>) -> Self {
        self.features = features.into_iter().collect();
        self
    }

    /// Remove one feature from the set.
    pub fn without_feature(mut self, feature: HostFeature) -> Self {
        self.features.remove(&feature);
        self
    }

    /// Restore a host from a snapshot.
    pub fn from_snapshot(snapshot: HostSnapshot) -> Self {
        MemoryHost {
            version: snapshot.version,
            features: snapshot.features,
            holders: RwLock::new(snapshot.holders),
        }
    }

    /// Capture the current state.
    pub fn snapshot(&self) -> Result<HostSnapshot, HostError> {
        let holders = self.holders.read().map_err(|_| HostError::Poisoned)?;
        Ok(HostSnapshot {
            version: self.version.clone(),
            features: self.features.clone(),
            holders: holders.clone(),
        })
    }

    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read host state: {}", path.display()))?;

        let snapshot: HostSnapshot = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse host state: {}", path.display()))?;

        Ok(MemoryHost::from_snapshot(snapshot))
    }

    /// Write the current state to a snapshot file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create state directory: {}", parent.display())
                })?;
            }
        }

        let snapshot = self.snapshot()?;
        let contents = serde_json::to_string_pretty(&snapshot)
            .context("failed to serialize host state")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write host state: {}", path.display()))?;

        Ok(())
    }

    /// Features this host exposes.
    pub fn features(&self) -> &BTreeSet<HostFeature> {
        &self.features
    }

    /// Root tag of a holder, if it has any storage.
    pub fn holder(&self, holder: &HolderId) -> Result<Option<Tag>, HostError> {
        let holders = self.holders.read().map_err(|_| HostError::Poisoned)?;
        Ok(holders.get(holder).cloned())
    }

    /// All holders with storage.
    pub fn holder_ids(&self) -> Result<Vec<HolderId>, HostError> {
        let holders = self.holders.read().map_err(|_| HostError::Poisoned)?;
        Ok(holders.keys().cloned().collect())
    }
}

impl HostRuntime for MemoryHost {
    fn version_string(&self) -> String {
        self.version.clone()
    }

    fn supports(&self, feature: HostFeature) -> bool {
        self.features.contains(&feature)
    }

    fn read_tag(&self, holder: &HolderId, path: &TagPath) -> Result<Option<Tag>, HostError> {
        let holders = self.holders.read().map_err(|_| HostError::Poisoned)?;
        Ok(holders.get(holder).and_then(|root| root.get(path)).cloned())
    }

    fn write_tag(&self, holder: &HolderId, path: &TagPath, tag: Tag) -> Result<(), HostError> {
        tracing::debug!("host write {} {} = {}", holder, path, tag);

        let mut holders = self.holders.write().map_err(|_| HostError::Poisoned)?;
        let root = holders.entry(holder.clone()).or_insert_with(Tag::compound);
        root.put(path, tag).map_err(|source| HostError::Tag {
            holder: holder.clone(),
            source,
        })
    }

    fn remove_tag(&self, holder: &HolderId, path: &TagPath) -> Result<Option<Tag>, HostError> {
        tracing::debug!("host remove {} {}", holder, path);

        let mut holders = self.holders.write().map_err(|_| HostError::Poisoned)?;
        if path.is_root() {
            return Ok(holders.remove(holder));
        }

        let Some(root) = holders.get_mut(holder) else {
            return Ok(None);
        };
        let removed = root.remove(path);
        if root.as_compound().is_some_and(|map| map.is_empty()) {
            holders.remove(holder);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> TagPath {
        TagPath::new(segments.iter().copied())
    }

    #[test]
    fn test_version_and_default_features() {
        let host = MemoryHost::new("1.21.4-R0.1-SNAPSHOT");
        assert_eq!(host.version_string(), "1.21.4-R0.1-SNAPSHOT");
        assert!(host.supports(HostFeature::TextShadow));

        let unknown = MemoryHost::new("nightly");
        assert!(unknown.features().is_empty());
    }

    #[test]
    fn test_feature_overrides() {
        let host = MemoryHost::new("1.21.4").without_feature(HostFeature::TextShadow);
        assert!(!host.supports(HostFeature::TextShadow));
        assert!(host.supports(HostFeature::ComponentModelData));

        let host = MemoryHost::new("1.21.4").with_features([HostFeature::DataComponents]);
        assert_eq!(host.features().len(), 1);
    }

    #[test]
    fn test_write_read_remove() {
        let host = MemoryHost::new("1.21.1");
        let holder = HolderId::item("sword");

        host.write_tag(&holder, &path(&["a", "b"]), Tag::Int(3)).unwrap();
        assert_eq!(host.read_tag(&holder, &path(&["a", "b"])).unwrap(), Some(Tag::Int(3)));
        assert_eq!(host.read_tag(&holder, &path(&["a", "c"])).unwrap(), None);
        assert_eq!(host.read_tag(&HolderId::item("other"), &path(&["a"])).unwrap(), None);

        assert_eq!(host.remove_tag(&holder, &path(&["a", "b"])).unwrap(), Some(Tag::Int(3)));
        // Holder with nothing left is dropped.
        assert!(host.holder(&holder).unwrap().is_none());
        assert!(host.holder_ids().unwrap().is_empty());
    }

    #[test]
    fn test_write_through_scalar_is_error() {
        let host = MemoryHost::new("1.21.1");
        let holder = HolderId::entity("zombie");
        host.write_tag(&holder, &path(&["a"]), Tag::Int(1)).unwrap();

        let err = host.write_tag(&holder, &path(&["a", "b"]), Tag::Int(2)).unwrap_err();
        assert!(matches!(err, HostError::Tag { .. }));
    }

    #[test]
    fn test_snapshot_round_trip_on_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("state").join("host.json");

        let host = MemoryHost::new("1.21.4");
        host.write_tag(&HolderId::item("gem"), &path(&["x"]), Tag::String("y".into()))
            .unwrap();
        host.save(&file).unwrap();

        let loaded = MemoryHost::load(&file).unwrap();
        assert_eq!(loaded.version_string(), "1.21.4");
        assert_eq!(loaded.features(), host.features());
        assert_eq!(
            loaded.read_tag(&HolderId::item("gem"), &path(&["x"])).unwrap(),
            Some(Tag::String("y".into()))
        );
    }

    #[test]
    fn test_snapshot_keeps_non_finite_floats() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("host.json");
        let holder = HolderId::item("x");

        let host = MemoryHost::new("1.21.4");
        host.write_tag(&holder, &path(&["nan"]), Tag::Float(f32::NAN)).unwrap();
        host.write_tag(&holder, &path(&["up"]), Tag::Double(f64::INFINITY))
            .unwrap();
        host.write_tag(&holder, &path(&["down"]), Tag::Float(f32::NEG_INFINITY))
            .unwrap();
        host.save(&file).unwrap();

        let loaded = MemoryHost::load(&file).unwrap();
        assert!(matches!(
            loaded.read_tag(&holder, &path(&["nan"])).unwrap(),
            Some(Tag::Float(v)) if v.is_nan()
        ));
        assert_eq!(
            loaded.read_tag(&holder, &path(&["up"])).unwrap(),
            Some(Tag::Double(f64::INFINITY))
        );
        assert_eq!(
            loaded.read_tag(&holder, &path(&["down"])).unwrap(),
            Some(Tag::Float(f32::NEG_INFINITY))
        );
    }

    #[test]
    fn test_concurrent_writers() {
        let host = MemoryHost::new("1.21.4");
        std::thread::scope(|s| {
            for t in 0..4 {
                let host = &host;
                s.spawn(move || {
                    for i in 0..25 {
                        let holder = HolderId::entity(format!("e{}", t));
                        host.write_tag(&holder, &path(&[format!("k{}", i).as_str()]), Tag::Int(i))
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(host.holder_ids().unwrap().len(), 4);
    }
}
