//! Host storage access shared by every shim.
//!
//! Persistent data and display names have the same raw layout on all
//! supported hosts, so the shims delegate to `DataContainer` for them.

use std::sync::Arc;

use crate::compat::error::CompatError;
use crate::core::data::DataValue;
use crate::core::key::NamespacedKey;
use crate::core::text::TextComponent;
use crate::host::tag::{Tag, TagPath};
use crate::host::{HolderId, HolderKind, HostRuntime};

/// Item component map.
pub const COMPONENTS: &str = "components";
/// Component carrying plugin data on items.
pub const CUSTOM_DATA: &str = "minecraft:custom_data";
/// Component carrying an item's display name.
pub const CUSTOM_NAME: &str = "minecraft:custom_name";
/// Component carrying an item's custom model data.
pub const CUSTOM_MODEL_DATA: &str = "minecraft:custom_model_data";

/// Path of a single item component.
pub fn component_path(component: &str) -> TagPath {
    TagPath::new([COMPONENTS, component])
}

/// Fail unless `holder` is an item.
pub fn require_item(holder: &HolderId, operation: &'static str) -> Result<(), CompatError> {
    match holder.kind {
        HolderKind::Item => Ok(()),
        HolderKind::Entity => Err(CompatError::WrongHolder {
            holder: holder.clone(),
            operation,
        }),
    }
}

/// Serialize a component as host JSON.
pub fn encode_text(text: &TextComponent) -> Result<String, CompatError> {
    serde_json::to_string(text).map_err(|e| CompatError::TextEncoding(e.to_string()))
}

/// Typed access to a host's persistent data and display names.
pub struct DataContainer {
    host: Arc<dyn HostRuntime>,
}

impl DataContainer {
    pub fn new(host: Arc<dyn HostRuntime>) -> Self {
        DataContainer { host }
    }

    pub fn host(&self) -> &dyn HostRuntime {
        self.host.as_ref()
    }

    /// Compound that holds a holder's plugin values.
    fn values_path(holder: &HolderId) -> TagPath {
        match holder.kind {
            HolderKind::Item => component_path(CUSTOM_DATA).child("PublicBukkitValues"),
            HolderKind::Entity => TagPath::new(["BukkitValues"]),
        }
    }

    pub fn read(
        &self,
        holder: &HolderId,
        key: &NamespacedKey,
    ) -> Result<Option<DataValue>, CompatError> {
        let path = Self::values_path(holder).child(key.to_string());
        match self.host.read_tag(holder, &path)? {
            None => Ok(None),
            Some(tag) => DataValue::from_tag(&tag)
                .map(Some)
                .map_err(|e| CompatError::CorruptData {
                    holder: holder.clone(),
                    what: format!("value `{}`", key),
                    reason: e.to_string(),
                }),
        }
    }

    pub fn write(
        &self,
        holder: &HolderId,
        key: &NamespacedKey,
        value: &DataValue,
    ) -> Result<(), CompatError> {
        let path = Self::values_path(holder).child(key.to_string());
        self.host.write_tag(holder, &path, value.to_tag())?;
        Ok(())
    }

    pub fn remove(&self, holder: &HolderId, key: &NamespacedKey) -> Result<bool, CompatError> {
        let path = Self::values_path(holder).child(key.to_string());
        Ok(self.host.remove_tag(holder, &path)?.is_some())
    }

    /// Keys on a holder, sorted. Entries whose names are not valid keys
    /// belong to someone else and are skipped.
    pub fn keys(&self, holder: &HolderId) -> Result<Vec<NamespacedKey>, CompatError> {
        let Some(tag) = self.host.read_tag(holder, &Self::values_path(holder))? else {
            return Ok(Vec::new());
        };
        let Some(map) = tag.as_compound() else {
            return Err(CompatError::CorruptData {
                holder: holder.clone(),
                what: "value container".to_string(),
                reason: format!("found {}, expected compound", tag.type_name()),
            });
        };

        let mut keys: Vec<NamespacedKey> = map
            .keys()
            .filter_map(|name| match NamespacedKey::parse(name) {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::warn!("skipping foreign entry `{}` on {}: {}", name, holder, e);
                    None
                }
            })
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Store an already-encoded display name.
    pub fn write_display_name(&self, item: &HolderId, json: String) -> Result<(), CompatError> {
        require_item(item, "set_display_name")?;
        self.host
            .write_tag(item, &component_path(CUSTOM_NAME), Tag::String(json))?;
        Ok(())
    }

    pub fn read_display_name(&self, item: &HolderId) -> Result<Option<TextComponent>, CompatError> {
        require_item(item, "display_name")?;
        let corrupt = |reason: String| CompatError::CorruptData {
            holder: item.clone(),
            what: "display name".to_string(),
            reason,
        };

        match self.host.read_tag(item, &component_path(CUSTOM_NAME))? {
            None => Ok(None),
            Some(Tag::String(json)) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| corrupt(e.to_string())),
            Some(other) => Err(corrupt(format!("found {}, expected string", other.type_name()))),
        }
    }
}
