//! Shim for 1.21.0 - 1.21.3 hosts.
//!
//! These hosts store custom model data as a single integer and know nothing
//! about text shadows.

use std::sync::Arc;

use crate::compat::capabilities::{
    require_features, ModelDataFormat, ShimCapabilities, ShimIdentity,
};
use crate::compat::container::{
    component_path, encode_text, require_item, DataContainer, CUSTOM_MODEL_DATA,
};
use crate::compat::error::{CompatError, ShimError};
use crate::compat::trait_def::{check_model_index, CompatLayer};
use crate::core::data::DataValue;
use crate::core::key::NamespacedKey;
use crate::core::predicate::VersionPredicate;
use crate::core::text::TextComponent;
use crate::core::version::HostVersion;
use crate::host::tag::Tag;
use crate::host::{HolderId, HostFeature, HostRuntime};

const REQUIRED: &[HostFeature] = &[HostFeature::DataComponents, HostFeature::IntegerModelData];

/// Legacy shim: integer model data, no text shadows.
pub struct LegacyShim {
    identity: ShimIdentity,
    capabilities: ShimCapabilities,
    container: DataContainer,
}

impl LegacyShim {
    pub const NAME: &'static str = "v1_21_1";

    /// Host range this shim is registered for.
    pub fn targets() -> VersionPredicate {
        VersionPredicate::between(&HostVersion::new(1, 21, 0), &HostVersion::new(1, 21, 4))
    }

    /// Build the shim, failing fast if the host lacks what it needs.
    pub fn new(host: Arc<dyn HostRuntime>) -> Result<Self, ShimError> {
        require_features(host.as_ref(), REQUIRED)?;

        Ok(LegacyShim {
            identity: ShimIdentity {
                name: Self::NAME,
                shim_version: semver::Version::new(1, 0, 0),
                targets: Self::targets(),
            },
            capabilities: ShimCapabilities {
                text_shadow: false,
                model_data: ModelDataFormat::Integer,
                required_features: REQUIRED.to_vec(),
            },
            container: DataContainer::new(host),
        })
    }
}

impl CompatLayer for LegacyShim {
    fn identity(&self) -> &ShimIdentity {
        &self.identity
    }

    fn capabilities(&self) -> &ShimCapabilities {
        &self.capabilities
    }

    fn read_data(
        &self,
        holder: &HolderId,
        key: &NamespacedKey,
    ) -> Result<Option<DataValue>, CompatError> {
        self.container.read(holder, key)
    }

    fn write_data(
        &self,
        holder: &HolderId,
        key: &NamespacedKey,
        value: &DataValue,
    ) -> Result<(), CompatError> {
        self.container.write(holder, key, value)
    }

    fn remove_data(&self, holder: &HolderId, key: &NamespacedKey) -> Result<bool, CompatError> {
        self.container.remove(holder, key)
    }

    fn data_keys(&self, holder: &HolderId) -> Result<Vec<NamespacedKey>, CompatError> {
        self.container.keys(holder)
    }

    fn model_index(&self, item: &HolderId) -> Result<Option<i32>, CompatError> {
        require_item(item, "model_index")?;
        let raw = self
            .container
            .host()
            .read_tag(item, &component_path(CUSTOM_MODEL_DATA))?;

        match raw {
            None => Ok(None),
            Some(Tag::Int(index)) => Ok(Some(index)),
            Some(other) => Err(CompatError::CorruptData {
                holder: item.clone(),
                what: "custom model data".to_string(),
                reason: format!("found {}, expected int", other.type_name()),
            }),
        }
    }

    fn set_model_index(&self, item: &HolderId, index: i32) -> Result<(), CompatError> {
        require_item(item, "set_model_index")?;
        check_model_index(index)?;
        self.container
            .host()
            .write_tag(item, &component_path(CUSTOM_MODEL_DATA), Tag::Int(index))?;
        Ok(())
    }

    fn clear_model_index(&self, item: &HolderId) -> Result<bool, CompatError> {
        require_item(item, "clear_model_index")?;
        let removed = self
            .container
            .host()
            .remove_tag(item, &component_path(CUSTOM_MODEL_DATA))?;
        Ok(removed.is_some())
    }

    fn render_text(&self, text: &TextComponent) -> Result<String, CompatError> {
        if text.has_shadow() {
            tracing::debug!("{}: host has no text shadows, dropping shadow_color", Self::NAME);
            return encode_text(&text.without_shadow());
        }
        encode_text(text)
    }

    fn set_display_name(&self, item: &HolderId, text: &TextComponent) -> Result<(), CompatError> {
        let json = self.render_text(text)?;
        self.container.write_display_name(item, json)
    }

    fn display_name(&self, item: &HolderId) -> Result<Option<TextComponent>, CompatError> {
        self.container.read_display_name(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn shim() -> (Arc<MemoryHost>, LegacyShim) {
        let host = Arc::new(MemoryHost::new("1.21.1"));
        let shim = LegacyShim::new(host.clone()).unwrap();
        (host, shim)
    }

    #[test]
    fn test_targets() {
        let targets = LegacyShim::targets();
        assert!(targets.matches(&HostVersion::new(1, 21, 0)));
        assert!(targets.matches(&HostVersion::new(1, 21, 3)));
        assert!(!targets.matches(&HostVersion::new(1, 21, 4)));
    }

    #[test]
    fn test_construction_requires_integer_model_data() {
        let host = Arc::new(MemoryHost::new("1.21.4"));
        let err = LegacyShim::new(host).err().unwrap();
        assert_eq!(
            err,
            ShimError::MissingFeature {
                feature: HostFeature::IntegerModelData
            }
        );
    }

    #[test]
    fn test_model_index_is_stored_as_int() {
        let (host, shim) = shim();
        let item = HolderId::item("wand");

        assert_eq!(shim.model_index(&item).unwrap(), None);
        shim.set_model_index(&item, 1001).unwrap();
        assert_eq!(
            host.read_tag(&item, &component_path(CUSTOM_MODEL_DATA)).unwrap(),
            Some(Tag::Int(1001))
        );
        assert_eq!(shim.model_index(&item).unwrap(), Some(1001));
        assert!(shim.clear_model_index(&item).unwrap());
        assert!(!shim.clear_model_index(&item).unwrap());
    }

    #[test]
    fn test_model_index_rejects_entities_and_garbage() {
        let (host, shim) = shim();
        assert!(matches!(
            shim.set_model_index(&HolderId::entity("e"), 1),
            Err(CompatError::WrongHolder { .. })
        ));

        let item = HolderId::item("odd");
        host.write_tag(&item, &component_path(CUSTOM_MODEL_DATA), Tag::String("x".into()))
            .unwrap();
        assert!(matches!(
            shim.model_index(&item),
            Err(CompatError::CorruptData { .. })
        ));
    }

    #[test]
    fn test_render_drops_shadow() {
        let (_, shim) = shim();
        let text = TextComponent::from_markup("<shadow:black>Hi");
        let json = shim.render_text(&text).unwrap();
        assert!(!json.contains("shadow_color"));
        assert!(json.contains("\"Hi\""));
        assert!(!shim.capabilities().text_shadow);
    }
}
