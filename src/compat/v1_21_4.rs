//! Shim for 1.21.4+ hosts.
//!
//! Custom model data became a compound of float/flag/string/colour lists,
//! and text components gained a shadow colour.

use std::collections::BTreeMap;
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

const REQUIRED: &[HostFeature] = &[HostFeature::DataComponents, HostFeature::ComponentModelData];

/// Component shim: compound model data, optional text shadows.
pub struct ComponentShim {
    identity: ShimIdentity,
    capabilities: ShimCapabilities,
    container: DataContainer,
}

impl ComponentShim {
    pub const NAME: &'static str = "v1_21_4";

    /// Host range this shim is registered for.
    pub fn targets() -> VersionPredicate {
        VersionPredicate::between(&HostVersion::new(1, 21, 4), &HostVersion::new(1, 22, 0))
    }

    /// Build the shim, failing fast if the host lacks what it needs.
    ///
    /// Text shadow support is optional and checked here once.
    pub fn new(host: Arc<dyn HostRuntime>) -> Result<Self, ShimError> {
        require_features(host.as_ref(), REQUIRED)?;
        let text_shadow = host.supports(HostFeature::TextShadow);
        if !text_shadow {
            tracing::warn!("{}: host has no text shadow support", Self::NAME);
        }

        Ok(ComponentShim {
            identity: ShimIdentity {
                name: Self::NAME,
                shim_version: semver::Version::new(1, 0, 0),
                targets: Self::targets(),
            },
            capabilities: ShimCapabilities {
                text_shadow,
                model_data: ModelDataFormat::Component,
                required_features: REQUIRED.to_vec(),
            },
            container: DataContainer::new(host),
        })
    }

    fn model_tag(index: i32) -> Tag {
        let mut map = BTreeMap::new();
        map.insert("floats".to_string(), Tag::List(vec![Tag::Float(index as f32)]));
        map.insert("flags".to_string(), Tag::List(Vec::new()));
        map.insert("strings".to_string(), Tag::List(Vec::new()));
        map.insert("colors".to_string(), Tag::List(Vec::new()));
        Tag::Compound(map)
    }

    /// First entry of `floats`, which must hold an exact integer.
    ///
    /// Items last written by a pre-1.21.4 host still carry the bare `int`
    /// layout; the host migrates those on access, and so do we.
    fn index_from_tag(tag: &Tag) -> Result<Option<i32>, String> {
        if let Tag::Int(index) = tag {
            return Ok(Some(*index));
        }

        let map = tag
            .as_compound()
            .ok_or_else(|| format!("found {}, expected compound", tag.type_name()))?;

        let first = match map.get("floats") {
            None => return Ok(None),
            Some(Tag::List(items)) => items.first(),
            Some(other) => return Err(format!("floats is {}, expected list", other.type_name())),
        };

        match first {
            None => Ok(None),
            Some(Tag::Float(f)) if f.fract() == 0.0 && f.abs() <= i32::MAX as f32 => {
                Ok(Some(*f as i32))
            }
            Some(Tag::Float(f)) => Err(format!("float {} is not an integral model index", f)),
            Some(other) => Err(format!("floats holds {}, expected float", other.type_name())),
        }
    }
}

impl CompatLayer for ComponentShim {
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
        let Some(tag) = self
            .container
            .host()
            .read_tag(item, &component_path(CUSTOM_MODEL_DATA))?
        else {
            return Ok(None);
        };

        Self::index_from_tag(&tag).map_err(|reason| CompatError::CorruptData {
            holder: item.clone(),
            what: "custom model data".to_string(),
            reason,
        })
    }

    fn set_model_index(&self, item: &HolderId, index: i32) -> Result<(), CompatError> {
        require_item(item, "set_model_index")?;
        check_model_index(index)?;
        self.container.host().write_tag(
            item,
            &component_path(CUSTOM_MODEL_DATA),
            Self::model_tag(index),
        )?;
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
        if !self.capabilities.text_shadow && text.has_shadow() {
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
