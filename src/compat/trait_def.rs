//! CompatLayer trait definition.
//!
//! The CompatLayer trait is the stable capability interface application code
//! programs against. Every operation is defined without reference to a host
//! version; version differences live entirely in the implementations.

use crate::compat::capabilities::{ShimCapabilities, ShimIdentity};
use crate::compat::error::CompatError;
use crate::core::data::DataValue;
use crate::core::key::NamespacedKey;
use crate::core::text::TextComponent;
use crate::host::HolderId;

/// Largest model index every shim can store without loss.
///
/// Component-style hosts keep model data as 32-bit floats, which are exact
/// for integers up to 2^24.
pub const MAX_MODEL_INDEX: i32 = 1 << 24;

/// Check that a model index is storable by every shim.
pub fn check_model_index(index: i32) -> Result<(), CompatError> {
    if index.unsigned_abs() > MAX_MODEL_INDEX as u32 {
        return Err(CompatError::ModelIndexOutOfRange {
            index,
            max: MAX_MODEL_INDEX,
        });
    }
    Ok(())
}

/// CompatLayer trait - version-agnostic host operations.
///
/// Implementations must behave equivalently: the same inputs produce the
/// same category of output on every shim. The only permitted difference is
/// that a shim whose host lacks text shadows drops `shadow_color` when
/// rendering (see `ShimCapabilities::text_shadow`).
pub trait CompatLayer: Send + Sync {
    /// Shim identity.
    fn identity(&self) -> &ShimIdentity;

    /// Capabilities decided at construction.
    fn capabilities(&self) -> &ShimCapabilities;

    /// Read a typed persistent value.
    fn read_data(
        &self,
        holder: &HolderId,
        key: &NamespacedKey,
    ) -> Result<Option<DataValue>, CompatError>;

    /// Store a typed persistent value, replacing any previous one.
    fn write_data(
        &self,
        holder: &HolderId,
        key: &NamespacedKey,
        value: &DataValue,
    ) -> Result<(), CompatError>;

    /// Remove a persistent value. Returns whether a value was present.
    fn remove_data(&self, holder: &HolderId, key: &NamespacedKey) -> Result<bool, CompatError>;

    /// All persistent keys on a holder, sorted.
    fn data_keys(&self, holder: &HolderId) -> Result<Vec<NamespacedKey>, CompatError>;

    /// Custom model index of an item.
    fn model_index(&self, item: &HolderId) -> Result<Option<i32>, CompatError>;

    /// Set the custom model index of an item.
    fn set_model_index(&self, item: &HolderId, index: i32) -> Result<(), CompatError>;

    /// Clear the custom model index. Returns whether one was set.
    fn clear_model_index(&self, item: &HolderId) -> Result<bool, CompatError>;

    /// Encode a component in the host's JSON text format.
    fn render_text(&self, text: &TextComponent) -> Result<String, CompatError>;

    /// Set an item's display name.
    fn set_display_name(&self, item: &HolderId, text: &TextComponent) -> Result<(), CompatError>;

    /// Read an item's display name.
    fn display_name(&self, item: &HolderId) -> Result<Option<TextComponent>, CompatError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_index_bounds() {
        assert!(check_model_index(0).is_ok());
        assert!(check_model_index(MAX_MODEL_INDEX).is_ok());
        assert!(check_model_index(-MAX_MODEL_INDEX).is_ok());
        assert!(check_model_index(MAX_MODEL_INDEX + 1).is_err());
        assert!(check_model_index(i32::MIN).is_err());
    }
}
