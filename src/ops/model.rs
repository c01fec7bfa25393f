//! Custom model index operations. Items only.

use anyhow::{Context, Result};

use crate::dispatch::CapabilityHandle;
use crate::host::HolderId;

pub fn model_get(handle: &CapabilityHandle, item: &HolderId) -> Result<Option<i32>> {
    handle
        .model_index(item)
        .with_context(|| format!("failed to read model index of {}", item))
}

/// Set the index, returning the previous one.
pub fn model_set(handle: &CapabilityHandle, item: &HolderId, index: i32) -> Result<Option<i32>> {
    let previous = model_get(handle, item)?;
    handle
        .set_model_index(item, index)
        .with_context(|| format!("failed to set model index of {}", item))?;
    Ok(previous)
}

pub fn model_clear(handle: &CapabilityHandle, item: &HolderId) -> Result<bool> {
    handle
        .clear_model_index(item)
        .with_context(|| format!("failed to clear model index of {}", item))
}
