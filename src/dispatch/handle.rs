//! The published capability handle.
//!
//! A `CapabilityHandle` is the only thing application code holds. It is
//! cheap to clone and shares one shim across every caller and thread.
//! `HandleSlot` is a set-once cell: once a handle is published it never
//! changes for the lifetime of the slot.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use crate::compat::trait_def::CompatLayer;
use crate::core::version::HostVersion;
use crate::dispatch::errors::DispatchError;

/// Shared reference to the selected shim.
#[derive(Clone)]
pub struct CapabilityHandle {
    shim: Arc<dyn CompatLayer>,
    shim_name: String,
    version: HostVersion,
}

impl CapabilityHandle {
    pub fn new(shim: Arc<dyn CompatLayer>, shim_name: impl Into<String>, version: HostVersion) -> Self {
        CapabilityHandle {
            shim,
            shim_name: shim_name.into(),
            version,
        }
    }

    /// Name of the registry entry that produced this handle.
    pub fn shim_name(&self) -> &str {
        &self.shim_name
    }

    /// Host version the shim was selected for.
    pub fn version(&self) -> &HostVersion {
        &self.version
    }

    pub fn shim(&self) -> &Arc<dyn CompatLayer> {
        &self.shim
    }

    /// Whether two handles share the same shim instance.
    pub fn ptr_eq(&self, other: &CapabilityHandle) -> bool {
        Arc::ptr_eq(&self.shim, &other.shim)
    }
}

impl Deref for CapabilityHandle {
    type Target = dyn CompatLayer;

    fn deref(&self) -> &Self::Target {
        self.shim.as_ref()
    }
}

impl fmt::Debug for CapabilityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityHandle")
            .field("shim", &self.shim_name)
            .field("version", &self.version)
            .finish()
    }
}

/// Set-once home for a `CapabilityHandle`.
pub struct HandleSlot {
    cell: OnceLock<CapabilityHandle>,
}

impl HandleSlot {
    pub const fn new() -> Self {
        HandleSlot {
            cell: OnceLock::new(),
        }
    }

    /// Publish `handle`. Fails if a handle is already in the slot.
    pub fn publish(&self, handle: CapabilityHandle) -> Result<(), DispatchError> {
        self.cell
            .set(handle)
            .map_err(|_| DispatchError::AlreadyPublished)
    }

    pub fn get(&self) -> Option<&CapabilityHandle> {
        self.cell.get()
    }

    /// Like `get`, but errors when nothing was published.
    pub fn require(&self) -> Result<&CapabilityHandle, DispatchError> {
        self.get().ok_or(DispatchError::NotInitialized)
    }

    pub fn is_published(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for HandleSlot {
    fn default() -> Self {
        HandleSlot::new()
    }
}

impl fmt::Debug for HandleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandleSlot").field(&self.cell.get()).finish()
    }
}
