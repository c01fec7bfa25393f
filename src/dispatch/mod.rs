//! Runtime shim selection.
//!
//! At startup the host reports its version string once. The dispatcher
//! parses it, walks the injected `ShimRegistry` in order, constructs the
//! first matching shim and publishes it as a `CapabilityHandle`. Any failure
//! is fatal: there is no degraded mode.
//!
//! Process entry points use [`bootstrap`], which publishes into a global
//! slot read by [`handle`] and [`require_handle`]. Tests and embedders that
//! need isolation create their own `HandleSlot` and call
//! `Dispatcher::initialize` directly.

pub mod dispatcher;
pub mod errors;
pub mod handle;
pub mod registry;

use std::sync::Arc;

use crate::host::HostRuntime;

pub use dispatcher::{DispatchState, Dispatcher};
pub use errors::{DispatchError, RegistryError};
pub use handle::{CapabilityHandle, HandleSlot};
pub use registry::{ShimConstructor, ShimEntry, ShimRegistry, ShimRegistryBuilder};

static GLOBAL: HandleSlot = HandleSlot::new();

/// Resolve `host` against `registry` and publish the handle process-wide.
pub fn bootstrap(
    registry: ShimRegistry,
    host: Arc<dyn HostRuntime>,
) -> Result<CapabilityHandle, DispatchError> {
    Dispatcher::new(registry).initialize(host, &GLOBAL)
}

/// The process-wide handle, if `bootstrap` succeeded.
pub fn handle() -> Option<&'static CapabilityHandle> {
    GLOBAL.get()
}

pub fn require_handle() -> Result<&'static CapabilityHandle, DispatchError> {
    GLOBAL.require()
}
