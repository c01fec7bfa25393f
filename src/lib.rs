//! hostcompat - version compatibility layer for plugin code on a game server host
//!
//! Application code talks to one stable interface, `CompatLayer`, through a
//! `CapabilityHandle`. At startup the dispatcher reads the host's reported
//! version once, picks the matching version shim from an explicit registry
//! and publishes the handle. Unsupported hosts fail at startup, never later.

pub mod app;
pub mod compat;
pub mod core;
pub mod dispatch;
pub mod host;
pub mod ops;
pub mod profiler;
pub mod util;

pub use compat::{CompatError, CompatLayer};
pub use crate::core::{DataValue, HostVersion, NamespacedKey, TextComponent, VersionPredicate};
pub use dispatch::{
    bootstrap, handle, require_handle, CapabilityHandle, DispatchError, DispatchState, Dispatcher,
    HandleSlot, ShimRegistry,
};
pub use host::{HolderId, HostFeature, HostRuntime, MemoryHost};
