//! Runtime dispatcher: picks one shim for the running host, once.
//!
//! ```text
//! Uninitialized ──resolve──▶ Resolving ──▶ Ready   (handle available)
//!                                     └──▶ Failed  (fatal, nothing published)
//! ```
//!
//! `Ready` and `Failed` are terminal. Selection is the first registry entry
//! whose predicate accepts the parsed host version; a matching shim that
//! fails construction is fatal and never falls through to a later entry.

use std::error::Error as _;
use std::fmt;
use std::sync::Arc;

use crate::core::version::HostVersion;
use crate::dispatch::errors::DispatchError;
use crate::dispatch::handle::{CapabilityHandle, HandleSlot};
use crate::dispatch::registry::{ShimEntry, ShimRegistry};
use crate::host::HostRuntime;

/// Where the dispatcher is in its lifecycle.
#[derive(Debug, Clone)]
pub enum DispatchState {
    Uninitialized,
    /// Selection in progress for the version string the host reported
    Resolving { version: String },
    Ready { handle: CapabilityHandle },
    Failed { reason: String },
}

impl DispatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchState::Ready { .. } | DispatchState::Failed { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DispatchState::Ready { .. })
    }

    pub fn handle(&self) -> Option<&CapabilityHandle> {
        match self {
            DispatchState::Ready { handle } => Some(handle),
            _ => None,
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchState::Uninitialized => write!(f, "uninitialized"),
            DispatchState::Resolving { version } => write!(f, "resolving {}", version),
            DispatchState::Ready { handle } => {
                write!(f, "ready: {} for host {}", handle.shim_name(), handle.version())
            }
            DispatchState::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Resolves a host to a capability handle using an injected registry.
#[derive(Debug)]
pub struct Dispatcher {
    registry: ShimRegistry,
    state: DispatchState,
}

impl Dispatcher {
    pub fn new(registry: ShimRegistry) -> Self {
        Dispatcher {
            registry,
            state: DispatchState::Uninitialized,
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    pub fn registry(&self) -> &ShimRegistry {
        &self.registry
    }

    /// Pure selection step: the first entry accepting `version`.
    pub fn select(&self, version: &HostVersion) -> Option<&ShimEntry> {
        for entry in self.registry.entries() {
            let accepted = entry.predicate().matches(version);
            tracing::debug!(
                "shim {} ({}) {} host {}",
                entry.name(),
                entry.predicate(),
                if accepted { "accepts" } else { "rejects" },
                version
            );
            if accepted {
                return Some(entry);
            }
        }
        None
    }

    /// Resolve the host to a handle. Only valid from `Uninitialized`.
    pub fn resolve(&mut self, host: Arc<dyn HostRuntime>) -> Result<CapabilityHandle, DispatchError> {
        if !matches!(self.state, DispatchState::Uninitialized) {
            return Err(DispatchError::AlreadyResolved {
                state: self.state.to_string(),
            });
        }

        let reported = host.version_string();
        self.state = DispatchState::Resolving {
            version: reported.clone(),
        };

        match self.construct(host, &reported) {
            Ok(handle) => {
                tracing::info!(
                    "selected shim {} for host version {}",
                    handle.shim_name(),
                    reported
                );
                self.state = DispatchState::Ready {
                    handle: handle.clone(),
                };
                Ok(handle)
            }
            Err(err) => {
                let reason = failure_reason(&err);
                tracing::error!("dispatch failed: {}", reason);
                self.state = DispatchState::Failed { reason };
                Err(err)
            }
        }
    }

    /// Resolve and publish the handle into `slot`.
    ///
    /// The dispatcher only ends `Ready` if its handle is the one published.
    pub fn initialize(
        &mut self,
        host: Arc<dyn HostRuntime>,
        slot: &HandleSlot,
    ) -> Result<CapabilityHandle, DispatchError> {
        if slot.is_published() {
            return Err(DispatchError::AlreadyPublished);
        }
        let handle = self.resolve(host)?;
        self.publish_into(handle, slot)
    }

    /// Another initializer can fill `slot` between the check above and
    /// this call; losing that race fails the dispatcher.
    fn publish_into(
        &mut self,
        handle: CapabilityHandle,
        slot: &HandleSlot,
    ) -> Result<CapabilityHandle, DispatchError> {
        if let Err(err) = slot.publish(handle.clone()) {
            let reason = failure_reason(&err);
            tracing::error!("cannot publish {}: {}", handle.shim_name(), reason);
            self.state = DispatchState::Failed { reason };
            return Err(err);
        }
        Ok(handle)
    }

    fn construct(
        &self,
        host: Arc<dyn HostRuntime>,
        reported: &str,
    ) -> Result<CapabilityHandle, DispatchError> {
        let version = HostVersion::parse(reported).map_err(|e| {
            tracing::warn!("cannot parse host version `{}`: {}", reported, e);
            self.unsupported(reported, None)
        })?;

        let entry = self
            .select(&version)
            .ok_or_else(|| self.unsupported(reported, Some(version.clone())))?;

        let shim = entry
            .construct(host)
            .map_err(|source| DispatchError::ShimConstruction {
                shim: entry.name().to_string(),
                source,
            })?;

        Ok(CapabilityHandle::new(Arc::from(shim), entry.name(), version))
    }

    fn unsupported(&self, reported: &str, parsed: Option<HostVersion>) -> DispatchError {
        DispatchError::UnsupportedVersion {
            reported: reported.to_string(),
            parsed,
            registered: self.registry.describe(),
        }
    }
}

/// Error message plus its source, on one line.
fn failure_reason(err: &DispatchError) -> String {
    match err.source() {
        Some(source) => format!("{}: {}", err, source),
        None => err.to_string(),
    }
}
