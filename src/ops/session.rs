//! A resolved host session for one CLI invocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::dispatch::{self, CapabilityHandle, Dispatcher, HandleSlot};
use crate::host::{HostRuntime, MemoryHost};
use crate::util::config::Config;

/// Simulated host plus the handle resolved for it.
pub struct Session {
    host: Arc<MemoryHost>,
    handle: CapabilityHandle,
    state: Option<PathBuf>,
    upgraded_from: Option<String>,
}

impl Session {
    /// Build the configured host and bootstrap the process-wide handle.
    pub fn open(config: &Config) -> Result<Self> {
        let registry = config.registry()?;
        let prepared = config.prepare_host()?;
        let host = Arc::new(prepared.host);
        let handle = dispatch::bootstrap(registry, host.clone() as Arc<dyn HostRuntime>)?;
        Ok(Session::from_parts(host, handle, config, prepared.replaced_version))
    }

    /// Like `open`, publishing into `slot` instead of the global slot.
    pub fn open_in(config: &Config, slot: &HandleSlot) -> Result<Self> {
        let registry = config.registry()?;
        let prepared = config.prepare_host()?;
        let host = Arc::new(prepared.host);
        let handle = Dispatcher::new(registry).initialize(host.clone(), slot)?;
        Ok(Session::from_parts(host, handle, config, prepared.replaced_version))
    }

    fn from_parts(
        host: Arc<MemoryHost>,
        handle: CapabilityHandle,
        config: &Config,
        upgraded_from: Option<String>,
    ) -> Self {
        Session {
            host,
            handle,
            state: config.host.state.clone(),
            upgraded_from,
        }
    }

    pub fn handle(&self) -> &CapabilityHandle {
        &self.handle
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }

    pub fn state_path(&self) -> Option<&Path> {
        self.state.as_deref()
    }

    /// Host version the stored state was written by, if this session
    /// runs a different one.
    pub fn upgraded_from(&self) -> Option<&str> {
        self.upgraded_from.as_deref()
    }

    /// Persist host state, if a state file is configured.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = &self.state {
            self.host
                .save(path)
                .with_context(|| format!("failed to save session to {}", path.display()))?;
            tracing::debug!("saved host state to {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::DataValue;
    use crate::core::key::NamespacedKey;
    use crate::dispatch::DispatchError;
    use crate::host::HolderId;
    use tempfile::TempDir;

    #[test]
    fn test_state_survives_sessions() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.host.state = Some(tmp.path().join("state.json"));
        config.host.version = Some("1.21.1".into());

        let holder = HolderId::item("gem");
        let key = NamespacedKey::parse("demo:owner").unwrap();

        let first = Session::open_in(&config, &HandleSlot::new()).unwrap();
        first
            .handle()
            .write_data(&holder, &key, &DataValue::String("alex".into()))
            .unwrap();
        first.save().unwrap();

        // Same data is visible after the host is upgraded
        config.host.version = Some("1.21.4".into());
        let second = Session::open_in(&config, &HandleSlot::new()).unwrap();
        assert_eq!(second.handle().shim_name(), "v1_21_4");
        assert_eq!(second.upgraded_from(), Some("1.21.1"));
        assert!(first.upgraded_from().is_none());
        assert_eq!(
            second.handle().read_data(&holder, &key).unwrap(),
            Some(DataValue::String("alex".into()))
        );
    }

    #[test]
    fn test_unsupported_host_fails_open() {
        let mut config = Config::default();
        config.host.version = Some("1.20.4".into());

        let slot = HandleSlot::new();
        let err = Session::open_in(&config, &slot).err().unwrap();
        let dispatch = err.downcast_ref::<DispatchError>().unwrap();
        assert!(dispatch.is_fatal());
        assert!(slot.get().is_none());
    }
}
