//! Configuration file support.
//!
//! Two configuration file locations:
//! - Global: `~/.hostcompat/config.toml` - User-wide defaults
//! - Project: `hostcompat.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::duration::parse_duration;
use crate::core::key::{KeyParseError, NamespacedKey};
use crate::core::version::HostVersion;
use crate::dispatch::{RegistryError, ShimRegistry};
use crate::host::memory::HostSnapshot;
use crate::host::{HostFeature, MemoryHost};

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "hostcompat.toml";

/// Host version simulated when nothing else says otherwise.
pub const DEFAULT_HOST_VERSION: &str = "1.21.4";

pub const DEFAULT_NAMESPACE: &str = "hostcompat";

pub const DEFAULT_MOTD: &str = "<green>Welcome back!";

/// hostcompat configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simulated host settings
    pub host: HostConfig,

    /// Shim selection settings
    pub dispatch: DispatchConfig,

    /// Logging settings
    pub log: LogConfig,

    /// Settings for the bundled application modules
    pub app: AppConfig,
}

/// Host-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Version string the host reports (e.g. `1.21.4-R0.1-SNAPSHOT`)
    pub version: Option<String>,

    /// JSON snapshot the host state is loaded from and saved to
    pub state: Option<PathBuf>,

    /// Explicit feature set, replacing the stock set for the version
    pub features: Option<Vec<HostFeature>>,
}

/// Dispatch-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Built-in shims removed before the registry is frozen
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level for the `hostcompat` target (error, warn, info, debug, trace)
    pub level: Option<String>,
}

/// Application module configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Namespace for keys the application writes
    pub namespace: Option<String>,

    /// Markup the greeter renders
    pub motd: Option<String>,

    /// Minimum time between counted visits (e.g. `5m30s`)
    pub visit_cooldown: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create config directory: {}", parent.display())
                })?;
            }
        }

        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.host.version.is_some() {
            self.host.version = other.host.version;
        }
        if other.host.state.is_some() {
            self.host.state = other.host.state;
        }
        if other.host.features.is_some() {
            self.host.features = other.host.features;
        }

        // Disabled shims accumulate across layers
        for name in other.dispatch.disabled {
            if !self.dispatch.disabled.contains(&name) {
                self.dispatch.disabled.push(name);
            }
        }

        if other.log.level.is_some() {
            self.log.level = other.log.level;
        }

        if other.app.namespace.is_some() {
            self.app.namespace = other.app.namespace;
        }
        if other.app.motd.is_some() {
            self.app.motd = other.app.motd;
        }
        if other.app.visit_cooldown.is_some() {
            self.app.visit_cooldown = other.app.visit_cooldown;
        }
    }

    pub fn host_version(&self) -> &str {
        self.host.version.as_deref().unwrap_or(DEFAULT_HOST_VERSION)
    }

    pub fn namespace(&self) -> &str {
        self.app.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn motd(&self) -> &str {
        self.app.motd.as_deref().unwrap_or(DEFAULT_MOTD)
    }

    /// Configured visit cooldown; zero when unset.
    pub fn visit_cooldown(&self) -> Result<Duration> {
        match &self.app.visit_cooldown {
            Some(text) => parse_duration(text)
                .with_context(|| format!("invalid app.visit_cooldown `{}`", text)),
            None => Ok(Duration::ZERO),
        }
    }

    /// Key `name` inside the configured namespace.
    pub fn app_key(&self, name: &str) -> Result<NamespacedKey, KeyParseError> {
        NamespacedKey::new(self.namespace(), name)
    }

    /// Tracing filter directive for the configured level.
    pub fn log_filter(&self, verbose: bool) -> String {
        if verbose {
            return "hostcompat=debug".to_string();
        }
        match &self.log.level {
            Some(level) => format!("hostcompat={}", level),
            None => "hostcompat=info".to_string(),
        }
    }

    /// Built-in registry minus the disabled shims.
    pub fn registry(&self) -> Result<ShimRegistry, RegistryError> {
        let mut builder = ShimRegistry::builtin_builder();
        for name in &self.dispatch.disabled {
            tracing::debug!("shim {} disabled by config", name);
            builder = builder.without(name);
        }
        builder.build()
    }

    /// Build the simulated host.
    ///
    /// Stored state is loaded when the state file exists. An explicitly
    /// configured version that differs from the stored one replaces it,
    /// along with the stock features for the new version. Configured
    /// features always win.
    pub fn build_host(&self) -> Result<MemoryHost> {
        Ok(self.prepare_host()?.host)
    }

    /// Like `build_host`, also reporting a replaced stored version.
    pub fn prepare_host(&self) -> Result<PreparedHost> {
        let mut snapshot = match self.host.state.as_deref() {
            Some(path) if path.exists() => MemoryHost::load(path)?.snapshot()?,
            _ => HostSnapshot::default(),
        };

        let wanted = match &self.host.version {
            Some(version) if *version != snapshot.version => Some(version.clone()),
            None if snapshot.version.is_empty() => Some(DEFAULT_HOST_VERSION.to_string()),
            _ => None,
        };
        let mut replaced_version = None;
        if let Some(version) = wanted {
            snapshot.features = HostVersion::parse(&version)
                .map(|v| HostFeature::defaults_for(&v))
                .unwrap_or_default();
            let previous = std::mem::replace(&mut snapshot.version, version);
            if !previous.is_empty() {
                tracing::debug!("stored host {} replaced by {}", previous, snapshot.version);
                replaced_version = Some(previous);
            }
        }

        if let Some(features) = &self.host.features {
            snapshot.features = features.iter().copied().collect();
        }

        Ok(PreparedHost {
            host: MemoryHost::from_snapshot(snapshot),
            replaced_version,
        })
    }
}

/// A configured host, plus the stored version it took over from.
#[derive(Debug)]
pub struct PreparedHost {
    pub host: MemoryHost,
    /// Version recorded in the state file, when the configured one differs
    pub replaced_version: Option<String>,
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (hostcompat.toml)
/// 2. Global config (~/.hostcompat/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.hostcompat).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".hostcompat"))
}

/// Get the global config path (~/.hostcompat/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (hostcompat.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}
