//! Application module lifecycle.
//!
//! Modules only ever see a `ModuleContext`: the capability handle, the key
//! namespace and the services the embedder provides. They never learn which
//! shim or host version is behind it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::app::services::Services;
use crate::compat::error::CompatError;
use crate::core::key::{KeyParseError, NamespacedKey};
use crate::dispatch::CapabilityHandle;

/// Lifecycle phase, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Start,
    Stop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Init => write!(f, "init"),
            Phase::Start => write!(f, "start"),
            Phase::Stop => write!(f, "stop"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Compat(#[from] CompatError),

    #[error("invalid key: {0}")]
    Key(#[from] KeyParseError),

    #[error("module `{0}` was started before init")]
    NotInitialized(String),

    #[error("no service of type `{0}` was provided")]
    MissingService(&'static str),

    #[error("`{key}` holds a {found}, expected {expected}")]
    UnexpectedValue {
        key: NamespacedKey,
        expected: &'static str,
        found: &'static str,
    },

    #[error("module `{module}` failed during {phase}")]
    Module {
        module: String,
        phase: Phase,
        #[source]
        source: Box<AppError>,
    },
}

/// What a module can reach of the outside world.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    handle: CapabilityHandle,
    namespace: String,
    services: Arc<Services>,
}

impl ModuleContext {
    pub fn new(handle: CapabilityHandle, namespace: impl Into<String>) -> Self {
        ModuleContext {
            handle,
            namespace: namespace.into(),
            services: Arc::new(Services::new()),
        }
    }

    pub fn with_services(mut self, services: Services) -> Self {
        self.services = Arc::new(services);
        self
    }

    pub fn handle(&self) -> &CapabilityHandle {
        &self.handle
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `name` inside the application namespace.
    pub fn key(&self, name: &str) -> Result<NamespacedKey, AppError> {
        Ok(NamespacedKey::new(self.namespace.as_str(), name)?)
    }

    /// The provided service of type `T`.
    pub fn service<T: Any + Send + Sync>(&self) -> Result<Arc<T>, AppError> {
        self.services.get::<T>()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }
}

/// A unit of application behaviour with an init/start/stop lifecycle.
///
/// `start` is only called after a successful `init`, and `stop` only after
/// a successful `start`.
pub trait AppModule: Send {
    fn name(&self) -> &str;

    fn init(&mut self, ctx: &ModuleContext) -> Result<(), AppError>;

    fn start(&mut self) -> Result<(), AppError>;

    fn stop(&mut self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Drives registered modules through their lifecycle in order.
pub struct ModuleManager {
    context: ModuleContext,
    modules: Vec<Box<dyn AppModule>>,
    initialized: bool,
    started: usize,
}

impl ModuleManager {
    pub fn new(context: ModuleContext) -> Self {
        ModuleManager {
            context,
            modules: Vec::new(),
            initialized: false,
            started: 0,
        }
    }

    pub fn register(&mut self, module: impl AppModule + 'static) {
        self.modules.push(Box::new(module));
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Initialize every module. The first failure aborts.
    pub fn init_all(&mut self) -> Result<(), AppError> {
        for module in &mut self.modules {
            tracing::debug!("init module {}", module.name());
            module
                .init(&self.context)
                .map_err(|e| wrap(module.name(), Phase::Init, e))?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Start every module in registration order. The first failure aborts;
    /// modules started before it are still stopped by `stop_all`.
    pub fn start_all(&mut self) -> Result<(), AppError> {
        if !self.initialized {
            let first = self.modules.first().map(|m| m.name()).unwrap_or("<none>");
            return Err(AppError::NotInitialized(first.to_string()));
        }
        for module in self.modules.iter_mut().skip(self.started) {
            tracing::debug!("start module {}", module.name());
            module
                .start()
                .map_err(|e| wrap(module.name(), Phase::Start, e))?;
            self.started += 1;
        }
        tracing::info!("{} module(s) running", self.started);
        Ok(())
    }

    /// Stop started modules in reverse order.
    ///
    /// Every started module gets its `stop` call even when an earlier one
    /// fails; the first failure is returned.
    pub fn stop_all(&mut self) -> Result<(), AppError> {
        let mut first_error = None;
        for module in self.modules[..self.started].iter_mut().rev() {
            tracing::debug!("stop module {}", module.name());
            if let Err(e) = module.stop() {
                tracing::error!("module {} failed to stop: {}", module.name(), e);
                if first_error.is_none() {
                    first_error = Some(wrap(module.name(), Phase::Stop, e));
                }
            }
        }
        self.started = 0;
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn wrap(module: &str, phase: Phase, source: AppError) -> AppError {
    AppError::Module {
        module: module.to_string(),
        phase,
        source: Box::new(source),
    }
}
