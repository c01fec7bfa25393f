//! Dispatch error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::compat::error::ShimError;
use crate::core::version::HostVersion;
use crate::util::diagnostic::Diagnostic;

/// Error while building a shim registry.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum RegistryError {
    #[error("shim `{name}` is registered more than once")]
    #[diagnostic(code(hostcompat::registry::duplicate))]
    DuplicateShim { name: String },
}

/// Startup failure of the runtime dispatcher.
///
/// `UnsupportedVersion` and `ShimConstruction` are fatal: the process entry
/// point must abort initialization rather than run degraded.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum DispatchError {
    #[error("unsupported host version `{reported}`")]
    #[diagnostic(
        code(hostcompat::dispatch::unsupported_version),
        help("run on a host version one of the registered shims supports")
    )]
    UnsupportedVersion {
        /// String exactly as the host reported it
        reported: String,
        /// Parsed form, if the string was understood at all
        parsed: Option<HostVersion>,
        /// `name (predicate)` of every registered shim
        registered: Vec<String>,
    },

    #[error("shim `{shim}` failed to initialize")]
    #[diagnostic(code(hostcompat::dispatch::shim_construction))]
    ShimConstruction {
        shim: String,
        #[source]
        source: ShimError,
    },

    #[error("dispatcher already left the uninitialized state ({state})")]
    #[diagnostic(code(hostcompat::dispatch::already_resolved))]
    AlreadyResolved { state: String },

    #[error("a capability handle has already been published")]
    #[diagnostic(code(hostcompat::dispatch::already_published))]
    AlreadyPublished,

    #[error("no capability handle has been published yet")]
    #[diagnostic(
        code(hostcompat::dispatch::not_initialized),
        help("call `dispatch::bootstrap` at startup before using host capabilities")
    )]
    NotInitialized,
}

impl DispatchError {
    /// Whether the error must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DispatchError::UnsupportedVersion { .. } | DispatchError::ShimConstruction { .. }
        )
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            DispatchError::UnsupportedVersion {
                reported,
                parsed,
                registered,
            } => {
                let mut diag = match parsed {
                    Some(version) => Diagnostic::error(format!(
                        "no shim supports host version {} (reported as `{}`)",
                        version, reported
                    )),
                    None => Diagnostic::error(format!(
                        "host reported an unrecognizable version `{}`",
                        reported
                    )),
                };

                if registered.is_empty() {
                    diag = diag.with_context("the shim registry is empty");
                } else {
                    diag = diag.with_context(format!("registered shims: {}", registered.join(", ")));
                }

                diag.with_suggestion("Run the plugin on a supported host version")
                    .with_suggestion("Check `dispatch.disabled` in hostcompat.toml")
            }

            DispatchError::ShimConstruction { shim, source } => {
                Diagnostic::error(format!("shim `{}` cannot run on this host", shim))
                    .with_context(source.to_string())
                    .with_suggestion(
                        "The host matches the shim's version range but lacks a capability it needs",
                    )
                    .with_suggestion("Check `host.features` in hostcompat.toml")
            }

            DispatchError::AlreadyResolved { state } => {
                Diagnostic::error("the dispatcher can only resolve once")
                    .with_context(format!("current state: {}", state))
            }

            DispatchError::AlreadyPublished => {
                Diagnostic::error("a capability handle has already been published")
            }

            DispatchError::NotInitialized => {
                Diagnostic::error("host capabilities used before initialization")
                    .with_suggestion("Call `dispatch::bootstrap` during startup")
            }
        }
    }
}
