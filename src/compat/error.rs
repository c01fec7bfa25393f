//! Error types for shim construction and shim operations.

use thiserror::Error;

use crate::host::{HolderId, HostError, HostFeature};

/// A matched shim could not be built for the running host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShimError {
    #[error("host lacks required feature `{feature}`")]
    MissingFeature { feature: HostFeature },
}

/// Error from a compatibility operation on a constructed shim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompatError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("`{operation}` requires an item holder, got {holder}")]
    WrongHolder {
        holder: HolderId,
        operation: &'static str,
    },

    #[error("stored {what} on {holder} is unreadable: {reason}")]
    CorruptData {
        holder: HolderId,
        what: String,
        reason: String,
    },

    #[error("model index {index} is outside the supported range ±{max}")]
    ModelIndexOutOfRange { index: i32, max: i32 },

    #[error("failed to encode text component: {0}")]
    TextEncoding(String),
}
