//! Host compatibility layer.
//!
//! One stable interface (`CompatLayer`) over host APIs whose shape changes
//! between releases, with one shim per supported host range.
//!
//! # Architecture
//!
//! ```text
//!                     ┌──────────────────┐
//!                     │ CapabilityHandle │ (application code)
//!                     └────────┬─────────┘
//!                              │ dyn CompatLayer
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//!       ┌───────────────┐             ┌───────────────┐
//!       │  LegacyShim   │             │ ComponentShim │
//!       │  (v1_21_1)    │             │  (v1_21_4)    │
//!       └───────┬───────┘             └───────┬───────┘
//!               └──────────────┬──────────────┘
//!                              ▼
//!                     ┌──────────────────┐
//!                     │   HostRuntime    │ (raw, version-dependent)
//!                     └──────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! - **CompatLayer** - The version-agnostic operations (in `trait_def.rs`)
//! - **Capabilities** - Facts about a constructed shim (in `capabilities.rs`)
//! - **DataContainer** - Storage access shared by all shims (in `container.rs`)
//! - **Shims** - One per host range (`v1_21_1.rs`, `v1_21_4.rs`)
//!
//! Shims check the host's features in their constructor, so an unsupported
//! host is rejected at startup and never at first use.

pub mod capabilities;
pub mod container;
pub mod error;
pub mod trait_def;
pub mod v1_21_1;
pub mod v1_21_4;

pub use capabilities::{require_features, ModelDataFormat, ShimCapabilities, ShimIdentity};
pub use container::DataContainer;
pub use error::{CompatError, ShimError};
pub use trait_def::{check_model_index, CompatLayer, MAX_MODEL_INDEX};
pub use v1_21_1::LegacyShim;
pub use v1_21_4::ComponentShim;
