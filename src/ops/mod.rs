//! High-level operations.
//!
//! One function per CLI operation. Everything goes through a
//! `CapabilityHandle`, so the same code runs on every supported host.

pub mod boot;
pub mod data;
pub mod model;
pub mod session;
pub mod text;

pub use boot::{boot, BootOptions, BootReport};
pub use data::{data_get, data_list, data_remove, data_set};
pub use model::{model_clear, model_get, model_set};
pub use session::Session;
pub use text::{text_name, text_render};
