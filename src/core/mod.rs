//! Core data types shared by every layer.
//!
//! - Host version identifiers and the predicates that match them
//! - Namespaced keys and typed persistent values
//! - Rich text components and their markup
//! - Human-readable durations for configuration values

pub mod data;
pub mod duration;
pub mod key;
pub mod predicate;
pub mod text;
pub mod version;

pub use data::{DataValue, DataValueParseError};
pub use duration::{format_duration, parse_duration, DurationParseError};
pub use key::{KeyParseError, NamespacedKey};
pub use predicate::{PredicateParseError, VersionPredicate};
pub use text::{NamedColor, Style, TextColor, TextComponent};
pub use version::{HostVersion, VersionParseError};
