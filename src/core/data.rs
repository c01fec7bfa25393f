//! Typed persistent data values.
//!
//! Plugins store small typed values on items and entities. `DataValue` is
//! the version-agnostic form; shims translate it to and from host tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::tag::{float_repr, Tag};

/// A typed persistent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DataValue {
    String(String),
    Int(i32),
    Long(i64),
    Float(#[serde(with = "float_repr::single")] f32),
    Double(#[serde(with = "float_repr::double")] f64),
    /// Stored by hosts as a byte 0/1.
    Bool(bool),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// Error returned when parsing a `type:value` literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataValueParseError {
    #[error("value `{0}` is missing a `type:` prefix (e.g. `int:5`)")]
    MissingType(String),

    #[error("unknown value type `{0}`, valid types: string, int, long, float, double, bool, bytes, ints, longs")]
    UnknownType(String),

    #[error("cannot parse `{value}` as {kind}")]
    InvalidValue { kind: &'static str, value: String },
}

/// Error returned when a host tag has no typed-value equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{found} tag cannot be read as a persistent value")]
pub struct UnsupportedTag {
    pub found: &'static str,
}

impl DataValue {
    /// Name of the value's type, as used in literals.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::String(_) => "string",
            DataValue::Int(_) => "int",
            DataValue::Long(_) => "long",
            DataValue::Float(_) => "float",
            DataValue::Double(_) => "double",
            DataValue::Bool(_) => "bool",
            DataValue::ByteArray(_) => "bytes",
            DataValue::IntArray(_) => "ints",
            DataValue::LongArray(_) => "longs",
        }
    }

    /// Parse a `type:value` literal such as `int:5` or `ints:1,2,3`.
    pub fn parse(input: &str) -> Result<Self, DataValueParseError> {
        let (kind, raw) = input
            .split_once(':')
            .ok_or_else(|| DataValueParseError::MissingType(input.to_string()))?;

        fn scalar<T: FromStr>(kind: &'static str, raw: &str) -> Result<T, DataValueParseError> {
            raw.trim().parse().map_err(|_| DataValueParseError::InvalidValue {
                kind,
                value: raw.to_string(),
            })
        }

        fn list<T: FromStr>(kind: &'static str, raw: &str) -> Result<Vec<T>, DataValueParseError> {
            if raw.trim().is_empty() {
                return Ok(Vec::new());
            }
            raw.split(',').map(|item| scalar(kind, item)).collect()
        }

        match kind {
            "string" | "str" => Ok(DataValue::String(raw.to_string())),
            "int" => Ok(DataValue::Int(scalar("int", raw)?)),
            "long" => Ok(DataValue::Long(scalar("long", raw)?)),
            "float" => Ok(DataValue::Float(scalar("float", raw)?)),
            "double" => Ok(DataValue::Double(scalar("double", raw)?)),
            "bool" => Ok(DataValue::Bool(scalar("bool", raw)?)),
            "bytes" => Ok(DataValue::ByteArray(list("bytes", raw)?)),
            "ints" => Ok(DataValue::IntArray(list("ints", raw)?)),
            "longs" => Ok(DataValue::LongArray(list("longs", raw)?)),
            other => Err(DataValueParseError::UnknownType(other.to_string())),
        }
    }

    /// Host tag representation.
    pub fn to_tag(&self) -> Tag {
        match self {
            DataValue::String(v) => Tag::String(v.clone()),
            DataValue::Int(v) => Tag::Int(*v),
            DataValue::Long(v) => Tag::Long(*v),
            DataValue::Float(v) => Tag::Float(*v),
            DataValue::Double(v) => Tag::Double(*v),
            DataValue::Bool(v) => Tag::Byte(i8::from(*v)),
            DataValue::ByteArray(v) => Tag::ByteArray(v.clone()),
            DataValue::IntArray(v) => Tag::IntArray(v.clone()),
            DataValue::LongArray(v) => Tag::LongArray(v.clone()),
        }
    }

    /// Read a value back from a host tag.
    ///
    /// Bytes are always read as booleans (non-zero is true).
    pub fn from_tag(tag: &Tag) -> Result<Self, UnsupportedTag> {
        Ok(match tag {
            Tag::String(v) => DataValue::String(v.clone()),
            Tag::Int(v) => DataValue::Int(*v),
            Tag::Long(v) => DataValue::Long(*v),
            Tag::Float(v) => DataValue::Float(*v),
            Tag::Double(v) => DataValue::Double(*v),
            Tag::Byte(v) => DataValue::Bool(*v != 0),
            Tag::ByteArray(v) => DataValue::ByteArray(v.clone()),
            Tag::IntArray(v) => DataValue::IntArray(v.clone()),
            Tag::LongArray(v) => DataValue::LongArray(v.clone()),
            other => {
                return Err(UnsupportedTag {
                    found: other.type_name(),
                })
            }
        })
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            DataValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromStr for DataValue {
    type Err = DataValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataValue::parse(s)
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(v) => write!(f, "string:{}", v),
            DataValue::Int(v) => write!(f, "int:{}", v),
            DataValue::Long(v) => write!(f, "long:{}", v),
            DataValue::Float(v) => write!(f, "float:{}", v),
            DataValue::Double(v) => write!(f, "double:{}", v),
            DataValue::Bool(v) => write!(f, "bool:{}", v),
            DataValue::ByteArray(v) => write!(f, "bytes:{}", join(v)),
            DataValue::IntArray(v) => write!(f, "ints:{}", join(v)),
            DataValue::LongArray(v) => write!(f, "longs:{}", join(v)),
        }
    }
}
