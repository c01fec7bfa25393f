//! NBT-like tag tree that hosts use for raw holder storage.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw host tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(#[serde(with = "float_repr::single")] f32),
    Double(#[serde(with = "float_repr::double")] f64),
    String(String),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    List(Vec<Tag>),
    Compound(BTreeMap<String, Tag>),
}

impl Tag {
    /// An empty compound.
    pub fn compound() -> Self {
        Tag::Compound(BTreeMap::new())
    }

    /// Short type name for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Tag::Byte(_) => "byte",
            Tag::Short(_) => "short",
            Tag::Int(_) => "int",
            Tag::Long(_) => "long",
            Tag::Float(_) => "float",
            Tag::Double(_) => "double",
            Tag::String(_) => "string",
            Tag::ByteArray(_) => "byte_array",
            Tag::IntArray(_) => "int_array",
            Tag::LongArray(_) => "long_array",
            Tag::List(_) => "list",
            Tag::Compound(_) => "compound",
        }
    }

    pub fn as_compound(&self) -> Option<&BTreeMap<String, Tag>> {
        match self {
            Tag::Compound(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a nested tag.
    pub fn get(&self, path: &TagPath) -> Option<&Tag> {
        let mut current = self;
        for segment in path.segments() {
            current = current.as_compound()?.get(segment)?;
        }
        Some(current)
    }

    /// Store `value` at `path`, creating intermediate compounds.
    ///
    /// Fails if a non-compound tag sits on the way. An empty path replaces
    /// the whole tree.
    pub fn put(&mut self, path: &TagPath, value: Tag) -> Result<(), TagError> {
        let Some((last, parents)) = path.segments().split_last() else {
            *self = value;
            return Ok(());
        };

        let mut current = self;
        for (depth, segment) in parents.iter().enumerate() {
            let map = match current {
                Tag::Compound(map) => map,
                other => {
                    return Err(TagError::NotACompound {
                        path: path.prefix(depth),
                        found: other.type_name(),
                    })
                }
            };
            current = map.entry(segment.clone()).or_insert_with(Tag::compound);
        }

        match current {
            Tag::Compound(map) => {
                map.insert(last.clone(), value);
                Ok(())
            }
            other => Err(TagError::NotACompound {
                path: path.prefix(parents.len()),
                found: other.type_name(),
            }),
        }
    }

    /// Remove the tag at `path`, returning it.
    ///
    /// Compounds left empty by the removal are pruned.
    pub fn remove(&mut self, path: &TagPath) -> Option<Tag> {
        fn remove_in(map: &mut BTreeMap<String, Tag>, segments: &[String]) -> Option<Tag> {
            let (first, rest) = segments.split_first()?;
            if rest.is_empty() {
                return map.remove(first);
            }
            let child = match map.get_mut(first)? {
                Tag::Compound(child) => child,
                _ => return None,
            };
            let removed = remove_in(child, rest);
            if removed.is_some() && child.is_empty() {
                map.remove(first);
            }
            removed
        }

        match self {
            Tag::Compound(map) => remove_in(map, path.segments()),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Byte(v) => write!(f, "{}b", v),
            Tag::Short(v) => write!(f, "{}s", v),
            Tag::Int(v) => write!(f, "{}", v),
            Tag::Long(v) => write!(f, "{}L", v),
            Tag::Float(v) => write!(f, "{}f", v),
            Tag::Double(v) => write!(f, "{}d", v),
            Tag::String(v) => write!(f, "{:?}", v),
            Tag::ByteArray(v) => write_array(f, "B", v),
            Tag::IntArray(v) => write_array(f, "I", v),
            Tag::LongArray(v) => write_array(f, "L", v),
            Tag::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Tag::Compound(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{:?}:{}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_array<T: fmt::Display>(f: &mut fmt::Formatter<'_>, prefix: &str, items: &[T]) -> fmt::Result {
    write!(f, "[{};", prefix)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

/// Serde form for floats that survives JSON.
///
/// JSON has no NaN or infinity, so non-finite values are written as the
/// strings `NaN`, `inf` and `-inf` and parsed back from them.
pub(crate) mod float_repr {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::Deserializer;

    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a number or one of `NaN`, `inf`, `-inf`")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v.parse::<f64>() {
                Ok(parsed) if !parsed.is_finite() => Ok(parsed),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }

    pub mod single {
        use serde::{Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
            if value.is_finite() {
                serializer.serialize_f32(*value)
            } else {
                serializer.serialize_str(&value.to_string())
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
            super::any_float(deserializer).map(|v| v as f32)
        }
    }

    pub mod double {
        use serde::{Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
            if value.is_finite() {
                serializer.serialize_f64(*value)
            } else {
                serializer.serialize_str(&value.to_string())
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            super::any_float(deserializer)
        }
    }

    fn any_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }
}

/// Error from tag tree navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("cannot descend into `{path}`: found {found}, expected compound")]
    NotACompound { path: String, found: &'static str },
}

/// A path of compound keys, e.g. `components/minecraft:custom_data`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TagPath {
    segments: Vec<String>,
}

impl TagPath {
    /// The empty path (the holder's root tag).
    pub fn root() -> Self {
        TagPath::default()
    }

    /// Build a path from segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TagPath {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Extend the path by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        TagPath { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn prefix(&self, len: usize) -> String {
        self.segments[..len].join("/")
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.segments.join("/"))
        }
    }
}
