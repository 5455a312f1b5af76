//! Typed property values exchanged with the runtime.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::types::{DataSource, Version};

/// Key/value parameters for object-typed properties (e.g. overlay view settings).
pub type ObjectMap = BTreeMap<String, String>;

/// Type tag of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropertyType {
    /// No parameter.
    None = 0,
    /// Parameter not applicable to this direction.
    NotApplicable = 1,
    /// Single byte.
    Byte = 2,
    /// Unsigned long.
    ULong = 3,
    /// Byte array.
    Array = 4,
    /// UTF-8 string.
    String = 5,
    /// Version structure.
    Version = 6,
    /// Data source structure.
    DataSource = 7,
    /// Enumeration structure.
    Enum = 8,
    /// Opaque object.
    Object = 9,
}

/// A property value: a tagged union over the runtime's parameter types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PropertyValue {
    /// No value.
    #[default]
    None,
    /// Single byte.
    Byte(u8),
    /// Unsigned long.
    ULong(u64),
    /// Byte array.
    Array(Bytes),
    /// String.
    String(String),
    /// Version structure.
    Version(Version),
    /// Data source structure.
    DataSource(DataSource),
    /// Opaque object parameters.
    Object(ObjectMap),
}

impl PropertyValue {
    /// Returns the type tag of this value.
    #[must_use]
    pub const fn kind(&self) -> PropertyType {
        match self {
            Self::None => PropertyType::None,
            Self::Byte(_) => PropertyType::Byte,
            Self::ULong(_) => PropertyType::ULong,
            Self::Array(_) => PropertyType::Array,
            Self::String(_) => PropertyType::String,
            Self::Version(_) => PropertyType::Version,
            Self::DataSource(_) => PropertyType::DataSource,
            Self::Object(_) => PropertyType::Object,
        }
    }

    /// Returns the byte value, if this is a byte.
    #[must_use]
    pub const fn as_byte(&self) -> Option<u8> {
        match self {
            Self::Byte(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the unsigned long value, if this is an unsigned long.
    #[must_use]
    pub const fn as_ulong(&self) -> Option<u64> {
        match self {
            Self::ULong(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Consumes the value, returning the string if this is a string.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Consumes the value, returning the bytes if this is an array.
    #[must_use]
    pub fn into_array(self) -> Option<Bytes> {
        match self {
            Self::Array(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the version, if this is a version.
    #[must_use]
    pub const fn as_version(&self) -> Option<Version> {
        match self {
            Self::Version(v) => Some(*v),
            _ => None,
        }
    }

    /// Consumes the value, returning the data source if this is one.
    #[must_use]
    pub fn into_data_source(self) -> Option<DataSource> {
        match self {
            Self::DataSource(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value, returning the object parameters if this is an object.
    #[must_use]
    pub fn into_object(self) -> Option<ObjectMap> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(PropertyValue::None.kind(), PropertyType::None);
        assert_eq!(PropertyValue::Byte(1).kind(), PropertyType::Byte);
        assert_eq!(PropertyValue::String("x".into()).kind(), PropertyType::String);
        assert_eq!(PropertyValue::Object(ObjectMap::new()).kind(), PropertyType::Object);
    }

    #[test]
    fn test_accessors_reject_other_variants() {
        let value = PropertyValue::ULong(7);
        assert_eq!(value.as_ulong(), Some(7));
        assert_eq!(value.as_byte(), None);
        assert_eq!(value.as_str(), None);
        assert!(value.into_string().is_none());
    }
}
