// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Field and primitive type descriptions consumed by the schema compiler.
//!
//! A datatype catalog maps record-type names to ordered field lists. Field
//! types arrive as strings (the catalog is typically exchanged as JSON);
//! resolution to [`PrimitiveType`] happens during compilation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Type alias for a full datatype catalog: record-type name -> ordered fields.
pub type DatatypeCatalog = HashMap<String, Vec<FieldSpec>>;

/// One field of a record-type definition, as supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Type name: a primitive ("float64", "string", ...) or another
    /// record-type name registered in the same catalog
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether the field is an array of the base type
    #[serde(default)]
    pub is_array: bool,
    /// Fixed element count for static arrays; `None` means the count is
    /// read from the stream at decode time
    #[serde(default)]
    pub array_length: Option<usize>,
    /// Constant fields carry no on-wire data and are excluded from the
    /// read program
    #[serde(default)]
    pub is_constant: bool,
}

impl FieldSpec {
    /// Create a scalar (non-array, non-constant) field.
    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_array: false,
            array_length: None,
            is_constant: false,
        }
    }

    /// Create a dynamic-length array field.
    pub fn dynamic_array(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_array: true,
            array_length: None,
            is_constant: false,
        }
    }

    /// Create a fixed-length array field.
    pub fn fixed_array(name: impl Into<String>, type_name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_array: true,
            array_length: Some(len),
            is_constant: false,
        }
    }

    /// Create a constant field (excluded from the read program).
    pub fn constant(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_array: false,
            array_length: None,
            is_constant: true,
        }
    }
}

/// Primitive field types with a known wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// Boolean
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Length-prefixed UTF-8 string
    String,
    /// Byte (alias for UInt8)
    Byte,
}

impl PrimitiveType {
    /// Get the size in bytes for this primitive type, if fixed.
    pub const fn size(self) -> Option<usize> {
        match self {
            PrimitiveType::Bool => Some(1),
            PrimitiveType::Int8 | PrimitiveType::UInt8 | PrimitiveType::Byte => Some(1),
            PrimitiveType::Int16 | PrimitiveType::UInt16 => Some(2),
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float32 => Some(4),
            PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Float64 => Some(8),
            PrimitiveType::String => None, // Variable length
        }
    }

    /// Check if this primitive occupies a single byte on the wire.
    pub const fn is_single_byte(self) -> bool {
        matches!(
            self,
            PrimitiveType::Bool | PrimitiveType::Int8 | PrimitiveType::UInt8 | PrimitiveType::Byte
        )
    }

    /// Parse a primitive type from a catalog type string.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(PrimitiveType::Bool),
            "int8" => Some(PrimitiveType::Int8),
            "int16" => Some(PrimitiveType::Int16),
            "int32" => Some(PrimitiveType::Int32),
            "int64" => Some(PrimitiveType::Int64),
            "uint8" => Some(PrimitiveType::UInt8),
            "uint16" => Some(PrimitiveType::UInt16),
            "uint32" => Some(PrimitiveType::UInt32),
            "uint64" => Some(PrimitiveType::UInt64),
            "float32" => Some(PrimitiveType::Float32),
            "float64" => Some(PrimitiveType::Float64),
            "string" => Some(PrimitiveType::String),
            "byte" | "char" => Some(PrimitiveType::Byte),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrimitiveType::Bool => write!(f, "bool"),
            PrimitiveType::Int8 => write!(f, "int8"),
            PrimitiveType::Int16 => write!(f, "int16"),
            PrimitiveType::Int32 => write!(f, "int32"),
            PrimitiveType::Int64 => write!(f, "int64"),
            PrimitiveType::UInt8 => write!(f, "uint8"),
            PrimitiveType::UInt16 => write!(f, "uint16"),
            PrimitiveType::UInt32 => write!(f, "uint32"),
            PrimitiveType::UInt64 => write!(f, "uint64"),
            PrimitiveType::Float32 => write!(f, "float32"),
            PrimitiveType::Float64 => write!(f, "float64"),
            PrimitiveType::String => write!(f, "string"),
            PrimitiveType::Byte => write!(f, "byte"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_type_from_str() {
        assert_eq!(
            PrimitiveType::try_from_str("int32"),
            Some(PrimitiveType::Int32)
        );
        assert_eq!(
            PrimitiveType::try_from_str("float64"),
            Some(PrimitiveType::Float64)
        );
        assert_eq!(
            PrimitiveType::try_from_str("char"),
            Some(PrimitiveType::Byte)
        );
        assert_eq!(PrimitiveType::try_from_str("quaternion"), None);
    }

    #[test]
    fn test_primitive_type_size() {
        assert_eq!(PrimitiveType::Bool.size(), Some(1));
        assert_eq!(PrimitiveType::Int16.size(), Some(2));
        assert_eq!(PrimitiveType::Float32.size(), Some(4));
        assert_eq!(PrimitiveType::UInt64.size(), Some(8));
        assert_eq!(PrimitiveType::String.size(), None);
    }

    #[test]
    fn test_primitive_type_single_byte() {
        assert!(PrimitiveType::UInt8.is_single_byte());
        assert!(PrimitiveType::Byte.is_single_byte());
        assert!(PrimitiveType::Bool.is_single_byte());
        assert!(!PrimitiveType::Int16.is_single_byte());
        assert!(!PrimitiveType::String.is_single_byte());
    }

    #[test]
    fn test_primitive_type_display_round_trip() {
        for prim in [
            PrimitiveType::Bool,
            PrimitiveType::Int64,
            PrimitiveType::Float64,
            PrimitiveType::String,
            PrimitiveType::Byte,
        ] {
            assert_eq!(PrimitiveType::try_from_str(&prim.to_string()), Some(prim));
        }
    }

    #[test]
    fn test_field_spec_constructors() {
        let f = FieldSpec::scalar("x", "float64");
        assert!(!f.is_array);
        assert!(!f.is_constant);
        assert_eq!(f.array_length, None);

        let f = FieldSpec::fixed_array("covariance", "float64", 9);
        assert!(f.is_array);
        assert_eq!(f.array_length, Some(9));

        let f = FieldSpec::dynamic_array("ranges", "float32");
        assert!(f.is_array);
        assert_eq!(f.array_length, None);

        let f = FieldSpec::constant("VERSION", "uint8");
        assert!(f.is_constant);
    }

    #[test]
    fn test_field_spec_from_json() {
        let json = r#"{"name": "frame_id", "type": "string"}"#;
        let field: FieldSpec = serde_json::from_str(json).unwrap();
        assert_eq!(field.name, "frame_id");
        assert_eq!(field.type_name, "string");
        assert!(!field.is_array);
        assert!(!field.is_constant);
        assert_eq!(field.array_length, None);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "sensors/Temp": [
                {"name": "stamp", "type": "uint64"},
                {"name": "celsius", "type": "float32"},
                {"name": "samples", "type": "float32", "is_array": true}
            ]
        }"#;
        let catalog: DatatypeCatalog = serde_json::from_str(json).unwrap();
        let fields = &catalog["sensors/Temp"];
        assert_eq!(fields.len(), 3);
        assert!(fields[2].is_array);
    }
}
