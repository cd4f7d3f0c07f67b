//! Type mapping from Firebird catalog type descriptors to SQL type names.

use serde::{Deserialize, Serialize};

/// `RDB$FIELD_TYPE` codes understood by [`map_type`].
pub mod codes {
    pub const SMALLINT: i32 = 7;
    pub const INTEGER: i32 = 8;
    pub const FLOAT: i32 = 10;
    pub const DATE: i32 = 12;
    pub const TIME: i32 = 13;
    pub const CHAR: i32 = 14;
    pub const INT64: i32 = 16;
    pub const DOUBLE: i32 = 27;
    pub const TIMESTAMP: i32 = 35;
    pub const VARCHAR: i32 = 37;
    pub const BLOB: i32 = 261;
}

/// Numeric type descriptor of a field, column or parameter as the catalog reports it.
///
/// Catalog NULLs are read as 0. `code` is the discriminant; `char_length` only
/// matters for string types and `precision`/`scale` for exact numerics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// `RDB$FIELD_TYPE`.
    pub code: i32,
    /// `RDB$FIELD_LENGTH` (storage bytes).
    pub length: i32,
    /// `RDB$CHARACTER_LENGTH`.
    pub char_length: i32,
    /// `RDB$FIELD_PRECISION`.
    pub precision: i32,
    /// `RDB$FIELD_SCALE`, stored as a non-positive exponent.
    pub scale: i32,
}

impl TypeDescriptor {
    /// Descriptor with only a type code set.
    pub fn new(code: i32) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// Set the character length.
    pub fn with_char_length(mut self, char_length: i32) -> Self {
        self.char_length = char_length;
        self
    }

    /// Set the numeric precision and scale.
    pub fn with_numeric(mut self, precision: i32, scale: i32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Canonical SQL type text for this descriptor.
    pub fn sql_type(&self) -> String {
        map_type(self)
    }
}

/// Map a catalog type descriptor to its SQL type name.
///
/// Never fails: unknown codes produce `UNKNOWN_TYPE_<code>` so the surrounding
/// DDL can still be inspected.
pub fn map_type(desc: &TypeDescriptor) -> String {
    match desc.code {
        codes::SMALLINT => "SMALLINT".to_string(),
        codes::INTEGER => "INTEGER".to_string(),

        // A negative scale of magnitude s means s digits after the point
        codes::INT64 => {
            if desc.scale < 0 {
                format!("DECIMAL({},{})", desc.precision, desc.scale.abs())
            } else {
                "BIGINT".to_string()
            }
        }

        codes::CHAR => format!("CHAR({})", desc.char_length),
        codes::VARCHAR => format!("VARCHAR({})", desc.char_length),

        codes::FLOAT => "FLOAT".to_string(),
        codes::DOUBLE => "DOUBLE PRECISION".to_string(),

        codes::DATE => "DATE".to_string(),
        codes::TIME => "TIME".to_string(),
        codes::TIMESTAMP => "TIMESTAMP".to_string(),

        codes::BLOB => "BLOB".to_string(),

        other => format!("UNKNOWN_TYPE_{}", other),
    }
}
