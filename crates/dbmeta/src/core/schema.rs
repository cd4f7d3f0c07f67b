//! Catalog metadata records.

use serde::{Deserialize, Serialize};

use crate::typemap::TypeDescriptor;

/// User-defined domain as read from `RDB$FIELDS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Domain name (trimmed).
    pub name: String,

    /// Underlying type.
    pub field_type: TypeDescriptor,

    /// Default clause source, e.g. `DEFAULT 0`.
    pub default_source: Option<String>,

    /// Validation clause source, e.g. `CHECK (VALUE > 0)`.
    pub check_source: Option<String>,
}

/// Table column as read from `RDB$RELATION_FIELDS` joined to `RDB$FIELDS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRecord {
    /// Column name (trimmed).
    pub name: String,

    /// Resolved type of the column's field source.
    pub field_type: TypeDescriptor,

    /// Whether the column is declared NOT NULL.
    pub not_null: bool,
}

impl ColumnRecord {
    pub fn new(name: impl Into<String>, field_type: TypeDescriptor, not_null: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            not_null,
        }
    }
}

/// Direction of a procedure parameter (`RDB$PARAMETER_TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterDirection {
    /// Input parameter (catalog value 0).
    In,
    /// Output parameter returned to the caller (catalog value 1).
    Out,
}

impl ParameterDirection {
    /// Catalog encoding of this direction.
    pub fn catalog_code(self) -> i32 {
        match self {
            ParameterDirection::In => 0,
            ParameterDirection::Out => 1,
        }
    }
}

/// Procedure parameter as read from `RDB$PROCEDURE_PARAMETERS`.
///
/// The type is not stored on the parameter itself; it lives on the field
/// named by `field_source` and is resolved with a separate lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    /// Parameter name (trimmed).
    pub name: String,

    /// Name of the backing field or domain.
    pub field_source: String,
}

impl ParameterRecord {
    pub fn new(name: impl Into<String>, field_source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_source: field_source.into(),
        }
    }
}
