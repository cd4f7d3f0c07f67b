//! Engine seam traits.
//!
//! - [`Connection`]: executes definition statements during replay
//! - [`CatalogReader`]: reads catalog metadata during export
//!
//! Catalog access is deliberately two-level: list the parent objects first,
//! then issue one scoped query per parent for its children. The exporter owns
//! the iteration, so a failing child query only affects its own parent.

use crate::error::Result;
use crate::typemap::TypeDescriptor;

use super::schema::{ColumnRecord, DomainRecord, ParameterDirection, ParameterRecord};

/// An open database connection able to run arbitrary statements.
///
/// Each call is one statement, committed independently by the engine.
pub trait Connection {
    /// Execute a single statement.
    fn execute(&mut self, sql: &str) -> Result<()>;
}

/// Read access to the user-defined part of the system catalog.
pub trait CatalogReader {
    /// Names of all user-defined domains, ordered by name.
    fn domain_names(&mut self) -> Result<Vec<String>>;

    /// One domain with its type and clauses, `None` when no such domain exists.
    fn domain(&mut self, name: &str) -> Result<Option<DomainRecord>>;

    /// Names of all user-defined tables (views excluded), ordered by name.
    fn table_names(&mut self) -> Result<Vec<String>>;

    /// Columns of one table, ordered by declared position.
    fn table_columns(&mut self, table: &str) -> Result<Vec<ColumnRecord>>;

    /// Names of all user-defined procedures, ordered by name.
    fn procedure_names(&mut self) -> Result<Vec<String>>;

    /// Parameters of one procedure in one direction, ordered by parameter number.
    fn procedure_parameters(
        &mut self,
        procedure: &str,
        direction: ParameterDirection,
    ) -> Result<Vec<ParameterRecord>>;

    /// Type of a field or domain by name, `None` when no such field exists.
    fn field_type(&mut self, field: &str) -> Result<Option<TypeDescriptor>>;

    /// Stored source text of a procedure, `None` when absent.
    fn procedure_source(&mut self, procedure: &str) -> Result<Option<String>>;
}
