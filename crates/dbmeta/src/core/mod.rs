//! Core abstractions shared by export and replay.
//!
//! - [`schema`]: catalog records (domains, columns, procedure parameters)
//! - [`traits`]: the engine seam, [`Connection`] for replay and
//!   [`CatalogReader`] for export
//!
//! Drivers (`drivers::firebird`) implement both traits against a live engine;
//! tests implement them with in-memory doubles.

pub mod schema;
pub mod traits;

pub use schema::{ColumnRecord, DomainRecord, ParameterDirection, ParameterRecord};
pub use traits::{CatalogReader, Connection};
