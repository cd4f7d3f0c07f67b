//! Firebird driver over `rsfbclient`'s pure-Rust wire client.
//!
//! Every `execute`/`query` on an `rsfbclient` connection runs in its own
//! transaction that commits on success, which gives the per-statement
//! auto-commit the replay engine relies on.

use rsfbclient::prelude::*;
use tracing::{debug, info};

use crate::config::{validate_connection, ConnectionConfig};
use crate::core::{ColumnRecord, DomainRecord, ParameterDirection, ParameterRecord};
use crate::error::{MetaError, Result};
use crate::typemap::TypeDescriptor;

const DOMAIN_NAMES_SQL: &str = r#"
    SELECT rf.RDB$FIELD_NAME
    FROM RDB$FIELDS rf
    WHERE COALESCE(rf.RDB$SYSTEM_FLAG, 0) = 0
      AND rf.RDB$FIELD_NAME NOT LIKE 'RDB$%'
      AND rf.RDB$FIELD_NAME NOT LIKE 'SEC$%'
    ORDER BY rf.RDB$FIELD_NAME
"#;

const DOMAIN_SQL: &str = r#"
    SELECT
        rf.RDB$FIELD_TYPE,
        rf.RDB$FIELD_LENGTH,
        rf.RDB$CHARACTER_LENGTH,
        rf.RDB$FIELD_PRECISION,
        rf.RDB$FIELD_SCALE,
        rf.RDB$DEFAULT_SOURCE,
        rf.RDB$VALIDATION_SOURCE
    FROM RDB$FIELDS rf
    WHERE rf.RDB$FIELD_NAME = ?
"#;

const TABLES_SQL: &str = r#"
    SELECT RDB$RELATION_NAME
    FROM RDB$RELATIONS
    WHERE COALESCE(RDB$SYSTEM_FLAG, 0) = 0
      AND RDB$VIEW_BLR IS NULL
    ORDER BY RDB$RELATION_NAME
"#;

const COLUMNS_SQL: &str = r#"
    SELECT
        rf.RDB$FIELD_NAME,
        f.RDB$FIELD_TYPE,
        f.RDB$FIELD_LENGTH,
        f.RDB$CHARACTER_LENGTH,
        f.RDB$FIELD_PRECISION,
        f.RDB$FIELD_SCALE,
        rf.RDB$NULL_FLAG
    FROM RDB$RELATION_FIELDS rf
    JOIN RDB$FIELDS f ON f.RDB$FIELD_NAME = rf.RDB$FIELD_SOURCE
    WHERE rf.RDB$RELATION_NAME = ?
    ORDER BY rf.RDB$FIELD_POSITION
"#;

const PROCEDURES_SQL: &str = r#"
    SELECT RDB$PROCEDURE_NAME
    FROM RDB$PROCEDURES
    WHERE COALESCE(RDB$SYSTEM_FLAG, 0) = 0
    ORDER BY RDB$PROCEDURE_NAME
"#;

const PARAMETERS_SQL: &str = r#"
    SELECT RDB$PARAMETER_NAME, RDB$FIELD_SOURCE
    FROM RDB$PROCEDURE_PARAMETERS
    WHERE RDB$PROCEDURE_NAME = ?
      AND RDB$PARAMETER_TYPE = ?
    ORDER BY RDB$PARAMETER_NUMBER
"#;

const FIELD_TYPE_SQL: &str = r#"
    SELECT
        RDB$FIELD_TYPE,
        RDB$FIELD_LENGTH,
        RDB$CHARACTER_LENGTH,
        RDB$FIELD_PRECISION,
        RDB$FIELD_SCALE
    FROM RDB$FIELDS
    WHERE RDB$FIELD_NAME = ?
"#;

const SOURCE_SQL: &str = r#"
    SELECT RDB$PROCEDURE_SOURCE
    FROM RDB$PROCEDURES
    WHERE RDB$PROCEDURE_NAME = ?
"#;

type TypeColumns = (Option<i64>, Option<i64>, Option<i64>, Option<i64>, Option<i64>);

fn descriptor((code, length, char_length, precision, scale): TypeColumns) -> Result<TypeDescriptor> {
    Ok(TypeDescriptor {
        code: small(code, "RDB$FIELD_TYPE")?,
        length: small(length, "RDB$FIELD_LENGTH")?,
        char_length: small(char_length, "RDB$CHARACTER_LENGTH")?,
        precision: small(precision, "RDB$FIELD_PRECISION")?,
        scale: small(scale, "RDB$FIELD_SCALE")?,
    })
}

/// Catalog SMALLINTs, NULL read as 0.
fn small(value: Option<i64>, column: &str) -> Result<i32> {
    let value = value.unwrap_or(0);
    i32::try_from(value)
        .map_err(|_| MetaError::Engine(format!("{} value {} out of range", column, value)))
}

/// Catalog names are CHAR columns padded with spaces.
fn name(value: String) -> String {
    value.trim_end().to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Open Firebird connection implementing both engine traits.
pub struct FirebirdConnection<T> {
    inner: T,
}

impl<T> FirebirdConnection<T>
where
    T: Execute + Queryable,
{
    /// Wrap an already-open `rsfbclient` connection.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

/// Connect to an existing database.
pub fn connect(config: &ConnectionConfig) -> Result<FirebirdConnection<impl Execute + Queryable>> {
    validate_connection(config)?;

    let conn = rsfbclient::builder_pure_rust()
        .host(config.host.as_str())
        .port(config.port)
        .db_name(config.database.as_str())
        .user(config.user.as_str())
        .pass(config.password.as_str())
        .connect()
        .map_err(|e| MetaError::Connection(e.to_string()))?;

    info!(
        "Connected to Firebird: {}:{}/{}",
        config.host, config.port, config.database
    );
    Ok(FirebirdConnection::new(conn))
}

/// Create an empty database and return a connection to it.
pub fn create_database(
    config: &ConnectionConfig,
) -> Result<FirebirdConnection<impl Execute + Queryable>> {
    validate_connection(config)?;

    let conn = rsfbclient::builder_pure_rust()
        .host(config.host.as_str())
        .port(config.port)
        .db_name(config.database.as_str())
        .user(config.user.as_str())
        .pass(config.password.as_str())
        .create_database()
        .map_err(|e| MetaError::Connection(e.to_string()))?;

    info!("Created database: {}", config.database);
    Ok(FirebirdConnection::new(conn))
}

impl<T> crate::core::Connection for FirebirdConnection<T>
where
    T: Execute + Queryable,
{
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.inner.execute(sql, ())?;
        Ok(())
    }
}

impl<T> crate::core::CatalogReader for FirebirdConnection<T>
where
    T: Execute + Queryable,
{
    fn domain_names(&mut self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = self.inner.query(DOMAIN_NAMES_SQL, ())?;
        debug!("Catalog returned {} domains", rows.len());
        Ok(rows.into_iter().map(|(n,)| name(n)).collect())
    }

    fn domain(&mut self, domain: &str) -> Result<Option<DomainRecord>> {
        type Row = (
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<String>,
            Option<String>,
        );

        let row: Option<Row> = self.inner.query_first(DOMAIN_SQL, (domain.to_string(),))?;
        row.map(
            |(code, length, char_length, precision, scale, default, check)| -> Result<DomainRecord> {
                Ok(DomainRecord {
                    name: domain.to_string(),
                    field_type: descriptor((code, length, char_length, precision, scale))?,
                    default_source: non_empty(default),
                    check_source: non_empty(check),
                })
            },
        )
        .transpose()
    }

    fn table_names(&mut self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = self.inner.query(TABLES_SQL, ())?;
        Ok(rows.into_iter().map(|(n,)| name(n)).collect())
    }

    fn table_columns(&mut self, table: &str) -> Result<Vec<ColumnRecord>> {
        type Row = (
            String,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<i64>,
        );

        let rows: Vec<Row> = self.inner.query(COLUMNS_SQL, (table.to_string(),))?;
        rows.into_iter()
            .map(
                |(col_name, code, length, char_length, precision, scale, null_flag)| -> Result<ColumnRecord> {
                    Ok(ColumnRecord::new(
                        name(col_name),
                        descriptor((code, length, char_length, precision, scale))?,
                        null_flag == Some(1),
                    ))
                },
            )
            .collect()
    }

    fn procedure_names(&mut self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = self.inner.query(PROCEDURES_SQL, ())?;
        Ok(rows.into_iter().map(|(n,)| name(n)).collect())
    }

    fn procedure_parameters(
        &mut self,
        procedure: &str,
        direction: ParameterDirection,
    ) -> Result<Vec<ParameterRecord>> {
        let rows: Vec<(String, String)> = self.inner.query(
            PARAMETERS_SQL,
            (procedure.to_string(), direction.catalog_code()),
        )?;
        Ok(rows
            .into_iter()
            .map(|(param, source)| ParameterRecord::new(name(param), name(source)))
            .collect())
    }

    fn field_type(&mut self, field: &str) -> Result<Option<TypeDescriptor>> {
        let row: Option<TypeColumns> = self
            .inner
            .query_first(FIELD_TYPE_SQL, (field.to_string(),))?;
        row.map(descriptor).transpose()
    }

    fn procedure_source(&mut self, procedure: &str) -> Result<Option<String>> {
        let row: Option<(Option<String>,)> = self
            .inner
            .query_first(SOURCE_SQL, (procedure.to_string(),))?;
        Ok(row.and_then(|(source,)| non_empty(source)))
    }
}
