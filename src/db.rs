use crate::error::LoadError;
use crate::types::{Value, TIMESTAMP_FORMAT};
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::info;

/// Where a destination connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Memory,
    File(PathBuf),
}

impl Destination {
    /// Accepts SQLAlchemy-style SQLite URIs (`sqlite://`, `sqlite:///rel.db`,
    /// `sqlite:////abs.db`) and bare file paths.
    pub fn parse(uri: &str) -> Result<Self, LoadError> {
        let uri = uri.trim();

        if let Some(rest) = uri.strip_prefix("sqlite://") {
            return match rest {
                "" | "/:memory:" | ":memory:" => Ok(Destination::Memory),
                _ => match rest.strip_prefix('/') {
                    Some(path) if !path.is_empty() => Ok(Destination::File(PathBuf::from(path))),
                    _ => Err(LoadError::UnsupportedDestination(uri.to_string())),
                },
            };
        }

        if uri.is_empty() || uri.contains("://") {
            return Err(LoadError::UnsupportedDestination(uri.to_string()));
        }
        if uri == ":memory:" {
            return Ok(Destination::Memory);
        }
        Ok(Destination::File(PathBuf::from(uri)))
    }

    pub fn open(&self) -> Result<Connection, LoadError> {
        let conn = match self {
            Destination::Memory => Connection::open_in_memory()?,
            Destination::File(path) => {
                info!("Connecting to SQLite database at {}", path.display());
                Connection::open(path)?
            }
        };
        Ok(conn)
    }
}

/// Double-quotes an identifier for SQLite.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(r) => ToSqlOutput::from(*r),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Timestamp(ts) => ToSqlOutput::from(ts.format(TIMESTAMP_FORMAT).to_string()),
        })
    }
}
