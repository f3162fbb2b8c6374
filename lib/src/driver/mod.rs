//! Relational source access: schema reflection and row cursors behind the [`Driver`] and
//! [`SourceConnection`] traits, plus the registry that picks a driver for a connection string.

pub mod quirks;
pub mod sqlite;

use crate::errors::{Result, TransformError};
use crate::options::FetchSize;
use crate::params::ConnectionParameters;
use log::{debug, info};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    /// Declared SQL type, as the database reports it.
    pub sql_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub referenced_table: String,
    /// Empty when the constraint refers to the parent's primary key implicitly.
    pub referenced_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub is_view: bool,
    pub columns: Vec<ColumnSchema>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseSchema {
    pub tables: Vec<TableSchema>,
}

impl DatabaseSchema {
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// One cell of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Lexical form of the value; `None` for NULL.
    pub fn lexical(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Integer(i) => Some(i.to_string()),
            SqlValue::Real(f) => Some(f.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Blob(b) => Some(b.iter().map(|byte| format!("{:02X}", byte)).collect()),
        }
    }
}

/// A plain projection of some columns of one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Vec<String>,
    pub limit: Option<u64>,
}

impl SelectQuery {
    pub fn to_sql(&self) -> String {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut sql = format!("SELECT {} FROM {}", columns, quote_ident(&self.table));
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }
}

/// Quotes an SQL identifier with double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Everything needed to open one source database.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectTarget {
    pub url: String,
    pub driver_class: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectTarget {
    pub fn from_parameters(params: &ConnectionParameters) -> Result<Self> {
        let url = params.connection_string().ok_or_else(|| {
            TransformError::invalid_parameter("connection_string", "no connection string given")
        })?;
        Ok(ConnectTarget {
            url: url.to_string(),
            driver_class: params.driver_class.clone(),
            username: params.username.clone(),
            password: params.password.clone(),
        })
    }
}

impl fmt::Debug for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectTarget")
            .field("url", &self.url)
            .field("driver_class", &self.driver_class)
            .field("username", &self.username)
            .finish()
    }
}

/// An open connection. Cursors opened through it are closed before each call returns.
pub trait SourceConnection {
    fn driver_name(&self) -> &'static str;

    /// Reads tables and views with their columns, primary and foreign keys.
    fn reflect_schema(&mut self) -> Result<DatabaseSchema>;

    /// Runs the query and feeds every row to `sink`, buffering `fetch_size` rows per batch.
    /// Returns the number of rows read.
    fn stream_rows(
        &mut self,
        query: &SelectQuery,
        fetch_size: FetchSize,
        sink: &mut dyn FnMut(&[SqlValue]) -> Result<()>,
    ) -> Result<u64>;
}

pub trait Driver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Driver class names this driver answers to.
    fn class_names(&self) -> &'static [&'static str];

    fn accepts_url(&self, url: &str) -> bool;

    fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn SourceConnection>>;
}

/// The drivers available to an export.
pub struct DriverRegistry {
    drivers: Vec<Box<dyn Driver>>,
}

impl Default for DriverRegistry {
    fn default() -> Self {
        DriverRegistry {
            drivers: vec![Box::new(sqlite::SqliteDriver)],
        }
    }
}

impl DriverRegistry {
    pub fn empty() -> Self {
        DriverRegistry { drivers: vec![] }
    }

    pub fn register(&mut self, driver: Box<dyn Driver>) {
        self.drivers.push(driver);
    }

    pub fn driver_names(&self) -> Vec<&'static str> {
        self.drivers.iter().map(|d| d.name()).collect()
    }

    /// Finds the driver for a target: by class name when one is given, and it has to accept
    /// the connection string either way.
    pub fn find(&self, target: &ConnectTarget) -> Result<&dyn Driver> {
        if let Some(class) = target.driver_class.as_deref().filter(|c| !c.trim().is_empty()) {
            let driver = self
                .drivers
                .iter()
                .find(|d| d.class_names().iter().any(|n| n.eq_ignore_ascii_case(class.trim())))
                .ok_or_else(|| TransformError::DriverNotFound(format!("driver class {}", class)))?;
            if !driver.accepts_url(&target.url) {
                return Err(TransformError::DriverNotFound(format!(
                    "driver {} does not accept {}",
                    class, target.url
                )));
            }
            return Ok(driver.as_ref());
        }
        self.drivers
            .iter()
            .find(|d| d.accepts_url(&target.url))
            .map(|d| d.as_ref())
            .ok_or_else(|| TransformError::DriverNotFound(target.url.clone()))
    }

    pub fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn SourceConnection>> {
        let driver = self.find(target)?;
        debug!("Using driver {} for {}", driver.name(), target.url);
        let conn = driver.connect(target)?;
        info!("Connected to {}", target.url);
        Ok(conn)
    }
}
