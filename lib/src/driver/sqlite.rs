//! SQLite driver. Accepts `jdbc:sqlite:<path>`, `sqlite:<path>` and `:memory:` targets and
//! opens database files read-only.

use super::{
    quote_ident, ColumnSchema, ConnectTarget, DatabaseSchema, Driver, ForeignKey, SelectQuery,
    SourceConnection, SqlValue, TableSchema,
};
use crate::errors::{Result, TransformError};
use crate::options::FetchSize;
use log::{debug, warn};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeMap;

const URL_PREFIXES: [&str; 2] = ["jdbc:sqlite:", "sqlite:"];

pub struct SqliteDriver;

impl SqliteDriver {
    /// Database path named by a connection string, `None` if the string is not for SQLite.
    pub fn database_path(url: &str) -> Option<&str> {
        let url = url.trim();
        if url == ":memory:" {
            return Some(url);
        }
        URL_PREFIXES
            .iter()
            .find_map(|prefix| url.strip_prefix(prefix))
            .map(|rest| rest.strip_prefix("//").unwrap_or(rest))
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn class_names(&self) -> &'static [&'static str] {
        &["org.sqlite.JDBC", "sqlite"]
    }

    fn accepts_url(&self, url: &str) -> bool {
        SqliteDriver::database_path(url).is_some()
    }

    fn connect(&self, target: &ConnectTarget) -> Result<Box<dyn SourceConnection>> {
        let path = SqliteDriver::database_path(&target.url)
            .ok_or_else(|| TransformError::DriverNotFound(target.url.clone()))?;
        if target.username.is_some() || target.password.is_some() {
            debug!("SQLite ignores credentials for {}", target.url);
        }
        let conn = if path.is_empty() || path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI,
            )
        }
        .map_err(|e| TransformError::Connectivity(format!("{}: {}", target.url, e)))?;
        Ok(Box::new(SqliteConnection { conn }))
    }
}

pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    /// Wraps an already open connection (used for in-process databases).
    pub fn from_connection(conn: Connection) -> Self {
        SqliteConnection { conn }
    }

    fn relations(&self) -> Result<Vec<(String, bool)>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type FROM sqlite_master \
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)? == "view"))
        })?;
        let mut relations = Vec::new();
        for row in rows {
            relations.push(row?);
        }
        Ok(relations)
    }

    fn columns(&self, table: &str) -> Result<(Vec<ColumnSchema>, Vec<String>)> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                row.get::<_, i64>(3)? != 0,
                row.get::<_, i64>(5)?,
            ))
        })?;
        let mut columns = Vec::new();
        let mut key: Vec<(i64, String)> = Vec::new();
        for row in rows {
            let (name, sql_type, not_null, pk) = row?;
            if pk > 0 {
                key.push((pk, name.clone()));
            }
            columns.push(ColumnSchema {
                name,
                sql_type,
                nullable: !not_null,
            });
        }
        key.sort();
        Ok((columns, key.into_iter().map(|(_, name)| name).collect()))
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA foreign_key_list({})", quote_ident(table)))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;
        // constraint id -> (seq, from, to)
        let mut grouped: BTreeMap<i64, (String, Vec<(i64, String, Option<String>)>)> =
            BTreeMap::new();
        for row in rows {
            let (id, seq, parent, from, to) = row?;
            grouped
                .entry(id)
                .or_insert_with(|| (parent, Vec::new()))
                .1
                .push((seq, from, to));
        }
        let mut keys = Vec::new();
        for (_, (parent, mut pairs)) in grouped {
            pairs.sort_by_key(|(seq, _, _)| *seq);
            let implicit = pairs.iter().any(|(_, _, to)| to.is_none());
            keys.push(ForeignKey {
                columns: pairs.iter().map(|(_, from, _)| from.clone()).collect(),
                referenced_table: parent,
                referenced_columns: if implicit {
                    vec![]
                } else {
                    pairs.into_iter().filter_map(|(_, _, to)| to).collect()
                },
            });
        }
        Ok(keys)
    }
}

impl SourceConnection for SqliteConnection {
    fn driver_name(&self) -> &'static str {
        "sqlite"
    }

    fn reflect_schema(&mut self) -> Result<DatabaseSchema> {
        let mut schema = DatabaseSchema::default();
        for (name, is_view) in self.relations()? {
            let (columns, primary_key) = self.columns(&name)?;
            let foreign_keys = if is_view { vec![] } else { self.foreign_keys(&name)? };
            debug!(
                "Reflected {} {} ({} columns, key {:?})",
                if is_view { "view" } else { "table" },
                name,
                columns.len(),
                primary_key
            );
            schema.tables.push(TableSchema {
                name,
                is_view,
                columns,
                primary_key,
                foreign_keys,
            });
        }
        // constraints that name no parent columns point at the parent's primary key
        let keys: BTreeMap<String, Vec<String>> = schema
            .tables
            .iter()
            .map(|t| (t.name.clone(), t.primary_key.clone()))
            .collect();
        for table in schema.tables.iter_mut() {
            for fk in table.foreign_keys.iter_mut() {
                if fk.referenced_columns.is_empty() {
                    match keys.get(&fk.referenced_table) {
                        Some(pk) if pk.len() == fk.columns.len() => {
                            fk.referenced_columns = pk.clone()
                        }
                        _ => warn!(
                            "Foreign key {}({}) refers to {} without a matching primary key",
                            table.name,
                            fk.columns.join(", "),
                            fk.referenced_table
                        ),
                    }
                }
            }
        }
        Ok(schema)
    }

    fn stream_rows(
        &mut self,
        query: &SelectQuery,
        fetch_size: FetchSize,
        sink: &mut dyn FnMut(&[SqlValue]) -> Result<()>,
    ) -> Result<u64> {
        let sql = query.to_sql();
        debug!("Executing [{}] with fetch size {}", sql, fetch_size);
        let mut stmt = self.conn.prepare(&sql)?;
        let width = stmt.column_count();
        let batch_len = fetch_size.batch_len();
        let mut batch: Vec<Vec<SqlValue>> = Vec::with_capacity(batch_len.min(4096));
        let mut count = 0u64;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(to_sql_value(row.get_ref(i)?));
            }
            batch.push(values);
            count += 1;
            if batch.len() >= batch_len {
                for values in batch.drain(..) {
                    sink(&values)?;
                }
            }
        }
        for values in batch.drain(..) {
            sink(&values)?;
        }
        debug!("Read {} rows from {}", count, query.table);
        Ok(count)
    }
}

fn to_sql_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(f) => SqlValue::Real(f),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SqliteConnection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Dept (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE Emp (id INTEGER PRIMARY KEY, name TEXT, dept INTEGER REFERENCES Dept);
             CREATE TABLE Link (a INTEGER, b INTEGER, PRIMARY KEY (b, a));
             CREATE VIEW EmpNames AS SELECT name FROM Emp;
             INSERT INTO Dept VALUES (1, 'R&D'), (2, 'Sales');
             INSERT INTO Emp VALUES (10, 'Ann', 1), (11, NULL, 2), (12, 'Bob', NULL);",
        )
        .unwrap();
        SqliteConnection::from_connection(conn)
    }

    #[test]
    fn test_database_path() {
        assert_eq!(SqliteDriver::database_path("jdbc:sqlite:/tmp/a.db"), Some("/tmp/a.db"));
        assert_eq!(SqliteDriver::database_path("sqlite://data.db"), Some("data.db"));
        assert_eq!(SqliteDriver::database_path("jdbc:mysql://h/db"), None);
        assert_eq!(SqliteDriver::database_path(" :memory: "), Some(":memory:"));
    }

    #[test]
    fn test_bare_memory_target() {
        let target = ConnectTarget {
            url: ":memory:".into(),
            ..Default::default()
        };
        assert!(SqliteDriver.accepts_url(&target.url));
        let mut conn = SqliteDriver.connect(&target).unwrap();
        assert!(conn.reflect_schema().unwrap().tables.is_empty());
    }

    #[test]
    fn test_reflect_schema() {
        let mut conn = sample();
        let schema = conn.reflect_schema().unwrap();
        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Dept", "Emp", "EmpNames", "Link"]);

        let emp = schema.table("Emp").unwrap();
        assert_eq!(emp.primary_key, vec!["id"]);
        assert_eq!(emp.foreign_keys.len(), 1);
        assert_eq!(emp.foreign_keys[0].referenced_table, "Dept");
        assert_eq!(emp.foreign_keys[0].referenced_columns, vec!["id"]);

        let link = schema.table("Link").unwrap();
        assert_eq!(link.primary_key, vec!["b", "a"]);

        let view = schema.table("EmpNames").unwrap();
        assert!(view.is_view);
        assert!(view.primary_key.is_empty());
    }

    #[test]
    fn test_stream_rows_in_batches() {
        let mut conn = sample();
        let query = SelectQuery {
            table: "Emp".into(),
            columns: vec!["id".into(), "name".into()],
            limit: None,
        };
        let mut seen = Vec::new();
        let count = conn
            .stream_rows(&query, FetchSize::Rows(2), &mut |row| {
                seen.push(row.to_vec());
                Ok(())
            })
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(seen[1][1], SqlValue::Null);

        let mut streamed = 0;
        conn.stream_rows(&query, FetchSize::Streaming, &mut |_| {
            streamed += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(streamed, 3);
    }

    #[test]
    fn test_sink_error_aborts() {
        let mut conn = sample();
        let query = SelectQuery {
            table: "Dept".into(),
            columns: vec![],
            limit: None,
        };
        let result = conn.stream_rows(&query, FetchSize::Streaming, &mut |_| {
            Err(TransformError::Query("stop".into()))
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_connectivity_error() {
        let target = ConnectTarget {
            url: "jdbc:sqlite:/definitely/not/here.db".into(),
            ..Default::default()
        };
        match SqliteDriver.connect(&target) {
            Err(TransformError::Connectivity(msg)) => assert!(msg.contains("not/here.db")),
            _ => panic!("expected a connectivity error"),
        }
    }
}
