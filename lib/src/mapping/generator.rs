//! Generates a mapping from a reflected relational schema.
//!
//! Every table or view becomes a class map whose subjects are identified by the primary key,
//! every plain column a datatype property and every foreign key an object property.

use super::{
    ClassMap, ColumnRef, Database, Join, Mapping, MappingOrigin, PatternPart, PropertyBridge,
    SubjectSource, TermSource, UriPattern,
};
use crate::consts::{
    D2RQ_NS, LABEL, XSD_BOOLEAN, XSD_DATE, XSD_DATE_TIME, XSD_DECIMAL, XSD_DOUBLE, XSD_INTEGER,
};
use crate::driver::{ConnectTarget, DatabaseSchema, DriverRegistry, ForeignKey, TableSchema};
use crate::errors::Result;
use crate::namespaces::NamespaceSet;
use crate::params::ConnectionParameters;
use crate::util::iri_escape;
use log::{info, warn};
use std::collections::BTreeSet;

/// Broad value category of an SQL column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Decimal,
    Double,
    Boolean,
    Date,
    DateTime,
    Text,
    Binary,
    Unsupported,
}

impl ColumnKind {
    /// XSD datatype of literals for this kind. Text maps to plain literals.
    pub fn datatype(self) -> Option<&'static str> {
        match self {
            ColumnKind::Integer => Some(XSD_INTEGER.as_str()),
            ColumnKind::Decimal => Some(XSD_DECIMAL.as_str()),
            ColumnKind::Double => Some(XSD_DOUBLE.as_str()),
            ColumnKind::Boolean => Some(XSD_BOOLEAN.as_str()),
            ColumnKind::Date => Some(XSD_DATE.as_str()),
            ColumnKind::DateTime => Some(XSD_DATE_TIME.as_str()),
            ColumnKind::Text | ColumnKind::Binary | ColumnKind::Unsupported => None,
        }
    }
}

/// Classifies a declared SQL type such as `VARCHAR(40)` or `NUMERIC(10,2)`.
pub fn column_kind(sql_type: &str) -> ColumnKind {
    let upper = sql_type.trim().to_ascii_uppercase();
    let base = upper.split('(').next().unwrap_or("").trim();
    if base.is_empty() {
        // SQLite lets columns go untyped
        return ColumnKind::Text;
    }
    if base.contains("BOOL") || base == "BIT" {
        ColumnKind::Boolean
    } else if base.contains("INT") || base.ends_with("SERIAL") {
        ColumnKind::Integer
    } else if base.contains("DEC") || base.contains("NUMERIC") || base == "MONEY" {
        ColumnKind::Decimal
    } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
        ColumnKind::Double
    } else if base.contains("TIMESTAMP") || base.contains("DATETIME") {
        ColumnKind::DateTime
    } else if base == "DATE" {
        ColumnKind::Date
    } else if base.contains("CHAR")
        || base.contains("TEXT")
        || base.contains("CLOB")
        || base.contains("STRING")
        || base == "UUID"
        || base == "TIME"
    {
        ColumnKind::Text
    } else if base.contains("BLOB") || base.contains("BINARY") || base == "BYTEA" || base == "IMAGE" || base.ends_with("RAW") {
        ColumnKind::Binary
    } else {
        ColumnKind::Unsupported
    }
}

/// Connects with `params`, reflects the schema and builds the mapping for it.
pub fn generate_mapping(
    params: &ConnectionParameters,
    base_uri: &str,
    registry: &DriverRegistry,
) -> Result<Mapping> {
    let target = ConnectTarget::from_parameters(params)?;
    let schema = {
        let mut conn = registry.connect(&target)?;
        conn.reflect_schema()?
    };
    info!("Reflected {} relations", schema.tables.len());
    Ok(mapping_from_schema(&schema, params, base_uri))
}

struct Generator<'a> {
    schema: &'a DatabaseSchema,
    namespaces: NamespaceSet,
    database_id: String,
    warnings: Vec<String>,
}

/// Builds the mapping for an already reflected schema.
pub fn mapping_from_schema(
    schema: &DatabaseSchema,
    params: &ConnectionParameters,
    base_uri: &str,
) -> Mapping {
    let namespaces = NamespaceSet::generated(base_uri);
    let database = Database {
        id: format!("{}database", namespaces.map_namespace),
        jdbc_dsn: params.connection_string().map(str::to_string),
        jdbc_driver: params.driver_class.clone(),
        username: params.username.clone(),
        password: params.password.clone(),
        fetch_size: None,
        result_size_limit: None,
    };
    let mut generator = Generator {
        schema,
        database_id: database.id.clone(),
        namespaces,
        warnings: Vec::new(),
    };
    let class_maps = schema
        .tables
        .iter()
        .filter_map(|table| generator.class_map(table))
        .collect();
    let prefixes = vec![
        ("map".to_string(), generator.namespaces.map_namespace.clone()),
        ("vocab".to_string(), generator.namespaces.vocabulary_namespace.clone()),
        ("d2rq".to_string(), D2RQ_NS.to_string()),
    ];
    Mapping {
        origin: MappingOrigin::Generated,
        namespaces: generator.namespaces,
        prefixes,
        databases: vec![database],
        class_maps,
        warnings: generator.warnings,
    }
}

impl Generator<'_> {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    fn map_iri(&self, local: &str) -> String {
        format!("{}{}", self.namespaces.map_namespace, iri_escape(local))
    }

    fn vocab_iri(&self, local: &str) -> String {
        format!("{}{}", self.namespaces.vocabulary_namespace, iri_escape(local))
    }

    /// Columns that identify a row of `table`: the primary key, or every mappable column.
    fn key_columns(table: &TableSchema) -> Vec<String> {
        if !table.primary_key.is_empty() {
            return table.primary_key.clone();
        }
        table
            .columns
            .iter()
            .filter(|c| column_kind(&c.sql_type) != ColumnKind::Binary)
            .map(|c| c.name.clone())
            .collect()
    }

    /// True when `fk` points at exactly the key columns of a mapped parent.
    fn references_parent_key(&self, fk: &ForeignKey) -> bool {
        match self.schema.table(&fk.referenced_table) {
            Some(parent) => {
                !parent.primary_key.is_empty() && parent.primary_key == fk.referenced_columns
            }
            None => false,
        }
    }

    fn class_map(&mut self, table: &TableSchema) -> Option<ClassMap> {
        let name = table.name.as_str();
        if table.primary_key.is_empty() {
            self.warn(format!(
                "{} {} has no primary key, all columns are used to identify rows",
                if table.is_view { "View" } else { "Table" },
                name
            ));
        } else if table.primary_key.len() > 1 {
            self.warn(format!(
                "Table {} has a composite primary key ({})",
                name,
                table.primary_key.join(", ")
            ));
        }
        let key = Self::key_columns(table);
        if key.is_empty() {
            self.warn(format!("Table {} has no usable columns and is skipped", name));
            return None;
        }

        let id = self.map_iri(name);
        let mut bridges = vec![self.label_bridge(table, &key)];

        let mut linked: Vec<&ForeignKey> = Vec::new();
        for fk in &table.foreign_keys {
            if fk.columns.len() > 1 {
                self.warn(format!(
                    "Table {} has a composite foreign key ({}) to {}",
                    name,
                    fk.columns.join(", "),
                    fk.referenced_table
                ));
            }
            if self.references_parent_key(fk) {
                linked.push(fk);
            } else {
                self.warn(format!(
                    "Foreign key {}({}) does not reference the primary key of {}, mapped as plain columns",
                    name,
                    fk.columns.join(", "),
                    fk.referenced_table
                ));
            }
        }
        let fk_columns: BTreeSet<&str> = linked
            .iter()
            .flat_map(|fk| fk.columns.iter().map(String::as_str))
            .collect();

        for column in &table.columns {
            if fk_columns.contains(column.name.as_str()) {
                continue;
            }
            let kind = column_kind(&column.sql_type);
            match kind {
                ColumnKind::Binary => {
                    self.warn(format!(
                        "Skipping column {}.{}: binary type {} cannot be mapped",
                        name, column.name, column.sql_type
                    ));
                    continue;
                }
                ColumnKind::Unsupported => self.warn(format!(
                    "Column {}.{} has unsupported type {}, mapped as a plain literal",
                    name, column.name, column.sql_type
                )),
                _ => {}
            }
            let local = format!("{}_{}", name, column.name);
            bridges.push(PropertyBridge {
                id: self.map_iri(&local),
                properties: vec![self.vocab_iri(&local)],
                source: TermSource::Column {
                    column: ColumnRef::new(name, &column.name),
                    datatype: kind.datatype().map(str::to_string),
                    lang: None,
                },
                label: Some(format!("{} {}", name, column.name)),
            });
        }

        for fk in linked {
            let local = format!("{}_{}", name, fk.columns.join("_"));
            let joins = fk
                .columns
                .iter()
                .zip(fk.referenced_columns.iter())
                .map(|(child, parent)| Join {
                    child: ColumnRef::new(name, child),
                    parent: ColumnRef::new(&fk.referenced_table, parent),
                })
                .collect();
            bridges.push(PropertyBridge {
                id: self.map_iri(&local),
                properties: vec![self.vocab_iri(&local)],
                source: TermSource::Reference {
                    class_map: self.map_iri(&fk.referenced_table),
                    joins,
                },
                label: Some(format!("{} {}", name, fk.columns.join(" "))),
            });
        }

        Some(ClassMap {
            id,
            database: self.database_id.clone(),
            subject: SubjectSource::Pattern(self.subject_pattern(name, &key)),
            classes: vec![self.vocab_iri(name)],
            label: Some(name.to_string()),
            bridges,
        })
    }

    fn subject_pattern(&self, table: &str, key: &[String]) -> UriPattern {
        let mut parts = vec![PatternPart::Text(format!(
            "{}{}/",
            self.namespaces.instance_namespace,
            iri_escape(table)
        ))];
        for (i, column) in key.iter().enumerate() {
            if i > 0 {
                parts.push(PatternPart::Text("/".to_string()));
            }
            parts.push(PatternPart::Column(ColumnRef::new(table, column)));
        }
        UriPattern::from_parts(parts)
    }

    fn label_bridge(&self, table: &TableSchema, key: &[String]) -> PropertyBridge {
        let name = table.name.as_str();
        let mut parts = vec![PatternPart::Text(format!("{} #", name))];
        for (i, column) in key.iter().enumerate() {
            if i > 0 {
                parts.push(PatternPart::Text("/".to_string()));
            }
            parts.push(PatternPart::Column(ColumnRef::new(name, column)));
        }
        PropertyBridge {
            id: self.map_iri(&format!("{}__label", name)),
            properties: vec![LABEL.as_str().to_string()],
            source: TermSource::Pattern {
                pattern: UriPattern::from_parts(parts),
                datatype: None,
                lang: None,
            },
            label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ColumnSchema;

    fn column(name: &str, sql_type: &str) -> ColumnSchema {
        ColumnSchema {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            nullable: true,
        }
    }

    fn schema() -> DatabaseSchema {
        DatabaseSchema {
            tables: vec![
                TableSchema {
                    name: "Dept".into(),
                    is_view: false,
                    columns: vec![column("id", "INTEGER"), column("name", "VARCHAR(40)")],
                    primary_key: vec!["id".into()],
                    foreign_keys: vec![],
                },
                TableSchema {
                    name: "Emp".into(),
                    is_view: false,
                    columns: vec![
                        column("id", "INTEGER"),
                        column("dept", "INTEGER"),
                        column("photo", "BLOB"),
                        column("hired", "DATETIME"),
                    ],
                    primary_key: vec!["id".into()],
                    foreign_keys: vec![ForeignKey {
                        columns: vec!["dept".into()],
                        referenced_table: "Dept".into(),
                        referenced_columns: vec!["id".into()],
                    }],
                },
                TableSchema {
                    name: "Log".into(),
                    is_view: false,
                    columns: vec![column("at", "TIMESTAMP"), column("msg", "TEXT")],
                    primary_key: vec![],
                    foreign_keys: vec![ForeignKey {
                        columns: vec!["msg".into()],
                        referenced_table: "Dept".into(),
                        referenced_columns: vec!["name".into()],
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_column_kind() {
        assert_eq!(column_kind("INTEGER"), ColumnKind::Integer);
        assert_eq!(column_kind("bigint"), ColumnKind::Integer);
        assert_eq!(column_kind("NUMERIC(10,2)"), ColumnKind::Decimal);
        assert_eq!(column_kind("double precision"), ColumnKind::Double);
        assert_eq!(column_kind("BOOLEAN"), ColumnKind::Boolean);
        assert_eq!(column_kind("DATE"), ColumnKind::Date);
        assert_eq!(column_kind("TIMESTAMP"), ColumnKind::DateTime);
        assert_eq!(column_kind("varchar(255)"), ColumnKind::Text);
        assert_eq!(column_kind(""), ColumnKind::Text);
        assert_eq!(column_kind("BLOB"), ColumnKind::Binary);
        assert_eq!(column_kind("GEOMETRY"), ColumnKind::Unsupported);
    }

    #[test]
    fn test_generated_namespaces() {
        let params = ConnectionParameters::new("", "jdbc:sqlite:x.db", "", "");
        let mapping = mapping_from_schema(&schema(), &params, "http://localhost/");
        assert_eq!(mapping.namespaces.map_namespace, "file:tmp#");
        assert_eq!(mapping.namespaces.instance_namespace, "");
        assert_eq!(mapping.namespaces.vocabulary_namespace, "http://localhost/vocab/");
        assert!(mapping.is_generated());
        mapping.validate().unwrap();
    }

    #[test]
    fn test_class_maps_and_bridges() {
        let params = ConnectionParameters::new("", "jdbc:sqlite:x.db", "", "");
        let mapping = mapping_from_schema(&schema(), &params, "http://localhost/");
        let emp = mapping.class_map("file:tmp#Emp").unwrap();
        assert_eq!(emp.classes, vec!["http://localhost/vocab/Emp"]);
        match &emp.subject {
            SubjectSource::Pattern(p) => assert_eq!(p.to_string(), "Emp/@@Emp.id@@"),
            other => panic!("unexpected subject {:?}", other),
        }
        let properties: Vec<&str> = emp
            .bridges
            .iter()
            .map(|b| b.properties[0].as_str())
            .collect();
        assert!(properties.contains(&"http://localhost/vocab/Emp_id"));
        assert!(properties.contains(&"http://localhost/vocab/Emp_hired"));
        assert!(properties.contains(&"http://localhost/vocab/Emp_dept"));
        assert!(!properties.contains(&"http://localhost/vocab/Emp_photo"));

        let fk = emp
            .bridges
            .iter()
            .find(|b| b.properties[0].ends_with("Emp_dept"))
            .unwrap();
        assert!(fk.source.is_reference());

        let hired = emp
            .bridges
            .iter()
            .find(|b| b.properties[0].ends_with("Emp_hired"))
            .unwrap();
        assert_eq!(hired.source.datatype(), Some(XSD_DATE_TIME.as_str()));
    }

    #[test]
    fn test_warnings() {
        let params = ConnectionParameters::new("", "jdbc:sqlite:x.db", "", "");
        let mapping = mapping_from_schema(&schema(), &params, "http://localhost/");
        let all = mapping.warnings.join("\n");
        assert!(all.contains("Log has no primary key"));
        assert!(all.contains("Emp.photo"));
        assert!(all.contains("does not reference the primary key of Dept"));

        // the degraded foreign key column stays a datatype property
        let log = mapping.class_map("file:tmp#Log").unwrap();
        assert!(log
            .bridges
            .iter()
            .any(|b| b.properties[0] == "http://localhost/vocab/Log_msg" && !b.source.is_reference()));
        match &log.subject {
            SubjectSource::Pattern(p) => assert_eq!(p.columns().count(), 2),
            other => panic!("unexpected subject {:?}", other),
        }
    }
}
