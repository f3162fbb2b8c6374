//! The declarative mapping from relational rows to RDF terms.
//!
//! A [`Mapping`] is either read from an explicit D2RQ document ([`parser`]) or generated
//! from a live schema ([`generator`]). Both are immutable once built; [`writer`] turns one
//! back into a D2RQ graph.

pub mod generator;
pub mod parser;
pub mod writer;

use crate::driver::DriverRegistry;
use crate::errors::{Result, TransformError};
use crate::namespaces::NamespaceSet;
use crate::options::FetchSize;
use crate::params::ConnectionParameters;
use log::info;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// A source database declared by the mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Database {
    pub id: String,
    pub jdbc_dsn: Option<String>,
    pub jdbc_driver: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub fetch_size: Option<FetchSize>,
    pub result_size_limit: Option<u64>,
}

/// A `Table.column` reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        ColumnRef {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Parses `Table.column`; the column is whatever follows the last dot.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.rfind('.') {
            Some(idx) if idx > 0 && idx + 1 < s.len() => Ok(ColumnRef::new(&s[..idx], &s[idx + 1..])),
            _ => Err(TransformError::InvalidMapping(format!(
                "'{}' is not a Table.column reference",
                s
            ))),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PatternPart {
    Text(String),
    Column(ColumnRef),
}

/// A template such as `Dept/@@Dept.id@@`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UriPattern {
    parts: Vec<PatternPart>,
}

impl UriPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut rest = pattern;
        while let Some(start) = rest.find("@@") {
            if start > 0 {
                parts.push(PatternPart::Text(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find("@@").ok_or_else(|| {
                TransformError::InvalidMapping(format!("unterminated @@ in pattern '{}'", pattern))
            })?;
            parts.push(PatternPart::Column(ColumnRef::parse(&after[..end])?));
            rest = &after[end + 2..];
        }
        if !rest.is_empty() {
            parts.push(PatternPart::Text(rest.to_string()));
        }
        Ok(UriPattern { parts })
    }

    pub fn from_parts(parts: Vec<PatternPart>) -> Self {
        UriPattern { parts }
    }

    pub fn parts(&self) -> &[PatternPart] {
        &self.parts
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnRef> {
        self.parts.iter().filter_map(|p| match p {
            PatternPart::Column(c) => Some(c),
            PatternPart::Text(_) => None,
        })
    }

    /// Fills the placeholders. Returns `None` as soon as one value is missing (NULL).
    /// With `escape`, values are percent-encoded for use inside an IRI.
    pub fn expand<F>(&self, mut value: F, escape: bool) -> Option<String>
    where
        F: FnMut(&ColumnRef) -> Option<String>,
    {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                PatternPart::Text(t) => out.push_str(t),
                PatternPart::Column(c) => {
                    let v = value(c)?;
                    if escape {
                        out.push_str(&crate::util::iri_escape(&v));
                    } else {
                        out.push_str(&v);
                    }
                }
            }
        }
        Some(out)
    }
}

impl fmt::Display for UriPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                PatternPart::Text(t) => write!(f, "{}", t)?,
                PatternPart::Column(c) => write!(f, "@@{}@@", c)?,
            }
        }
        Ok(())
    }
}

/// `child => parent` column equality of a foreign-key bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Join {
    pub child: ColumnRef,
    pub parent: ColumnRef,
}

impl Join {
    /// Parses `Emp.dept => Dept.id` (`<=` and `=` are accepted too, `<=` with swapped sides).
    pub fn parse(s: &str) -> Result<Self> {
        let (left, right, swapped) = if let Some((l, r)) = s.split_once("=>") {
            (l, r, false)
        } else if let Some((l, r)) = s.split_once("<=") {
            (l, r, true)
        } else if let Some((l, r)) = s.split_once('=') {
            (l, r, false)
        } else {
            return Err(TransformError::InvalidMapping(format!("malformed join '{}'", s)));
        };
        let (left, right) = (ColumnRef::parse(left)?, ColumnRef::parse(right)?);
        Ok(if swapped {
            Join {
                child: right,
                parent: left,
            }
        } else {
            Join {
                child: left,
                parent: right,
            }
        })
    }

    /// Parses a join of a bridge reading `child_table` that refers to `parent_table`. A plain
    /// `=` has no direction, so its sides are ordered by the tables they read.
    pub fn parse_between(s: &str, child_table: Option<&str>, parent_table: Option<&str>) -> Result<Self> {
        let join = Join::parse(s)?;
        if s.contains("=>") || s.contains("<=") {
            return Ok(join);
        }
        let reversed = child_table.is_some_and(|t| join.child.table != t && join.parent.table == t)
            || parent_table.is_some_and(|t| join.parent.table != t && join.child.table == t);
        Ok(if reversed {
            Join {
                child: join.parent,
                parent: join.child,
            }
        } else {
            join
        })
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.child, self.parent)
    }
}

/// Where the object of a bridge's triples comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TermSource {
    Column {
        column: ColumnRef,
        datatype: Option<String>,
        lang: Option<String>,
    },
    Pattern {
        pattern: UriPattern,
        datatype: Option<String>,
        lang: Option<String>,
    },
    /// The subject of another class map, linked through join columns.
    Reference { class_map: String, joins: Vec<Join> },
}

impl TermSource {
    pub fn datatype(&self) -> Option<&str> {
        match self {
            TermSource::Column { datatype, .. } | TermSource::Pattern { datatype, .. } => {
                datatype.as_deref()
            }
            TermSource::Reference { .. } => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TermSource::Reference { .. })
    }

    /// Columns of the owning table this source reads.
    pub fn columns(&self) -> Vec<&ColumnRef> {
        match self {
            TermSource::Column { column, .. } => vec![column],
            TermSource::Pattern { pattern, .. } => pattern.columns().collect(),
            TermSource::Reference { joins, .. } => joins.iter().map(|j| &j.child).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyBridge {
    pub id: String,
    pub properties: Vec<String>,
    pub source: TermSource,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SubjectSource {
    Pattern(UriPattern),
    /// A column that already holds the URI.
    Column(ColumnRef),
}

impl SubjectSource {
    pub fn columns(&self) -> Vec<&ColumnRef> {
        match self {
            SubjectSource::Pattern(p) => p.columns().collect(),
            SubjectSource::Column(c) => vec![c],
        }
    }
}

/// One relation mapped to one or more RDF classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassMap {
    pub id: String,
    pub database: String,
    pub subject: SubjectSource,
    pub classes: Vec<String>,
    pub label: Option<String>,
    pub bridges: Vec<PropertyBridge>,
}

impl ClassMap {
    /// The table the class map reads from, taken from its subject columns.
    pub fn table(&self) -> Option<&str> {
        self.subject.columns().first().map(|c| c.table.as_str())
    }

    /// Distinct columns (of the class map's own table) needed to produce its triples.
    pub fn required_columns(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut columns = Vec::new();
        let refs = self
            .subject
            .columns()
            .into_iter()
            .chain(self.bridges.iter().flat_map(|b| b.source.columns()));
        for c in refs {
            if seen.insert(c.column.clone()) {
                columns.push(c.column.clone());
            }
        }
        columns
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MappingOrigin {
    Generated,
    Document(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    pub origin: MappingOrigin,
    pub namespaces: NamespaceSet,
    /// Prefixes to declare when the mapping or its graph is written out.
    pub prefixes: Vec<(String, String)>,
    pub databases: Vec<Database>,
    pub class_maps: Vec<ClassMap>,
    /// Non-fatal findings made while building the mapping.
    pub warnings: Vec<String>,
}

impl Mapping {
    pub fn class_map(&self, id: &str) -> Option<&ClassMap> {
        self.class_maps.iter().find(|c| c.id == id)
    }

    pub fn database(&self, id: &str) -> Option<&Database> {
        self.databases.iter().find(|d| d.id == id)
    }

    pub fn is_generated(&self) -> bool {
        self.origin == MappingOrigin::Generated
    }

    pub fn bridge_count(&self) -> usize {
        self.class_maps.iter().map(|c| c.bridges.len()).sum()
    }

    /// Checks every reference inside the mapping resolves.
    pub fn validate(&self) -> Result<()> {
        for class_map in &self.class_maps {
            if self.database(&class_map.database).is_none() {
                return Err(TransformError::InvalidMapping(format!(
                    "class map {} uses unknown database {}",
                    class_map.id, class_map.database
                )));
            }
            let table = class_map.table().ok_or_else(|| {
                TransformError::InvalidMapping(format!(
                    "class map {} has no subject column",
                    class_map.id
                ))
            })?;
            for bridge in &class_map.bridges {
                if bridge.properties.is_empty() {
                    return Err(TransformError::InvalidMapping(format!(
                        "property bridge {} has no d2rq:property",
                        bridge.id
                    )));
                }
                if let Some(c) = bridge.source.columns().iter().find(|c| c.table != table) {
                    return Err(TransformError::InvalidMapping(format!(
                        "property bridge {} reads {} but class map {} reads table {}",
                        bridge.id, c, class_map.id, table
                    )));
                }
                if let TermSource::Reference { class_map: target, joins } = &bridge.source {
                    let target_map = self.class_map(target).ok_or_else(|| {
                        TransformError::InvalidMapping(format!(
                            "property bridge {} refers to unknown class map {}",
                            bridge.id, target
                        ))
                    })?;
                    for column in target_map.subject.columns() {
                        if !joins.iter().any(|j| j.parent == *column) {
                            return Err(TransformError::InvalidMapping(format!(
                                "property bridge {} has no join for {}",
                                bridge.id, column
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Builds the mapping for one export: the explicit document when given, otherwise one
/// generated from the live schema. Fails before any I/O when neither source is available.
pub fn resolve_mapping(
    params: Option<&ConnectionParameters>,
    explicit: Option<&Path>,
    base_uri: &str,
    registry: &DriverRegistry,
) -> Result<Mapping> {
    if let Some(path) = explicit {
        info!("Loading mapping document {}", path.display());
        return parser::parse_mapping_file(path, base_uri);
    }
    let params = params
        .filter(|p| p.connection_string().is_some())
        .ok_or_else(|| {
            TransformError::MissingMappingSource(
                "no mapping file and no connection string given".to_string(),
            )
        })?;
    info!(
        "Generating mapping from schema of {}",
        params.connection_string().unwrap_or_default()
    );
    generator::generate_mapping(params, base_uri, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_parse_and_expand() {
        let pattern = UriPattern::parse("Emp/@@Emp.id@@/@@Emp.name@@").unwrap();
        assert_eq!(pattern.columns().count(), 2);
        assert_eq!(pattern.to_string(), "Emp/@@Emp.id@@/@@Emp.name@@");
        let expanded = pattern.expand(
            |c| match c.column.as_str() {
                "id" => Some("7".to_string()),
                _ => Some("Ann Lee".to_string()),
            },
            true,
        );
        assert_eq!(expanded.as_deref(), Some("Emp/7/Ann%20Lee"));
        assert_eq!(pattern.expand(|_| None, true), None);
        assert!(UriPattern::parse("Emp/@@Emp.id").is_err());
    }

    #[test]
    fn test_join_parse() {
        let join = Join::parse("Emp.dept => Dept.id").unwrap();
        assert_eq!(join.child, ColumnRef::new("Emp", "dept"));
        assert_eq!(join.parent, ColumnRef::new("Dept", "id"));
        let reversed = Join::parse("Dept.id <= Emp.dept").unwrap();
        assert_eq!(reversed, join);
        assert!(Join::parse("Emp.dept").is_err());

        let undirected = Join::parse_between("Dept.id = Emp.dept", Some("Emp"), Some("Dept")).unwrap();
        assert_eq!(undirected.child, ColumnRef::new("Emp", "dept"));
        assert_eq!(undirected.parent, ColumnRef::new("Dept", "id"));
        let parent_only = Join::parse_between("Dept.id = Emp.dept", None, Some("Dept")).unwrap();
        assert_eq!(parent_only.child, ColumnRef::new("Emp", "dept"));
        let in_order = Join::parse_between("Emp.dept = Dept.id", Some("Emp"), Some("Dept")).unwrap();
        assert_eq!(in_order.child, ColumnRef::new("Emp", "dept"));
        // explicit arrows keep their direction
        let arrow = Join::parse_between("Dept.id => Emp.dept", Some("Emp"), Some("Dept")).unwrap();
        assert_eq!(arrow.child, ColumnRef::new("Dept", "id"));
    }

    #[test]
    fn test_missing_mapping_source() {
        let registry = DriverRegistry::default();
        let params = ConnectionParameters::new("", "", "", "");
        match resolve_mapping(Some(&params), None, "http://localhost/", &registry) {
            Err(TransformError::MissingMappingSource(_)) => {}
            other => panic!("expected MissingMappingSource, got {:?}", other),
        }
        match resolve_mapping(None, None, "http://localhost/", &registry) {
            Err(e) => assert!(e.is_configuration()),
            Ok(_) => panic!("expected an error"),
        }
    }
}
