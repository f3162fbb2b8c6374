//! Runs a mapping against its database and collects the resulting triples.

use crate::consts::*;
use crate::driver::quirks::choose_fetch_size;
use crate::driver::{ConnectTarget, DriverRegistry, SelectQuery, SourceConnection, SqlValue};
use crate::errors::{Result, TransformError};
use crate::mapping::{ClassMap, ColumnRef, Database, Mapping, SubjectSource, TermSource};
use crate::namespaces::BaseIri;
use crate::options::FetchSize;
use crate::params::{ConnectionParameters, DEFAULT_FETCH_SIZE};
use chrono::Utc;
use log::{debug, info};
use oxigraph::model::{Literal, NamedNode, NamedNodeRef, Term, Triple};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOptions {
    /// Also emit the class and property declarations of the mapped vocabulary.
    pub vocabulary: bool,
    /// Ignore `d2rq:resultSizeLimit` declarations.
    pub lift_result_limit: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        MaterializeOptions {
            vocabulary: true,
            lift_result_limit: true,
        }
    }
}

/// Triples in the order they were produced, plus the prefixes to declare when writing them.
#[derive(Debug, Clone, Default)]
pub struct RdfGraph {
    triples: Vec<Triple>,
    prefixes: Vec<(String, String)>,
}

impl RdfGraph {
    pub fn new(prefixes: Vec<(String, String)>) -> Self {
        RdfGraph {
            triples: Vec::new(),
            prefixes,
        }
    }

    pub fn from_triples(triples: Vec<Triple>, prefixes: Vec<(String, String)>) -> Self {
        RdfGraph { triples, prefixes }
    }

    pub fn push(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }
}

fn output_prefixes(mapping: &Mapping) -> Vec<(String, String)> {
    let mut prefixes = vec![(
        "vocab".to_string(),
        mapping.namespaces.vocabulary_namespace.clone(),
    )];
    for (name, ns) in WELL_KNOWN_PREFIXES {
        prefixes.push((name.to_string(), ns.to_string()));
    }
    for (name, ns) in &mapping.prefixes {
        let internal = ns == D2RQ_NS || *ns == mapping.namespaces.map_namespace;
        if !internal && !prefixes.iter().any(|(n, _)| n == name) {
            prefixes.push((name.clone(), ns.clone()));
        }
    }
    prefixes
}

fn named_node(iri: &str) -> Result<NamedNode> {
    NamedNode::new(iri).map_err(|e| TransformError::InvalidMapping(format!("bad IRI '{}': {}", iri, e)))
}

/// Normalizes a database value into the lexical space of `datatype`.
fn lexical_for(value: &SqlValue, datatype: Option<&str>) -> Option<String> {
    let lexical = value.lexical()?;
    let normalized = match datatype {
        Some(dt) if dt == XSD_BOOLEAN.as_str() => match lexical.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "y" | "yes" => "true".to_string(),
            "0" | "false" | "f" | "n" | "no" => "false".to_string(),
            other => other.to_string(),
        },
        Some(dt) if dt == XSD_DATE_TIME.as_str() => lexical.trim().replacen(' ', "T", 1),
        _ => lexical,
    };
    Some(normalized)
}

fn literal(value: String, datatype: Option<&str>, lang: Option<&str>) -> Result<Literal> {
    if let Some(lang) = lang {
        return Literal::new_language_tagged_literal(value, lang)
            .map_err(|e| TransformError::InvalidMapping(format!("bad language tag '{}': {}", lang, e)));
    }
    Ok(match datatype {
        Some(dt) => Literal::new_typed_literal(value, named_node(dt)?),
        None => Literal::new_simple_literal(value),
    })
}

/// Materializes with the default driver set and options.
pub fn materialize(mapping: &Mapping, params: &ConnectionParameters, base_uri: &str) -> Result<RdfGraph> {
    materialize_with(
        mapping,
        params,
        base_uri,
        &DriverRegistry::default(),
        MaterializeOptions::default(),
    )
}

pub fn materialize_with(
    mapping: &Mapping,
    params: &ConnectionParameters,
    base_uri: &str,
    registry: &DriverRegistry,
    options: MaterializeOptions,
) -> Result<RdfGraph> {
    let base = BaseIri::new(base_uri)?;
    let mut graph = RdfGraph::new(output_prefixes(mapping));
    if options.vocabulary {
        emit_vocabulary(mapping, &base, &mut graph)?;
    }
    for database in &mapping.databases {
        let class_maps: Vec<&ClassMap> = mapping
            .class_maps
            .iter()
            .filter(|c| c.database == database.id)
            .collect();
        if class_maps.is_empty() {
            continue;
        }
        let target = connect_target(mapping, database, params)?;
        let fetch_size = choose_fetch_size(
            params.fetch_size,
            database.fetch_size,
            Some(&target.url),
            DEFAULT_FETCH_SIZE,
        );
        let limit = if options.lift_result_limit {
            None
        } else {
            database.result_size_limit
        };
        info!(
            "Materializing {} class maps from {} (fetch size {})",
            class_maps.len(),
            target.url,
            fetch_size
        );
        let mut conn = registry.connect(&target)?;
        for class_map in class_maps {
            materialize_class_map(mapping, class_map, conn.as_mut(), &base, fetch_size, limit, &mut graph)?;
        }
    }
    info!("Materialized {} triples", graph.len());
    Ok(graph)
}

/// Connection details for a database: the document's own settings for explicit mappings,
/// with the caller's parameters filling the gaps.
fn connect_target(
    mapping: &Mapping,
    database: &Database,
    params: &ConnectionParameters,
) -> Result<ConnectTarget> {
    if mapping.is_generated() {
        return ConnectTarget::from_parameters(params);
    }
    let url = database
        .jdbc_dsn
        .clone()
        .or_else(|| params.connection_string().map(str::to_string))
        .ok_or_else(|| {
            TransformError::invalid_parameter(
                "connection_string",
                format!("database {} declares no d2rq:jdbcDSN", database.id),
            )
        })?;
    Ok(ConnectTarget {
        url,
        driver_class: database.jdbc_driver.clone().or_else(|| params.driver_class.clone()),
        username: database.username.clone().or_else(|| params.username.clone()),
        password: database.password.clone().or_else(|| params.password.clone()),
    })
}

fn materialize_class_map(
    mapping: &Mapping,
    class_map: &ClassMap,
    conn: &mut dyn SourceConnection,
    base: &BaseIri,
    fetch_size: FetchSize,
    limit: Option<u64>,
    graph: &mut RdfGraph,
) -> Result<()> {
    let table = class_map
        .table()
        .ok_or_else(|| TransformError::InvalidMapping(format!("class map {} has no table", class_map.id)))?;
    let columns = class_map.required_columns();
    let query = SelectQuery {
        table: table.to_string(),
        columns: columns.clone(),
        limit,
    };
    let classes = class_map
        .classes
        .iter()
        .map(|c| named_node(c))
        .collect::<Result<Vec<_>>>()?;
    let before = graph.len();
    let mut skipped = 0u64;
    let rows = conn.stream_rows(&query, fetch_size, &mut |row| {
        let value = |c: &ColumnRef| cell(&columns, row, c);
        let subject = match subject_iri(&class_map.subject, |c| value(c).and_then(SqlValue::lexical), base)? {
            Some(s) => s,
            None => {
                skipped += 1;
                return Ok(());
            }
        };
        for class in &classes {
            graph.push(Triple::new(subject.clone(), TYPE.into_owned(), class.clone()));
        }
        for bridge in &class_map.bridges {
            let object: Term = match &bridge.source {
                TermSource::Column { column, datatype, lang } => {
                    let Some(v) = value(column).and_then(|v| lexical_for(v, datatype.as_deref())) else {
                        continue;
                    };
                    literal(v, datatype.as_deref(), lang.as_deref())?.into()
                }
                TermSource::Pattern { pattern, datatype, lang } => {
                    let Some(v) = pattern.expand(|c| value(c).and_then(SqlValue::lexical), false) else {
                        continue;
                    };
                    literal(v, datatype.as_deref(), lang.as_deref())?.into()
                }
                TermSource::Reference { class_map: target, joins } => {
                    let target = mapping.class_map(target).ok_or_else(|| {
                        TransformError::InvalidMapping(format!("unknown class map {}", target))
                    })?;
                    // the parent's key values are the child's join column values
                    let parent_value = |p: &ColumnRef| {
                        joins
                            .iter()
                            .find(|j| j.parent == *p)
                            .and_then(|j| value(&j.child))
                            .and_then(SqlValue::lexical)
                    };
                    match subject_iri(&target.subject, parent_value, base)? {
                        Some(o) => o.into(),
                        None => continue,
                    }
                }
            };
            for property in &bridge.properties {
                graph.push(Triple::new(subject.clone(), named_node(property)?, object.clone()));
            }
        }
        Ok(())
    })?;
    debug!(
        "{}: {} rows, {} triples, {} rows without a subject",
        class_map.id,
        rows,
        graph.len() - before,
        skipped
    );
    Ok(())
}

/// Non-NULL value of `column` in a row laid out as `columns`.
fn cell<'r>(columns: &[String], row: &'r [SqlValue], column: &ColumnRef) -> Option<&'r SqlValue> {
    columns
        .iter()
        .position(|name| *name == column.column)
        .and_then(|i| row.get(i))
        .filter(|v| !v.is_null())
}

/// Subject IRI of a row, resolved against the base. `None` when a key value is NULL.
fn subject_iri<F>(subject: &SubjectSource, mut value: F, base: &BaseIri) -> Result<Option<NamedNode>>
where
    F: FnMut(&ColumnRef) -> Option<String>,
{
    let relative = match subject {
        SubjectSource::Pattern(pattern) => pattern.expand(&mut value, true),
        SubjectSource::Column(column) => value(column),
    };
    match relative {
        Some(r) => Ok(Some(named_node(&base.resolve(&r)?)?)),
        None => Ok(None),
    }
}

fn is_builtin(iri: &str) -> bool {
    [RDF_NS, RDFS_NS, OWL_NS, XSD_NS].iter().any(|ns| iri.starts_with(ns))
}

/// Declarations of the classes and properties the mapping produces.
fn emit_vocabulary(mapping: &Mapping, base: &BaseIri, graph: &mut RdfGraph) -> Result<()> {
    let ontology = named_node(base.as_str().trim_end_matches('#'))?;
    graph.push(Triple::new(ontology.clone(), TYPE.into_owned(), ONTOLOGY.into_owned()));
    graph.push(Triple::new(
        ontology,
        COMMENT.into_owned(),
        Literal::new_simple_literal(format!(
            "Exported by dbtransformer on {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        )),
    ));

    let mut declared: HashSet<String> = HashSet::new();
    let mut declare = |graph: &mut RdfGraph, iri: &str, kind: NamedNodeRef<'static>| -> Result<bool> {
        if is_builtin(iri) || !declared.insert(iri.to_string()) {
            return Ok(false);
        }
        graph.push(Triple::new(named_node(iri)?, TYPE.into_owned(), kind.into_owned()));
        Ok(true)
    };

    for class_map in &mapping.class_maps {
        for class in &class_map.classes {
            if declare(graph, class, OWL_CLASS)? {
                if let Some(label) = &class_map.label {
                    graph.push(Triple::new(named_node(class)?, LABEL.into_owned(), Literal::new_simple_literal(label)));
                }
            }
        }
    }
    for class_map in &mapping.class_maps {
        for bridge in &class_map.bridges {
            let (kind, range): (NamedNodeRef<'static>, Vec<String>) = match &bridge.source {
                TermSource::Reference { class_map: target, .. } => (
                    OBJECT_PROPERTY,
                    mapping.class_map(target).map(|t| t.classes.clone()).unwrap_or_default(),
                ),
                source => (
                    DATATYPE_PROPERTY,
                    source.datatype().map(|d| vec![d.to_string()]).unwrap_or_default(),
                ),
            };
            for property in &bridge.properties {
                if !declare(graph, property, kind)? {
                    continue;
                }
                let p = named_node(property)?;
                for class in &class_map.classes {
                    graph.push(Triple::new(p.clone(), DOMAIN.into_owned(), named_node(class)?));
                }
                for r in &range {
                    graph.push(Triple::new(p.clone(), RANGE.into_owned(), named_node(r)?));
                }
                if let Some(label) = &bridge.label {
                    graph.push(Triple::new(p.clone(), LABEL.into_owned(), Literal::new_simple_literal(label)));
                }
            }
        }
    }
    Ok(())
}
