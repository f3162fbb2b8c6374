//! Reads an explicit D2RQ mapping document.

use super::{
    ClassMap, ColumnRef, Database, Join, Mapping, MappingOrigin, PropertyBridge, SubjectSource,
    TermSource, UriPattern,
};
use crate::consts::*;
use crate::errors::{Result, TransformError};
use crate::namespaces::{BaseIri, NamespaceSet};
use crate::options::FetchSize;
use crate::util::read_rdf_file;
use log::{debug, info};
use oxigraph::model::{NamedNodeRef, NamedOrBlankNode, Term, Triple};
use std::collections::HashMap;
use std::path::Path;

/// Loads and validates a mapping document. The syntax follows the file extension.
pub fn parse_mapping_file(path: &Path, base_uri: &str) -> Result<Mapping> {
    let base = BaseIri::new(base_uri)?;
    let (triples, prefixes) = read_rdf_file(path, Some(base.as_str()))?;
    let mut mapping = parse_mapping_triples(&triples, &prefixes, base_uri)?;
    mapping.origin = MappingOrigin::Document(path.to_path_buf());
    mapping.validate()?;
    info!(
        "Loaded mapping {} ({} class maps, {} property bridges)",
        path.display(),
        mapping.class_maps.len(),
        mapping.bridge_count()
    );
    Ok(mapping)
}

fn node_key(node: &NamedOrBlankNode) -> String {
    match node {
        NamedOrBlankNode::NamedNode(n) => n.as_str().to_string(),
        NamedOrBlankNode::BlankNode(b) => format!("_:{}", b.as_str()),
    }
}

fn term_key(term: &Term) -> Option<String> {
    match term {
        Term::NamedNode(n) => Some(n.as_str().to_string()),
        Term::BlankNode(b) => Some(format!("_:{}", b.as_str())),
        _ => None,
    }
}

fn term_text(term: &Term) -> Option<String> {
    match term {
        Term::NamedNode(n) => Some(n.as_str().to_string()),
        Term::Literal(l) => Some(l.value().to_string()),
        _ => None,
    }
}

/// Subject-indexed view over the document's triples.
struct Document<'a> {
    by_subject: HashMap<String, Vec<&'a Triple>>,
    order: Vec<String>,
}

impl<'a> Document<'a> {
    fn new(triples: &'a [Triple]) -> Self {
        let mut by_subject: HashMap<String, Vec<&Triple>> = HashMap::new();
        let mut order = Vec::new();
        for triple in triples {
            let key = node_key(&triple.subject);
            let entry = by_subject.entry(key.clone()).or_default();
            if entry.is_empty() {
                order.push(key);
            }
            entry.push(triple);
        }
        Document { by_subject, order }
    }

    fn objects(&self, subject: &str, predicate: NamedNodeRef<'_>) -> Vec<&'a Term> {
        self.by_subject
            .get(subject)
            .map(|triples| {
                triples
                    .iter()
                    .copied()
                    .filter(|t| t.predicate.as_ref() == predicate)
                    .map(|t| &t.object)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn text(&self, subject: &str, predicate: NamedNodeRef<'_>) -> Option<String> {
        self.objects(subject, predicate).into_iter().find_map(term_text)
    }

    fn texts(&self, subject: &str, predicate: NamedNodeRef<'_>) -> Vec<String> {
        self.objects(subject, predicate)
            .into_iter()
            .filter_map(term_text)
            .collect()
    }

    fn node(&self, subject: &str, predicate: NamedNodeRef<'_>) -> Option<String> {
        self.objects(subject, predicate).into_iter().find_map(term_key)
    }

    fn has_type(&self, subject: &str, class: NamedNodeRef<'_>) -> bool {
        self.objects(subject, TYPE)
            .iter()
            .any(|o| matches!(o, Term::NamedNode(n) if n.as_ref() == class))
    }

    /// Subjects in document order that are typed `class` or carry `marker`.
    fn subjects(&self, class: NamedNodeRef<'_>, marker: Option<NamedNodeRef<'_>>) -> Vec<&str> {
        self.order
            .iter()
            .filter(|s| {
                self.has_type(s, class)
                    || marker.map_or(false, |m| !self.objects(s, m).is_empty())
            })
            .map(String::as_str)
            .collect()
    }
}

fn parse_number<T: std::str::FromStr>(subject: &str, name: &str, value: Option<String>) -> Result<Option<T>> {
    match value {
        Some(v) => v.trim().parse::<T>().map(Some).map_err(|_| {
            TransformError::InvalidMapping(format!("{} of {} is not a number: '{}'", name, subject, v))
        }),
        None => Ok(None),
    }
}

fn table_of<'a>(class_maps: &'a [ClassMap], id: &str) -> Option<&'a str> {
    class_maps.iter().find(|c| c.id == id).and_then(ClassMap::table)
}

/// Builds a mapping from already parsed triples. `prefixes` are the document's own prefix
/// declarations; `map:` and `vocab:` among them override the generated namespaces.
pub fn parse_mapping_triples(
    triples: &[Triple],
    prefixes: &[(String, String)],
    base_uri: &str,
) -> Result<Mapping> {
    let doc = Document::new(triples);
    let mut namespaces = NamespaceSet::generated(base_uri);
    for (name, iri) in prefixes {
        match name.as_str() {
            "map" => namespaces.map_namespace = iri.clone(),
            "vocab" => namespaces.vocabulary_namespace = iri.clone(),
            _ => {}
        }
    }

    let mut databases = Vec::new();
    for id in doc.subjects(D2RQ_DATABASE, Some(D2RQ_JDBC_DSN)) {
        databases.push(Database {
            id: id.to_string(),
            jdbc_dsn: doc.text(id, D2RQ_JDBC_DSN),
            jdbc_driver: doc.text(id, D2RQ_JDBC_DRIVER),
            username: doc.text(id, D2RQ_USERNAME),
            password: doc.text(id, D2RQ_PASSWORD),
            fetch_size: parse_number::<i32>(id, "d2rq:fetchSize", doc.text(id, D2RQ_FETCH_SIZE))?
                .map(FetchSize::from),
            result_size_limit: parse_number(
                id,
                "d2rq:resultSizeLimit",
                doc.text(id, D2RQ_RESULT_SIZE_LIMIT),
            )?,
        });
    }

    let mut class_maps: Vec<ClassMap> = Vec::new();
    for id in doc.subjects(D2RQ_CLASS_MAP, Some(D2RQ_DATA_STORAGE)) {
        let database = doc.node(id, D2RQ_DATA_STORAGE).ok_or_else(|| {
            TransformError::InvalidMapping(format!("class map {} has no d2rq:dataStorage", id))
        })?;
        let subject = if let Some(pattern) = doc.text(id, D2RQ_URI_PATTERN) {
            SubjectSource::Pattern(UriPattern::parse(&pattern)?)
        } else if let Some(column) = doc.text(id, D2RQ_URI_COLUMN) {
            SubjectSource::Column(ColumnRef::parse(&column)?)
        } else {
            return Err(TransformError::InvalidMapping(format!(
                "class map {} has neither d2rq:uriPattern nor d2rq:uriColumn",
                id
            )));
        };
        class_maps.push(ClassMap {
            id: id.to_string(),
            database,
            subject,
            classes: doc.texts(id, D2RQ_CLASS),
            label: doc.text(id, D2RQ_CLASS_DEFINITION_LABEL),
            bridges: Vec::new(),
        });
    }

    for id in doc.subjects(D2RQ_PROPERTY_BRIDGE, Some(D2RQ_BELONGS_TO_CLASS_MAP)) {
        let owner = doc.node(id, D2RQ_BELONGS_TO_CLASS_MAP).ok_or_else(|| {
            TransformError::InvalidMapping(format!("property bridge {} has no d2rq:belongsToClassMap", id))
        })?;
        let datatype = doc.text(id, D2RQ_DATATYPE);
        let lang = doc.text(id, D2RQ_LANG);
        let source = if let Some(column) = doc.text(id, D2RQ_COLUMN) {
            TermSource::Column {
                column: ColumnRef::parse(&column)?,
                datatype,
                lang,
            }
        } else if let Some(pattern) = doc.text(id, D2RQ_PATTERN) {
            TermSource::Pattern {
                pattern: UriPattern::parse(&pattern)?,
                datatype,
                lang,
            }
        } else if let Some(target) = doc.node(id, D2RQ_REFERS_TO_CLASS_MAP) {
            let owner_table = table_of(&class_maps, &owner);
            let target_table = table_of(&class_maps, &target);
            let joins = doc
                .texts(id, D2RQ_JOIN)
                .iter()
                .map(|j| Join::parse_between(j, owner_table, target_table))
                .collect::<Result<Vec<_>>>()?;
            TermSource::Reference {
                class_map: target,
                joins,
            }
        } else {
            return Err(TransformError::InvalidMapping(format!(
                "property bridge {} has no d2rq:column, d2rq:pattern or d2rq:refersToClassMap",
                id
            )));
        };
        let bridge = PropertyBridge {
            id: id.to_string(),
            properties: doc.texts(id, D2RQ_PROPERTY),
            source,
            label: doc.text(id, D2RQ_PROPERTY_DEFINITION_LABEL),
        };
        let class_map = class_maps
            .iter_mut()
            .find(|c| c.id == owner)
            .ok_or_else(|| {
                TransformError::InvalidMapping(format!(
                    "property bridge {} belongs to unknown class map {}",
                    id, owner
                ))
            })?;
        debug!("Bridge {} -> {}", id, class_map.id);
        class_map.bridges.push(bridge);
    }

    Ok(Mapping {
        origin: MappingOrigin::Generated,
        namespaces,
        prefixes: prefixes.to_vec(),
        databases,
        class_maps,
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{declared_prefixes, parse_rdf};
    use oxigraph::io::RdfFormat;

    const DOC: &str = r#"
@prefix map: <http://example.org/map#> .
@prefix vocab: <http://example.org/vocab/> .
@prefix d2rq: <http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

map:db a d2rq:Database ;
    d2rq:jdbcDSN "jdbc:sqlite:shop.db" ;
    d2rq:fetchSize "20" ;
    d2rq:resultSizeLimit "100" .

map:Dept a d2rq:ClassMap ;
    d2rq:dataStorage map:db ;
    d2rq:uriPattern "dept/@@Dept.id@@" ;
    d2rq:class vocab:Department ;
    d2rq:classDefinitionLabel "Department" .

map:Emp a d2rq:ClassMap ;
    d2rq:dataStorage map:db ;
    d2rq:uriPattern "emp/@@Emp.id@@" ;
    d2rq:class vocab:Employee .

map:Dept_name a d2rq:PropertyBridge ;
    d2rq:belongsToClassMap map:Dept ;
    d2rq:property vocab:name ;
    d2rq:column "Dept.name" ;
    d2rq:lang "en" .

map:Emp_dept a d2rq:PropertyBridge ;
    d2rq:belongsToClassMap map:Emp ;
    d2rq:property vocab:worksIn ;
    d2rq:refersToClassMap map:Dept ;
    d2rq:join "Emp.dept => Dept.id" .
"#;

    fn parse(doc: &str) -> Result<Mapping> {
        let triples = parse_rdf(doc.as_bytes(), RdfFormat::Turtle, None)?;
        let mapping = parse_mapping_triples(&triples, &declared_prefixes(doc), "http://localhost/")?;
        mapping.validate()?;
        Ok(mapping)
    }

    #[test]
    fn test_parse_document() {
        let mapping = parse(DOC).unwrap();
        assert_eq!(mapping.namespaces.map_namespace, "http://example.org/map#");
        assert_eq!(mapping.namespaces.vocabulary_namespace, "http://example.org/vocab/");
        assert_eq!(mapping.databases.len(), 1);
        let db = &mapping.databases[0];
        assert_eq!(db.fetch_size, Some(FetchSize::Rows(20)));
        assert_eq!(db.result_size_limit, Some(100));

        let dept = mapping.class_map("http://example.org/map#Dept").unwrap();
        assert_eq!(dept.table(), Some("Dept"));
        assert_eq!(dept.label.as_deref(), Some("Department"));
        assert_eq!(dept.bridges.len(), 1);

        let emp = mapping.class_map("http://example.org/map#Emp").unwrap();
        match &emp.bridges[0].source {
            TermSource::Reference { class_map, joins } => {
                assert_eq!(class_map, "http://example.org/map#Dept");
                assert_eq!(joins[0].child, ColumnRef::new("Emp", "dept"));
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(emp.required_columns(), vec!["id", "dept"]);
    }

    #[test]
    fn test_dangling_class_map_reference() {
        let broken = DOC.replace("d2rq:refersToClassMap map:Dept", "d2rq:refersToClassMap map:Nope");
        match parse(&broken) {
            Err(TransformError::InvalidMapping(msg)) => assert!(msg.contains("map#Nope")),
            other => panic!("expected InvalidMapping, got {:?}", other),
        }
    }

    #[test]
    fn test_bridge_without_value() {
        let broken = DOC.replace("d2rq:column \"Dept.name\" ;", "");
        match parse(&broken) {
            Err(TransformError::InvalidMapping(msg)) => assert!(msg.contains("Dept_name")),
            other => panic!("expected InvalidMapping, got {:?}", other),
        }
    }

    #[test]
    fn test_undirected_join() {
        let doc = DOC.replace("\"Emp.dept => Dept.id\"", "\"Dept.id = Emp.dept\"");
        let mapping = parse(&doc).unwrap();
        let emp = mapping.class_map("http://example.org/map#Emp").unwrap();
        match &emp.bridges[0].source {
            TermSource::Reference { joins, .. } => {
                assert_eq!(joins[0].child, ColumnRef::new("Emp", "dept"));
                assert_eq!(joins[0].parent, ColumnRef::new("Dept", "id"));
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_relative_iris_resolve_against_base() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.ttl");
        let doc = DOC
            .replace("<http://example.org/map#>", "<#>")
            .replace("<http://example.org/vocab/>", "<vocab/>");
        std::fs::write(&path, doc).unwrap();

        let mapping = parse_mapping_file(&path, "http://example.org/db/").unwrap();
        assert_eq!(mapping.namespaces.map_namespace, "http://example.org/db/#");
        assert_eq!(mapping.namespaces.vocabulary_namespace, "http://example.org/db/vocab/");
        let dept = mapping.class_map("http://example.org/db/#Dept").unwrap();
        assert_eq!(dept.classes, vec!["http://example.org/db/vocab/Department".to_string()]);
        assert!(matches!(mapping.origin, MappingOrigin::Document(_)));
    }

    #[test]
    fn test_unknown_database() {
        let broken = DOC.replace("d2rq:dataStorage map:db ;\n    d2rq:uriPattern \"emp", "d2rq:dataStorage map:other ;\n    d2rq:uriPattern \"emp");
        assert!(matches!(parse(&broken), Err(TransformError::InvalidMapping(_))));
    }
}
