//! Writes a mapping back out as a D2RQ document.

use super::{Mapping, SubjectSource, TermSource};
use crate::consts::*;
use crate::errors::{Result, TransformError};
use crate::util::write_rdf;
use oxigraph::io::RdfFormat;
use oxigraph::model::{BlankNode, Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, Term, Triple};

fn node(id: &str) -> Result<NamedOrBlankNode> {
    match id.strip_prefix("_:") {
        Some(label) => Ok(BlankNode::new_unchecked(label).into()),
        None => NamedNode::new(id)
            .map(Into::into)
            .map_err(|e| TransformError::InvalidMapping(format!("bad IRI '{}': {}", id, e))),
    }
}

fn iri(value: &str) -> Result<Term> {
    Ok(match node(value)? {
        NamedOrBlankNode::NamedNode(n) => n.into(),
        NamedOrBlankNode::BlankNode(b) => b.into(),
    })
}

struct GraphBuilder {
    triples: Vec<Triple>,
}

impl GraphBuilder {
    fn add(&mut self, subject: &NamedOrBlankNode, predicate: NamedNodeRef<'_>, object: Term) {
        self.triples
            .push(Triple::new(subject.clone(), predicate.into_owned(), object));
    }

    fn add_text(&mut self, subject: &NamedOrBlankNode, predicate: NamedNodeRef<'_>, text: &str) {
        self.add(subject, predicate, Literal::new_simple_literal(text).into());
    }
}

impl Mapping {
    /// The mapping as D2RQ triples: databases, class maps, then their bridges.
    pub fn to_graph(&self) -> Result<Vec<Triple>> {
        let mut g = GraphBuilder { triples: Vec::new() };
        for db in &self.databases {
            let s = node(&db.id)?;
            g.add(&s, TYPE, D2RQ_DATABASE.into_owned().into());
            if let Some(dsn) = &db.jdbc_dsn {
                g.add_text(&s, D2RQ_JDBC_DSN, dsn);
            }
            if let Some(driver) = &db.jdbc_driver {
                g.add_text(&s, D2RQ_JDBC_DRIVER, driver);
            }
            if let Some(user) = &db.username {
                g.add_text(&s, D2RQ_USERNAME, user);
            }
            if let Some(size) = db.fetch_size {
                g.add_text(&s, D2RQ_FETCH_SIZE, &size.as_driver_value().to_string());
            }
            if let Some(limit) = db.result_size_limit {
                g.add_text(&s, D2RQ_RESULT_SIZE_LIMIT, &limit.to_string());
            }
        }
        for class_map in &self.class_maps {
            let s = node(&class_map.id)?;
            g.add(&s, TYPE, D2RQ_CLASS_MAP.into_owned().into());
            g.add(&s, D2RQ_DATA_STORAGE, iri(&class_map.database)?);
            match &class_map.subject {
                SubjectSource::Pattern(p) => g.add_text(&s, D2RQ_URI_PATTERN, &p.to_string()),
                SubjectSource::Column(c) => g.add_text(&s, D2RQ_URI_COLUMN, &c.to_string()),
            }
            for class in &class_map.classes {
                g.add(&s, D2RQ_CLASS, iri(class)?);
            }
            if let Some(label) = &class_map.label {
                g.add_text(&s, D2RQ_CLASS_DEFINITION_LABEL, label);
            }
        }
        for class_map in &self.class_maps {
            for bridge in &class_map.bridges {
                let s = node(&bridge.id)?;
                g.add(&s, TYPE, D2RQ_PROPERTY_BRIDGE.into_owned().into());
                g.add(&s, D2RQ_BELONGS_TO_CLASS_MAP, iri(&class_map.id)?);
                for property in &bridge.properties {
                    g.add(&s, D2RQ_PROPERTY, iri(property)?);
                }
                if let Some(label) = &bridge.label {
                    g.add_text(&s, D2RQ_PROPERTY_DEFINITION_LABEL, label);
                }
                match &bridge.source {
                    TermSource::Column { column, datatype, lang } => {
                        g.add_text(&s, D2RQ_COLUMN, &column.to_string());
                        if let Some(dt) = datatype {
                            g.add(&s, D2RQ_DATATYPE, iri(dt)?);
                        }
                        if let Some(lang) = lang {
                            g.add_text(&s, D2RQ_LANG, lang);
                        }
                    }
                    TermSource::Pattern { pattern, datatype, lang } => {
                        g.add_text(&s, D2RQ_PATTERN, &pattern.to_string());
                        if let Some(dt) = datatype {
                            g.add(&s, D2RQ_DATATYPE, iri(dt)?);
                        }
                        if let Some(lang) = lang {
                            g.add_text(&s, D2RQ_LANG, lang);
                        }
                    }
                    TermSource::Reference { class_map: target, joins } => {
                        g.add(&s, D2RQ_REFERS_TO_CLASS_MAP, iri(target)?);
                        for join in joins {
                            g.add_text(&s, D2RQ_JOIN, &join.to_string());
                        }
                    }
                }
            }
        }
        Ok(g.triples)
    }

    /// The mapping as a Turtle document, declaring its prefixes.
    pub fn to_turtle(&self) -> Result<Vec<u8>> {
        let mut prefixes = self.prefixes.clone();
        for (name, ns) in WELL_KNOWN_PREFIXES {
            if !prefixes.iter().any(|(n, _)| n == name) {
                prefixes.push((name.to_string(), ns.to_string()));
            }
        }
        if !prefixes.iter().any(|(_, ns)| ns == D2RQ_NS) {
            prefixes.push(("d2rq".to_string(), D2RQ_NS.to_string()));
        }
        write_rdf(&self.to_graph()?, RdfFormat::Turtle, &prefixes)
    }
}

#[cfg(test)]
mod tests {
    use crate::driver::{ColumnSchema, DatabaseSchema, ForeignKey, TableSchema};
    use crate::mapping::generator::mapping_from_schema;
    use crate::mapping::parser::parse_mapping_triples;
    use crate::params::ConnectionParameters;
    use crate::util::{declared_prefixes, parse_rdf};
    use oxigraph::io::RdfFormat;

    #[test]
    fn test_generated_mapping_reads_back() {
        let schema = DatabaseSchema {
            tables: vec![
                TableSchema {
                    name: "Dept".into(),
                    is_view: false,
                    columns: vec![ColumnSchema {
                        name: "id".into(),
                        sql_type: "INTEGER".into(),
                        nullable: false,
                    }],
                    primary_key: vec!["id".into()],
                    foreign_keys: vec![],
                },
                TableSchema {
                    name: "Emp".into(),
                    is_view: false,
                    columns: vec![
                        ColumnSchema {
                            name: "id".into(),
                            sql_type: "INTEGER".into(),
                            nullable: false,
                        },
                        ColumnSchema {
                            name: "dept".into(),
                            sql_type: "INTEGER".into(),
                            nullable: true,
                        },
                    ],
                    primary_key: vec!["id".into()],
                    foreign_keys: vec![ForeignKey {
                        columns: vec!["dept".into()],
                        referenced_table: "Dept".into(),
                        referenced_columns: vec!["id".into()],
                    }],
                },
            ],
        };
        let params = ConnectionParameters::new("org.sqlite.JDBC", "jdbc:sqlite:shop.db", "", "");
        let mapping = mapping_from_schema(&schema, &params, "http://localhost/");
        let turtle = mapping.to_turtle().unwrap();
        let text = String::from_utf8(turtle).unwrap();
        assert!(text.contains("d2rq:"));

        let triples = parse_rdf(text.as_bytes(), RdfFormat::Turtle, None).unwrap();
        let reread = parse_mapping_triples(&triples, &declared_prefixes(&text), "http://localhost/").unwrap();
        reread.validate().unwrap();
        assert_eq!(reread.class_maps, mapping.class_maps);
        assert_eq!(reread.databases[0].jdbc_dsn.as_deref(), Some("jdbc:sqlite:shop.db"));
    }
}
