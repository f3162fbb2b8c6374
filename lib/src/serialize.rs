//! Writes a materialized graph in one of the supported RDF syntaxes.

use crate::errors::Result;
use crate::materialize::RdfGraph;
use crate::options::RdfSyntax;
use crate::rdfxml::write_rdf_xml;
use crate::util::write_rdf;
use log::debug;
use oxigraph::io::RdfFormat;

/// Serializes the graph into memory. The graph is consumed whatever the outcome.
/// `base_uri` is only written (as `xml:base`) by the XML syntaxes.
pub fn serialize(graph: RdfGraph, base_uri: Option<&str>, syntax: RdfSyntax) -> Result<Vec<u8>> {
    debug!("Serializing {} triples as {}", graph.len(), syntax);
    let bytes = match syntax {
        RdfSyntax::RdfXml => write_rdf_xml(graph.triples(), graph.prefixes(), base_uri, false)?,
        RdfSyntax::RdfXmlAbbrev => write_rdf_xml(graph.triples(), graph.prefixes(), base_uri, true)?,
        RdfSyntax::NTriples => write_rdf(graph.triples(), RdfFormat::NTriples, &[])?,
        // N3 output is the Turtle subset of N3
        RdfSyntax::Turtle | RdfSyntax::N3 => {
            write_rdf(graph.triples(), RdfFormat::Turtle, graph.prefixes())?
        }
    };
    debug!("Serialized graph into {} bytes", bytes.len());
    Ok(bytes)
}

/// Like [`serialize`], with the syntax given by name (`RDF/XML`, `RDF/XML-ABBREV`,
/// `N-TRIPLE`, `TURTLE`, `TTL`, `N3`).
pub fn serialize_as(graph: RdfGraph, base_uri: Option<&str>, syntax: &str) -> Result<Vec<u8>> {
    let syntax: RdfSyntax = syntax.parse()?;
    serialize(graph, base_uri, syntax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransformError;
    use crate::util::parse_rdf;
    use oxigraph::model::{Literal, NamedNode, Triple};

    fn graph() -> RdfGraph {
        let triples = vec![Triple::new(
            NamedNode::new("http://localhost/Dept/1").unwrap(),
            NamedNode::new("http://localhost/vocab/Dept_name").unwrap(),
            Literal::new_simple_literal("R&D"),
        )];
        RdfGraph::from_triples(
            triples,
            vec![("vocab".to_string(), "http://localhost/vocab/".to_string())],
        )
    }

    #[test]
    fn test_every_syntax_parses_back() {
        let cases = [
            (RdfSyntax::RdfXml, RdfFormat::RdfXml),
            (RdfSyntax::RdfXmlAbbrev, RdfFormat::RdfXml),
            (RdfSyntax::NTriples, RdfFormat::NTriples),
            (RdfSyntax::Turtle, RdfFormat::Turtle),
            (RdfSyntax::N3, RdfFormat::Turtle),
        ];
        for (syntax, format) in cases {
            let bytes = serialize(graph(), Some("http://localhost/"), syntax).unwrap();
            assert!(!bytes.is_empty());
            let triples = parse_rdf(&bytes, format, None).unwrap();
            assert_eq!(triples, graph().triples().to_vec(), "{}", syntax);
        }
    }

    #[test]
    fn test_turtle_uses_prefixes() {
        let bytes = serialize(graph(), None, RdfSyntax::Turtle).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("@prefix vocab: <http://localhost/vocab/>"));
        assert!(text.contains("vocab:Dept_name"));
    }

    #[test]
    fn test_unknown_syntax_name() {
        match serialize_as(graph(), None, "JSON-LD") {
            Err(TransformError::Serialization(msg)) => assert!(msg.contains("JSON-LD")),
            other => panic!("expected a serialization error, got {:?}", other.map(|b| b.len())),
        }
    }
}
