//! RDF syntaxes of an ontology: abbreviated RDF/XML and Turtle.

use super::{Names, OntologyRenderer};
use crate::errors::{Result, TransformError};
use crate::ontology::{rdf::to_triples, Ontology};
use crate::options::OutputFormat;
use crate::rdfxml::write_rdf_xml;
use crate::util::write_rdf;
use oxigraph::io::RdfFormat;

fn storage_error(err: TransformError) -> TransformError {
    match err {
        TransformError::Serialization(msg) => TransformError::OntologyStorage(msg),
        other => other,
    }
}

pub struct RdfXmlRenderer;

impl OntologyRenderer for RdfXmlRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        let triples = to_triples(ontology)?;
        let names = Names::for_ontology(ontology);
        write_rdf_xml(&triples, names.prefixes(), ontology.iri.as_deref(), true).map_err(storage_error)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::RdfXml
    }
}

pub struct TurtleRenderer;

impl OntologyRenderer for TurtleRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        let triples = to_triples(ontology)?;
        let names = Names::for_ontology(ontology);
        write_rdf(&triples, RdfFormat::Turtle, names.prefixes()).map_err(storage_error)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Turtle
    }
}
