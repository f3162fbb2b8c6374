//! Per-call ontology registry.
//!
//! Loading returns a [`LoadedOntology`] guard; the entry is removed from the registry
//! when the guard is dropped, whichever way the caller leaves.

use super::functional::{looks_like_functional, parse_functional};
use super::owlxml::{looks_like_owl_xml, parse_owl_xml};
use super::{rdf, Ontology};
use crate::errors::{Result, TransformError};
use crate::util::{declared_prefixes, parse_rdf_any};
use log::{debug, info};
use oxigraph::io::RdfFormat;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

/// The syntax a loaded document was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSyntax {
    Rdf(RdfFormat),
    OwlXml,
    Functional,
}

impl fmt::Display for SourceSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSyntax::Rdf(format) => write!(f, "{}", format.name()),
            SourceSyntax::OwlXml => write!(f, "OWL/XML"),
            SourceSyntax::Functional => write!(f, "OWL functional syntax"),
        }
    }
}

#[derive(Default)]
pub struct OntologyManager {
    ontologies: RefCell<HashMap<u64, Ontology>>,
    next_id: Cell<u64>,
}

impl OntologyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads an ontology document, detecting its syntax, and registers it.
    pub fn load_from_bytes(&self, bytes: &[u8]) -> Result<LoadedOntology<'_>> {
        let (ontology, syntax) = read_document(bytes)?;
        info!(
            "Loaded ontology {} from {} ({} axioms)",
            ontology.iri.as_deref().unwrap_or("<anonymous>"),
            syntax,
            ontology.len()
        );
        Ok(self.register(ontology, syntax))
    }

    pub fn register(&self, ontology: Ontology, syntax: SourceSyntax) -> LoadedOntology<'_> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.ontologies.borrow_mut().insert(id, ontology);
        LoadedOntology {
            manager: self,
            id,
            syntax,
        }
    }

    pub fn len(&self) -> usize {
        self.ontologies.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ontologies.borrow().is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ontologies.borrow().contains_key(&id)
    }

    fn remove(&self, id: u64) {
        if self.ontologies.borrow_mut().remove(&id).is_some() {
            debug!("Removed ontology {} from the registry", id);
        }
    }
}

fn read_document(bytes: &[u8]) -> Result<(Ontology, SourceSyntax)> {
    let text = String::from_utf8_lossy(bytes);
    if looks_like_owl_xml(&text) {
        return Ok((parse_owl_xml(&text)?, SourceSyntax::OwlXml));
    }
    if looks_like_functional(&text) {
        return Ok((parse_functional(&text)?, SourceSyntax::Functional));
    }
    let (triples, format) = parse_rdf_any(bytes, None)?;
    if triples.is_empty() {
        debug!("Document parsed as {} but holds no triples", format.name());
    }
    let ontology = rdf::from_triples(&triples, &declared_prefixes(&text));
    Ok((ontology, SourceSyntax::Rdf(format)))
}

/// A registered ontology. Dropping the guard removes the registry entry.
pub struct LoadedOntology<'m> {
    manager: &'m OntologyManager,
    id: u64,
    syntax: SourceSyntax,
}

impl LoadedOntology<'_> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn syntax(&self) -> SourceSyntax {
        self.syntax
    }

    pub fn with<R>(&self, f: impl FnOnce(&Ontology) -> R) -> Result<R> {
        let ontologies = self.manager.ontologies.borrow();
        let ontology = ontologies
            .get(&self.id)
            .ok_or_else(|| TransformError::OntologyStorage(format!("ontology {} is no longer registered", self.id)))?;
        Ok(f(ontology))
    }
}

impl Drop for LoadedOntology<'_> {
    fn drop(&mut self) {
        self.manager.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TURTLE: &str = r#"@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix vocab: <http://localhost/vocab/> .
<http://localhost/> a owl:Ontology .
vocab:Emp a owl:Class ; rdfs:subClassOf vocab:Person .
"#;

    #[test]
    fn test_guard_removes_entry() {
        let manager = OntologyManager::new();
        let id = {
            let loaded = manager.load_from_bytes(TURTLE.as_bytes()).unwrap();
            assert_eq!(loaded.syntax(), SourceSyntax::Rdf(RdfFormat::Turtle));
            assert!(manager.contains(loaded.id()));
            let iri = loaded.with(|o| o.iri.clone()).unwrap();
            assert_eq!(iri.as_deref(), Some("http://localhost/"));
            loaded.id()
        };
        assert!(!manager.contains(id));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_detects_syntax() {
        let manager = OntologyManager::new();
        let functional = "Prefix(:=<http://x.org/>)\nOntology(<http://x.org/o>\nDeclaration(Class(:A))\n)\n";
        let loaded = manager.load_from_bytes(functional.as_bytes()).unwrap();
        assert_eq!(loaded.syntax(), SourceSyntax::Functional);

        let owl_xml = r#"<?xml version="1.0"?>
<Ontology xmlns="http://www.w3.org/2002/07/owl#" ontologyIRI="http://x.org/o">
  <Declaration><Class IRI="http://x.org/A"/></Declaration>
</Ontology>"#;
        let second = manager.load_from_bytes(owl_xml.as_bytes()).unwrap();
        assert_eq!(second.syntax(), SourceSyntax::OwlXml);
        assert_ne!(loaded.id(), second.id());
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_malformed_input_is_load_error() {
        let manager = OntologyManager::new();
        let err = manager.load_from_bytes(b"this is { not rdf").err().unwrap();
        assert!(matches!(err, TransformError::OntologyLoad(_)));
        assert!(manager.is_empty());
    }
}
