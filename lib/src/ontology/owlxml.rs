//! Reader for OWL/XML documents.
//!
//! Elements are converted into the node tree of the functional-syntax reader: OWL/XML
//! element names are the functional-syntax constructor names, entity elements become
//! IRIs, and `cardinality` attributes become the leading argument.

use super::functional::{Interpreter, Node};
use super::{EntityKind, Ontology};
use crate::errors::{Result, TransformError};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn load_error(message: impl std::fmt::Display) -> TransformError {
    TransformError::OntologyLoad(format!("OWL/XML: {}", message))
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(load_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(load_error)?.to_string();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        ..Default::default()
    })
}

fn read_tree(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<Element> = Vec::new();
    loop {
        match reader.read_event().map_err(load_error)? {
            Event::Start(e) => stack.push(start_element(&e)?),
            Event::Empty(e) => {
                let element = start_element(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape().map_err(load_error)?);
                }
            }
            Event::CData(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| load_error("unbalanced end tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Eof => return Err(load_error("unexpected end of document")),
            _ => {}
        }
    }
}

fn entity_iri(element: &Element) -> Node {
    match (element.attribute("IRI"), element.attribute("abbreviatedIRI")) {
        (Some(iri), _) => Node::Iri(iri.to_string()),
        (None, Some(abbreviated)) => Node::PName(abbreviated.to_string()),
        (None, None) => Node::Word(String::new()),
    }
}

fn to_node(element: &Element, in_declaration: bool) -> Node {
    match element.name.as_str() {
        name if EntityKind::from_owl_name(name).is_some() => {
            let iri = entity_iri(element);
            if in_declaration {
                Node::Call(name.to_string(), vec![iri])
            } else {
                iri
            }
        }
        "IRI" => Node::Iri(element.text.clone()),
        "AbbreviatedIRI" => Node::PName(element.text.clone()),
        "AnonymousIndividual" => Node::Blank(element.attribute("nodeID").unwrap_or("").to_string()),
        "Literal" => Node::Literal {
            value: element.text.clone(),
            lang: element.attribute("xml:lang").map(str::to_string),
            datatype: element
                .attribute("datatypeIRI")
                .map(|dt| Box::new(Node::Iri(dt.to_string()))),
        },
        name => {
            let mut args = Vec::new();
            if let Some(n) = element.attribute("cardinality") {
                args.push(Node::Word(n.to_string()));
            }
            let declaration = name == "Declaration";
            args.extend(element.children.iter().map(|c| to_node(c, declaration)));
            Node::Call(name.to_string(), args)
        }
    }
}

/// Parses an OWL/XML document.
pub fn parse_owl_xml(text: &str) -> Result<Ontology> {
    let root = read_tree(text)?;
    if root.name != "Ontology" {
        return Err(load_error(format!("root element is {}, not Ontology", root.name)));
    }
    let mut interpreter = Interpreter::new();
    let mut body = Vec::new();
    if let Some(iri) = root.attribute("ontologyIRI") {
        body.push(Node::Iri(iri.to_string()));
    }
    for child in &root.children {
        if child.name == "Prefix" {
            if let (Some(name), Some(iri)) = (child.attribute("name"), child.attribute("IRI")) {
                interpreter.add_prefix(name, iri);
            }
            continue;
        }
        body.push(to_node(child, false));
    }
    let ontology = interpreter.ontology(&body);
    debug!("Read {} axioms from OWL/XML", ontology.len());
    Ok(ontology)
}

/// True for an XML document whose root element is an OWL/XML `Ontology`.
pub fn looks_like_owl_xml(text: &str) -> bool {
    let Some(start) = text.find("<Ontology").or_else(|| text.find("<owl:Ontology")) else {
        return false;
    };
    !text[..start].contains("<rdf:RDF") && text.contains("http://www.w3.org/2002/07/owl#")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Axiom, ClassExpression};
    use oxigraph::model::Literal;

    const DOC: &str = r#"<?xml version="1.0"?>
<Ontology xmlns="http://www.w3.org/2002/07/owl#" ontologyIRI="http://example.org/shop">
    <Prefix name="" IRI="http://example.org/shop#"/>
    <Declaration><Class IRI="http://example.org/shop#Emp"/></Declaration>
    <SubClassOf>
        <Class abbreviatedIRI=":Emp"/>
        <ObjectMaxCardinality cardinality="2"><ObjectProperty IRI="http://example.org/shop#dept"/></ObjectMaxCardinality>
    </SubClassOf>
    <AnnotationAssertion>
        <AnnotationProperty abbreviatedIRI="rdfs:label"/>
        <IRI>http://example.org/shop#Emp</IRI>
        <Literal xml:lang="en">R&amp;D staff</Literal>
    </AnnotationAssertion>
    <HasKey><Class IRI="http://example.org/shop#Emp"/></HasKey>
</Ontology>
"#;

    #[test]
    fn test_parse_document() {
        assert!(looks_like_owl_xml(DOC));
        let o = parse_owl_xml(DOC).unwrap();
        assert_eq!(o.iri.as_deref(), Some("http://example.org/shop"));
        let axioms = o.axiom_set();
        assert!(axioms.contains(&Axiom::SubClassOf(
            ClassExpression::class("http://example.org/shop#Emp"),
            ClassExpression::MaxCardinality {
                cardinality: 2,
                property: "http://example.org/shop#dept".into()
            }
        )));
        assert!(axioms.contains(&Axiom::AnnotationAssertion {
            property: "http://www.w3.org/2000/01/rdf-schema#label".into(),
            subject: "http://example.org/shop#Emp".into(),
            value: Literal::new_language_tagged_literal("R&D staff", "en").unwrap().into(),
        }));
        assert_eq!(o.unparsed, 1);
    }

    #[test]
    fn test_rejects_other_roots() {
        assert!(parse_owl_xml("<rdf:RDF xmlns:rdf=\"x\"></rdf:RDF>").is_err());
        assert!(parse_owl_xml("<Ontology>").is_err());
        assert!(!looks_like_owl_xml("<rdf:RDF><owl:Ontology rdf:about=\"x\"/></rdf:RDF>"));
    }
}
