//! OWL/XML renderer.

use super::{Names, OntologyRenderer};
use crate::consts::{OWL_NS, XSD_STRING};
use crate::errors::{Result, TransformError};
use crate::ontology::{Axiom, ClassExpression, EntityKind, Ontology};
use crate::options::OutputFormat;
use oxigraph::model::{Literal, Term};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

pub struct OwlXmlRenderer;

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| TransformError::OntologyStorage(e.to_string()))
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attributes {
            start.push_attribute(*attr);
        }
        self.emit(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attributes {
            start.push_attribute(*attr);
        }
        self.emit(Event::Empty(start))
    }

    fn text_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        self.open(name, attributes)?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn entity(&mut self, kind: EntityKind, iri: &str) -> Result<()> {
        self.empty(kind.owl_name(), &[("IRI", iri)])
    }

    fn literal(&mut self, literal: &Literal) -> Result<()> {
        match literal.language() {
            Some(lang) => self.text_element("Literal", &[("xml:lang", lang)], literal.value()),
            None if literal.datatype() == XSD_STRING => self.text_element("Literal", &[], literal.value()),
            None => self.text_element(
                "Literal",
                &[("datatypeIRI", literal.datatype().as_str())],
                literal.value(),
            ),
        }
    }

    fn class_expression(&mut self, ce: &ClassExpression) -> Result<()> {
        match ce {
            ClassExpression::Class(iri) => self.entity(EntityKind::Class, iri),
            ClassExpression::IntersectionOf(ops) | ClassExpression::UnionOf(ops) => {
                let name = if matches!(ce, ClassExpression::IntersectionOf(_)) {
                    "ObjectIntersectionOf"
                } else {
                    "ObjectUnionOf"
                };
                self.open(name, &[])?;
                for op in ops {
                    self.class_expression(op)?;
                }
                self.close(name)
            }
            ClassExpression::ComplementOf(inner) => {
                self.open("ObjectComplementOf", &[])?;
                self.class_expression(inner)?;
                self.close("ObjectComplementOf")
            }
            ClassExpression::SomeValuesFrom { property, filler }
            | ClassExpression::AllValuesFrom { property, filler } => {
                let name = if matches!(ce, ClassExpression::SomeValuesFrom { .. }) {
                    "ObjectSomeValuesFrom"
                } else {
                    "ObjectAllValuesFrom"
                };
                self.open(name, &[])?;
                self.entity(EntityKind::ObjectProperty, property)?;
                self.class_expression(filler)?;
                self.close(name)
            }
            ClassExpression::MinCardinality { cardinality, property }
            | ClassExpression::MaxCardinality { cardinality, property }
            | ClassExpression::ExactCardinality { cardinality, property } => {
                let name = match ce {
                    ClassExpression::MinCardinality { .. } => "ObjectMinCardinality",
                    ClassExpression::MaxCardinality { .. } => "ObjectMaxCardinality",
                    _ => "ObjectExactCardinality",
                };
                let n = cardinality.to_string();
                self.open(name, &[("cardinality", n.as_str())])?;
                self.entity(EntityKind::ObjectProperty, property)?;
                self.close(name)
            }
        }
    }

    fn annotation_value(&mut self, value: &Term) -> Result<()> {
        match value {
            Term::NamedNode(n) => self.text_element("IRI", &[], n.as_str()),
            Term::BlankNode(b) => self.empty("AnonymousIndividual", &[("nodeID", b.as_str())]),
            Term::Literal(l) => self.literal(l),
            #[allow(unreachable_patterns)]
            _ => Err(TransformError::OntologyStorage(
                "OWL/XML cannot hold quoted triples".to_string(),
            )),
        }
    }

    fn axiom(&mut self, axiom: &Axiom) -> Result<()> {
        let name = axiom.kind_name();
        self.open(name, &[])?;
        match axiom {
            Axiom::Declaration(kind, iri) => self.entity(*kind, iri)?,
            Axiom::SubClassOf(sub, sup) => {
                self.class_expression(sub)?;
                self.class_expression(sup)?;
            }
            Axiom::EquivalentClasses(ops) | Axiom::DisjointClasses(ops) => {
                for op in ops {
                    self.class_expression(op)?;
                }
            }
            Axiom::SubObjectPropertyOf(a, b) => {
                self.entity(EntityKind::ObjectProperty, a)?;
                self.entity(EntityKind::ObjectProperty, b)?;
            }
            Axiom::SubDataPropertyOf(a, b) => {
                self.entity(EntityKind::DataProperty, a)?;
                self.entity(EntityKind::DataProperty, b)?;
            }
            Axiom::ObjectPropertyDomain(p, ce) | Axiom::ObjectPropertyRange(p, ce) => {
                self.entity(EntityKind::ObjectProperty, p)?;
                self.class_expression(ce)?;
            }
            Axiom::DataPropertyDomain(p, ce) => {
                self.entity(EntityKind::DataProperty, p)?;
                self.class_expression(ce)?;
            }
            Axiom::DataPropertyRange(p, dt) => {
                self.entity(EntityKind::DataProperty, p)?;
                self.entity(EntityKind::Datatype, dt)?;
            }
            Axiom::FunctionalObjectProperty(p) => self.entity(EntityKind::ObjectProperty, p)?,
            Axiom::FunctionalDataProperty(p) => self.entity(EntityKind::DataProperty, p)?,
            Axiom::ClassAssertion(ce, i) => {
                self.class_expression(ce)?;
                self.entity(EntityKind::NamedIndividual, i)?;
            }
            Axiom::ObjectPropertyAssertion {
                property,
                subject,
                object,
            } => {
                self.entity(EntityKind::ObjectProperty, property)?;
                self.entity(EntityKind::NamedIndividual, subject)?;
                self.entity(EntityKind::NamedIndividual, object)?;
            }
            Axiom::DataPropertyAssertion {
                property,
                subject,
                value,
            } => {
                self.entity(EntityKind::DataProperty, property)?;
                self.entity(EntityKind::NamedIndividual, subject)?;
                self.literal(value)?;
            }
            Axiom::AnnotationAssertion {
                property,
                subject,
                value,
            } => {
                self.entity(EntityKind::AnnotationProperty, property)?;
                self.text_element("IRI", &[], subject)?;
                self.annotation_value(value)?;
            }
        }
        self.close(name)
    }
}

impl OntologyRenderer for OwlXmlRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        let names = Names::for_ontology(ontology);
        let mut out = XmlOut {
            writer: Writer::new_with_indent(Vec::new(), b' ', 4),
        };
        out.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut attributes: Vec<(String, String)> = vec![("xmlns".into(), OWL_NS.into())];
        if let Some(iri) = &ontology.iri {
            attributes.push(("xml:base".into(), iri.clone()));
            attributes.push(("ontologyIRI".into(), iri.clone()));
        }
        let attributes: Vec<(&str, &str)> = attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        out.open("Ontology", &attributes)?;
        for (name, iri) in names.prefixes() {
            out.empty("Prefix", &[("name", name.as_str()), ("IRI", iri.as_str())])?;
        }
        for (property, value) in &ontology.annotations {
            out.open("Annotation", &[])?;
            out.entity(EntityKind::AnnotationProperty, property)?;
            out.annotation_value(value)?;
            out.close("Annotation")?;
        }
        for axiom in ontology.axioms() {
            out.axiom(axiom)?;
        }
        out.close("Ontology")?;
        let mut bytes = out.writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::OwlXml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::owlxml::parse_owl_xml;

    #[test]
    fn test_output_reads_back() {
        let mut o = Ontology::new(Some("http://example.org/shop".into()));
        o.add(Axiom::SubClassOf(
            ClassExpression::class("http://example.org/shop#Emp"),
            ClassExpression::AllValuesFrom {
                property: "http://example.org/shop#dept".into(),
                filler: Box::new(ClassExpression::ComplementOf(Box::new(ClassExpression::class(
                    "http://example.org/shop#Shop",
                )))),
            },
        ));
        o.add(Axiom::AnnotationAssertion {
            property: "http://www.w3.org/2000/01/rdf-schema#comment".into(),
            subject: "http://example.org/shop#Emp".into(),
            value: Literal::new_simple_literal("a < b & c").into(),
        });
        o.add_missing_declarations();

        let bytes = OwlXmlRenderer.render(&o).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("ontologyIRI=\"http://example.org/shop\""));
        assert!(text.contains("a &lt; b &amp; c"));
        let reread = parse_owl_xml(&text).unwrap();
        assert_eq!(reread.axiom_set(), o.axiom_set());
        assert_eq!(reread.unparsed, 0);
    }
}
