//! OWL 2 functional syntax. With `abbreviate` set, IRIs covered by a declared prefix are
//! written as prefixed names (the "Prefix OWL" flavour); otherwise every IRI is written in full.

use super::{quote, Names, OntologyRenderer};
use crate::consts::XSD_STRING;
use crate::errors::Result;
use crate::ontology::{Axiom, ClassExpression, Ontology};
use crate::options::OutputFormat;
use oxigraph::model::{Literal, Term};
use std::fmt::Write;

pub struct FunctionalRenderer {
    pub abbreviate: bool,
}

struct Writer<'a> {
    names: &'a Names,
    abbreviate: bool,
}

impl Writer<'_> {
    fn iri(&self, iri: &str) -> String {
        if self.abbreviate {
            self.names.prefixed_or_full(iri)
        } else {
            format!("<{}>", iri)
        }
    }

    fn literal(&self, literal: &Literal) -> String {
        let quoted = quote(literal.value());
        if let Some(lang) = literal.language() {
            format!("{}@{}", quoted, lang)
        } else if literal.datatype() == XSD_STRING {
            quoted
        } else {
            format!("{}^^{}", quoted, self.iri(literal.datatype().as_str()))
        }
    }

    fn term(&self, term: &Term) -> String {
        match term {
            Term::NamedNode(n) => self.iri(n.as_str()),
            Term::BlankNode(b) => format!("_:{}", b.as_str()),
            Term::Literal(l) => self.literal(l),
            #[allow(unreachable_patterns)]
            other => quote(&other.to_string()),
        }
    }

    fn class_expression(&self, ce: &ClassExpression) -> String {
        match ce {
            ClassExpression::Class(iri) => self.iri(iri),
            ClassExpression::IntersectionOf(ops) => format!("ObjectIntersectionOf({})", self.list(ops)),
            ClassExpression::UnionOf(ops) => format!("ObjectUnionOf({})", self.list(ops)),
            ClassExpression::ComplementOf(inner) => {
                format!("ObjectComplementOf({})", self.class_expression(inner))
            }
            ClassExpression::SomeValuesFrom { property, filler } => format!(
                "ObjectSomeValuesFrom({} {})",
                self.iri(property),
                self.class_expression(filler)
            ),
            ClassExpression::AllValuesFrom { property, filler } => format!(
                "ObjectAllValuesFrom({} {})",
                self.iri(property),
                self.class_expression(filler)
            ),
            ClassExpression::MinCardinality { cardinality, property } => {
                format!("ObjectMinCardinality({} {})", cardinality, self.iri(property))
            }
            ClassExpression::MaxCardinality { cardinality, property } => {
                format!("ObjectMaxCardinality({} {})", cardinality, self.iri(property))
            }
            ClassExpression::ExactCardinality { cardinality, property } => {
                format!("ObjectExactCardinality({} {})", cardinality, self.iri(property))
            }
        }
    }

    fn list(&self, ops: &[ClassExpression]) -> String {
        ops.iter()
            .map(|op| self.class_expression(op))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn axiom(&self, axiom: &Axiom) -> String {
        let body = match axiom {
            Axiom::Declaration(kind, iri) => format!("{}({})", kind.owl_name(), self.iri(iri)),
            Axiom::SubClassOf(sub, sup) => {
                format!("{} {}", self.class_expression(sub), self.class_expression(sup))
            }
            Axiom::EquivalentClasses(ops) | Axiom::DisjointClasses(ops) => self.list(ops),
            Axiom::SubObjectPropertyOf(a, b) | Axiom::SubDataPropertyOf(a, b) => {
                format!("{} {}", self.iri(a), self.iri(b))
            }
            Axiom::ObjectPropertyDomain(p, ce)
            | Axiom::ObjectPropertyRange(p, ce)
            | Axiom::DataPropertyDomain(p, ce) => {
                format!("{} {}", self.iri(p), self.class_expression(ce))
            }
            Axiom::DataPropertyRange(p, dt) => format!("{} {}", self.iri(p), self.iri(dt)),
            Axiom::FunctionalObjectProperty(p) | Axiom::FunctionalDataProperty(p) => self.iri(p),
            Axiom::ClassAssertion(ce, i) => format!("{} {}", self.class_expression(ce), self.iri(i)),
            Axiom::ObjectPropertyAssertion {
                property,
                subject,
                object,
            } => format!("{} {} {}", self.iri(property), self.iri(subject), self.iri(object)),
            Axiom::DataPropertyAssertion {
                property,
                subject,
                value,
            } => format!("{} {} {}", self.iri(property), self.iri(subject), self.literal(value)),
            Axiom::AnnotationAssertion {
                property,
                subject,
                value,
            } => format!("{} {} {}", self.iri(property), self.iri(subject), self.term(value)),
        };
        format!("{}({})", axiom.kind_name(), body)
    }
}

impl OntologyRenderer for FunctionalRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        let names = Names::for_ontology(ontology);
        let w = Writer {
            names: &names,
            abbreviate: self.abbreviate,
        };
        let mut out = String::new();
        for (name, iri) in names.prefixes() {
            let _ = writeln!(out, "Prefix({}:=<{}>)", name, iri);
        }
        out.push('\n');
        match &ontology.iri {
            Some(iri) => {
                let _ = writeln!(out, "Ontology(<{}>", iri);
            }
            None => out.push_str("Ontology(\n"),
        }
        for (property, value) in &ontology.annotations {
            let _ = writeln!(out, "Annotation({} {})", w.iri(property), w.term(value));
        }
        if !ontology.annotations.is_empty() {
            out.push('\n');
        }
        for axiom in ontology.axioms() {
            out.push_str(&w.axiom(axiom));
            out.push('\n');
        }
        out.push_str(")\n");
        Ok(out.into_bytes())
    }

    fn format(&self) -> OutputFormat {
        if self.abbreviate {
            OutputFormat::PrefixOwl
        } else {
            OutputFormat::OwlFunctional
        }
    }
}
