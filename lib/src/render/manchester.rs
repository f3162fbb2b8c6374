//! Manchester OWL syntax: one frame per entity.

use super::{Names, OntologyRenderer};
use crate::consts::XSD_STRING;
use crate::errors::Result;
use crate::ontology::{Axiom, ClassExpression, EntityKind, Ontology};
use crate::options::OutputFormat;
use oxigraph::model::{Literal, Term};
use std::collections::HashSet;
use std::fmt::Write;

pub struct ManchesterRenderer;

struct Frame {
    keyword: &'static str,
    subject: String,
    /// Section name and the comma-separated entries under it.
    sections: Vec<(&'static str, Vec<String>)>,
}

impl Frame {
    fn new(keyword: &'static str, subject: String) -> Self {
        Frame {
            keyword,
            subject,
            sections: Vec::new(),
        }
    }

    fn add(&mut self, section: &'static str, entry: String) {
        match self.sections.iter_mut().find(|(name, _)| *name == section) {
            Some((_, entries)) => entries.push(entry),
            None => self.sections.push((section, vec![entry])),
        }
    }

    fn write(&self, out: &mut String) {
        let _ = writeln!(out, "{}: {}\n", self.keyword, self.subject);
        for (section, entries) in &self.sections {
            let _ = writeln!(out, "    {}: ", section);
            let _ = writeln!(out, "        {}\n", entries.join(",\n        "));
        }
        out.push('\n');
    }
}

struct Manchester<'a> {
    names: &'a Names,
}

impl Manchester<'_> {
    fn iri(&self, iri: &str) -> String {
        self.names.prefixed_or_full(iri)
    }

    fn literal(&self, literal: &Literal) -> String {
        let quoted = super::quote(literal.value());
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
            other => other.to_string(),
        }
    }

    fn operand(&self, ce: &ClassExpression) -> String {
        match ce {
            ClassExpression::Class(_) => self.class_expression(ce),
            _ => format!("({})", self.class_expression(ce)),
        }
    }

    fn class_expression(&self, ce: &ClassExpression) -> String {
        match ce {
            ClassExpression::Class(iri) => self.iri(iri),
            ClassExpression::IntersectionOf(ops) => ops
                .iter()
                .map(|op| self.operand(op))
                .collect::<Vec<_>>()
                .join(" and "),
            ClassExpression::UnionOf(ops) => ops
                .iter()
                .map(|op| self.operand(op))
                .collect::<Vec<_>>()
                .join(" or "),
            ClassExpression::ComplementOf(inner) => format!("not {}", self.operand(inner)),
            ClassExpression::SomeValuesFrom { property, filler } => {
                format!("{} some {}", self.iri(property), self.operand(filler))
            }
            ClassExpression::AllValuesFrom { property, filler } => {
                format!("{} only {}", self.iri(property), self.operand(filler))
            }
            ClassExpression::MinCardinality { cardinality, property } => {
                format!("{} min {}", self.iri(property), cardinality)
            }
            ClassExpression::MaxCardinality { cardinality, property } => {
                format!("{} max {}", self.iri(property), cardinality)
            }
            ClassExpression::ExactCardinality { cardinality, property } => {
                format!("{} exactly {}", self.iri(property), cardinality)
            }
        }
    }

    /// Adds `axiom` to the frame of `subject`.
    fn add_to_frame(&self, frame: &mut Frame, subject: &str, axiom: &Axiom) {
        match axiom {
            Axiom::Declaration(..) => {}
            Axiom::AnnotationAssertion { property, value, .. } => {
                frame.add("Annotations", format!("{} {}", self.iri(property), self.term(value)))
            }
            Axiom::SubClassOf(_, sup) => frame.add("SubClassOf", self.class_expression(sup)),
            Axiom::EquivalentClasses(ops) | Axiom::DisjointClasses(ops) => {
                let section = if matches!(axiom, Axiom::EquivalentClasses(_)) {
                    "EquivalentTo"
                } else {
                    "DisjointWith"
                };
                for op in ops.iter().filter(|op| op.as_class() != Some(subject)) {
                    frame.add(section, self.class_expression(op));
                }
            }
            Axiom::SubObjectPropertyOf(_, parent) | Axiom::SubDataPropertyOf(_, parent) => {
                frame.add("SubPropertyOf", self.iri(parent))
            }
            Axiom::ObjectPropertyDomain(_, c) | Axiom::DataPropertyDomain(_, c) => {
                frame.add("Domain", self.class_expression(c))
            }
            Axiom::ObjectPropertyRange(_, c) => frame.add("Range", self.class_expression(c)),
            Axiom::DataPropertyRange(_, dt) => frame.add("Range", self.iri(dt)),
            Axiom::FunctionalObjectProperty(_) | Axiom::FunctionalDataProperty(_) => {
                frame.add("Characteristics", "Functional".to_string())
            }
            Axiom::ClassAssertion(c, _) => frame.add("Types", self.class_expression(c)),
            Axiom::ObjectPropertyAssertion { property, object, .. } => {
                frame.add("Facts", format!("{} {}", self.iri(property), self.iri(object)))
            }
            Axiom::DataPropertyAssertion { property, value, .. } => {
                frame.add("Facts", format!("{} {}", self.iri(property), self.literal(value)))
            }
        }
    }
}

const FRAMES: [(EntityKind, &str); 6] = [
    (EntityKind::AnnotationProperty, "AnnotationProperty"),
    (EntityKind::Datatype, "Datatype"),
    (EntityKind::ObjectProperty, "ObjectProperty"),
    (EntityKind::DataProperty, "DataProperty"),
    (EntityKind::Class, "Class"),
    (EntityKind::NamedIndividual, "Individual"),
];

impl OntologyRenderer for ManchesterRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        let names = Names::for_ontology(ontology);
        let m = Manchester { names: &names };
        let mut out = String::new();
        for (name, iri) in names.prefixes() {
            let _ = writeln!(out, "Prefix: {}: <{}>", name, iri);
        }
        out.push('\n');
        match &ontology.iri {
            Some(iri) => {
                let _ = writeln!(out, "Ontology: <{}>\n", iri);
            }
            None => out.push_str("Ontology:\n\n"),
        }
        if !ontology.annotations.is_empty() {
            let entries: Vec<String> = ontology
                .annotations
                .iter()
                .map(|(p, v)| format!("{} {}", m.iri(p), m.term(v)))
                .collect();
            let _ = writeln!(out, "Annotations: \n    {}\n", entries.join(",\n    "));
        }

        let mut placed: HashSet<&Axiom> = HashSet::new();
        for (kind, keyword) in FRAMES {
            for iri in ontology.entities(kind) {
                let mut frame = Frame::new(keyword, m.iri(iri));
                for axiom in ontology.axioms_about(iri) {
                    // an IRI may be punned, each axiom goes to the first frame only
                    if placed.contains(axiom) {
                        continue;
                    }
                    m.add_to_frame(&mut frame, iri, axiom);
                    placed.insert(axiom);
                }
                frame.write(&mut out);
            }
        }
        // axioms whose subject is not a named entity
        for axiom in ontology.axioms().iter().filter(|a| !placed.contains(*a)) {
            match axiom {
                Axiom::SubClassOf(sub, sup) => {
                    let _ = writeln!(
                        out,
                        "Class: {}\n\n    SubClassOf: \n        {}\n\n",
                        m.operand(sub),
                        m.class_expression(sup)
                    );
                }
                Axiom::EquivalentClasses(ops) | Axiom::DisjointClasses(ops) => {
                    let keyword = if matches!(axiom, Axiom::EquivalentClasses(_)) {
                        "EquivalentClasses"
                    } else {
                        "DisjointClasses"
                    };
                    let list: Vec<String> = ops.iter().map(|op| m.operand(op)).collect();
                    let _ = writeln!(out, "{}: \n    {}\n", keyword, list.join(", "));
                }
                _ => {}
            }
        }
        Ok(out.into_bytes())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Manchester
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames() {
        let mut o = Ontology::new(Some("http://localhost/".into()));
        o.prefixes = vec![("vocab".to_string(), "http://localhost/vocab/".to_string())];
        o.add(Axiom::SubClassOf(
            ClassExpression::class("http://localhost/vocab/Emp"),
            ClassExpression::MinCardinality {
                cardinality: 1,
                property: "http://localhost/vocab/Emp_dept".into(),
            },
        ));
        o.add(Axiom::ObjectPropertyRange(
            "http://localhost/vocab/Emp_dept".into(),
            ClassExpression::class("http://localhost/vocab/Dept"),
        ));
        o.add(Axiom::DataPropertyAssertion {
            property: "http://localhost/vocab/Emp_name".into(),
            subject: "http://localhost/Emp/10".into(),
            value: Literal::new_simple_literal("Ann"),
        });
        o.add_missing_declarations();
        let text = String::from_utf8(ManchesterRenderer.render(&o).unwrap()).unwrap();
        assert!(text.contains("Prefix: vocab: <http://localhost/vocab/>"));
        assert!(text.contains("Ontology: <http://localhost/>"));
        assert!(text.contains("Class: vocab:Emp"));
        assert!(text.contains("vocab:Emp_dept min 1"));
        assert!(text.contains("ObjectProperty: vocab:Emp_dept"));
        assert!(text.contains("Individual: <http://localhost/Emp/10>"));
        assert!(text.contains("vocab:Emp_name \"Ann\""));
    }
}
