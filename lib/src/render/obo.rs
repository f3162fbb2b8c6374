//! OBO 1.2 flat file renderer.
//!
//! Classes become `[Term]` stanzas, properties `[Typedef]` and individuals `[Instance]`.
//! Class axioms with no OBO tag are skipped.

use super::{quote, Names, OntologyRenderer};
use crate::consts::{COMMENT, LABEL};
use crate::errors::Result;
use crate::ontology::{Axiom, ClassExpression, EntityKind, Ontology};
use crate::options::OutputFormat;
use chrono::Local;
use log::debug;
use oxigraph::model::Term;
use std::fmt::Write;

pub struct OboRenderer;

struct Obo<'a> {
    names: &'a Names,
    ontology: &'a Ontology,
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\n', "\\n")
}

impl Obo<'_> {
    fn id(&self, iri: &str) -> String {
        escape(&self.names.short(iri))
    }

    fn label(&self, iri: &str) -> Option<String> {
        self.ontology.axioms_about(iri).find_map(|a| match a {
            Axiom::AnnotationAssertion {
                property,
                value: Term::Literal(l),
                ..
            } if property.as_str() == LABEL.as_str() => Some(l.value().to_string()),
            _ => None,
        })
    }

    /// `id ! label` reference to another entity.
    fn reference(&self, iri: &str) -> String {
        match self.label(iri) {
            Some(label) => format!("{} ! {}", self.id(iri), escape(&label)),
            None => self.id(iri),
        }
    }

    fn header(&self, out: &mut String, stanza: &str, iri: &str) {
        let _ = writeln!(out, "[{}]", stanza);
        let _ = writeln!(out, "id: {}", self.id(iri));
        let name = self.label(iri).unwrap_or_else(|| self.names.short(iri));
        let _ = writeln!(out, "name: {}", escape(&name));
        for axiom in self.ontology.axioms_about(iri) {
            if let Axiom::AnnotationAssertion {
                property,
                value: Term::Literal(l),
                ..
            } = axiom
            {
                if property.as_str() == COMMENT.as_str() {
                    let _ = writeln!(out, "comment: {}", escape(l.value()));
                }
            }
        }
    }

    fn term_stanza(&self, out: &mut String, iri: &str, skipped: &mut usize) {
        self.header(out, "Term", iri);
        for axiom in self.ontology.axioms_about(iri) {
            match axiom {
                Axiom::SubClassOf(_, ClassExpression::Class(sup)) => {
                    let _ = writeln!(out, "is_a: {}", self.reference(sup));
                }
                Axiom::SubClassOf(_, ClassExpression::SomeValuesFrom { property, filler }) => {
                    match filler.as_class() {
                        Some(target) => {
                            let _ = writeln!(out, "relationship: {} {}", self.id(property), self.reference(target));
                        }
                        None => *skipped += 1,
                    }
                }
                Axiom::EquivalentClasses(ops) => {
                    for op in &ops[1..] {
                        match op {
                            ClassExpression::IntersectionOf(parts) => {
                                for part in parts {
                                    match part {
                                        ClassExpression::Class(c) => {
                                            let _ = writeln!(out, "intersection_of: {}", self.reference(c));
                                        }
                                        ClassExpression::SomeValuesFrom { property, filler } => {
                                            match filler.as_class() {
                                                Some(target) => {
                                                    let _ = writeln!(
                                                        out,
                                                        "intersection_of: {} {}",
                                                        self.id(property),
                                                        self.reference(target)
                                                    );
                                                }
                                                None => *skipped += 1,
                                            }
                                        }
                                        _ => *skipped += 1,
                                    }
                                }
                            }
                            ClassExpression::UnionOf(parts) => {
                                for part in parts {
                                    match part.as_class() {
                                        Some(c) => {
                                            let _ = writeln!(out, "union_of: {}", self.reference(c));
                                        }
                                        None => *skipped += 1,
                                    }
                                }
                            }
                            ClassExpression::Class(c) => {
                                let _ = writeln!(out, "equivalent_to: {}", self.reference(c));
                            }
                            _ => *skipped += 1,
                        }
                    }
                }
                Axiom::DisjointClasses(ops) => {
                    for op in &ops[1..] {
                        match op.as_class() {
                            Some(c) => {
                                let _ = writeln!(out, "disjoint_from: {}", self.reference(c));
                            }
                            None => *skipped += 1,
                        }
                    }
                }
                Axiom::Declaration(..) | Axiom::AnnotationAssertion { .. } | Axiom::ClassAssertion(..) => {}
                _ => *skipped += 1,
            }
        }
        out.push('\n');
    }

    fn typedef_stanza(&self, out: &mut String, iri: &str, skipped: &mut usize) {
        self.header(out, "Typedef", iri);
        for axiom in self.ontology.axioms_about(iri) {
            match axiom {
                Axiom::ObjectPropertyDomain(_, ClassExpression::Class(c))
                | Axiom::DataPropertyDomain(_, ClassExpression::Class(c)) => {
                    let _ = writeln!(out, "domain: {}", self.reference(c));
                }
                Axiom::ObjectPropertyRange(_, ClassExpression::Class(c)) | Axiom::DataPropertyRange(_, c) => {
                    let _ = writeln!(out, "range: {}", self.reference(c));
                }
                Axiom::SubObjectPropertyOf(_, parent) | Axiom::SubDataPropertyOf(_, parent) => {
                    let _ = writeln!(out, "is_a: {}", self.reference(parent));
                }
                Axiom::FunctionalObjectProperty(_) | Axiom::FunctionalDataProperty(_) => {
                    out.push_str("is_functional: true\n");
                }
                Axiom::Declaration(..) | Axiom::AnnotationAssertion { .. } => {}
                _ => *skipped += 1,
            }
        }
        out.push('\n');
    }

    fn instance_stanza(&self, out: &mut String, iri: &str, skipped: &mut usize) {
        self.header(out, "Instance", iri);
        for axiom in self.ontology.axioms_about(iri) {
            match axiom {
                Axiom::ClassAssertion(ClassExpression::Class(c), _) => {
                    let _ = writeln!(out, "instance_of: {}", self.reference(c));
                }
                Axiom::ObjectPropertyAssertion { property, object, .. } => {
                    let _ = writeln!(out, "property_value: {} {}", self.id(property), self.id(object));
                }
                Axiom::DataPropertyAssertion { property, value, .. } => {
                    let _ = writeln!(
                        out,
                        "property_value: {} {} {}",
                        self.id(property),
                        quote(value.value()),
                        self.names.prefixed_or_full(value.datatype().as_str())
                    );
                }
                Axiom::Declaration(..) | Axiom::AnnotationAssertion { .. } => {}
                _ => *skipped += 1,
            }
        }
        out.push('\n');
    }
}

impl OntologyRenderer for OboRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        let names = Names::for_ontology(ontology);
        let obo = Obo {
            names: &names,
            ontology,
        };
        let mut out = String::new();
        out.push_str("format-version: 1.2\n");
        let _ = writeln!(out, "date: {}", Local::now().format("%d:%m:%Y %H:%M"));
        out.push_str("auto-generated-by: dbtransformer\n");
        if let Some(iri) = &ontology.iri {
            let _ = writeln!(out, "ontology: {}", escape(iri.trim_end_matches(['/', '#'])));
        }
        out.push('\n');

        let mut skipped = 0usize;
        for iri in ontology.entities(EntityKind::Class) {
            obo.term_stanza(&mut out, iri, &mut skipped);
        }
        for kind in [EntityKind::ObjectProperty, EntityKind::DataProperty] {
            for iri in ontology.entities(kind) {
                obo.typedef_stanza(&mut out, iri, &mut skipped);
            }
        }
        for iri in ontology.entities(EntityKind::NamedIndividual) {
            obo.instance_stanza(&mut out, iri, &mut skipped);
        }
        if skipped > 0 {
            debug!("{} axioms have no OBO representation and were skipped", skipped);
        }
        Ok(out.into_bytes())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Obo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::Literal;

    #[test]
    fn test_stanzas() {
        let mut o = Ontology::new(Some("http://localhost/".into()));
        o.add(Axiom::SubClassOf(
            ClassExpression::class("http://localhost/vocab/Emp"),
            ClassExpression::class("http://localhost/vocab/Person"),
        ));
        o.add(Axiom::AnnotationAssertion {
            property: LABEL.as_str().into(),
            subject: "http://localhost/vocab/Person".into(),
            value: Literal::new_simple_literal("Person").into(),
        });
        o.add(Axiom::ObjectPropertyRange(
            "http://localhost/vocab/Emp_dept".into(),
            ClassExpression::class("http://localhost/vocab/Dept"),
        ));
        o.add(Axiom::ClassAssertion(
            ClassExpression::class("http://localhost/vocab/Emp"),
            "http://localhost/Emp/10".into(),
        ));
        o.add_missing_declarations();
        let text = String::from_utf8(OboRenderer.render(&o).unwrap()).unwrap();
        assert!(text.starts_with("format-version: 1.2\n"));
        assert!(text.contains("ontology: http://localhost\n"));
        assert!(text.contains("[Term]\nid: Emp\nname: Emp\nis_a: Person ! Person\n"));
        assert!(text.contains("[Typedef]\nid: Emp_dept\nname: Emp_dept\nrange: Dept\n"));
        assert!(text.contains("[Instance]\nid: 10\nname: 10\ninstance_of: Emp\n"));
    }
}
