//! KRSS and KRSS2 renderers.
//!
//! Both print one s-expression per line. KRSS2 folds property domains, ranges and
//! parents into `define-primitive-role` and writes equivalences as `define-concept`.

use super::{quote, Names, OntologyRenderer};
use crate::consts::{OWL_NOTHING, OWL_THING};
use crate::errors::Result;
use crate::ontology::{Axiom, ClassExpression, EntityKind, Ontology};
use crate::options::OutputFormat;
use std::fmt::Write;

pub struct KrssRenderer {
    pub version2: bool,
}

struct Krss<'a> {
    names: &'a Names,
}

impl Krss<'_> {
    fn name(&self, iri: &str) -> String {
        let short = self.names.short(iri);
        if short.chars().any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '|' | ';')) {
            format!("|{}|", short.replace('|', "\\|"))
        } else {
            short
        }
    }

    fn concept(&self, ce: &ClassExpression) -> String {
        let list = |ops: &[ClassExpression]| {
            ops.iter()
                .map(|op| self.concept(op))
                .collect::<Vec<_>>()
                .join(" ")
        };
        match ce {
            ClassExpression::Class(iri) if iri.as_str() == OWL_THING.as_str() => "top".to_string(),
            ClassExpression::Class(iri) if iri.as_str() == OWL_NOTHING.as_str() => "bottom".to_string(),
            ClassExpression::Class(iri) => self.name(iri),
            ClassExpression::IntersectionOf(ops) => format!("(and {})", list(ops)),
            ClassExpression::UnionOf(ops) => format!("(or {})", list(ops)),
            ClassExpression::ComplementOf(inner) => format!("(not {})", self.concept(inner)),
            ClassExpression::SomeValuesFrom { property, filler } => {
                format!("(some {} {})", self.name(property), self.concept(filler))
            }
            ClassExpression::AllValuesFrom { property, filler } => {
                format!("(all {} {})", self.name(property), self.concept(filler))
            }
            ClassExpression::MinCardinality { cardinality, property } => {
                format!("(at-least {} {})", cardinality, self.name(property))
            }
            ClassExpression::MaxCardinality { cardinality, property } => {
                format!("(at-most {} {})", cardinality, self.name(property))
            }
            ClassExpression::ExactCardinality { cardinality, property } => {
                format!("(exactly {} {})", cardinality, self.name(property))
            }
        }
    }

    /// `(define-primitive-concept C D)` with all named superclass expressions conjoined.
    fn primitive_concept(&self, ontology: &Ontology, iri: &str) -> String {
        let supers: Vec<String> = ontology
            .axioms_about(iri)
            .filter_map(|a| match a {
                Axiom::SubClassOf(_, sup) => Some(self.concept(sup)),
                _ => None,
            })
            .collect();
        let definition = match supers.len() {
            0 => "top".to_string(),
            1 => supers[0].clone(),
            _ => format!("(and {})", supers.join(" ")),
        };
        format!("(define-primitive-concept {} {})", self.name(iri), definition)
    }

    fn role(&self, ontology: &Ontology, iri: &str, version2: bool) -> Vec<String> {
        if !version2 {
            let mut lines = vec![format!("(define-primitive-role {})", self.name(iri))];
            for axiom in ontology.axioms_about(iri) {
                match axiom {
                    Axiom::SubObjectPropertyOf(_, parent) | Axiom::SubDataPropertyOf(_, parent) => {
                        lines[0] = format!("(define-primitive-role {} {})", self.name(iri), self.name(parent))
                    }
                    Axiom::ObjectPropertyDomain(_, c) | Axiom::DataPropertyDomain(_, c) => {
                        lines.push(format!("(domain {} {})", self.name(iri), self.concept(c)))
                    }
                    Axiom::ObjectPropertyRange(_, c) => {
                        lines.push(format!("(range {} {})", self.name(iri), self.concept(c)))
                    }
                    Axiom::DataPropertyRange(_, dt) => {
                        lines.push(format!("(range {} {})", self.name(iri), self.name(dt)))
                    }
                    Axiom::FunctionalObjectProperty(_) | Axiom::FunctionalDataProperty(_) => {
                        lines.push(format!("(functional {})", self.name(iri)))
                    }
                    _ => {}
                }
            }
            return lines;
        }
        let mut parents = Vec::new();
        let mut domains = Vec::new();
        let mut ranges = Vec::new();
        let mut functional = false;
        for axiom in ontology.axioms_about(iri) {
            match axiom {
                Axiom::SubObjectPropertyOf(_, parent) | Axiom::SubDataPropertyOf(_, parent) => {
                    parents.push(self.name(parent))
                }
                Axiom::ObjectPropertyDomain(_, c) | Axiom::DataPropertyDomain(_, c) => domains.push(self.concept(c)),
                Axiom::ObjectPropertyRange(_, c) => ranges.push(self.concept(c)),
                Axiom::DataPropertyRange(_, dt) => ranges.push(self.name(dt)),
                Axiom::FunctionalObjectProperty(_) | Axiom::FunctionalDataProperty(_) => functional = true,
                _ => {}
            }
        }
        let conjoin = |items: &[String]| match items.len() {
            1 => items[0].clone(),
            _ => format!("(and {})", items.join(" ")),
        };
        let mut line = format!("(define-primitive-role {}", self.name(iri));
        if !parents.is_empty() {
            let _ = write!(line, " :parents ({})", parents.join(" "));
        }
        if !domains.is_empty() {
            let _ = write!(line, " :domain {}", conjoin(&domains));
        }
        if !ranges.is_empty() {
            let _ = write!(line, " :range {}", conjoin(&ranges));
        }
        if functional {
            line.push_str(" :feature t");
        }
        line.push(')');
        vec![line]
    }
}

impl OntologyRenderer for KrssRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        let names = Names::for_ontology(ontology);
        let k = Krss { names: &names };
        let mut out = String::new();
        if let Some(iri) = &ontology.iri {
            let _ = writeln!(out, ";; {}", iri);
        }
        for iri in ontology.entities(EntityKind::Class) {
            let _ = writeln!(out, "{}", k.primitive_concept(ontology, iri));
        }
        for kind in [EntityKind::ObjectProperty, EntityKind::DataProperty] {
            for iri in ontology.entities(kind) {
                for line in k.role(ontology, iri, self.version2) {
                    let _ = writeln!(out, "{}", line);
                }
            }
        }
        for axiom in ontology.axioms() {
            let line = match axiom {
                Axiom::EquivalentClasses(ops) if ops.len() >= 2 => {
                    let keyword = if self.version2 { "define-concept" } else { "equivalent" };
                    ops[1..]
                        .iter()
                        .map(|op| format!("({} {} {})", keyword, k.concept(&ops[0]), k.concept(op)))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
                Axiom::DisjointClasses(ops) => format!(
                    "(disjoint {})",
                    ops.iter().map(|op| k.concept(op)).collect::<Vec<_>>().join(" ")
                ),
                Axiom::SubClassOf(sub, sup) if sub.as_class().is_none() => {
                    format!("(implies {} {})", k.concept(sub), k.concept(sup))
                }
                Axiom::ClassAssertion(ce, individual) => {
                    format!("(instance {} {})", k.name(individual), k.concept(ce))
                }
                Axiom::ObjectPropertyAssertion {
                    property,
                    subject,
                    object,
                } => format!("(related {} {} {})", k.name(subject), k.name(property), k.name(object)),
                Axiom::DataPropertyAssertion {
                    property,
                    subject,
                    value,
                } => format!(
                    "(related {} {} {})",
                    k.name(subject),
                    k.name(property),
                    quote(value.value())
                ),
                _ => continue,
            };
            let _ = writeln!(out, "{}", line);
        }
        Ok(out.into_bytes())
    }

    fn format(&self) -> OutputFormat {
        if self.version2 {
            OutputFormat::Krss2
        } else {
            OutputFormat::Krss
        }
    }
}
