//! Description-logic notation, as plain text or as an HTML page.
//!
//! The entity-grouped layout and the notation itself are shared with the LaTeX renderer,
//! which only swaps the symbol table and the name escaping.

use super::{quote, Names, OntologyRenderer};
use crate::errors::Result;
use crate::ontology::{Axiom, ClassExpression, EntityKind, Ontology};
use crate::options::OutputFormat;
use std::collections::HashSet;
use std::fmt::Write;

pub(crate) struct Symbols {
    pub top: &'static str,
    pub bottom: &'static str,
    pub subclass: &'static str,
    pub equivalent: &'static str,
    pub and: &'static str,
    pub or: &'static str,
    pub not: &'static str,
    pub some: &'static str,
    pub all: &'static str,
    pub at_least: &'static str,
    pub at_most: &'static str,
    pub exactly: &'static str,
    pub member: &'static str,
}

pub(crate) const UNICODE: Symbols = Symbols {
    top: "⊤",
    bottom: "⊥",
    subclass: "⊑",
    equivalent: "≡",
    and: "⊓",
    or: "⊔",
    not: "¬",
    some: "∃",
    all: "∀",
    at_least: "≥",
    at_most: "≤",
    exactly: "=",
    member: ":",
};

/// Writes axioms in DL notation.
pub(crate) struct DlWriter<'a> {
    pub names: &'a Names,
    pub symbols: &'a Symbols,
    pub escape: fn(&str) -> String,
}

impl DlWriter<'_> {
    pub(crate) fn name(&self, iri: &str) -> String {
        (self.escape)(&self.names.short(iri))
    }

    fn operand(&self, ce: &ClassExpression) -> String {
        match ce {
            ClassExpression::Class(_) => self.class_expression(ce),
            _ => format!("({})", self.class_expression(ce)),
        }
    }

    pub(crate) fn class_expression(&self, ce: &ClassExpression) -> String {
        let s = self.symbols;
        match ce {
            ClassExpression::Class(iri) if iri.as_str() == crate::consts::OWL_THING.as_str() => s.top.to_string(),
            ClassExpression::Class(iri) if iri.as_str() == crate::consts::OWL_NOTHING.as_str() => {
                s.bottom.to_string()
            }
            ClassExpression::Class(iri) => self.name(iri),
            ClassExpression::IntersectionOf(ops) => ops
                .iter()
                .map(|op| self.operand(op))
                .collect::<Vec<_>>()
                .join(&format!(" {} ", s.and)),
            ClassExpression::UnionOf(ops) => ops
                .iter()
                .map(|op| self.operand(op))
                .collect::<Vec<_>>()
                .join(&format!(" {} ", s.or)),
            ClassExpression::ComplementOf(inner) => format!("{}{}", s.not, self.operand(inner)),
            ClassExpression::SomeValuesFrom { property, filler } => {
                format!("{} {}.{}", s.some, self.name(property), self.operand(filler))
            }
            ClassExpression::AllValuesFrom { property, filler } => {
                format!("{} {}.{}", s.all, self.name(property), self.operand(filler))
            }
            ClassExpression::MinCardinality { cardinality, property } => {
                format!("{} {} {}", s.at_least, cardinality, self.name(property))
            }
            ClassExpression::MaxCardinality { cardinality, property } => {
                format!("{} {} {}", s.at_most, cardinality, self.name(property))
            }
            ClassExpression::ExactCardinality { cardinality, property } => {
                format!("{} {} {}", s.exactly, cardinality, self.name(property))
            }
        }
    }

    /// DL form of a logical axiom; `None` for declarations and annotations.
    pub(crate) fn axiom(&self, axiom: &Axiom) -> Option<String> {
        let s = self.symbols;
        let ce = |c: &ClassExpression| self.class_expression(c);
        Some(match axiom {
            Axiom::Declaration(..) | Axiom::AnnotationAssertion { .. } => return None,
            Axiom::SubClassOf(sub, sup) => format!("{} {} {}", ce(sub), s.subclass, ce(sup)),
            Axiom::EquivalentClasses(ops) => ops
                .iter()
                .map(|op| ce(op))
                .collect::<Vec<_>>()
                .join(&format!(" {} ", s.equivalent)),
            Axiom::DisjointClasses(ops) => format!(
                "{} {} {}",
                ops.iter().map(|op| self.operand(op)).collect::<Vec<_>>().join(&format!(" {} ", s.and)),
                s.subclass,
                s.bottom
            ),
            Axiom::SubObjectPropertyOf(a, b) | Axiom::SubDataPropertyOf(a, b) => {
                format!("{} {} {}", self.name(a), s.subclass, self.name(b))
            }
            Axiom::ObjectPropertyDomain(p, c) | Axiom::DataPropertyDomain(p, c) => format!(
                "{} {}.{} {} {}",
                s.some,
                self.name(p),
                s.top,
                s.subclass,
                ce(c)
            ),
            Axiom::ObjectPropertyRange(p, c) => format!(
                "{} {} {} {}.{}",
                s.top,
                s.subclass,
                s.all,
                self.name(p),
                self.operand(c)
            ),
            Axiom::DataPropertyRange(p, dt) => format!(
                "{} {} {} {}.{}",
                s.top,
                s.subclass,
                s.all,
                self.name(p),
                self.name(dt)
            ),
            Axiom::FunctionalObjectProperty(p) | Axiom::FunctionalDataProperty(p) => format!(
                "{} {} {} 1 {}",
                s.top,
                s.subclass,
                s.at_most,
                self.name(p)
            ),
            Axiom::ClassAssertion(c, i) => format!("{} {} {}", self.name(i), s.member, self.operand(c)),
            Axiom::ObjectPropertyAssertion {
                property,
                subject,
                object,
            } => format!(
                "({}, {}) {} {}",
                self.name(subject),
                self.name(object),
                s.member,
                self.name(property)
            ),
            Axiom::DataPropertyAssertion {
                property,
                subject,
                value,
            } => format!(
                "({}, {}) {} {}",
                self.name(subject),
                (self.escape)(&quote(value.value())),
                s.member,
                self.name(property)
            ),
        })
    }
}

/// Logical axioms grouped under the entity they are about.
pub(crate) struct Section {
    pub title: &'static str,
    pub entities: Vec<(String, Vec<String>)>,
}

pub(crate) const SECTIONS: [(EntityKind, &str); 4] = [
    (EntityKind::Class, "Classes"),
    (EntityKind::ObjectProperty, "Object properties"),
    (EntityKind::DataProperty, "Data properties"),
    (EntityKind::NamedIndividual, "Individuals"),
];

/// Entity sections plus the axioms not about any declared entity.
pub(crate) fn sections(ontology: &Ontology, writer: &DlWriter<'_>) -> (Vec<Section>, Vec<String>) {
    // axioms are unique within an ontology, so equality identifies them
    let mut rendered: HashSet<&Axiom> = HashSet::new();
    let mut sections = Vec::new();
    for (kind, title) in SECTIONS {
        let mut entities = Vec::new();
        for iri in ontology.entities(kind) {
            let mut lines = Vec::new();
            for axiom in ontology.axioms_about(iri) {
                if rendered.contains(axiom) {
                    continue;
                }
                if let Some(line) = writer.axiom(axiom) {
                    rendered.insert(axiom);
                    lines.push(line);
                }
            }
            if !lines.is_empty() {
                entities.push((writer.name(iri), lines));
            }
        }
        if !entities.is_empty() {
            sections.push(Section { title, entities });
        }
    }
    let general = ontology
        .axioms()
        .iter()
        .filter(|a| !rendered.contains(*a))
        .filter_map(|a| writer.axiom(a))
        .collect();
    (sections, general)
}

fn plain(name: &str) -> String {
    name.to_string()
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub struct DlRenderer {
    pub html: bool,
}

impl DlRenderer {
    fn text(ontology: &Ontology, sections: &[Section], general: &[String]) -> String {
        let mut out = String::new();
        if let Some(iri) = &ontology.iri {
            let _ = writeln!(out, "Ontology: {}\n", iri);
        }
        for section in sections {
            let _ = writeln!(out, "{}\n{}\n", section.title, "=".repeat(section.title.len()));
            for (entity, lines) in &section.entities {
                let _ = writeln!(out, "{}", entity);
                for line in lines {
                    let _ = writeln!(out, "    {}", line);
                }
                out.push('\n');
            }
        }
        if !general.is_empty() {
            out.push_str("General axioms\n==============\n\n");
            for line in general {
                let _ = writeln!(out, "    {}", line);
            }
        }
        out
    }

    fn html(ontology: &Ontology, sections: &[Section], general: &[String]) -> String {
        let title = html_escape(ontology.iri.as_deref().unwrap_or("Ontology"));
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", title);
        out.push_str("<style>body { font-family: sans-serif; } .axiom { font-family: serif; }</style>\n");
        out.push_str("</head>\n<body>\n");
        let _ = writeln!(out, "<h1>{}</h1>", title);
        for section in sections {
            let _ = writeln!(out, "<h2>{}</h2>", section.title);
            for (entity, lines) in &section.entities {
                let _ = writeln!(out, "<h3>{}</h3>\n<ul>", html_escape(entity));
                for line in lines {
                    let _ = writeln!(out, "<li class=\"axiom\">{}</li>", html_escape(line));
                }
                out.push_str("</ul>\n");
            }
        }
        if !general.is_empty() {
            out.push_str("<h2>General axioms</h2>\n<ul>\n");
            for line in general {
                let _ = writeln!(out, "<li class=\"axiom\">{}</li>", html_escape(line));
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}

impl OntologyRenderer for DlRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        let names = Names::for_ontology(ontology);
        let writer = DlWriter {
            names: &names,
            symbols: &UNICODE,
            escape: plain,
        };
        let (sections, general) = sections(ontology, &writer);
        let text = if self.html {
            Self::html(ontology, &sections, &general)
        } else {
            Self::text(ontology, &sections, &general)
        };
        Ok(text.into_bytes())
    }

    fn format(&self) -> OutputFormat {
        if self.html {
            OutputFormat::DlSyntaxHtml
        } else {
            OutputFormat::DlSyntax
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ontology() -> Ontology {
        let mut o = Ontology::new(Some("http://example.org/shop".into()));
        o.add(Axiom::SubClassOf(
            ClassExpression::class("http://example.org/shop#Emp"),
            ClassExpression::SomeValuesFrom {
                property: "http://example.org/shop#dept".into(),
                filler: Box::new(ClassExpression::class("http://example.org/shop#Dept")),
            },
        ));
        o.add(Axiom::ClassAssertion(
            ClassExpression::class("http://example.org/shop#Emp"),
            "http://example.org/shop#e1".into(),
        ));
        o.add(Axiom::SubClassOf(
            ClassExpression::UnionOf(vec![
                ClassExpression::class("http://example.org/shop#A"),
                ClassExpression::class("http://example.org/shop#B"),
            ]),
            ClassExpression::thing(),
        ));
        o.add_missing_declarations();
        o
    }

    #[test]
    fn test_plain_text() {
        let text = String::from_utf8(DlRenderer { html: false }.render(&ontology()).unwrap()).unwrap();
        assert!(text.contains("Emp ⊑ ∃ dept.Dept"));
        assert!(text.contains("e1 : Emp"));
        assert!(text.contains("General axioms"));
        assert!(text.contains("A ⊔ B ⊑ ⊤"));
    }

    #[test]
    fn test_html() {
        let text = String::from_utf8(DlRenderer { html: true }.render(&ontology()).unwrap()).unwrap();
        assert!(text.starts_with("<!DOCTYPE html>"));
        assert!(text.contains("<h2>Classes</h2>"));
        assert!(text.contains("<li class=\"axiom\">Emp ⊑ ∃ dept.Dept</li>"));
    }
}
