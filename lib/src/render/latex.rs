//! LaTeX documents: the DL notation grouped by entity, or a flat list of every axiom.

use super::dl::{sections, DlWriter, Symbols};
use super::{Names, OntologyRenderer};
use crate::errors::Result;
use crate::ontology::{Axiom, Ontology};
use crate::options::OutputFormat;
use oxigraph::model::Term;
use std::fmt::Write;

const LATEX: Symbols = Symbols {
    top: "\\top",
    bottom: "\\bot",
    subclass: "\\sqsubseteq",
    equivalent: "\\equiv",
    and: "\\sqcap",
    or: "\\sqcup",
    not: "\\neg ",
    some: "\\exists",
    all: "\\forall",
    at_least: "\\geq",
    at_most: "\\leq",
    exactly: "=",
    member: ":",
};

/// Escapes text for LaTeX and sets it upright inside math mode.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 12);
    out.push_str("\\mathsf{");
    out.push_str(&escape_text(text));
    out.push('}');
    out
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' | '#' | '$' | '%' | '&' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            c => out.push(c),
        }
    }
    out
}

pub struct LatexRenderer {
    pub axioms_list: bool,
}

const PREAMBLE: &str = "\\documentclass{article}\n\\usepackage{amsmath,amssymb}\n\\usepackage[utf8]{inputenc}\n";

impl LatexRenderer {
    fn term(writer: &DlWriter<'_>, term: &Term) -> String {
        match term {
            Term::NamedNode(n) => writer.name(n.as_str()),
            Term::Literal(l) => format!("\\text{{``{}''}}", escape_text(l.value())),
            other => escape(&other.to_string()),
        }
    }

    /// Every axiom, including declarations and annotations, in DL-like notation.
    fn list_line(writer: &DlWriter<'_>, axiom: &Axiom) -> String {
        match axiom {
            Axiom::Declaration(kind, iri) => {
                format!("\\mathrm{{{}}}({})", kind.owl_name(), writer.name(iri))
            }
            Axiom::AnnotationAssertion {
                property,
                subject,
                value,
            } => format!(
                "{}({}, {})",
                writer.name(property),
                writer.name(subject),
                Self::term(writer, value)
            ),
            other => writer.axiom(other).unwrap_or_default(),
        }
    }
}

impl OntologyRenderer for LatexRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>> {
        let names = Names::for_ontology(ontology);
        let writer = DlWriter {
            names: &names,
            symbols: &LATEX,
            escape,
        };
        let title = escape_text(ontology.iri.as_deref().unwrap_or("Ontology"));
        let mut out = String::from(PREAMBLE);
        let _ = writeln!(out, "\\title{{{}}}", title);
        out.push_str("\\begin{document}\n\\maketitle\n\n");
        if self.axioms_list {
            out.push_str("\\begin{itemize}\n");
            for axiom in ontology.axioms() {
                let _ = writeln!(out, "\\item ${}$", Self::list_line(&writer, axiom));
            }
            out.push_str("\\end{itemize}\n");
        } else {
            let (sections, general) = sections(ontology, &writer);
            for section in &sections {
                let _ = writeln!(out, "\\section*{{{}}}\n", section.title);
                for (entity, lines) in &section.entities {
                    let _ = writeln!(out, "\\subsection*{{${}$}}", entity);
                    out.push_str("\\begin{itemize}\n");
                    for line in lines {
                        let _ = writeln!(out, "\\item ${}$", line);
                    }
                    out.push_str("\\end{itemize}\n\n");
                }
            }
            if !general.is_empty() {
                out.push_str("\\section*{General axioms}\n\\begin{itemize}\n");
                for line in &general {
                    let _ = writeln!(out, "\\item ${}$", line);
                }
                out.push_str("\\end{itemize}\n");
            }
        }
        out.push_str("\\end{document}\n");
        Ok(out.into_bytes())
    }

    fn format(&self) -> OutputFormat {
        if self.axioms_list {
            OutputFormat::LatexAxiomsList
        } else {
            OutputFormat::Latex
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{ClassExpression, EntityKind};

    fn ontology() -> Ontology {
        let mut o = Ontology::new(Some("http://localhost/".into()));
        o.add(Axiom::Declaration(EntityKind::Class, "http://localhost/vocab/Emp_Dept".into()));
        o.add(Axiom::SubClassOf(
            ClassExpression::class("http://localhost/vocab/Emp_Dept"),
            ClassExpression::thing(),
        ));
        o
    }

    #[test]
    fn test_document() {
        let text = String::from_utf8(LatexRenderer { axioms_list: false }.render(&ontology()).unwrap()).unwrap();
        assert!(text.starts_with("\\documentclass{article}"));
        assert!(text.contains("\\section*{Classes}"));
        assert!(text.contains("$\\mathsf{Emp\\_Dept} \\sqsubseteq \\top$"));
        assert!(text.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn test_axioms_list_includes_declarations() {
        let text = String::from_utf8(LatexRenderer { axioms_list: true }.render(&ontology()).unwrap()).unwrap();
        assert!(text.contains("\\item $\\mathrm{Class}(\\mathsf{Emp\\_Dept})$"));
        assert_eq!(text.matches("\\item").count(), 2);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a_b#c&d"), "a\\_b\\#c\\&d");
    }
}
