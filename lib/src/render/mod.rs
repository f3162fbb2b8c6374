//! One renderer per output syntax. Given an ontology, a renderer produces the bytes of the
//! output document; the converter picks the renderer from the output format code.

pub mod dl;
pub mod functional;
pub mod krss;
pub mod latex;
pub mod manchester;
pub mod obo;
pub mod owl_xml;
pub mod rdf;

use crate::consts::{OWL_NOTHING, OWL_THING, WELL_KNOWN_PREFIXES};
use crate::errors::Result;
use crate::ontology::Ontology;
use crate::options::OutputFormat;
use crate::util::{is_ncname, local_name};
use log::debug;

pub trait OntologyRenderer {
    fn render(&self, ontology: &Ontology) -> Result<Vec<u8>>;
    fn format(&self) -> OutputFormat;
}

/// Renderer for an output format. `Unknown` renders as RDF/XML.
pub fn renderer_for(format: OutputFormat) -> Box<dyn OntologyRenderer> {
    match format.effective() {
        OutputFormat::OwlXml => Box::new(owl_xml::OwlXmlRenderer),
        OutputFormat::Turtle => Box::new(rdf::TurtleRenderer),
        OutputFormat::DlSyntax => Box::new(dl::DlRenderer { html: false }),
        OutputFormat::DlSyntaxHtml => Box::new(dl::DlRenderer { html: true }),
        OutputFormat::OwlFunctional => Box::new(functional::FunctionalRenderer { abbreviate: false }),
        OutputFormat::PrefixOwl => Box::new(functional::FunctionalRenderer { abbreviate: true }),
        OutputFormat::Krss => Box::new(krss::KrssRenderer { version2: false }),
        OutputFormat::Krss2 => Box::new(krss::KrssRenderer { version2: true }),
        OutputFormat::Latex => Box::new(latex::LatexRenderer { axioms_list: false }),
        OutputFormat::LatexAxiomsList => Box::new(latex::LatexRenderer { axioms_list: true }),
        OutputFormat::Manchester => Box::new(manchester::ManchesterRenderer),
        OutputFormat::Obo => Box::new(obo::OboRenderer),
        _ => Box::new(rdf::RdfXmlRenderer),
    }
}

pub fn render(format: OutputFormat, ontology: &Ontology) -> Result<Vec<u8>> {
    let renderer = renderer_for(format);
    let bytes = renderer.render(ontology)?;
    debug!("Rendered {} axioms as {} ({} bytes)", ontology.len(), renderer.format(), bytes.len());
    Ok(bytes)
}

/// Turns IRIs into the names a text syntax prints.
pub struct Names {
    prefixes: Vec<(String, String)>,
}

impl Names {
    /// The ontology's prefixes followed by the well-known ones.
    pub fn for_ontology(ontology: &Ontology) -> Self {
        let mut names = Names { prefixes: Vec::new() };
        for (name, iri) in &ontology.prefixes {
            names.add(name, iri);
        }
        for (name, iri) in WELL_KNOWN_PREFIXES {
            names.add(name, iri);
        }
        names
    }

    fn add(&mut self, name: &str, iri: &str) {
        let usable = (name.is_empty() || is_ncname(name)) && !iri.is_empty();
        if usable && !self.prefixes.iter().any(|(n, i)| n == name || i == iri) {
            self.prefixes.push((name.to_string(), iri.to_string()));
        }
    }

    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    /// `prefix:local` using the longest matching namespace, if the local part is a plain name.
    pub fn prefixed(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .and_then(|(name, ns)| {
                let local = &iri[ns.len()..];
                (local.is_empty() || is_ncname(local)).then(|| format!("{}:{}", name, local))
            })
    }

    /// The prefixed name, or the full IRI in angle brackets.
    pub fn prefixed_or_full(&self, iri: &str) -> String {
        self.prefixed(iri).unwrap_or_else(|| format!("<{}>", iri))
    }

    /// Bare local name used by the DL-style syntaxes.
    pub fn short(&self, iri: &str) -> String {
        if iri == OWL_THING.as_str() {
            return "Thing".to_string();
        }
        if iri == OWL_NOTHING.as_str() {
            return "Nothing".to_string();
        }
        local_name(iri).to_string()
    }
}

/// Escapes a string for a double-quoted literal.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let mut o = Ontology::new(None);
        o.prefixes = vec![
            ("".to_string(), "http://example.org/shop#".to_string()),
            ("vocab".to_string(), "http://localhost/vocab/".to_string()),
        ];
        let names = Names::for_ontology(&o);
        assert_eq!(names.prefixed("http://example.org/shop#Emp").as_deref(), Some(":Emp"));
        assert_eq!(names.prefixed("http://www.w3.org/2002/07/owl#Thing").as_deref(), Some("owl:Thing"));
        assert_eq!(names.prefixed_or_full("http://other.org/x y"), "<http://other.org/x y>");
        assert_eq!(names.short("http://localhost/vocab/Emp_name"), "Emp_name");
        assert_eq!(names.short(OWL_THING.as_str()), "Thing");
    }

    #[test]
    fn test_every_format_has_a_renderer() {
        for format in OutputFormat::NAMED {
            assert_eq!(renderer_for(format).format(), format);
        }
        assert_eq!(renderer_for(OutputFormat::Unknown).format(), OutputFormat::RdfXml);
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(r#"say "hi" \ bye"#), r#""say \"hi\" \\ bye""#);
    }
}
