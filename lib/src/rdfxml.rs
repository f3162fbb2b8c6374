//! RDF/XML writer used by both the graph serializer and the ontology renderer.
//!
//! Triples are grouped by subject in order of first appearance. In abbreviated mode the
//! first `rdf:type` of a subject becomes the node element name.

use crate::consts::{RDF_NS, TYPE, XSD_STRING};
use crate::errors::{Result, TransformError};
use crate::util::is_ncname;
use oxigraph::model::{NamedOrBlankNode, Term, Triple};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Splits an IRI into a namespace and a local part that is a valid XML NCName.
pub fn qname_split(iri: &str) -> Option<(&str, &str)> {
    let tail_start = iri
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_name_char(*c))
        .last()
        .map(|(i, _)| i)?;
    let local_start = iri[tail_start..]
        .char_indices()
        .find(|(_, c)| c.is_alphabetic() || *c == '_')
        .map(|(i, _)| tail_start + i)?;
    let (ns, local) = iri.split_at(local_start);
    if ns.is_empty() || !is_ncname(local) {
        return None;
    }
    Some((ns, local))
}

struct Namespaces {
    by_iri: HashMap<String, String>,
    declared: Vec<(String, String)>,
}

impl Namespaces {
    fn new(prefixes: &[(String, String)]) -> Self {
        let mut ns = Namespaces {
            by_iri: HashMap::new(),
            declared: Vec::new(),
        };
        ns.add("rdf", RDF_NS);
        for (name, iri) in prefixes {
            if !name.is_empty() && is_ncname(name) && !name.starts_with("xml") {
                ns.add(name, iri);
            }
        }
        ns
    }

    fn add(&mut self, name: &str, iri: &str) {
        if self.by_iri.contains_key(iri) || self.declared.iter().any(|(n, _)| n == name) {
            return;
        }
        self.by_iri.insert(iri.to_string(), name.to_string());
        self.declared.push((name.to_string(), iri.to_string()));
    }

    /// Registers the namespace of `iri`, inventing a prefix when none is known.
    fn ensure(&mut self, iri: &str) -> Result<()> {
        let (ns, _) = qname_split(iri).ok_or_else(|| {
            TransformError::Serialization(format!("cannot write <{}> as an XML element name", iri))
        })?;
        if !self.by_iri.contains_key(ns) {
            let mut n = self.declared.len();
            let name = loop {
                let candidate = format!("ns{}", n);
                if !self.declared.iter().any(|(d, _)| *d == candidate) {
                    break candidate;
                }
                n += 1;
            };
            self.add(&name, ns);
        }
        Ok(())
    }

    fn qname(&self, iri: &str) -> Result<String> {
        qname_split(iri)
            .and_then(|(ns, local)| self.by_iri.get(ns).map(|p| format!("{}:{}", p, local)))
            .ok_or_else(|| TransformError::Serialization(format!("no prefix for <{}>", iri)))
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| TransformError::Serialization(e.to_string()))
}

/// Name of the typed node element for a subject, if abbreviation applies.
fn node_type(triples: &[&Triple]) -> Option<usize> {
    triples.iter().position(|t| {
        t.predicate.as_ref() == TYPE
            && matches!(&t.object, Term::NamedNode(n) if qname_split(n.as_str()).is_some())
    })
}

/// Writes `triples` as RDF/XML. `base`, when given, becomes `xml:base` on the root element.
pub fn write_rdf_xml(
    triples: &[Triple],
    prefixes: &[(String, String)],
    base: Option<&str>,
    abbreviated: bool,
) -> Result<Vec<u8>> {
    let mut order: Vec<&NamedOrBlankNode> = Vec::new();
    let mut groups: HashMap<&NamedOrBlankNode, Vec<&Triple>> = HashMap::new();
    for triple in triples {
        let group = groups.entry(&triple.subject).or_default();
        if group.is_empty() {
            order.push(&triple.subject);
        }
        group.push(triple);
    }

    let mut namespaces = Namespaces::new(prefixes);
    for subject in &order {
        let group = &groups[subject];
        if abbreviated {
            if let Some(i) = node_type(group) {
                if let Term::NamedNode(n) = &group[i].object {
                    namespaces.ensure(n.as_str())?;
                }
            }
        }
        for t in group {
            namespaces.ensure(t.predicate.as_str())?;
        }
    }

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut root = BytesStart::new("rdf:RDF");
    if let Some(base) = base {
        root.push_attribute(("xml:base", base));
    }
    for (name, iri) in &namespaces.declared {
        root.push_attribute((format!("xmlns:{}", name).as_str(), iri.as_str()));
    }
    emit(&mut writer, Event::Start(root))?;

    for subject in &order {
        let group = &groups[subject];
        let typed = if abbreviated { node_type(group) } else { None };
        let element = match typed.map(|i| &group[i].object) {
            Some(Term::NamedNode(n)) => namespaces.qname(n.as_str())?,
            _ => "rdf:Description".to_string(),
        };
        let mut start = BytesStart::new(element.as_str());
        match subject {
            NamedOrBlankNode::NamedNode(n) => start.push_attribute(("rdf:about", n.as_str())),
            NamedOrBlankNode::BlankNode(b) => start.push_attribute(("rdf:nodeID", b.as_str())),
        }
        emit(&mut writer, Event::Start(start))?;
        for (i, triple) in group.iter().enumerate() {
            if Some(i) == typed {
                continue;
            }
            let name = namespaces.qname(triple.predicate.as_str())?;
            let mut property = BytesStart::new(name.as_str());
            match &triple.object {
                Term::NamedNode(n) => {
                    property.push_attribute(("rdf:resource", n.as_str()));
                    emit(&mut writer, Event::Empty(property))?;
                }
                Term::BlankNode(b) => {
                    property.push_attribute(("rdf:nodeID", b.as_str()));
                    emit(&mut writer, Event::Empty(property))?;
                }
                Term::Literal(l) => {
                    if let Some(lang) = l.language() {
                        property.push_attribute(("xml:lang", lang));
                    } else if l.datatype() != XSD_STRING {
                        property.push_attribute(("rdf:datatype", l.datatype().as_str()));
                    }
                    emit(&mut writer, Event::Start(property))?;
                    emit(&mut writer, Event::Text(BytesText::new(l.value())))?;
                    emit(&mut writer, Event::End(BytesEnd::new(name.as_str())))?;
                }
                #[allow(unreachable_patterns)]
                _ => {
                    return Err(TransformError::Serialization(
                        "RDF/XML cannot hold quoted triples".to_string(),
                    ))
                }
            }
        }
        emit(&mut writer, Event::End(BytesEnd::new(element.as_str())))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("rdf:RDF")))?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}
