//! Utility functions for reading RDF documents, splitting IRIs and writing output files.

use crate::errors::{Result, TransformError};
use lazy_static::lazy_static;
use log::{debug, info};
use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::Triple;
use oxiri::Iri;
use regex::Regex;
use std::io::BufReader;
use std::path::Path;

lazy_static! {
    static ref TURTLE_PREFIX: Regex =
        Regex::new(r#"(?mi)^\s*@?prefix\s+([A-Za-z][\w.-]*)?:\s*<([^>]*)>"#).unwrap();
    static ref XMLNS_PREFIX: Regex = Regex::new(r#"xmlns:([A-Za-z][\w.-]*)\s*=\s*"([^"]*)""#).unwrap();
}

/// Picks an RDF syntax from a file extension; unknown extensions read as Turtle.
pub fn rdf_format_for_path(path: &Path) -> RdfFormat {
    let ext = path.extension().and_then(|ext| ext.to_str()).map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("ttl") | Some("n3") => RdfFormat::Turtle,
        Some("nt") => RdfFormat::NTriples,
        Some("xml") | Some("rdf") | Some("owl") => RdfFormat::RdfXml,
        _ => RdfFormat::Turtle,
    }
}

/// Parses an RDF document with a known syntax into a list of triples.
pub fn parse_rdf(bytes: &[u8], format: RdfFormat, base_iri: Option<&str>) -> Result<Vec<Triple>> {
    let mut parser = RdfParser::from_format(format).without_named_graphs();
    if let Some(base) = base_iri {
        parser = parser
            .with_base_iri(base)
            .map_err(|e| TransformError::invalid_parameter("base_uri", e.to_string()))?;
    }
    let mut triples = Vec::new();
    for quad in parser.for_reader(BufReader::new(bytes)) {
        let quad = quad.map_err(|e| TransformError::OntologyLoad(e.to_string()))?;
        triples.push(Triple::new(quad.subject, quad.predicate, quad.object));
    }
    Ok(triples)
}

/// Parses RDF bytes whose syntax is not known up front, trying the likely syntax first.
pub fn parse_rdf_any(bytes: &[u8], base_iri: Option<&str>) -> Result<(Vec<Triple>, RdfFormat)> {
    let mut candidates = vec![RdfFormat::Turtle, RdfFormat::RdfXml, RdfFormat::NTriples];
    if looks_like_xml(bytes) {
        candidates.retain(|f| *f != RdfFormat::RdfXml);
        candidates.insert(0, RdfFormat::RdfXml);
    }
    let mut last_error = None;
    for format in candidates {
        match parse_rdf(bytes, format, base_iri) {
            Ok(triples) => {
                debug!("Parsed {} triples as {:?}", triples.len(), format);
                return Ok((triples, format));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error
        .unwrap_or_else(|| TransformError::OntologyLoad("no RDF syntax accepted the input".into())))
}

/// True when the document opens with an XML declaration, a comment/doctype or a known root
/// element. A Turtle document may also start with `<`, but only for an IRI.
pub fn looks_like_xml(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let start = match bytes.iter().position(|b| !b.is_ascii_whitespace()) {
        Some(i) => &bytes[i..],
        None => return false,
    };
    [&b"<?xml"[..], b"<!", b"<rdf:RDF", b"<Ontology", b"<owl:Ontology"]
        .iter()
        .any(|marker| start.starts_with(marker))
}

/// Reads an RDF file, choosing the parser from the file extension. Returns the triples and
/// the prefixes declared in the document. Relative IRIs, prefix namespaces included, are
/// resolved against `base_iri`.
pub fn read_rdf_file(file: &Path, base_iri: Option<&str>) -> Result<(Vec<Triple>, Vec<(String, String)>)> {
    debug!("Reading file: {}", file.display());
    let bytes = std::fs::read(file)?;
    let format = rdf_format_for_path(file);
    let triples = parse_rdf(&bytes, format, base_iri)
        .map_err(|e| TransformError::InvalidMapping(format!("{}: {}", file.display(), e)))?;
    let mut prefixes = declared_prefixes(&String::from_utf8_lossy(&bytes));
    if let Some(base) = base_iri.and_then(|b| Iri::parse(b).ok()) {
        for (_, namespace) in prefixes.iter_mut() {
            if let Ok(resolved) = base.resolve(namespace) {
                *namespace = resolved.into_inner();
            }
        }
    }
    Ok((triples, prefixes))
}

/// Collects `@prefix`/`PREFIX` and `xmlns:` declarations from a document, in order of appearance.
pub fn declared_prefixes(text: &str) -> Vec<(String, String)> {
    let mut prefixes: Vec<(String, String)> = Vec::new();
    let found = TURTLE_PREFIX
        .captures_iter(text)
        .map(|c| {
            (
                c.get(1).map(|m| m.as_str()).unwrap_or("").to_string(),
                c[2].to_string(),
            )
        })
        .chain(
            XMLNS_PREFIX
                .captures_iter(text)
                .map(|c| (c[1].to_string(), c[2].to_string())),
        );
    for (name, iri) in found {
        if !prefixes.iter().any(|(n, _)| *n == name) {
            prefixes.push((name, iri));
        }
    }
    prefixes
}

/// Splits an IRI into namespace and local name at the last `#`, `/` or `:`.
/// The local name is empty when the IRI ends with a separator.
pub fn split_iri(iri: &str) -> (&str, &str) {
    match iri.rfind(['#', '/', ':']) {
        Some(idx) => iri.split_at(idx + 1),
        None => ("", iri),
    }
}

/// Local part of an IRI, or the whole IRI when it has none.
pub fn local_name(iri: &str) -> &str {
    let (_, local) = split_iri(iri);
    if local.is_empty() {
        iri
    } else {
        local
    }
}

/// True when `name` can stand as an XML NCName (used for QNames and OWL/XML abbreviations).
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Percent-encodes everything outside the IRI-safe set, so database values can sit in a path
/// segment.
pub fn iri_escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~' => result.push(c),
            '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' | ':' | '@' => {
                result.push(c)
            }
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    result
}

/// Serializes triples with oxigraph's writer for `format`, declaring `prefixes` where the
/// syntax supports them. Prefixes whose IRI the writer rejects are left out.
pub fn write_rdf(triples: &[Triple], format: RdfFormat, prefixes: &[(String, String)]) -> Result<Vec<u8>> {
    let mut serializer = RdfSerializer::from_format(format);
    for (name, iri) in prefixes {
        if !(name.is_empty() || is_ncname(name)) || oxiri::Iri::parse(iri.as_str()).is_err() {
            debug!("Skipping prefix {}: <{}>", name, iri);
            continue;
        }
        serializer = serializer
            .with_prefix(name.as_str(), iri.as_str())
            .map_err(|e| TransformError::Serialization(e.to_string()))?;
    }
    let mut writer = serializer.for_writer(Vec::new());
    for triple in triples {
        writer
            .serialize_triple(triple)
            .map_err(|e| TransformError::Serialization(e.to_string()))?;
    }
    writer
        .finish()
        .map_err(|e| TransformError::Serialization(e.to_string()))
}

/// Writes bytes to a file, creating or truncating it. Parent directories are not created.
pub fn write_bytes_to_file(path: &Path, bytes: &[u8]) -> Result<()> {
    info!("Writing {} bytes to file: {}", bytes.len(), path.display());
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdf_format_for_path() {
        assert_eq!(rdf_format_for_path(Path::new("map.ttl")), RdfFormat::Turtle);
        assert_eq!(rdf_format_for_path(Path::new("map.NT")), RdfFormat::NTriples);
        assert_eq!(rdf_format_for_path(Path::new("map.owl")), RdfFormat::RdfXml);
        assert_eq!(rdf_format_for_path(Path::new("map")), RdfFormat::Turtle);
    }

    #[test]
    fn test_parse_rdf_any() {
        let nt = b"<http://a.org/s> <http://a.org/p> \"v\" .\n";
        let (triples, _) = parse_rdf_any(nt, None).unwrap();
        assert_eq!(triples.len(), 1);

        let xml = br#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://a.org/">
  <rdf:Description rdf:about="http://a.org/s"><ex:p>v</ex:p></rdf:Description>
</rdf:RDF>"#;
        let (triples, format) = parse_rdf_any(xml, None).unwrap();
        assert_eq!(format, RdfFormat::RdfXml);
        assert_eq!(triples.len(), 1);

        assert!(parse_rdf_any(b"this is { not rdf", None).is_err());
    }

    #[test]
    fn test_declared_prefixes() {
        let ttl = "@prefix map: <file:tmp#> .\nPREFIX vocab: <http://localhost/vocab/>\n@prefix : <http://x/> .";
        let prefixes = declared_prefixes(ttl);
        assert_eq!(prefixes[0], ("map".to_string(), "file:tmp#".to_string()));
        assert_eq!(prefixes[1], ("vocab".to_string(), "http://localhost/vocab/".to_string()));
        assert_eq!(prefixes[2], ("".to_string(), "http://x/".to_string()));
    }

    #[test]
    fn test_split_iri() {
        assert_eq!(split_iri("http://localhost/vocab/Person"), ("http://localhost/vocab/", "Person"));
        assert_eq!(split_iri("http://www.w3.org/2002/07/owl#Class"), ("http://www.w3.org/2002/07/owl#", "Class"));
        assert_eq!(local_name("http://localhost/"), "http://localhost/");
    }

    #[test]
    fn test_iri_escape() {
        assert_eq!(iri_escape("Ann Lee"), "Ann%20Lee");
        assert_eq!(iri_escape("a/b"), "a%2Fb");
        assert_eq!(iri_escape("é"), "%C3%A9");
        assert_eq!(iri_escape("x-1.2_~"), "x-1.2_~");
    }

    #[test]
    fn test_is_ncname() {
        assert!(is_ncname("Person_name"));
        assert!(!is_ncname("1abc"));
        assert!(!is_ncname(""));
        assert!(!is_ncname("a b"));
    }
}
