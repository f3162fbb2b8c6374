mod common;

use common::{create_shop_db, sqlite_params};
use dbtransformer::convert::convert;
use dbtransformer::ontology::{Axiom, OntologyManager};
use dbtransformer::util::looks_like_xml;
use dbtransformer::{DbTransformer, OutputFormat};
use std::collections::HashSet;
use std::path::Path;
use tempdir::TempDir;

fn shop_graph(dir: &Path) -> Vec<u8> {
    let db = dir.join("shop.db");
    create_shop_db(&db);
    DbTransformer::default()
        .transform(&sqlite_params(&db), Some("http://localhost/"))
        .unwrap()
}

fn axioms(bytes: &[u8]) -> HashSet<Axiom> {
    let manager = OntologyManager::new();
    let loaded = manager.load_from_bytes(bytes).unwrap();
    loaded.with(|o| o.axioms().iter().cloned().collect()).unwrap()
}

#[test]
fn test_every_format_writes_a_file() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let graph = shop_graph(dir.path());
    for format in OutputFormat::NAMED {
        let path = dir.path().join(format!("shop-{}.{}", format.code(), format.extension()));
        let report = convert(format.code(), &graph, &path).unwrap();
        assert_eq!(report.format, format);
        let written = std::fs::read(&path).unwrap();
        assert!(!written.is_empty(), "{} wrote an empty file", format);
        assert_eq!(report.bytes, written.len());
        assert_eq!(report.hash, blake3::hash(&written).to_hex().to_string());
    }
}

#[test]
fn test_readable_formats_round_trip() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let graph = shop_graph(dir.path());
    let expected = axioms(&graph);
    assert!(!expected.is_empty());

    for format in [
        OutputFormat::RdfXml,
        OutputFormat::Turtle,
        OutputFormat::OwlXml,
        OutputFormat::OwlFunctional,
        OutputFormat::PrefixOwl,
    ] {
        let path = dir.path().join(format!("round-trip.{}", format.extension()));
        convert(format.code(), &graph, &path).unwrap();
        let reloaded = axioms(&std::fs::read(&path).unwrap());
        assert_eq!(reloaded, expected, "{} did not round trip", format);
    }
}

#[test]
fn test_unknown_codes_write_rdf_xml() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let graph = shop_graph(dir.path());
    for code in [0, 14, -3, 999] {
        let path = dir.path().join(format!("unknown{}.owl", code));
        let report = convert(code, &graph, &path).unwrap();
        assert_eq!(report.format, OutputFormat::RdfXml);
        let written = std::fs::read(&path).unwrap();
        assert!(looks_like_xml(&written));
        assert!(String::from_utf8(written).unwrap().contains("<rdf:RDF"));
    }
}

#[test]
fn test_transformer_convert_uses_output_path() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let graph = shop_graph(dir.path());
    let output = dir.path().join("shop.omn");
    let mut transformer = DbTransformer::default();
    // absolute paths keep their leading separator, so coercion leaves them alone
    transformer.set_output(output.to_str().unwrap());
    transformer.convert(OutputFormat::Manchester.code(), &graph).unwrap();
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("Class: "));
}

#[test]
fn test_malformed_input() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let path = dir.path().join("broken.owl");
    let err = convert(1, b"<rdf:RDF this is not xml", &path).unwrap_err();
    assert!(matches!(err, dbtransformer::TransformError::OntologyLoad(_)));
    assert!(!path.exists());
}

#[test]
fn test_mysql_fetch_size_streams() {
    use dbtransformer::driver::quirks::choose_fetch_size;
    use dbtransformer::params::DEFAULT_FETCH_SIZE;

    let params = dbtransformer::ConnectionParameters::new("", "jdbc:mysql://db:3306/shop", "", "");
    let size = choose_fetch_size(params.fetch_size, None, params.connection_string(), DEFAULT_FETCH_SIZE);
    assert!(size.is_streaming());
    assert_eq!(size.as_driver_value(), i32::MIN);

    let explicit = params.with_fetch_size(25);
    let size = choose_fetch_size(explicit.fetch_size, None, explicit.connection_string(), DEFAULT_FETCH_SIZE);
    assert_eq!(size.as_driver_value(), 25);
}
