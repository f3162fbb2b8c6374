mod common;

use common::{create_shop_db, sqlite_params};
use dbtransformer::ontology::OntologyManager;
use dbtransformer::util::parse_rdf;
use dbtransformer::{ConnectionParameters, DbTransformer, ExportConfig, OutputFormat, RdfSyntax, TransformError};
use oxigraph::io::RdfFormat;
use tempdir::TempDir;

#[test]
fn test_transform_produces_ntriples() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let db = dir.path().join("shop.db");
    create_shop_db(&db);

    let transformer = DbTransformer::default();
    let bytes = transformer.transform(&sqlite_params(&db), Some("http://example.org/shop/")).unwrap();
    assert!(!bytes.is_empty());
    let triples = parse_rdf(&bytes, RdfFormat::NTriples, None).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("<http://example.org/shop/Emp/10> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://localhost/vocab/Emp>"));
    assert!(text.contains("<http://example.org/shop/Emp/10> <http://localhost/vocab/Emp_dept> <http://example.org/shop/Dept/1>"));
    // Bob has no department
    assert!(!text.contains("<http://example.org/shop/Emp/11> <http://localhost/vocab/Emp_dept>"));
    assert!(triples.len() > 10);
}

#[test]
fn test_transform_in_each_rdf_syntax() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let db = dir.path().join("shop.db");
    create_shop_db(&db);
    let params = sqlite_params(&db);

    for (syntax, format) in [
        (RdfSyntax::RdfXml, RdfFormat::RdfXml),
        (RdfSyntax::RdfXmlAbbrev, RdfFormat::RdfXml),
        (RdfSyntax::Turtle, RdfFormat::Turtle),
        (RdfSyntax::N3, RdfFormat::Turtle),
    ] {
        let config = ExportConfig::builder().syntax(syntax).build().unwrap();
        let bytes = DbTransformer::new(config).transform(&params, None).unwrap();
        let triples = parse_rdf(&bytes, format, None).unwrap();
        assert!(!triples.is_empty(), "{} produced no triples", syntax);
    }
}

#[test]
fn test_missing_mapping_source_writes_nothing() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let output = dir.path().join("out.owl");
    let mut transformer = DbTransformer::default();
    transformer.set_output(output.to_str().unwrap());

    let err = transformer.export(&ConnectionParameters::default()).unwrap_err();
    assert!(matches!(err, TransformError::MissingMappingSource(_)));
    assert!(!output.exists());
}

#[test]
fn test_unreachable_driver() {
    let params = ConnectionParameters::new("", "jdbc:mysql://localhost:3306/shop", "root", "");
    let err = DbTransformer::default().transform(&params, None).unwrap_err();
    assert!(matches!(err, TransformError::DriverNotFound(_)));
    assert!(err.is_relational());
}

#[test]
fn test_export_with_explicit_mapping() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let db = dir.path().join("shop.db");
    create_shop_db(&db);
    let mapping = dir.path().join("mapping.ttl");
    std::fs::write(
        &mapping,
        format!(
            r#"@prefix map: <http://example.org/map#> .
@prefix vocab: <http://example.org/vocab/> .
@prefix d2rq: <http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#> .

map:db a d2rq:Database ;
    d2rq:jdbcDSN "jdbc:sqlite:{}" .

map:Dept a d2rq:ClassMap ;
    d2rq:dataStorage map:db ;
    d2rq:uriPattern "dept/@@Dept.id@@" ;
    d2rq:class vocab:Department .

map:Dept_name a d2rq:PropertyBridge ;
    d2rq:belongsToClassMap map:Dept ;
    d2rq:property vocab:title ;
    d2rq:column "Dept.name" .
"#,
            db.display()
        ),
    )
    .unwrap();

    let output = dir.path().join("shop.ttl");
    let config = ExportConfig::builder()
        .mapping_file(mapping)
        .output_path(output.to_str().unwrap())
        .base_uri("http://example.org/")
        .format(OutputFormat::Turtle)
        .build()
        .unwrap();
    let report = DbTransformer::new(config).export(&ConnectionParameters::default()).unwrap();
    assert_eq!(report.format, OutputFormat::Turtle);
    assert_eq!(report.path, output);

    let written = std::fs::read(&output).unwrap();
    let manager = OntologyManager::new();
    let loaded = manager.load_from_bytes(&written).unwrap();
    let classes = loaded
        .with(|o| {
            o.entities(dbtransformer::ontology::EntityKind::Class)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap();
    assert_eq!(classes, vec!["http://example.org/vocab/Department".to_string()]);
    let text = String::from_utf8(written).unwrap();
    assert!(text.contains("R&D"));
}

#[test]
fn test_export_into_directory_with_space() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let db = dir.path().join("shop.db");
    create_shop_db(&db);
    let out_dir = dir.path().join("my dir");
    std::fs::create_dir(&out_dir).unwrap();
    let output = out_dir.join("out.ttl");

    let mut transformer = DbTransformer::new(ExportConfig::builder().format(OutputFormat::Turtle).build().unwrap());
    transformer.set_output(output.to_str().unwrap());
    assert!(transformer.base_uri(None).contains("my%20dir"));
    let report = transformer.export(&sqlite_params(&db)).unwrap();
    assert_eq!(report.path, output);
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("my%20dir/Emp/10"));
}

#[test]
fn test_mapping_with_relative_prefix() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let db = dir.path().join("shop.db");
    create_shop_db(&db);
    let mapping = dir.path().join("map.ttl");
    std::fs::write(
        &mapping,
        format!(
            r#"@prefix map: <#> .
@prefix vocab: <http://example.org/vocab/> .
@prefix d2rq: <http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#> .

map:db a d2rq:Database ;
    d2rq:jdbcDSN "jdbc:sqlite:{}" .

map:Dept a d2rq:ClassMap ;
    d2rq:dataStorage map:db ;
    d2rq:uriPattern "dept/@@Dept.id@@" ;
    d2rq:class vocab:Department .

map:Emp a d2rq:ClassMap ;
    d2rq:dataStorage map:db ;
    d2rq:uriPattern "emp/@@Emp.id@@" ;
    d2rq:class vocab:Employee .

map:Emp_dept a d2rq:PropertyBridge ;
    d2rq:belongsToClassMap map:Emp ;
    d2rq:property vocab:worksIn ;
    d2rq:refersToClassMap map:Dept ;
    d2rq:join "Dept.id = Emp.dept" .
"#,
            db.display()
        ),
    )
    .unwrap();

    let config = ExportConfig::builder().mapping_file(mapping).build().unwrap();
    let bytes = DbTransformer::new(config)
        .transform(&ConnectionParameters::default(), Some("http://example.org/shop/"))
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains(
        "<http://example.org/shop/emp/10> <http://example.org/vocab/worksIn> <http://example.org/shop/dept/1>"
    ));
    assert!(!text.contains("<http://example.org/shop/emp/11> <http://example.org/vocab/worksIn>"));
}
