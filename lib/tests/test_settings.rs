use dbtransformer::{ExportConfig, OutputFormat, Settings};
use tempdir::TempDir;

#[test]
fn test_read_format_code() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let path = dir.path().join("settings.xml");
    std::fs::write(
        &path,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!--DBTransformer Settings-->
<Setting>
    <jdbc>jdbc:sqlite:shop.db</jdbc>
    <user></user>
    <driver>org.sqlite.JDBC</driver>
    <outputPath>out/shop.ttl</outputPath>
    <baseUri>http://example.org/shop/</baseUri>
    <format>3</format>
</Setting>
"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.format, 3);
    assert_eq!(settings.output_format(), OutputFormat::Turtle);
    assert_eq!(settings.user, "");

    let config = ExportConfig::from_settings(&settings);
    assert_eq!(config.output_path.as_deref(), Some("/shop.ttl"));
    assert_eq!(config.base_uri.as_deref(), Some("http://example.org/shop/"));

    let params = settings.connection_parameters(Some("secret"));
    assert_eq!(params.connection_string(), Some("jdbc:sqlite:shop.db"));
    assert_eq!(params.driver_class.as_deref(), Some("org.sqlite.JDBC"));
    assert_eq!(params.username, None);
}

#[test]
fn test_save_then_load_reproduces_all_fields() {
    let dir = TempDir::new("dbtransformer").unwrap();
    let path = dir.path().join("settings.xml");
    let settings = Settings {
        jdbc: "jdbc:sqlite:/data/a&b.db".into(),
        user: "admin".into(),
        driver: "org.sqlite.JDBC".into(),
        output_path: "C:\\exports\\shop.owl".into(),
        base_uri: "http://example.org/shop#".into(),
        format: 11,
    };
    settings.save(&path).unwrap();
    assert_eq!(Settings::load(&path).unwrap(), settings);
}
