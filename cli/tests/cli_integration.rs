use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempdir::TempDir;

fn dbtransformer_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dbtransformer"))
}

fn run(args: &[&str]) -> Output {
    Command::new(dbtransformer_bin())
        .args(args)
        .env_remove("DBTRANSFORMER_LOG")
        .output()
        .expect("run dbtransformer")
}

fn create_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Dept (id INTEGER PRIMARY KEY, name TEXT);
         CREATE TABLE Emp (id INTEGER PRIMARY KEY, name TEXT, dept INTEGER REFERENCES Dept(id));
         INSERT INTO Dept VALUES (1, 'Sales');
         INSERT INTO Emp VALUES (10, 'Ann', 1);",
    )
    .unwrap();
}

fn jdbc(path: &Path) -> String {
    format!("jdbc:sqlite:{}", path.display())
}

#[test]
fn formats_lists_every_code() {
    let out = run(&["formats", "--json"]);
    assert!(out.status.success());
    let formats: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let formats = formats.as_array().unwrap();
    assert_eq!(formats.len(), 13);
    assert_eq!(formats[2]["name"], "Turtle");
    assert_eq!(formats[2]["code"], 3);
}

#[test]
fn export_writes_ontology() {
    let dir = TempDir::new("dbtransformer-cli").unwrap();
    let db = dir.path().join("shop.db");
    create_db(&db);
    let output = dir.path().join("shop.omn");
    let out = run(&[
        "export",
        "--jdbc",
        &jdbc(&db),
        "--format",
        "manchester",
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("Class: "));
    assert!(text.contains("Emp_dept"));
}

#[test]
fn transform_then_convert() {
    let dir = TempDir::new("dbtransformer-cli").unwrap();
    let db = dir.path().join("shop.db");
    create_db(&db);
    let graph = dir.path().join("shop.ttl");
    let out = run(&[
        "transform",
        "--jdbc",
        &jdbc(&db),
        "--syntax",
        "TURTLE",
        "--base-uri",
        "http://example.org/shop/",
        "--output",
        graph.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(fs::read_to_string(&graph).unwrap().contains("<http://example.org/shop/Emp/10>"));

    let owl = dir.path().join("shop.ofn");
    let out = run(&[
        "convert",
        "--format",
        "5",
        "--input",
        graph.to_str().unwrap(),
        "--output",
        owl.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = fs::read_to_string(&owl).unwrap();
    assert!(text.contains("ClassAssertion(<http://localhost/vocab/Emp> <http://example.org/shop/Emp/10>)"));
}

#[test]
fn mapping_prints_turtle() {
    let dir = TempDir::new("dbtransformer-cli").unwrap();
    let db = dir.path().join("shop.db");
    create_db(&db);
    let out = run(&["mapping", "--jdbc", &jdbc(&db)]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("d2rq:ClassMap"));
    assert!(stdout.contains("Emp/@@Emp.id@@"));
}

#[test]
fn settings_save_and_show() {
    let dir = TempDir::new("dbtransformer-cli").unwrap();
    let file = dir.path().join("settings.xml");
    let out = run(&[
        "settings",
        "save",
        file.to_str().unwrap(),
        "--jdbc",
        "jdbc:sqlite:shop.db",
        "--output-path",
        "/tmp/shop.ttl",
        "--format",
        "turtle",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(fs::read_to_string(&file).unwrap().contains("<format>3</format>"));

    let out = run(&["settings", "show", file.to_str().unwrap(), "--json"]);
    assert!(out.status.success());
    let settings: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(settings["jdbc"], "jdbc:sqlite:shop.db");
    assert_eq!(settings["outputPath"], "/tmp/shop.ttl");
    assert_eq!(settings["format"], 3);
}

#[test]
fn settings_supply_export_defaults() {
    let dir = TempDir::new("dbtransformer-cli").unwrap();
    let db = dir.path().join("shop.db");
    create_db(&db);
    let output = dir.path().join("from-settings.ttl");
    let file = dir.path().join("settings.xml");
    fs::write(
        &file,
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Setting><jdbc>{}</jdbc><outputPath>{}</outputPath><format>3</format></Setting>\n",
            jdbc(&db),
            output.display()
        ),
    )
    .unwrap();
    let out = run(&["--settings", file.to_str().unwrap(), "export"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(fs::read_to_string(&output).unwrap().contains("@prefix"));
}

#[test]
fn missing_connection_fails_with_status_1() {
    let dir = TempDir::new("dbtransformer-cli").unwrap();
    let output = dir.path().join("out.owl");
    let out = run(&["export", "--output", output.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Must specify either a connection string or a mapping file"));
    assert!(!output.exists());
}
