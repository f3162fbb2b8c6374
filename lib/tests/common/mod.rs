use dbtransformer::ConnectionParameters;
use rusqlite::Connection;
use std::path::Path;

/// Creates a two-table database with a foreign key and three rows.
pub fn create_shop_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Dept (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE Emp (id INTEGER PRIMARY KEY, name TEXT, salary DECIMAL(10,2),
                           active BOOLEAN, dept INTEGER REFERENCES Dept(id));
         INSERT INTO Dept VALUES (1, 'R&D');
         INSERT INTO Emp VALUES (10, 'Ann Lee', 1200.5, 1, 1);
         INSERT INTO Emp VALUES (11, 'Bob <Jr>', NULL, 0, NULL);",
    )
    .unwrap();
}

pub fn sqlite_params(path: &Path) -> ConnectionParameters {
    ConnectionParameters::new("", format!("jdbc:sqlite:{}", path.display()), "", "")
}
