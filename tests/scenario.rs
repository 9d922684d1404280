use std::path::Path;

use serde_json::{Value as Json, json};
use tempfile::TempDir;

use skiff_db::{
    AlwaysConfirm, Database, DatabaseError, JsonFileBackend, Response, Session, Warning,
};

fn open(dir: &Path) -> Session<JsonFileBackend, AlwaysConfirm> {
    let backend = JsonFileBackend::open(dir, "db_meta.json").unwrap();
    let db = Database::open(backend).unwrap();
    Session::new(db, AlwaysConfirm)
}

fn run(session: &mut Session<JsonFileBackend, AlwaysConfirm>, line: &str) -> (String, Vec<Warning>) {
    match session.execute_line(line) {
        Ok(Some(Response::Output { text, warnings })) => (text, warnings),
        other => panic!("`{line}` gave {other:?}"),
    }
}

fn read(path: impl AsRef<Path>) -> Json {
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_single_table_lifecycle_on_disk() {
    let dir = TempDir::new().unwrap();
    let mut session = open(dir.path());
    let table_file = dir.path().join("tables").join("t.json");
    let registry_file = dir.path().join("db_meta.json");

    run(&mut session, "create_table t x:int");
    assert_eq!(read(&registry_file), json!({"t": {"id": "integer", "x": "integer"}}));
    assert_eq!(read(&table_file), json!({"id": [], "x": []}));

    let (text, _) = run(&mut session, "insert into t values (5)");
    assert_eq!(text, "Inserted row 1 into `t`");
    assert_eq!(read(&table_file), json!({"id": [1], "x": [5]}));

    let result = session
        .database()
        .registry()
        .get("t")
        .map(|schema| schema.arity())
        .unwrap();
    assert_eq!(result, 1);

    let (text, _) = run(&mut session, "select from t where x = 5");
    assert!(text.ends_with("(1 row)"), "{text}");

    let (text, warnings) = run(&mut session, "update t set x = 9 where x = 5");
    assert_eq!(text, "Updated row 1 in `t`");
    assert!(warnings.is_empty());
    assert_eq!(read(&table_file), json!({"id": [1], "x": [9]}));

    let (text, _) = run(&mut session, "delete from t where x = 9");
    assert_eq!(text, "Deleted row 1 from `t`");
    assert_eq!(read(&table_file), json!({"id": [], "x": []}));
}

#[test]
fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut session = open(dir.path());
        run(&mut session, "create_table users name:str age:int active:bool");
        run(&mut session, "insert into users values ('ann', 30, true)");
        run(&mut session, "insert into users values ('bob', 25, false)");
        run(&mut session, "delete from users where name = 'bob'");
    }

    let mut session = open(dir.path());
    let (text, _) = run(&mut session, "info users");
    assert!(text.contains("Rows: 1"), "{text}");

    run(&mut session, "insert into users values ('cat', 41, true)");
    assert_eq!(
        read(dir.path().join("tables").join("users.json")),
        json!({
            "id": [1, 2],
            "name": ["ann", "cat"],
            "age": [30, 41],
            "active": [true, true]
        })
    );
}

#[test]
fn test_rejected_commands_leave_files_untouched() {
    let dir = TempDir::new().unwrap();
    let mut session = open(dir.path());
    run(&mut session, "create_table t x:int flag:bool");
    run(&mut session, "insert into t values (1, true)");

    let table_file = dir.path().join("tables").join("t.json");
    let registry_file = dir.path().join("db_meta.json");
    let table_before = read(&table_file);
    let registry_before = read(&registry_file);

    for line in [
        "create_table t y:str",
        "create_table u y:float",
        "create_table v a:int a:str",
        "create_table w",
        "insert into t values (1)",
        "insert into t values ('one', true)",
        "update t set id = 5 where x = 1",
        "update t set nope = 5 where x = 1",
        "delete from t where x = 1.5",
        "select from t where flag = yes",
    ] {
        assert!(session.execute_line(line).is_err(), "`{line}` should fail");
    }

    assert_eq!(read(&table_file), table_before);
    assert_eq!(read(&registry_file), registry_before);
    assert!(!dir.path().join("tables").join("u.json").exists());
    assert!(!dir.path().join("tables").join("v.json").exists());
    assert!(!dir.path().join("tables").join("w.json").exists());
}

#[test]
fn test_drop_table_with_missing_file_warns() {
    let dir = TempDir::new().unwrap();
    let mut session = open(dir.path());
    run(&mut session, "create_table t x:int");
    std::fs::remove_file(dir.path().join("tables").join("t.json")).unwrap();

    let err = session.execute_line("select from t").unwrap_err();
    assert!(matches!(err, DatabaseError::BackendIo { .. }));

    let (text, warnings) = run(&mut session, "drop_table t");
    assert_eq!(text, "Dropped table `t`");
    assert_eq!(warnings, vec![Warning::MissingTableFile("t".to_string())]);

    let (text, _) = run(&mut session, "list_tables");
    assert_eq!(text, "Database is empty");
    assert_eq!(read(dir.path().join("db_meta.json")), json!({}));
}

#[test]
fn test_table_named_like_registry_file() {
    let dir = TempDir::new().unwrap();
    let mut session = open(dir.path());

    run(&mut session, "create_table db_meta x:int");
    let (text, _) = run(&mut session, "insert into db_meta values (1)");
    assert_eq!(text, "Inserted row 1 into `db_meta`");

    assert_eq!(
        read(dir.path().join("db_meta.json")),
        json!({"db_meta": {"id": "integer", "x": "integer"}})
    );
    assert_eq!(
        read(dir.path().join("tables").join("db_meta.json")),
        json!({"id": [1], "x": [1]})
    );

    run(&mut session, "drop_table db_meta");
    assert_eq!(read(dir.path().join("db_meta.json")), json!({}));
}
