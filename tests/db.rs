use pushkind_dispatch::db::run_migrations;

mod common;

#[test]
fn test_creates_a_migrated_database() {
    let test_db = common::TestDb::new("test_creates_a_migrated_database.db");
    let conn = test_db.pool().get();
    assert!(conn.is_ok());
}

#[test]
fn test_migrations_are_applied_once() {
    let test_db = common::TestDb::new("test_migrations_are_applied_once.db");
    assert_eq!(run_migrations(&test_db.pool()).unwrap(), 0);
}
