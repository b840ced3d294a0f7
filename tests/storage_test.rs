//! Integration tests for the storage layer against a real SQLite file.

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use vitrina::storage::db::{self, DbPool};
use vitrina::telegram::commands::resolve_registered_handle;

fn test_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("test.sqlite");
    let pool = db::create_pool(path.to_str().expect("utf-8 path")).expect("create pool");
    (dir, pool)
}

#[test]
fn migrations_seed_exactly_one_stock_row() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM stock", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    let id: i64 = conn.query_row("SELECT id FROM stock", [], |row| row.get(0)).unwrap();
    assert_eq!(id, db::STOCK_ROW_ID);

    let text = db::get_stock_text(&conn).unwrap();
    assert!(text.contains("Stock"));
}

#[test]
fn stock_text_roundtrip_keeps_line_breaks() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).unwrap();

    db::set_stock_text(&conn, "📦 Stock\n\nLine one\nLine two").unwrap();
    assert_eq!(db::get_stock_text(&conn).unwrap(), "📦 Stock\n\nLine one\nLine two");

    // Still a singleton after the update
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM stock", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn add_operator_is_idempotent() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).unwrap();

    db::add_operator(&conn, "@foo").unwrap();
    db::add_operator(&conn, "@foo").unwrap();

    let operators = db::list_operators(&conn).unwrap();
    assert_eq!(operators.len(), 1);

    let op = &operators[0];
    assert_eq!(op.username, "@foo");
    assert_eq!(op.user_id, None);
    assert_eq!(op.location, None);
    assert!(!op.online);
    assert!(!op.delivery);
}

#[test]
fn re_adding_an_operator_keeps_their_status() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).unwrap();

    db::add_operator(&conn, "@foo").unwrap();
    db::set_operator_online(&conn, "@foo", true).unwrap();
    db::set_operator_location(&conn, "@foo", "North side").unwrap();

    // A second registration must not reset anything
    db::add_operator(&conn, "@foo").unwrap();

    let op = db::get_operator(&conn, "@foo").unwrap().unwrap();
    assert!(op.online);
    assert_eq!(op.location.as_deref(), Some("North side"));
}

#[test]
fn operator_status_updates_are_keyed_to_one_row() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).unwrap();

    db::add_operator(&conn, "@foo").unwrap();
    db::add_operator(&conn, "@bar").unwrap();

    db::set_operator_online(&conn, "@foo", true).unwrap();
    db::set_operator_delivery(&conn, "@foo", true).unwrap();

    let foo = db::get_operator(&conn, "@foo").unwrap().unwrap();
    let bar = db::get_operator(&conn, "@bar").unwrap().unwrap();
    assert!(foo.online);
    assert!(foo.delivery);
    assert!(!bar.online);
    assert!(!bar.delivery);

    db::set_operator_online(&conn, "@foo", false).unwrap();
    let foo = db::get_operator(&conn, "@foo").unwrap().unwrap();
    assert!(!foo.online);
}

#[test]
fn unregistered_handle_resolves_to_none_and_changes_nothing() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).unwrap();

    db::add_operator(&conn, "@foo").unwrap();

    let resolved = resolve_registered_handle(&conn, "stranger", Some(42)).unwrap();
    assert_eq!(resolved, None);

    let operators = db::list_operators(&conn).unwrap();
    assert_eq!(operators.len(), 1);
    assert_eq!(operators[0].username, "@foo");
    assert_eq!(operators[0].user_id, None);
}

#[test]
fn registered_handle_resolves_and_backfills_user_id() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).unwrap();

    db::add_operator(&conn, "@foo").unwrap();

    // The raw Telegram username has no '@'; resolution normalizes it
    let resolved = resolve_registered_handle(&conn, "foo", Some(42)).unwrap();
    assert_eq!(resolved.as_deref(), Some("@foo"));

    let op = db::get_operator(&conn, "@foo").unwrap().unwrap();
    assert_eq!(op.user_id, Some(42));

    // A second interaction leaves the id in place
    let resolved = resolve_registered_handle(&conn, "@foo", Some(42)).unwrap();
    assert_eq!(resolved.as_deref(), Some("@foo"));
    assert_eq!(db::get_operator(&conn, "@foo").unwrap().unwrap().user_id, Some(42));
}

#[test]
fn links_are_append_only_and_ordered() {
    let (_dir, pool) = test_pool();
    let conn = db::get_connection(&pool).unwrap();

    db::add_link(&conn, "Main channel", "https://t.me/example").unwrap();
    db::add_link(&conn, "Backup", "https://t.me/example2").unwrap();

    let links = db::list_links(&conn).unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].name, "Main channel");
    assert_eq!(links[0].url, "https://t.me/example");
    assert_eq!(links[1].name, "Backup");
    assert!(links[0].id < links[1].id);
}
