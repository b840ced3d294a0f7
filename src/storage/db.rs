use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Result;

use super::migrations::run_migrations;

/// Id of the single stock row. Exactly one row exists at all times.
pub const STOCK_ROW_ID: i64 = 1;

/// A registered operator contact.
///
/// The username is the primary key and is always stored with a leading
/// '@'. `user_id` is unknown until the operator first talks to the bot
/// and is backfilled at that point.
#[derive(Debug, Clone)]
pub struct Operator {
    /// Telegram handle, '@'-prefixed
    pub username: String,
    /// Telegram user ID, filled in on first self-service interaction
    pub user_id: Option<i64>,
    /// Free-text location, set by the operator via /loc
    pub location: Option<String>,
    /// Availability flag, toggled via /online and /offline
    pub online: bool,
    /// Delivery flag, set via /delivery
    pub delivery: bool,
}

/// A link board entry. Append-only.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub name: String,
    pub url: String,
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and applies
/// the embedded schema migrations, which also seed the stock singleton.
/// Migration failure is fatal: without the stock row the bot cannot
/// honor its invariants.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Returns
///
/// Returns a `DbPool` on success or an error if pool creation or
/// migration fails.
pub fn create_pool(database_path: &str) -> anyhow::Result<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Returns the current stock text.
///
/// The row is seeded by the migrations, so a missing row is a genuine
/// database error rather than an expected state.
pub fn get_stock_text(conn: &DbConnection) -> Result<String> {
    conn.query_row(
        "SELECT text FROM stock WHERE id = ?1",
        [STOCK_ROW_ID],
        |row| row.get(0),
    )
}

/// Replaces the stock text. The singleton row is never inserted or
/// deleted here, only updated.
pub fn set_stock_text(conn: &DbConnection, text: &str) -> Result<()> {
    conn.execute(
        "UPDATE stock SET text = ?1 WHERE id = ?2",
        &[&text as &dyn rusqlite::ToSql, &STOCK_ROW_ID as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

/// Registers an operator handle.
///
/// Idempotent: inserting an already registered handle changes nothing.
/// New operators start offline, without delivery and without a
/// location.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `username` - '@'-prefixed handle
pub fn add_operator(conn: &DbConnection, username: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO operators (username, user_id, location, online, delivery)
         VALUES (?1, NULL, NULL, 0, 0)
         ON CONFLICT(username) DO NOTHING",
        &[&username as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

/// Looks up an operator row by '@'-prefixed handle.
///
/// # Returns
///
/// Returns `Ok(Some(Operator))` if the handle is registered, `Ok(None)`
/// otherwise.
pub fn get_operator(conn: &DbConnection, username: &str) -> Result<Option<Operator>> {
    let mut stmt = conn.prepare(
        "SELECT username, user_id, location, online, delivery FROM operators WHERE username = ?",
    )?;
    let mut rows = stmt.query(&[&username as &dyn rusqlite::ToSql])?;

    if let Some(row) = rows.next()? {
        Ok(Some(Operator {
            username: row.get(0)?,
            user_id: row.get(1)?,
            location: row.get(2)?,
            online: row.get(3)?,
            delivery: row.get(4)?,
        }))
    } else {
        Ok(None)
    }
}

/// Returns all registered operators, ordered by handle for a stable
/// directory listing.
pub fn list_operators(conn: &DbConnection) -> Result<Vec<Operator>> {
    let mut stmt = conn.prepare(
        "SELECT username, user_id, location, online, delivery FROM operators ORDER BY username",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Operator {
            username: row.get(0)?,
            user_id: row.get(1)?,
            location: row.get(2)?,
            online: row.get(3)?,
            delivery: row.get(4)?,
        })
    })?;

    let mut operators = Vec::new();
    for row in rows {
        operators.push(row?);
    }
    Ok(operators)
}

/// Backfills the Telegram user ID of a registered operator.
pub fn set_operator_user_id(conn: &DbConnection, username: &str, user_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE operators SET user_id = ?1 WHERE username = ?2",
        &[&user_id as &dyn rusqlite::ToSql, &username as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

/// Stores the operator's free-text location.
pub fn set_operator_location(conn: &DbConnection, username: &str, location: &str) -> Result<()> {
    conn.execute(
        "UPDATE operators SET location = ?1 WHERE username = ?2",
        &[&location as &dyn rusqlite::ToSql, &username as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

/// Flips the operator's online flag.
pub fn set_operator_online(conn: &DbConnection, username: &str, online: bool) -> Result<()> {
    let value = if online { 1 } else { 0 };
    conn.execute(
        "UPDATE operators SET online = ?1 WHERE username = ?2",
        &[&value as &dyn rusqlite::ToSql, &username as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

/// Sets the operator's delivery flag.
pub fn set_operator_delivery(conn: &DbConnection, username: &str, delivery: bool) -> Result<()> {
    let value = if delivery { 1 } else { 0 };
    conn.execute(
        "UPDATE operators SET delivery = ?1 WHERE username = ?2",
        &[&value as &dyn rusqlite::ToSql, &username as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

/// Appends a link board entry.
pub fn add_link(conn: &DbConnection, name: &str, url: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO links (name, url) VALUES (?1, ?2)",
        &[&name as &dyn rusqlite::ToSql, &url as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

/// Returns all link board entries in insertion order.
pub fn list_links(conn: &DbConnection) -> Result<Vec<Link>> {
    let mut stmt = conn.prepare("SELECT id, name, url FROM links ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Link {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
        })
    })?;

    let mut links = Vec::new();
    for row in rows {
        links.push(row?);
    }
    Ok(links)
}
