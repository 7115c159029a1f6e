//! Table definitions for the directory store.
//!
//! Every statement is idempotent so the schema can be applied on each start.

use rusqlite::Connection;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS department (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS role (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    salary REAL NOT NULL CHECK (salary >= 0),
    department_id INTEGER NOT NULL REFERENCES department(id)
);

CREATE TABLE IF NOT EXISTS employee (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role_id INTEGER NOT NULL REFERENCES role(id),
    manager_id INTEGER REFERENCES employee(id)
);

CREATE INDEX IF NOT EXISTS idx_role_department ON role(department_id);
CREATE INDEX IF NOT EXISTS idx_employee_role ON employee(role_id);
CREATE INDEX IF NOT EXISTS idx_employee_manager ON employee(manager_id);
";

pub fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Foreign keys are off by default in SQLite and must be enabled per connection.
pub fn enable_foreign_keys(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}
