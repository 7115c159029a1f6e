use crate::adapters::schema;
use crate::domain::model::{
    Department, DepartmentBudget, DepartmentId, Employee, EmployeeId, EmployeeReport, ManagerUpdate,
    NewEmployee, NewRole, Role, RoleId, RoleReport,
};
use crate::domain::ports::DirectoryStore;
use crate::utils::error::{Entity, StoreError, StoreResult};
use async_trait::async_trait;
use rusqlite::{ffi, params, Connection, ErrorCode, TransactionBehavior};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// SQLite-backed directory store.
///
/// The connection is shared behind an async mutex, so each trait call runs
/// serialized against the database. Manager changes also run in their own
/// immediate transaction so other processes on the same file cannot interleave.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database file, enables foreign keys and applies the schema.
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::prepare(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    /// Wraps a connection as-is. The caller is responsible for pragmas and schema.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn prepare(conn: Connection) -> StoreResult<Self> {
        schema::enable_foreign_keys(&conn)?;
        schema::apply(&conn)?;
        tracing::debug!("SQLite schema ready");
        Ok(Self::from_connection(conn))
    }
}

fn exists(conn: &Connection, table: &str, id: i64) -> rusqlite::Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table);
    conn.query_row(&sql, params![id], |row| row.get(0))
}

#[async_trait]
impl DirectoryStore for SqliteStore {
    async fn insert_department(&self, name: &str) -> StoreResult<DepartmentId> {
        let conn = self.conn.lock().await;
        conn.execute("INSERT INTO department (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    async fn insert_role(&self, role: &NewRole) -> StoreResult<RoleId> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO role (title, salary, department_id) VALUES (?1, ?2, ?3)",
            params![role.title, role.salary, role.department_id],
        )
        .map_err(|e| {
            with_missing_parent(e.into(), || Some((Entity::Department, role.department_id)))
        })?;
        Ok(conn.last_insert_rowid())
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> StoreResult<EmployeeId> {
        let conn = self.conn.lock().await;
        let inserted = conn.execute(
            "INSERT INTO employee (first_name, last_name, role_id, manager_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                employee.first_name,
                employee.last_name,
                employee.role_id,
                employee.manager_id
            ],
        );

        if let Err(e) = inserted {
            // SQLite does not say which key failed, so look for the missing parent.
            return Err(with_missing_parent(e.into(), || {
                if !exists(&conn, "role", employee.role_id).unwrap_or(true) {
                    return Some((Entity::Role, employee.role_id));
                }
                employee
                    .manager_id
                    .filter(|id| !exists(&conn, "employee", *id).unwrap_or(true))
                    .map(|id| (Entity::Employee, id))
            }));
        }
        Ok(conn.last_insert_rowid())
    }

    async fn departments(&self) -> StoreResult<Vec<Department>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id, name FROM department ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Department {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn roles(&self) -> StoreResult<Vec<Role>> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, title, salary, department_id FROM role ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Role {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    salary: row.get(2)?,
                    department_id: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn role_report(&self) -> StoreResult<Vec<RoleReport>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT r.id, r.title, r.salary, d.name
             FROM role r
             LEFT JOIN department d ON r.department_id = d.id
             ORDER BY r.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RoleReport {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    salary: row.get(2)?,
                    department: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn employees(&self) -> StoreResult<Vec<Employee>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, role_id, manager_id FROM employee ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Employee {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    role_id: row.get(3)?,
                    manager_id: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn employee_report(&self) -> StoreResult<Vec<EmployeeReport>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT e.id, e.first_name, e.last_name, r.title, d.name, r.salary,
                    m.first_name || ' ' || m.last_name
             FROM employee e
             LEFT JOIN role r ON e.role_id = r.id
             LEFT JOIN department d ON r.department_id = d.id
             LEFT JOIN employee m ON e.manager_id = m.id
             ORDER BY e.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(EmployeeReport {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    role_title: row.get(3)?,
                    department: row.get(4)?,
                    salary: row.get(5)?,
                    manager_full_name: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn department_budgets(&self) -> StoreResult<Vec<DepartmentBudget>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT d.id, d.name, COUNT(e.id),
                    COALESCE(SUM(CASE WHEN e.id IS NOT NULL THEN r.salary END), 0.0)
             FROM department d
             LEFT JOIN role r ON r.department_id = d.id
             LEFT JOIN employee e ON e.role_id = r.id
             GROUP BY d.id, d.name
             ORDER BY d.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DepartmentBudget {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    headcount: row.get(2)?,
                    total_salary: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn update_employee_role(
        &self,
        employee_id: EmployeeId,
        role_id: RoleId,
    ) -> StoreResult<u64> {
        let conn = self.conn.lock().await;
        let changes = conn
            .execute(
                "UPDATE employee SET role_id = ?1 WHERE id = ?2",
                params![role_id, employee_id],
            )
            .map_err(|e| with_missing_parent(e.into(), || Some((Entity::Role, role_id))))?;
        Ok(changes as u64)
    }

    async fn update_employee_manager(
        &self,
        employee_id: EmployeeId,
        manager_id: Option<EmployeeId>,
    ) -> StoreResult<ManagerUpdate> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(manager_id) = manager_id {
            if !exists(&tx, "employee", manager_id)? {
                return Ok(ManagerUpdate::ManagerMissing { manager_id });
            }
            let reaches_employee: bool = tx.query_row(
                MANAGER_CHAIN_REACHES,
                params![manager_id, employee_id],
                |row| row.get(0),
            )?;
            if reaches_employee {
                return Ok(ManagerUpdate::WouldCycle { manager_id });
            }
        }

        let changes = tx
            .execute(
                "UPDATE employee SET manager_id = ?1 WHERE id = ?2",
                params![manager_id, employee_id],
            )
            .map_err(|e| {
                with_missing_parent(e.into(), || manager_id.map(|id| (Entity::Employee, id)))
            })?;
        tx.commit()?;
        Ok(ManagerUpdate::Applied(changes as u64))
    }
}

/// Whether walking up from employee `?1` through `manager_id` reaches employee `?2`.
/// `UNION` drops repeated ids, so an existing loop ends the walk.
const MANAGER_CHAIN_REACHES: &str = "
    WITH RECURSIVE chain(id) AS (
        SELECT ?1
        UNION
        SELECT e.manager_id FROM employee e JOIN chain c ON e.id = c.id
        WHERE e.manager_id IS NOT NULL
    )
    SELECT EXISTS(SELECT 1 FROM chain WHERE id = ?2)";

/// Fills in the missing parent of a foreign key violation; other errors pass through.
fn with_missing_parent(
    err: StoreError,
    locate: impl FnOnce() -> Option<(Entity, i64)>,
) -> StoreError {
    match err {
        StoreError::ForeignKeyViolation { missing: None, message } => {
            StoreError::ForeignKeyViolation {
                missing: locate(),
                message,
            }
        }
        other => other,
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, detail) => {
                let message = detail.clone().unwrap_or_else(|| failure.to_string());
                match failure.code {
                    ErrorCode::ConstraintViolation => match failure.extended_code {
                        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => StoreError::ForeignKeyViolation {
                            missing: None,
                            message,
                        },
                        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                            StoreError::UniqueViolation(message)
                        }
                        ffi::SQLITE_CONSTRAINT_CHECK => StoreError::CheckViolation(message),
                        ffi::SQLITE_CONSTRAINT_NOTNULL => StoreError::NotNullViolation(message),
                        _ => StoreError::Unknown(message),
                    },
                    ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure => StoreError::Unavailable(message),
                    _ => StoreError::Unknown(message),
                }
            }
            _ => StoreError::Unknown(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::enable_foreign_keys(&conn).unwrap();
        schema::apply(&conn).unwrap();
        conn
    }

    #[test]
    fn test_classifies_foreign_key_violation() {
        let conn = connection();
        let err = conn
            .execute(
                "INSERT INTO role (title, salary, department_id) VALUES ('Engineer', 1.0, 42)",
                [],
            )
            .unwrap_err();

        assert!(matches!(
            StoreError::from(err),
            StoreError::ForeignKeyViolation { missing: None, .. }
        ));
    }

    #[test]
    fn test_classifies_unique_violation() {
        let conn = connection();
        conn.execute("INSERT INTO department (name) VALUES ('Sales')", [])
            .unwrap();
        let err = conn
            .execute("INSERT INTO department (name) VALUES ('Sales')", [])
            .unwrap_err();

        assert!(matches!(StoreError::from(err), StoreError::UniqueViolation(_)));
    }

    #[test]
    fn test_classifies_check_violation() {
        let conn = connection();
        conn.execute("INSERT INTO department (name) VALUES ('Sales')", [])
            .unwrap();
        let err = conn
            .execute(
                "INSERT INTO role (title, salary, department_id) VALUES ('Clerk', -5.0, 1)",
                [],
            )
            .unwrap_err();

        assert!(matches!(StoreError::from(err), StoreError::CheckViolation(_)));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = connection();
        assert!(schema::apply(&conn).is_ok());
    }

    #[tokio::test]
    async fn test_employee_insert_names_missing_manager() {
        let store = SqliteStore::open_in_memory().unwrap();
        let department = store.insert_department("Ops").await.unwrap();
        let role = store
            .insert_role(&NewRole {
                title: "Operator".into(),
                salary: 50_000.0,
                department_id: department,
            })
            .await
            .unwrap();

        let err = store
            .insert_employee(&NewEmployee {
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
                role_id: role,
                manager_id: Some(77),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::ForeignKeyViolation {
                missing: Some((Entity::Employee, 77)),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_manager_update_rejects_chain_back_to_employee() {
        let store = SqliteStore::open_in_memory().unwrap();
        let department = store.insert_department("Ops").await.unwrap();
        let role = store
            .insert_role(&NewRole {
                title: "Operator".into(),
                salary: 50_000.0,
                department_id: department,
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for name in ["Ada", "Grace", "Alan"] {
            let id = store
                .insert_employee(&NewEmployee {
                    first_name: name.into(),
                    last_name: "Test".into(),
                    role_id: role,
                    manager_id: ids.last().copied(),
                })
                .await
                .unwrap();
            ids.push(id);
        }

        // Ada <- Grace <- Alan; Ada reporting to Alan would close the loop.
        let update = store.update_employee_manager(ids[0], Some(ids[2])).await.unwrap();
        assert_eq!(update, ManagerUpdate::WouldCycle { manager_id: ids[2] });

        let update = store.update_employee_manager(ids[0], Some(99)).await.unwrap();
        assert_eq!(update, ManagerUpdate::ManagerMissing { manager_id: 99 });

        let update = store.update_employee_manager(ids[2], Some(ids[0])).await.unwrap();
        assert_eq!(update, ManagerUpdate::Applied(1));

        let update = store.update_employee_manager(42, None).await.unwrap();
        assert_eq!(update, ManagerUpdate::Applied(0));
    }
}
