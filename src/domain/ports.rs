use crate::domain::model::{
    Department, DepartmentBudget, DepartmentId, Employee, EmployeeId, EmployeeReport, ManagerUpdate,
    NewEmployee, NewRole, Role, RoleId, RoleReport,
};
use crate::utils::error::StoreResult;
use async_trait::async_trait;

/// Access to the relational store holding the three directory tables.
///
/// Implementations report failures as classified [`StoreError`](crate::utils::error::StoreError)s;
/// turning them into domain errors is the service's job.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn insert_department(&self, name: &str) -> StoreResult<DepartmentId>;
    async fn insert_role(&self, role: &NewRole) -> StoreResult<RoleId>;
    async fn insert_employee(&self, employee: &NewEmployee) -> StoreResult<EmployeeId>;

    async fn departments(&self) -> StoreResult<Vec<Department>>;
    async fn roles(&self) -> StoreResult<Vec<Role>>;
    /// Roles left-outer-joined to their department.
    async fn role_report(&self) -> StoreResult<Vec<RoleReport>>;
    async fn employees(&self) -> StoreResult<Vec<Employee>>;
    /// Employees left-outer-joined to role, department and manager.
    async fn employee_report(&self) -> StoreResult<Vec<EmployeeReport>>;
    async fn department_budgets(&self) -> StoreResult<Vec<DepartmentBudget>>;

    /// Returns the number of affected rows.
    async fn update_employee_role(&self, employee_id: EmployeeId, role_id: RoleId)
        -> StoreResult<u64>;
    /// Sets or clears the manager. When a manager is given, the store checks
    /// that it exists and that its reporting chain does not reach `employee_id`
    /// atomically with the write.
    async fn update_employee_manager(
        &self,
        employee_id: EmployeeId,
        manager_id: Option<EmployeeId>,
    ) -> StoreResult<ManagerUpdate>;
}

pub trait ConfigProvider: Send + Sync {
    fn database_path(&self) -> &str;
    fn busy_timeout_ms(&self) -> u64;
    fn bind_address(&self) -> String;
}
