use crate::domain::model::{
    Department, DepartmentBudget, Employee, EmployeeId, EmployeeListing, EmployeeReport,
    ListMode, ManagerUpdate, NewDepartment, NewEmployee, NewRole, ReassignOutcome, Role, RoleId,
    RoleListing, RoleReport,
};
use crate::domain::ports::DirectoryStore;
use crate::utils::error::{DirectoryError, Entity, Result, StoreError};
use crate::utils::validation::{validate_non_empty_string, validate_salary};

/// Validates directory operations and runs each one as a single store call.
///
/// The service holds no rows between calls; every read goes back to the store.
pub struct DirectoryService<S: DirectoryStore> {
    store: S,
}

impl<S: DirectoryStore> DirectoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn add_department(&self, input: NewDepartment) -> Result<Department> {
        validate_non_empty_string("name", &input.name)?;
        let name = input.name.trim().to_string();

        let id = self
            .store
            .insert_department(&name)
            .await
            .map_err(|e| reject("add department", DirectoryError::from_store(e, None)))?;

        tracing::info!("Added department {} ({})", id, name);
        Ok(Department { id, name })
    }

    pub async fn add_role(&self, input: NewRole) -> Result<Role> {
        validate_non_empty_string("title", &input.title)?;
        validate_salary("salary", input.salary)?;

        let role = NewRole {
            title: input.title.trim().to_string(),
            ..input
        };
        let id = self.store.insert_role(&role).await.map_err(|e| {
            reject(
                "add role",
                DirectoryError::from_store(e, Some((Entity::Department, role.department_id))),
            )
        })?;

        tracing::info!("Added role {} ({}) in department {}", id, role.title, role.department_id);
        Ok(Role {
            id,
            title: role.title,
            salary: role.salary,
            department_id: role.department_id,
        })
    }

    pub async fn add_employee(&self, input: NewEmployee) -> Result<Employee> {
        validate_non_empty_string("first_name", &input.first_name)?;
        validate_non_empty_string("last_name", &input.last_name)?;

        let employee = NewEmployee {
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            ..input
        };
        let id = self.store.insert_employee(&employee).await.map_err(|e| {
            reject(
                "add employee",
                DirectoryError::from_store(e, Some((Entity::Role, employee.role_id))),
            )
        })?;

        tracing::info!(
            "Added employee {} ({} {}) with role {}",
            id,
            employee.first_name,
            employee.last_name,
            employee.role_id
        );
        Ok(Employee {
            id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            role_id: employee.role_id,
            manager_id: employee.manager_id,
        })
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>> {
        let departments = self.store.departments().await.map_err(read_failure)?;
        tracing::debug!("Listed {} departments", departments.len());
        Ok(departments)
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        let roles = self.store.roles().await.map_err(read_failure)?;
        tracing::debug!("Listed {} roles", roles.len());
        Ok(roles)
    }

    pub async fn list_roles_report(&self) -> Result<Vec<RoleReport>> {
        let roles = self.store.role_report().await.map_err(read_failure)?;
        tracing::debug!("Listed {} roles (report)", roles.len());
        Ok(roles)
    }

    pub async fn list_roles_in(&self, mode: ListMode) -> Result<RoleListing> {
        match mode {
            ListMode::Raw => self.list_roles().await.map(RoleListing::Raw),
            ListMode::Report => self.list_roles_report().await.map(RoleListing::Report),
        }
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>> {
        let employees = self.store.employees().await.map_err(read_failure)?;
        tracing::debug!("Listed {} employees", employees.len());
        Ok(employees)
    }

    pub async fn list_employees_report(&self) -> Result<Vec<EmployeeReport>> {
        let employees = self.store.employee_report().await.map_err(read_failure)?;
        tracing::debug!("Listed {} employees (report)", employees.len());
        Ok(employees)
    }

    pub async fn list_employees_in(&self, mode: ListMode) -> Result<EmployeeListing> {
        match mode {
            ListMode::Raw => self.list_employees().await.map(EmployeeListing::Raw),
            ListMode::Report => self
                .list_employees_report()
                .await
                .map(EmployeeListing::Report),
        }
    }

    pub async fn department_budgets(&self) -> Result<Vec<DepartmentBudget>> {
        self.store.department_budgets().await.map_err(read_failure)
    }

    pub async fn reassign_employee_role(
        &self,
        employee_id: EmployeeId,
        role_id: RoleId,
    ) -> Result<ReassignOutcome> {
        let changes = self
            .store
            .update_employee_role(employee_id, role_id)
            .await
            .map_err(|e| {
                reject(
                    "update employee role",
                    DirectoryError::from_store(e, Some((Entity::Role, role_id))),
                )
            })?;

        let outcome = outcome_from_changes(employee_id, changes)?;
        match outcome {
            ReassignOutcome::Updated { .. } => {
                tracing::info!("Employee {} now holds role {}", employee_id, role_id)
            }
            ReassignOutcome::NotFound { .. } => {
                tracing::warn!("No employee {} to move to role {}", employee_id, role_id)
            }
        }
        Ok(outcome)
    }

    /// Sets or clears an employee's manager, refusing any change that would
    /// make the employee their own direct or indirect manager.
    ///
    /// The chain check runs inside the store together with the write, so two
    /// concurrent moves cannot both pass it.
    pub async fn reassign_employee_manager(
        &self,
        employee_id: EmployeeId,
        manager_id: Option<EmployeeId>,
    ) -> Result<ReassignOutcome> {
        if manager_id == Some(employee_id) {
            return Err(reject(
                "update employee manager",
                DirectoryError::validation("manager_id", "An employee cannot manage themselves"),
            ));
        }

        let update = self
            .store
            .update_employee_manager(employee_id, manager_id)
            .await
            .map_err(|e| {
                reject(
                    "update employee manager",
                    DirectoryError::from_store(e, manager_id.map(|id| (Entity::Employee, id))),
                )
            })?;

        let outcome = match update {
            ManagerUpdate::Applied(changes) => outcome_from_changes(employee_id, changes)?,
            ManagerUpdate::ManagerMissing { manager_id } => {
                return Err(reject(
                    "update employee manager",
                    DirectoryError::ReferenceError {
                        entity: Entity::Employee,
                        id: manager_id,
                    },
                ))
            }
            ManagerUpdate::WouldCycle { manager_id } => {
                return Err(reject(
                    "update employee manager",
                    DirectoryError::validation(
                        "manager_id",
                        format!(
                            "Employee {} already reports to employee {}",
                            manager_id, employee_id
                        ),
                    ),
                ))
            }
        };

        if outcome.is_not_found() {
            tracing::warn!("No employee {} to reassign", employee_id);
        } else {
            tracing::info!("Employee {} now reports to {:?}", employee_id, manager_id);
        }
        Ok(outcome)
    }
}

fn outcome_from_changes(employee_id: EmployeeId, changes: u64) -> Result<ReassignOutcome> {
    match changes {
        0 => Ok(ReassignOutcome::NotFound { id: employee_id }),
        1 => Ok(ReassignOutcome::Updated {
            id: employee_id,
            changes,
        }),
        n => Err(DirectoryError::StoreError(StoreError::Unknown(format!(
            "update by id {} touched {} rows",
            employee_id, n
        )))),
    }
}

fn reject(operation: &str, err: DirectoryError) -> DirectoryError {
    tracing::warn!("Rejected {}: {}", operation, err);
    err
}

fn read_failure(err: StoreError) -> DirectoryError {
    tracing::error!("Read failed: {}", err);
    DirectoryError::from_store(err, None)
}
