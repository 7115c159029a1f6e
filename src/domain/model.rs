use serde::{Deserialize, Serialize};

pub type DepartmentId = i64;
pub type RoleId = i64;
pub type EmployeeId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub title: String,
    pub salary: f64,
    pub department_id: DepartmentId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub role_id: RoleId,
    pub manager_id: Option<EmployeeId>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRole {
    pub title: String,
    pub salary: f64,
    pub department_id: DepartmentId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub role_id: RoleId,
    pub manager_id: Option<EmployeeId>,
}

/// A role with its department resolved to a name. `department` is `None`
/// when the role points at a department that does not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleReport {
    pub id: RoleId,
    pub title: String,
    pub salary: f64,
    pub department: Option<String>,
}

/// An employee with role and manager resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeReport {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub role_title: Option<String>,
    pub department: Option<String>,
    pub salary: Option<f64>,
    pub manager_full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentBudget {
    pub id: DepartmentId,
    pub name: String,
    pub headcount: i64,
    pub total_salary: f64,
}

/// Presentation mode for the role and employee listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    #[default]
    Raw,
    Report,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RoleListing {
    Raw(Vec<Role>),
    Report(Vec<RoleReport>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EmployeeListing {
    Raw(Vec<Employee>),
    Report(Vec<EmployeeReport>),
}

/// Result of a targeted update. Matching no employee is an ordinary outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassignOutcome {
    Updated { id: EmployeeId, changes: u64 },
    NotFound { id: EmployeeId },
}

impl ReassignOutcome {
    pub fn id(&self) -> EmployeeId {
        match self {
            ReassignOutcome::Updated { id, .. } | ReassignOutcome::NotFound { id } => *id,
        }
    }

    pub fn changes(&self) -> u64 {
        match self {
            ReassignOutcome::Updated { changes, .. } => *changes,
            ReassignOutcome::NotFound { .. } => 0,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ReassignOutcome::NotFound { .. })
    }
}

/// What the store did with a manager change. The existence and chain checks
/// run in the same transaction as the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerUpdate {
    /// The update ran; `0` changes means the employee does not exist.
    Applied(u64),
    ManagerMissing { manager_id: EmployeeId },
    /// The proposed manager already reports, directly or not, to the employee.
    WouldCycle { manager_id: EmployeeId },
}
