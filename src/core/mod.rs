pub mod directory;

pub use crate::domain::model::{
    Department, DepartmentBudget, Employee, EmployeeReport, ListMode, NewDepartment, NewEmployee,
    NewRole, ReassignOutcome, Role, RoleReport,
};
pub use crate::domain::ports::{ConfigProvider, DirectoryStore};
pub use crate::utils::error::Result;
pub use directory::DirectoryService;
