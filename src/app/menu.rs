//! Interactive text menu over [`DirectoryService`].
//!
//! Each pass shows the menu, runs one action and comes back, until the user
//! picks "Exit" or input ends. Prompts that need an existing record fetch the
//! candidates first and then ask for a numbered choice.

use crate::app::table;
use crate::core::DirectoryService;
use crate::domain::model::{NewDepartment, NewEmployee, NewRole, ReassignOutcome};
use crate::domain::ports::DirectoryStore;
use crate::utils::error::{DirectoryError, Result};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddDepartment,
    AddRole,
    AddEmployee,
    ViewDepartments,
    ViewRoles,
    ViewEmployees,
    UpdateEmployeeRole,
    UpdateEmployeeManager,
    ViewDepartmentBudgets,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 10] = [
        MenuAction::AddDepartment,
        MenuAction::AddRole,
        MenuAction::AddEmployee,
        MenuAction::ViewDepartments,
        MenuAction::ViewRoles,
        MenuAction::ViewEmployees,
        MenuAction::UpdateEmployeeRole,
        MenuAction::UpdateEmployeeManager,
        MenuAction::ViewDepartmentBudgets,
        MenuAction::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::AddDepartment => "Add a department",
            MenuAction::AddRole => "Add a role",
            MenuAction::AddEmployee => "Add an employee",
            MenuAction::ViewDepartments => "View all departments",
            MenuAction::ViewRoles => "View all roles",
            MenuAction::ViewEmployees => "View all employees",
            MenuAction::UpdateEmployeeRole => "Update an employee role",
            MenuAction::UpdateEmployeeManager => "Update an employee manager",
            MenuAction::ViewDepartmentBudgets => "View department budgets",
            MenuAction::Exit => "Exit",
        }
    }

    /// Accepts the 1-based menu number or the label itself, ignoring case.
    pub fn parse(answer: &str) -> Option<MenuAction> {
        let answer = answer.trim();
        if let Ok(index) = answer.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| MenuAction::ALL.get(i))
                .copied();
        }
        MenuAction::ALL
            .iter()
            .copied()
            .find(|action| action.label().eq_ignore_ascii_case(answer))
    }
}

enum Step {
    Continue,
    EndOfInput,
}

pub struct Menu<'a, S: DirectoryStore, R: BufRead, W: Write> {
    service: &'a DirectoryService<S>,
    input: R,
    output: W,
}

impl<'a, S: DirectoryStore, R: BufRead, W: Write> Menu<'a, S, R, W> {
    pub fn new(service: &'a DirectoryService<S>, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(action) = self.choose_action()? else {
                break;
            };
            if action == MenuAction::Exit {
                writeln!(self.output, "Goodbye!")?;
                break;
            }

            tracing::debug!("Menu action: {}", action.label());
            match self.perform(action).await {
                Ok(Step::Continue) => {}
                Ok(Step::EndOfInput) => break,
                Err(e) => {
                    tracing::warn!("{} failed: {}", action.label(), e);
                    writeln!(self.output, "❌ {}", e.user_friendly_message())?;
                    writeln!(self.output, "💡 {}", e.recovery_suggestion())?;
                }
            }
        }
        Ok(())
    }

    async fn perform(&mut self, action: MenuAction) -> Result<Step> {
        match action {
            MenuAction::AddDepartment => self.add_department().await,
            MenuAction::AddRole => self.add_role().await,
            MenuAction::AddEmployee => self.add_employee().await,
            MenuAction::ViewDepartments => {
                let departments = self.service.list_departments().await?;
                write!(self.output, "{}", table::departments(&departments))?;
                Ok(Step::Continue)
            }
            MenuAction::ViewRoles => {
                let roles = self.service.list_roles_report().await?;
                write!(self.output, "{}", table::roles(&roles))?;
                Ok(Step::Continue)
            }
            MenuAction::ViewEmployees => {
                let employees = self.service.list_employees_report().await?;
                write!(self.output, "{}", table::employees(&employees))?;
                Ok(Step::Continue)
            }
            MenuAction::UpdateEmployeeRole => self.update_employee_role().await,
            MenuAction::UpdateEmployeeManager => self.update_employee_manager().await,
            MenuAction::ViewDepartmentBudgets => {
                let budgets = self.service.department_budgets().await?;
                write!(self.output, "{}", table::budgets(&budgets))?;
                Ok(Step::Continue)
            }
            MenuAction::Exit => Ok(Step::EndOfInput),
        }
    }

    async fn add_department(&mut self) -> Result<Step> {
        let Some(name) = self.prompt("What is the name of the department?")? else {
            return Ok(Step::EndOfInput);
        };

        let department = self.service.add_department(NewDepartment { name }).await?;
        writeln!(
            self.output,
            "✅ Department {} added with id {}",
            department.name, department.id
        )?;
        Ok(Step::Continue)
    }

    async fn add_role(&mut self) -> Result<Step> {
        let Some(title) = self.prompt("What is the title of the role?")? else {
            return Ok(Step::EndOfInput);
        };
        let Some(salary) = self.prompt("What is the salary of the role?")? else {
            return Ok(Step::EndOfInput);
        };
        let salary = parse_salary(&salary)?;

        let departments: Vec<(i64, String)> = self
            .service
            .list_departments()
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();
        let Some(department_id) =
            self.choose("Which department does the role belong to?", "department_id", &departments, false)?
        else {
            return Ok(Step::EndOfInput);
        };
        let department_id = required(department_id, "department_id")?;

        let role = self
            .service
            .add_role(NewRole {
                title,
                salary,
                department_id,
            })
            .await?;
        writeln!(self.output, "✅ Role {} added with id {}", role.title, role.id)?;
        Ok(Step::Continue)
    }

    async fn add_employee(&mut self) -> Result<Step> {
        let Some(first_name) = self.prompt("What is the first name of the employee?")? else {
            return Ok(Step::EndOfInput);
        };
        let Some(last_name) = self.prompt("What is the last name of the employee?")? else {
            return Ok(Step::EndOfInput);
        };

        let roles = self.role_choices().await?;
        let Some(role_id) = self.choose("What is the employee's role?", "role_id", &roles, false)?
        else {
            return Ok(Step::EndOfInput);
        };
        let role_id = required(role_id, "role_id")?;

        let managers = self.employee_choices().await?;
        let Some(manager_id) =
            self.choose("Who is the employee's manager?", "manager_id", &managers, true)?
        else {
            return Ok(Step::EndOfInput);
        };

        let employee = self
            .service
            .add_employee(NewEmployee {
                first_name,
                last_name,
                role_id,
                manager_id,
            })
            .await?;
        writeln!(
            self.output,
            "✅ Employee {} added with id {}",
            employee.full_name(),
            employee.id
        )?;
        Ok(Step::Continue)
    }

    async fn update_employee_role(&mut self) -> Result<Step> {
        let employees = self.employee_choices().await?;
        let Some(employee_id) =
            self.choose("Which employee's role do you want to update?", "employee_id", &employees, false)?
        else {
            return Ok(Step::EndOfInput);
        };
        let employee_id = required(employee_id, "employee_id")?;

        let roles = self.role_choices().await?;
        let Some(role_id) = self.choose("Which role should they hold?", "role_id", &roles, false)?
        else {
            return Ok(Step::EndOfInput);
        };
        let role_id = required(role_id, "role_id")?;

        let outcome = self
            .service
            .reassign_employee_role(employee_id, role_id)
            .await?;
        self.report_outcome(outcome, "role")?;
        Ok(Step::Continue)
    }

    async fn update_employee_manager(&mut self) -> Result<Step> {
        let employees = self.employee_choices().await?;
        let Some(employee_id) = self.choose(
            "Which employee's manager do you want to update?",
            "employee_id",
            &employees,
            false,
        )?
        else {
            return Ok(Step::EndOfInput);
        };
        let employee_id = required(employee_id, "employee_id")?;

        let Some(manager_id) =
            self.choose("Who should be their manager?", "manager_id", &employees, true)?
        else {
            return Ok(Step::EndOfInput);
        };

        let outcome = self
            .service
            .reassign_employee_manager(employee_id, manager_id)
            .await?;
        self.report_outcome(outcome, "manager")?;
        Ok(Step::Continue)
    }

    fn report_outcome(&mut self, outcome: ReassignOutcome, what: &str) -> Result<()> {
        match outcome {
            ReassignOutcome::Updated { id, .. } => {
                writeln!(self.output, "✅ Updated the {} of employee {}", what, id)?
            }
            ReassignOutcome::NotFound { id } => {
                writeln!(self.output, "Employee {} not found", id)?
            }
        }
        Ok(())
    }

    async fn role_choices(&self) -> Result<Vec<(i64, String)>> {
        Ok(self
            .service
            .list_roles()
            .await?
            .into_iter()
            .map(|r| (r.id, r.title))
            .collect())
    }

    async fn employee_choices(&self) -> Result<Vec<(i64, String)>> {
        Ok(self
            .service
            .list_employees()
            .await?
            .into_iter()
            .map(|e| (e.id, e.full_name()))
            .collect())
    }

    fn choose_action(&mut self) -> Result<Option<MenuAction>> {
        loop {
            writeln!(self.output, "What would you like to do?")?;
            for (i, action) in MenuAction::ALL.iter().enumerate() {
                writeln!(self.output, "  {}) {}", i + 1, action.label())?;
            }
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            match MenuAction::parse(&answer) {
                Some(action) => return Ok(Some(action)),
                None => writeln!(self.output, "Please choose one of the listed options")?,
            }
        }
    }

    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        writeln!(self.output, "{}", question)?;
        self.read_answer()
    }

    /// Lists `choices` and reads a 1-based pick. With `allow_none` an extra
    /// "None" entry is offered and picking it yields `Some(None)`.
    fn choose(
        &mut self,
        question: &str,
        field: &str,
        choices: &[(i64, String)],
        allow_none: bool,
    ) -> Result<Option<Option<i64>>> {
        if choices.is_empty() && !allow_none {
            return Err(DirectoryError::validation(
                field,
                "There is nothing to choose from yet",
            ));
        }

        writeln!(self.output, "{}", question)?;
        for (i, (id, label)) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {} (id {})", i + 1, label, id)?;
        }
        if allow_none {
            writeln!(self.output, "  {}) None", choices.len() + 1)?;
        }

        let Some(answer) = self.read_answer()? else {
            return Ok(None);
        };
        let index = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(|| {
                DirectoryError::validation(field, format!("'{}' is not a listed number", answer))
            })?;

        match choices.get(index) {
            Some((id, _)) => Ok(Some(Some(*id))),
            None if allow_none && index == choices.len() => Ok(Some(None)),
            None => Err(DirectoryError::validation(
                field,
                format!("'{}' is not a listed number", answer),
            )),
        }
    }

    fn read_answer(&mut self) -> Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn parse_salary(answer: &str) -> Result<f64> {
    answer
        .trim()
        .parse::<f64>()
        .map_err(|_| DirectoryError::validation("salary", format!("'{}' is not a number", answer)))
}

fn required(choice: Option<i64>, field: &str) -> Result<i64> {
    choice.ok_or_else(|| DirectoryError::validation(field, "A selection is required"))
}
