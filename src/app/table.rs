use crate::domain::model::{Department, DepartmentBudget, EmployeeReport, RoleReport};

/// Renders rows as a left-aligned text table with a dashed header rule.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    push_line(&mut out, widths.iter().map(|w| "-".repeat(*w)), &widths);
    for row in rows {
        push_line(&mut out, row.iter().cloned(), &widths);
    }
    out
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn or_null(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "null".to_string())
}

pub fn departments(departments: &[Department]) -> String {
    let rows: Vec<Vec<String>> = departments
        .iter()
        .map(|d| vec![d.id.to_string(), d.name.clone()])
        .collect();
    render(&["id", "name"], &rows)
}

pub fn roles(roles: &[RoleReport]) -> String {
    let rows: Vec<Vec<String>> = roles
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.title.clone(),
                r.salary.to_string(),
                or_null(&r.department),
            ]
        })
        .collect();
    render(&["id", "title", "salary", "department"], &rows)
}

pub fn employees(employees: &[EmployeeReport]) -> String {
    let rows: Vec<Vec<String>> = employees
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.first_name.clone(),
                e.last_name.clone(),
                or_null(&e.role_title),
                or_null(&e.department),
                e.salary.map(|s| s.to_string()).unwrap_or_else(|| "null".to_string()),
                or_null(&e.manager_full_name),
            ]
        })
        .collect();
    render(
        &["id", "first_name", "last_name", "title", "department", "salary", "manager"],
        &rows,
    )
}

pub fn budgets(budgets: &[DepartmentBudget]) -> String {
    let rows: Vec<Vec<String>> = budgets
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.name.clone(),
                b.headcount.to_string(),
                b.total_salary.to_string(),
            ]
        })
        .collect();
    render(&["id", "department", "headcount", "total_salary"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pads_columns() {
        let table = render(
            &["id", "name"],
            &[
                vec!["1".to_string(), "Engineering".to_string()],
                vec!["12".to_string(), "HR".to_string()],
            ],
        );

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "id  name");
        assert_eq!(lines[1], "--  -----------");
        assert_eq!(lines[2], "1   Engineering");
        assert_eq!(lines[3], "12  HR");
    }

    #[test]
    fn test_render_empty_rows_keeps_header() {
        let table = render(&["id", "name"], &[]);
        assert_eq!(table, "id  name\n--  ----\n");
    }

    #[test]
    fn test_employee_table_shows_null_manager() {
        let table = employees(&[EmployeeReport {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role_title: Some("Engineer".to_string()),
            department: Some("Engineering".to_string()),
            salary: Some(90000.0),
            manager_full_name: None,
        }]);

        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with("1   Ada"));
        assert!(row.ends_with("null"));
    }
}
