use crate::utils::error::{DirectoryError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DirectoryError::validation(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| DirectoryError::validation(field_name, "Value is required"))
}

pub fn validate_salary(field_name: &str, salary: f64) -> Result<()> {
    if !salary.is_finite() {
        return Err(DirectoryError::validation(
            field_name,
            format!("Salary must be a finite number, got {}", salary),
        ));
    }
    if salary < 0.0 {
        return Err(DirectoryError::validation(
            field_name,
            format!("Salary cannot be negative, got {}", salary),
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DirectoryError::ConfigError {
            field: field_name.to_string(),
            message: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DirectoryError::ConfigError {
            field: field_name.to_string(),
            message: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DirectoryError::ConfigError {
            field: field_name.to_string(),
            message: format!("Value {} must be between {} and {}", value, min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("name", "Engineering").is_ok());
        assert!(validate_non_empty_string("name", "").is_err());
        assert!(validate_non_empty_string("name", "   \t").is_err());
    }

    #[test]
    fn test_validate_salary() {
        assert!(validate_salary("salary", 0.0).is_ok());
        assert!(validate_salary("salary", 90000.0).is_ok());
        assert!(validate_salary("salary", -1.0).is_err());
        assert!(validate_salary("salary", f64::NAN).is_err());
        assert!(validate_salary("salary", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(3_i64);
        let missing: Option<i64> = None;
        assert_eq!(*validate_required_field("department_id", &present).unwrap(), 3);
        assert!(validate_required_field("department_id", &missing).is_err());
    }

    #[test]
    fn test_validate_path_and_range() {
        assert!(validate_path("database.path", "directory.db").is_ok());
        assert!(validate_path("database.path", "").is_err());
        assert!(validate_range("server.port", 3001_u16, 1, u16::MAX).is_ok());
        assert!(validate_range("server.port", 0_u16, 1, u16::MAX).is_err());
    }
}
