use std::fmt;
use thiserror::Error;

/// The three tables of the directory, used to name the side of a broken reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Department,
    Role,
    Employee,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Department => "department",
            Entity::Role => "role",
            Entity::Employee => "employee",
        };
        f.write_str(name)
    }
}

/// A store failure after classification of the driver's error code.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation {
        missing: Option<(Entity, i64)>,
        message: String,
    },

    #[error("unique violation: {0}")]
    UniqueViolation(String),

    #[error("check violation: {0}")]
    CheckViolation(String),

    #[error("not null violation: {0}")]
    NotNullViolation(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unknown store error: {0}")]
    Unknown(String),
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("No such {entity}: {id}")]
    ReferenceError { entity: Entity, id: i64 },

    #[error("{entity} {id} not found")]
    NotFoundError { entity: Entity, id: i64 },

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Configuration error on '{field}': {message}")]
    ConfigError { field: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Reference,
    NotFound,
    Store,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DirectoryError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        DirectoryError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Translates a classified store failure into the domain's error kinds.
    ///
    /// `reference` names the foreign key the caller was writing, used when the
    /// store reports a foreign key violation without saying which parent is missing.
    pub fn from_store(err: StoreError, reference: Option<(Entity, i64)>) -> Self {
        match err {
            StoreError::ForeignKeyViolation { missing, message } => match missing.or(reference) {
                Some((entity, id)) => DirectoryError::ReferenceError { entity, id },
                None => DirectoryError::StoreError(StoreError::ForeignKeyViolation {
                    missing: None,
                    message,
                }),
            },
            StoreError::CheckViolation(message) | StoreError::NotNullViolation(message) => {
                DirectoryError::ValidationError {
                    field: "record".to_string(),
                    message,
                }
            }
            other => DirectoryError::StoreError(other),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DirectoryError::ValidationError { .. } => ErrorCategory::Input,
            DirectoryError::ReferenceError { .. } => ErrorCategory::Reference,
            DirectoryError::NotFoundError { .. } => ErrorCategory::NotFound,
            DirectoryError::StoreError(_) => ErrorCategory::Store,
            DirectoryError::ConfigError { .. } => ErrorCategory::Configuration,
            DirectoryError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DirectoryError::ValidationError { .. }
            | DirectoryError::ReferenceError { .. }
            | DirectoryError::NotFoundError { .. } => ErrorSeverity::Low,
            DirectoryError::StoreError(StoreError::Unavailable(_)) => ErrorSeverity::Medium,
            DirectoryError::StoreError(_) => ErrorSeverity::High,
            DirectoryError::ConfigError { .. } | DirectoryError::IoError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// True for failures caused by the caller's input rather than the store itself.
    pub fn is_client_error(&self) -> bool {
        match self {
            DirectoryError::ValidationError { .. }
            | DirectoryError::ReferenceError { .. }
            | DirectoryError::NotFoundError { .. } => true,
            DirectoryError::StoreError(store) => matches!(
                store,
                StoreError::UniqueViolation(_)
                    | StoreError::CheckViolation(_)
                    | StoreError::NotNullViolation(_)
                    | StoreError::ForeignKeyViolation { .. }
            ),
            DirectoryError::ConfigError { .. } | DirectoryError::IoError(_) => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DirectoryError::ValidationError { field, message } => {
                format!("Invalid value for {}: {}", field, message)
            }
            DirectoryError::ReferenceError { entity, id } => {
                format!("There is no {} with id {}", entity, id)
            }
            DirectoryError::NotFoundError { entity, id } => {
                format!("{} {} was not found", capitalize(&entity.to_string()), id)
            }
            DirectoryError::StoreError(StoreError::UniqueViolation(_)) => {
                "A record with the same value already exists".to_string()
            }
            DirectoryError::StoreError(StoreError::Unavailable(_)) => {
                "The database is currently unavailable".to_string()
            }
            DirectoryError::StoreError(e) => format!("The database rejected the request: {}", e),
            DirectoryError::ConfigError { field, message } => {
                format!("Configuration problem in {}: {}", field, message)
            }
            DirectoryError::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DirectoryError::ValidationError { .. } => "Check the value and try again",
            DirectoryError::ReferenceError { .. } => {
                "List the existing records and pick one of their ids"
            }
            DirectoryError::NotFoundError { .. } => "List the employees to find a valid id",
            DirectoryError::StoreError(StoreError::UniqueViolation(_)) => {
                "Use a different name or reuse the existing record"
            }
            DirectoryError::StoreError(StoreError::Unavailable(_)) => {
                "Wait a moment and retry the operation"
            }
            DirectoryError::StoreError(_) => "Inspect the database logs for details",
            DirectoryError::ConfigError { .. } => "Fix the configuration file or command-line flags",
            DirectoryError::IoError(_) => "Check file paths and permissions",
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
