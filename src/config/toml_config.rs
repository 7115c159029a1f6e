use crate::core::ConfigProvider;
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::{validate_path, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DATABASE_PATH: &str = "directory.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    pub busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_ms: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl DirectoryConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DirectoryError::ConfigError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of the environment variable; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DirectoryError::ConfigError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// `PORT` overrides the configured server port.
    pub fn apply_port_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port.trim().parse().map_err(|_| DirectoryError::ConfigError {
                field: "PORT".to_string(),
                message: format!("'{}' is not a valid port", port),
            })?;
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.busy_timeout_ms())
    }

    pub fn verbose(&self) -> bool {
        self.logging.verbose.unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

impl ConfigProvider for DirectoryConfig {
    fn database_path(&self) -> &str {
        &self.database.path
    }

    fn busy_timeout_ms(&self) -> u64 {
        self.database
            .busy_timeout_ms
            .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS)
    }

    fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for DirectoryConfig {
    fn validate(&self) -> Result<()> {
        validate_path("database.path", &self.database.path)?;
        if self.server.host.trim().is_empty() {
            return Err(DirectoryError::ConfigError {
                field: "server.host".to_string(),
                message: "Host cannot be empty".to_string(),
            });
        }
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        if let Some(timeout) = self.database.busy_timeout_ms {
            validate_range("database.busy_timeout_ms", timeout, 0, 600_000)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[database]
path = "/var/lib/directory/org.db"
busy_timeout_ms = 250

[server]
host = "0.0.0.0"
port = 8080

[logging]
json = true
"#;

        let config = DirectoryConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.database_path(), "/var/lib/directory/org.db");
        assert_eq!(config.busy_timeout_ms(), 250);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.json_logs());
        assert!(!config.verbose());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = DirectoryConfig::from_toml_str("").unwrap();

        assert_eq!(config, DirectoryConfig::default());
        assert_eq!(config.database_path(), DEFAULT_DATABASE_PATH);
        assert_eq!(config.bind_address(), "127.0.0.1:3001");
        assert_eq!(config.busy_timeout_ms(), DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ORG_DIRECTORY_TEST_DB", "/tmp/from-env.db");

        let toml_content = r#"
[database]
path = "${ORG_DIRECTORY_TEST_DB}"
"#;

        let config = DirectoryConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.database.path, "/tmp/from-env.db");

        std::env::remove_var("ORG_DIRECTORY_TEST_DB");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[database]
path = ""
"#;

        let config = DirectoryConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let mut config = DirectoryConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = DirectoryConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, DirectoryError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[server]
port = 4000
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = DirectoryConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, DEFAULT_HOST);
    }
}
